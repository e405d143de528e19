//! Genetic search CLI - Solve point-goal queries from JSON problem files.

use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use genetic_search::{
    compute::{GoalState, RealVectorSearch, StateSpace, solve_parallel},
    schema::ProblemConfig,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <problem.json> [seconds]", args[0]);
        eprintln!();
        eprintln!("Search for a valid state inside the goal region of a JSON problem.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  problem.json  Path to problem description");
        eprintln!("  seconds       Time budget per worker (default: 1.0)");
        eprintln!();
        eprintln!("Example problem is printed with --example flag.");
        process::exit(1);
    }

    if args[1] == "--example" {
        print_example_problem();
        return;
    }

    let solve_time = parse_budget(args.get(2).map(String::as_str)).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    let problem = ProblemConfig::load(&args[1]).unwrap_or_else(|e| {
        eprintln!("Error loading problem: {}", e);
        process::exit(1);
    });

    println!("Genetic Search");
    println!("==============");
    println!("Dimensions: {}", problem.dimension());
    println!("Obstacles: {}", problem.obstacles.len());
    println!("Goal threshold: {}", problem.threshold);
    println!(
        "Pool: {} (mutation {}, random {})",
        problem.search.pool_size, problem.search.pool_mutation, problem.search.pool_random
    );
    println!("Workers: {}", problem.workers);
    println!("Budget: {:.3}s", solve_time.as_secs_f64());
    println!();

    let space = Arc::new(problem.space());
    let goal = GoalState::new(Arc::clone(&space), problem.goal_state(), problem.threshold);
    let hints = problem.hint_states();

    let mut engines = Vec::with_capacity(problem.workers);
    for worker in 0..problem.workers {
        let seed = problem.random_seed.map(|s| s.wrapping_add(worker as u64));
        let engine = RealVectorSearch::real_vector(Arc::clone(&space), problem.search.clone(), seed)
            .unwrap_or_else(|e| {
                eprintln!("Invalid search configuration: {}", e);
                process::exit(1);
            });
        engines.push(engine);
    }

    let start = Instant::now();
    let outcome = solve_parallel(&mut engines, solve_time, &goal, &hints).unwrap_or_else(|e| {
        eprintln!("Search failed: {}", e);
        process::exit(1);
    });
    let elapsed = start.elapsed();

    for (worker, engine) in engines.iter().enumerate() {
        if let Some(stats) = engine.stats() {
            println!(
                "  Worker {}: {:?} after {} generations, best distance {:.6}",
                worker, stats.stop_reason, stats.generations, stats.best_distance
            );
        }
    }
    println!();

    match outcome {
        Some(solution) => {
            println!("Solution found by worker {}:", solution.worker);
            println!("  Distance to goal: {:.6}", solution.distance);
            println!("  Valid: {}", space.is_valid(&solution.state));
            println!("  Time: {:.3}s", elapsed.as_secs_f64());
            match serde_json::to_string(&solution.state) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error serializing solution: {}", e),
            }
        }
        None => {
            println!("No solution found in {:.3}s", elapsed.as_secs_f64());
            process::exit(2);
        }
    }
}

/// Time budget from the optional seconds argument (default: 1 second).
fn parse_budget(arg: Option<&str>) -> Result<Duration, String> {
    let Some(arg) = arg else {
        return Ok(Duration::from_secs(1));
    };
    let seconds: f64 = arg
        .parse()
        .map_err(|e| format!("Invalid time budget {:?}: {}", arg, e))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("Invalid time budget {}: {}", seconds, e))
}

fn print_example_problem() {
    let problem = ProblemConfig::default();

    println!("Example problem (problem.json):");
    match serde_json::to_string_pretty(&problem) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
