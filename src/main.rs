//! TSP Heuristics - Command Line Interface
//!
//! Construct, improve and compare tours on Euclidean TSP instances.

use clap::{Parser, Subcommand, ValueEnum};
use tsp_heuristics::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use tsp_heuristics::heuristics::aco::{AcoConfig, AntColonyOptimization};
use tsp_heuristics::heuristics::construction::*;
use tsp_heuristics::heuristics::local_search::*;
use tsp_heuristics::instance::TspInstance;
use tsp_heuristics::solution::Solution;

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "tsp-heuristics")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Construction and improvement heuristics for the Euclidean TSP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance with one algorithm
    Solve {
        /// Path to the instance file (omit to use a random instance)
        #[arg(short, long)]
        instance: Option<PathBuf>,

        /// Size of the random instance when no file is given
        #[arg(short = 'n', long, default_value = "30")]
        size: usize,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "nn")]
        algorithm: Algorithm,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// GRASP restarts
        #[arg(long, default_value = "20")]
        grasp_iterations: usize,

        /// GRASP relaxation factor (>= 1.0)
        #[arg(long, default_value = "1.2")]
        relaxation: f64,

        /// Construct ACO agents in parallel
        #[arg(long)]
        parallel: bool,

        /// Output solution as JSON to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate a random instance file
    Generate {
        /// Number of points
        #[arg(short = 'n', long, default_value = "30")]
        size: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run benchmarks on a directory of instances
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of runs per stochastic algorithm
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Maximum instance size
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Compare all algorithms on an instance
    Compare {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Number of runs per stochastic algorithm
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Nearest Neighbor construction
    Nn,
    /// Cheapest Insertion construction
    Insertion,
    /// GRASP over nearest neighbour
    Grasp,
    /// Nearest Neighbor + 2-opt
    TwoOpt,
    /// Nearest Neighbor + segment reinsertion search
    Reinsertion,
    /// GRASP + segment reinsertion pipeline
    GraspReinsertion,
    /// Ant Colony Optimization
    Aco,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            size,
            algorithm,
            seed,
            grasp_iterations,
            relaxation,
            parallel,
            output,
            verbose,
        } => {
            solve_instance(
                instance,
                size,
                algorithm,
                seed,
                grasp_iterations,
                relaxation,
                parallel,
                output,
                verbose,
            );
        }

        Commands::Generate { size, seed, output } => {
            generate_instance(size, seed, &output);
        }

        Commands::Benchmark {
            dir,
            output,
            runs,
            max_size,
        } => {
            run_benchmark(&dir, &output, runs, max_size);
        }

        Commands::Analyze { instance } => {
            analyze_instance(&instance);
        }

        Commands::Compare {
            instance,
            runs,
            output,
        } => {
            compare_algorithms(&instance, runs, output);
        }
    }
}

fn load_or_generate(path: Option<PathBuf>, size: usize, seed: u64) -> TspInstance {
    let result = match path {
        Some(p) => {
            println!("Loading instance from {:?}...", p);
            TspInstance::from_file(&p)
        }
        None => {
            println!("Generating random instance with {} points (seed {})...", size, seed);
            TspInstance::random(size, seed)
        }
    };

    match result {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_instance(
    path: Option<PathBuf>,
    size: usize,
    algorithm: Algorithm,
    seed: u64,
    grasp_iterations: usize,
    relaxation: f64,
    parallel: bool,
    output: Option<PathBuf>,
    verbose: bool,
) {
    let instance = load_or_generate(path, size, seed);

    if verbose {
        println!("{}", instance.statistics());
    }

    println!("Solving with {:?} algorithm...", algorithm);
    let start = Instant::now();

    let solution = match algorithm {
        Algorithm::Nn => NearestNeighborHeuristic::new().construct(&instance),

        Algorithm::Insertion => CheapestInsertionHeuristic::new().construct(&instance),

        Algorithm::Grasp => {
            match GraspNearestNeighbor::new(grasp_iterations, relaxation, seed) {
                Ok(grasp) => grasp.construct(&instance),
                Err(e) => {
                    eprintln!("Invalid GRASP configuration: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Algorithm::TwoOpt => {
            let mut sol = NearestNeighborHeuristic::new().construct(&instance);
            TwoOptSearch::new().improve(&instance, &mut sol);
            sol.algorithm = "NearestNeighbor + 2-Opt".to_string();
            sol
        }

        Algorithm::Reinsertion => {
            let mut sol = NearestNeighborHeuristic::new().construct(&instance);
            SegmentReinsertionSearch::new().improve(&instance, &mut sol);
            sol.algorithm = "NearestNeighbor + SegmentReinsertion".to_string();
            sol
        }

        Algorithm::GraspReinsertion => {
            match GraspNearestNeighbor::new(grasp_iterations, relaxation, seed) {
                Ok(grasp) => {
                    let mut sol = grasp.construct(&instance);
                    SegmentReinsertionSearch::new().improve(&instance, &mut sol);
                    sol.algorithm = "GRASP + SegmentReinsertion".to_string();
                    sol
                }
                Err(e) => {
                    eprintln!("Invalid GRASP configuration: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Algorithm::Aco => {
            let config = AcoConfig {
                seed,
                parallel,
                ..Default::default()
            };
            match AntColonyOptimization::new(instance.clone(), config) {
                Ok(mut aco) => aco.run(),
                Err(e) => {
                    eprintln!("Invalid ACO configuration: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let elapsed = start.elapsed();

    if let Err(e) = solution.verify(&instance) {
        eprintln!("Produced tour failed validation: {}", e);
        std::process::exit(1);
    }

    println!("\n========== Results ==========");
    println!("Algorithm: {}", solution.algorithm);
    println!("Length: {:.2}", solution.length);
    println!("Time: {:.4}s", elapsed.as_secs_f64());
    if let Some(iter) = solution.iterations {
        println!("Iterations: {}", iter);
    }

    if verbose {
        println!("\nTour: {:?}", solution.tour);
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution).expect("Failed to serialize solution");
        std::fs::write(&out_path, json).expect("Failed to write output");
        println!("\nSolution saved to {:?}", out_path);
    }
}

fn generate_instance(size: usize, seed: u64, output: &PathBuf) {
    let instance = match TspInstance::random(size, seed) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error generating instance: {}", e);
            std::process::exit(1);
        }
    };

    // TSP-LIB style coordinate file, 1-indexed point ids
    let mut content = String::new();
    content.push_str(&format!("NAME: {}\n", instance.name));
    content.push_str("COMMENT: randomly generated Euclidean instance\n");
    content.push_str(&format!("DIMENSION: {}\n", instance.dimension));
    content.push_str("EDGE_WEIGHT_TYPE: EUC_2D\n");
    content.push_str("NODE_COORD_SECTION\n");
    for point in &instance.points {
        content.push_str(&format!("{} {} {}\n", point.id + 1, point.x, point.y));
    }
    content.push_str("EOF\n");

    std::fs::write(output, content).expect("Failed to write instance file");
    println!("Instance with {} points saved to {:?}", size, output);
}

fn run_benchmark(dir: &PathBuf, output: &PathBuf, runs: usize, max_size: Option<usize>) {
    println!("Loading instances from {:?}...", dir);

    let mut instances = load_instances_from_dir(dir);

    if let Some(max) = max_size {
        instances.retain(|i| i.dimension <= max);
    }

    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return;
    }

    std::fs::create_dir_all(output).expect("Failed to create output directory");

    let config = BenchmarkConfig {
        num_runs: runs,
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(config);

    for (i, instance) in instances.iter().enumerate() {
        println!(
            "\n[{}/{}] Processing {} (n={})...",
            i + 1,
            instances.len(),
            instance.name,
            instance.dimension
        );

        if let Err(e) = benchmark.run_full_benchmark(instance) {
            eprintln!("Benchmark failed on {}: {}", instance.name, e);
            std::process::exit(1);
        }
    }

    let results_path = output.join("results.csv");
    benchmark
        .export_to_csv(&results_path)
        .expect("Failed to export results");
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark
        .export_statistics_csv(&stats_path)
        .expect("Failed to export statistics");
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report).expect("Failed to save report");
    println!("Report saved to {:?}", report_path);
}

fn analyze_instance(path: &PathBuf) {
    let instance = match TspInstance::from_file(path) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let nn_sol = NearestNeighborHeuristic::new().construct(&instance);

    let mut improved = nn_sol.clone();
    TwoOptSearch::new().improve(&instance, &mut improved);

    println!("\nQuick Tour Estimates:");
    println!("  Nearest Neighbor: {:.2}", nn_sol.length);
    println!("  Nearest Neighbor + 2-Opt: {:.2}", improved.length);
}

fn compare_algorithms(path: &PathBuf, runs: usize, output: Option<PathBuf>) {
    let instance = match TspInstance::from_file(path) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Comparing algorithms on {} (n={})...\n",
        instance.name, instance.dimension
    );

    type Solver = Box<dyn Fn(&TspInstance, u64) -> Option<Solution>>;
    let algorithms: Vec<(&str, Solver)> = vec![
        (
            "NN",
            Box::new(|inst: &TspInstance, _seed: u64| {
                Some(NearestNeighborHeuristic::new().construct(inst))
            }),
        ),
        (
            "CheapestInsertion",
            Box::new(|inst: &TspInstance, _seed: u64| {
                Some(CheapestInsertionHeuristic::new().construct(inst))
            }),
        ),
        (
            "NN+2Opt",
            Box::new(|inst: &TspInstance, _seed: u64| {
                let mut sol = NearestNeighborHeuristic::new().construct(inst);
                TwoOptSearch::new().improve(inst, &mut sol);
                Some(sol)
            }),
        ),
        (
            "NN+Reinsertion",
            Box::new(|inst: &TspInstance, _seed: u64| {
                let mut sol = NearestNeighborHeuristic::new().construct(inst);
                SegmentReinsertionSearch::new().improve(inst, &mut sol);
                Some(sol)
            }),
        ),
        (
            "GRASP",
            Box::new(|inst: &TspInstance, seed: u64| {
                GraspNearestNeighbor::new(20, 1.2, seed)
                    .ok()
                    .map(|g| g.construct(inst))
            }),
        ),
        (
            "GRASP+Reinsertion",
            Box::new(|inst: &TspInstance, seed: u64| {
                GraspNearestNeighbor::new(20, 1.2, seed).ok().map(|g| {
                    let mut sol = g.construct(inst);
                    SegmentReinsertionSearch::new().improve(inst, &mut sol);
                    sol
                })
            }),
        ),
        (
            "ACO",
            Box::new(|inst: &TspInstance, seed: u64| {
                let config = AcoConfig {
                    seed,
                    ..Default::default()
                };
                AntColonyOptimization::new(inst.clone(), config)
                    .ok()
                    .map(|mut aco| aco.run())
            }),
        ),
    ];

    let mut results: Vec<(String, Vec<f64>, Vec<f64>)> = Vec::new();

    for (name, solver) in &algorithms {
        let mut lengths = Vec::new();
        let mut times = Vec::new();

        print!("Testing {}... ", name);
        std::io::Write::flush(&mut std::io::stdout()).expect("Failed to flush stdout");

        for seed in 0..runs as u64 {
            let start = Instant::now();
            if let Some(sol) = solver(&instance, seed) {
                let elapsed = start.elapsed().as_secs_f64();
                lengths.push(sol.length);
                times.push(elapsed);
            }
        }

        if !lengths.is_empty() {
            let avg_length = lengths.iter().sum::<f64>() / lengths.len() as f64;
            let avg_time = times.iter().sum::<f64>() / times.len() as f64;
            println!(
                "avg={:.2}, best={:.2}, time={:.4}s",
                avg_length,
                lengths.iter().cloned().fold(f64::INFINITY, f64::min),
                avg_time
            );
        } else {
            println!("no solutions produced");
        }

        results.push((name.to_string(), lengths, times));
    }

    println!("\n========== Summary ==========");
    println!(
        "{:<18} {:>10} {:>10} {:>10} {:>10}",
        "Algorithm", "Best", "Average", "Worst", "Avg Time"
    );
    println!("{}", "-".repeat(62));

    for (name, lengths, times) in &results {
        if !lengths.is_empty() {
            let best = lengths.iter().cloned().fold(f64::INFINITY, f64::min);
            let avg = lengths.iter().sum::<f64>() / lengths.len() as f64;
            let worst = lengths.iter().cloned().fold(0.0, f64::max);
            let avg_time = times.iter().sum::<f64>() / times.len() as f64;

            println!(
                "{:<18} {:>10.2} {:>10.2} {:>10.2} {:>10.4}",
                name, best, avg, worst, avg_time
            );
        }
    }

    if let Some(out_path) = output {
        let mut csv = String::new();
        csv.push_str("algorithm,run,length,time\n");

        for (name, lengths, times) in &results {
            for (i, (length, time)) in lengths.iter().zip(times.iter()).enumerate() {
                csv.push_str(&format!("{},{},{:.2},{:.4}\n", name, i, length, time));
            }
        }

        std::fs::write(&out_path, csv).expect("Failed to write CSV");
        println!("\nResults exported to {:?}", out_path);
    }
}
