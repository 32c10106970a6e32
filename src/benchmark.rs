//! Benchmarking and experimentation module.
//!
//! Provides tools for running experiments, collecting statistics,
//! and comparing algorithm performance.

use crate::error::TspError;
use crate::heuristics::aco::{AcoConfig, AntColonyOptimization};
use crate::heuristics::construction::*;
use crate::heuristics::local_search::*;
use crate::instance::TspInstance;
use crate::solution::Solution;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Tour length
    pub length: f64,
    /// Computation time in seconds
    pub time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
    /// Gap to best known (if available)
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    /// Algorithm name
    pub algorithm: String,
    /// Number of recorded runs
    pub num_runs: usize,
    /// Average tour length
    pub avg_length: f64,
    /// Best tour length
    pub best_length: f64,
    /// Worst tour length
    pub worst_length: f64,
    /// Standard deviation of tour length
    pub std_length: f64,
    /// Average time
    pub avg_time: f64,
    /// Total time
    pub total_time: f64,
    /// Average gap to best known
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per stochastic algorithm
    pub num_runs: usize,
    /// GRASP restarts per run
    pub grasp_iterations: usize,
    /// GRASP relaxation factor
    pub grasp_relaxation: f64,
    /// Construct ACO agents in parallel
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            grasp_iterations: 20,
            grasp_relaxation: 1.2,
            parallel: false,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    best_known: HashMap<String, f64>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    /// Set best known solution for an instance
    pub fn set_best_known(&mut self, instance_name: &str, length: f64) {
        self.best_known.insert(instance_name.to_string(), length);
    }

    /// Run both deterministic construction heuristics on an instance.
    pub fn run_construction_heuristics(&mut self, instance: &TspInstance) {
        let heuristics: Vec<Box<dyn ConstructionHeuristic>> = vec![
            Box::new(NearestNeighborHeuristic::new()),
            Box::new(CheapestInsertionHeuristic::new()),
        ];

        for heuristic in heuristics {
            let solution = heuristic.construct(instance);
            self.record_result(instance, &solution);
        }
    }

    /// Run both local searches on a copy of the given initial solution.
    pub fn run_local_search(&mut self, instance: &TspInstance, initial: &Solution) {
        let searches: Vec<Box<dyn LocalSearch>> = vec![
            Box::new(TwoOptSearch::new()),
            Box::new(SegmentReinsertionSearch::new()),
        ];

        for search in searches {
            let mut solution = initial.clone();
            let start = std::time::Instant::now();
            search.improve(instance, &mut solution);
            solution.computation_time = start.elapsed().as_secs_f64();
            solution.algorithm = format!("{} + {}", initial.algorithm, search.name());
            self.record_result(instance, &solution);
        }
    }

    /// Run the stochastic methods, once per configured seed.
    pub fn run_metaheuristics(&mut self, instance: &TspInstance) -> Result<(), TspError> {
        for seed in 0..self.config.num_runs {
            let grasp = GraspNearestNeighbor::new(
                self.config.grasp_iterations,
                self.config.grasp_relaxation,
                seed as u64,
            )?;
            let mut solution = grasp.construct(instance);
            solution.algorithm = format!("GRASP-run{}", seed);
            self.record_result(instance, &solution);
        }

        for seed in 0..self.config.num_runs {
            let aco_config = AcoConfig {
                seed: seed as u64,
                parallel: self.config.parallel,
                ..Default::default()
            };

            let mut aco = AntColonyOptimization::new(instance.clone(), aco_config)?;
            let mut solution = aco.run();
            solution.algorithm = format!("ACO-run{}", seed);
            self.record_result(instance, &solution);
        }

        Ok(())
    }

    /// Run the whole suite on an instance.
    pub fn run_full_benchmark(&mut self, instance: &TspInstance) -> Result<(), TspError> {
        log::info!("running benchmark on instance {}", instance.name);

        self.run_construction_heuristics(instance);

        let initial = NearestNeighborHeuristic::new().construct(instance);
        self.run_local_search(instance, &initial);

        self.run_metaheuristics(instance)
    }

    /// Run the suite on multiple instances.
    pub fn run_on_instances(&mut self, instances: &[TspInstance]) -> Result<(), TspError> {
        for instance in instances {
            self.run_full_benchmark(instance)?;
        }
        Ok(())
    }

    /// Record a result, rejecting tours that fail validation.
    fn record_result(&mut self, instance: &TspInstance, solution: &Solution) {
        if let Err(e) = solution.verify(instance) {
            log::error!(
                "{} produced an invalid tour on {}: {}",
                solution.algorithm,
                instance.name,
                e
            );
            return;
        }

        let mut result = AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            instance: instance.name.clone(),
            dimension: instance.dimension,
            length: solution.length,
            time: solution.computation_time,
            iterations: solution.iterations,
            gap_to_best: None,
        };

        if let Some(&best) = self.best_known.get(&instance.name) {
            result.gap_to_best = Some((result.length - best) / best * 100.0);
        }

        self.results.push(result);
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut stats_map: HashMap<String, Vec<&AlgorithmResult>> = HashMap::new();

        for result in &self.results {
            stats_map
                .entry(result.algorithm.clone())
                .or_default()
                .push(result);
        }

        let mut statistics = Vec::new();

        for (algo, results) in stats_map {
            let lengths: Vec<f64> = results.iter().map(|r| r.length).collect();
            let times: Vec<f64> = results.iter().map(|r| r.time).collect();
            let gaps: Vec<f64> = results.iter().filter_map(|r| r.gap_to_best).collect();

            let avg_length = lengths.iter().sum::<f64>() / lengths.len() as f64;
            let best_length = lengths.iter().cloned().fold(f64::INFINITY, f64::min);
            let worst_length = lengths.iter().cloned().fold(0.0, f64::max);

            let variance = lengths
                .iter()
                .map(|l| (l - avg_length).powi(2))
                .sum::<f64>()
                / lengths.len() as f64;
            let std_length = variance.sqrt();

            let avg_time = times.iter().sum::<f64>() / times.len() as f64;
            let total_time = times.iter().sum::<f64>();

            let avg_gap = if !gaps.is_empty() {
                Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
            } else {
                None
            };

            statistics.push(AlgorithmStatistics {
                algorithm: algo,
                num_runs: results.len(),
                avg_length,
                best_length,
                worst_length,
                std_length,
                avg_time,
                total_time,
                avg_gap,
            });
        }

        statistics.sort_by(|a, b| a.avg_length.total_cmp(&b.avg_length));

        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        let stats = self.compute_statistics();
        for stat in stats {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       TSP Benchmark Report\n");
        report.push_str("========================================\n\n");

        let stats = self.compute_statistics();

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<30} {:>6} {:>12} {:>12} {:>10} {:>10}\n",
            "Algorithm", "Runs", "Avg Length", "Best Length", "Avg Gap%", "Avg Time"
        ));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for stat in &stats {
            let gap_str = stat
                .avg_gap
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<30} {:>6} {:>12.2} {:>12.2} {:>10} {:>10.4}\n",
                stat.algorithm, stat.num_runs, stat.avg_length, stat.best_length, gap_str, stat.avg_time
            ));
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        report.push_str("\nBest Tours per Instance:\n");

        let mut instance_best: HashMap<String, &AlgorithmResult> = HashMap::new();
        for result in &self.results {
            let entry = instance_best
                .entry(result.instance.clone())
                .or_insert(result);
            if result.length < entry.length {
                *entry = result;
            }
        }

        for (instance, best) in &instance_best {
            report.push_str(&format!(
                "  {}: {:.2} ({})\n",
                instance, best.length, best.algorithm
            ));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    /// Get best known values
    pub fn best_known(&self) -> &HashMap<String, f64> {
        &self.best_known
    }
}

/// Helper function to load instances from a directory
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Vec<TspInstance> {
    let mut instances = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "tsp").unwrap_or(false) {
                match TspInstance::from_file(&path) {
                    Ok(instance) => instances.push(instance),
                    Err(e) => log::warn!("skipping {:?}: {}", path, e),
                }
            }
        }
    }

    // Sort by dimension
    instances.sort_by_key(|i| i.dimension);

    instances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
    }

    #[test]
    fn test_full_benchmark_records_all_runs() {
        let instance = TspInstance::random(15, 8).unwrap();
        let config = BenchmarkConfig {
            num_runs: 2,
            ..Default::default()
        };

        let mut benchmark = Benchmark::new(config);
        benchmark.run_full_benchmark(&instance).unwrap();

        // 2 constructions + 2 local searches + 2 GRASP + 2 ACO runs
        assert_eq!(benchmark.results().len(), 8);
        assert!(benchmark.results().iter().all(|r| r.length > 0.0));
    }

    #[test]
    fn test_gap_to_best_known() {
        let instance = TspInstance::random(10, 2).unwrap();
        let mut benchmark = Benchmark::new(BenchmarkConfig::default());
        benchmark.set_best_known(&instance.name, 100.0);

        benchmark.run_construction_heuristics(&instance);

        for result in benchmark.results() {
            let gap = result.gap_to_best.unwrap();
            assert!((gap - (result.length - 100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_statistics_aggregate_per_algorithm() {
        let instance = TspInstance::random(10, 2).unwrap();
        let mut benchmark = Benchmark::new(BenchmarkConfig::default());

        benchmark.run_construction_heuristics(&instance);
        let stats = benchmark.compute_statistics();

        assert_eq!(stats.len(), 2);
        for stat in &stats {
            assert_eq!(stat.num_runs, 1);
            assert!(stat.best_length <= stat.avg_length + 1e-9);
            assert!(stat.avg_length <= stat.worst_length + 1e-9);
        }
    }
}
