//! Ant Colony Optimization.
//!
//! Agents build tours edge by edge, drawn by roulette over a score that
//! combines pheromone level and closeness. After every iteration only
//! the best agent of the round deposits pheromone (elitist update).

use crate::error::TspError;
use crate::heuristics::local_search::{LocalSearch, TwoOptSearch};
use crate::instance::TspInstance;
use crate::solution::Solution;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashSet;

/// ACO configuration parameters
#[derive(Debug, Clone)]
pub struct AcoConfig {
    /// Number of agents per iteration
    pub num_ants: usize,
    /// Number of iterations
    pub iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Distance importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho); persistence is 1 - rho
    pub evaporation_rate: f64,
    /// Pheromone deposit factor
    pub q: f64,
    /// Initial pheromone level on every edge
    pub initial_pheromone: f64,
    /// Refine each agent's tour with 2-opt before the update step
    pub apply_two_opt: bool,
    /// Construct the agents of one iteration in parallel
    pub parallel: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            num_ants: 10,
            iterations: 20,
            alpha: 0.5,
            beta: 1.0,
            evaporation_rate: 0.9,
            q: 100.0,
            initial_pheromone: 1.0,
            apply_two_opt: false,
            parallel: false,
            seed: 42,
        }
    }
}

impl AcoConfig {
    /// Check that every parameter is inside its documented domain.
    pub fn validate(&self) -> Result<(), TspError> {
        if self.num_ants == 0 {
            return Err(TspError::invalid_parameter(
                "num_ants",
                "at least one agent is required",
            ));
        }
        if self.iterations == 0 {
            return Err(TspError::invalid_parameter(
                "iterations",
                "at least one iteration is required",
            ));
        }
        if !(0.0..1.0).contains(&self.evaporation_rate) {
            return Err(TspError::invalid_parameter(
                "evaporation_rate",
                format!("must be in [0, 1), got {}", self.evaporation_rate),
            ));
        }
        if !(self.q > 0.0) {
            return Err(TspError::invalid_parameter(
                "q",
                format!("deposit factor must be positive, got {}", self.q),
            ));
        }
        if !(self.initial_pheromone > 0.0) {
            return Err(TspError::invalid_parameter(
                "initial_pheromone",
                format!("must be positive, got {}", self.initial_pheromone),
            ));
        }
        Ok(())
    }
}

/// One agent's tour under construction: the ordered path, the directed
/// edges already traversed, and the running length.
struct Ant {
    path: Vec<usize>,
    used_edges: HashSet<(usize, usize)>,
    length: f64,
}

impl Ant {
    fn new(anchor: usize) -> Self {
        Ant {
            path: vec![anchor],
            used_edges: HashSet::new(),
            length: 0.0,
        }
    }

    /// Append a point to the path. Visiting a point twice is a
    /// construction bug, not recoverable input.
    fn add_to_path(&mut self, instance: &TspInstance, point: usize) {
        assert!(
            !self.path.contains(&point),
            "point {} added to the path twice",
            point
        );

        let last = self.path[self.path.len() - 1];
        self.length += instance.distance(last, point);
        self.used_edges.insert((last, point));
        self.path.push(point);

        // Once every point is placed, close the cycle.
        if self.path.len() == instance.dimension {
            let first = self.path[0];
            self.length += instance.distance(point, first);
            self.used_edges.insert((point, first));
        }
    }

    /// Resynchronize the edge set and length after the path has been
    /// rewritten externally, rotating the anchor back to the front so
    /// tours stay comparable across agents.
    fn refresh_from_path(&mut self, instance: &TspInstance, anchor: usize) {
        if let Some(pos) = self.path.iter().position(|&p| p == anchor) {
            self.path.rotate_left(pos);
        }

        self.used_edges.clear();
        let n = self.path.len();
        for i in 0..n {
            self.used_edges.insert((self.path[i], self.path[(i + 1) % n]));
        }
        self.length = instance.tour_length(&self.path);
    }
}

/// Ant Colony Optimization solver
pub struct AntColonyOptimization {
    config: AcoConfig,
    instance: TspInstance,
    pheromone: Vec<Vec<f64>>,
    best_tour: Vec<usize>,
    best_length: f64,
    rng: ChaCha8Rng,
}

impl AntColonyOptimization {
    pub fn new(instance: TspInstance, config: AcoConfig) -> Result<Self, TspError> {
        config.validate()?;

        let n = instance.dimension;
        let pheromone = vec![vec![config.initial_pheromone; n]; n];
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(AntColonyOptimization {
            config,
            instance,
            pheromone,
            best_tour: Vec::new(),
            best_length: f64::INFINITY,
            rng,
        })
    }

    /// Attraction of moving from `current` to `candidate`. The constant
    /// in the denominator keeps zero-distance pairs finite.
    fn edge_score(&self, current: usize, candidate: usize) -> f64 {
        let tau = self.pheromone[current][candidate];
        let dist = self.instance.distance(current, candidate);
        tau.powf(self.config.alpha) / (dist.powf(self.config.beta) + 0.1)
    }

    /// Build one agent's complete tour from its own seeded generator.
    fn construct_ant(&self, seed: u64) -> Ant {
        let n = self.instance.dimension;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut ant = Ant::new(0);
        let mut visited = vec![false; n];
        visited[0] = true;
        let mut current = 0;

        while ant.path.len() < n {
            let candidates: Vec<(usize, f64)> = (0..n)
                .filter(|&j| !visited[j])
                .map(|j| (j, self.edge_score(current, j)))
                .collect();

            // Roulette wheel over the scores
            let total: f64 = candidates.iter().map(|&(_, s)| s).sum();
            let mut pick = rng.gen::<f64>() * total;
            let mut chosen = candidates[candidates.len() - 1].0;
            for &(j, score) in &candidates {
                pick -= score;
                if pick <= 0.0 {
                    chosen = j;
                    break;
                }
            }

            ant.add_to_path(&self.instance, chosen);
            visited[chosen] = true;
            current = chosen;
        }

        if self.config.apply_two_opt {
            let mut refined = Solution::from_tour(&self.instance, ant.path.clone(), "aco-agent");
            TwoOptSearch::new().improve(&self.instance, &mut refined);
            ant.path = refined.tour;
            ant.refresh_from_path(&self.instance, 0);
        }

        ant
    }

    /// Evaporate every edge, then let the round's best agent deposit on
    /// the directed edges it traversed.
    fn update_pheromone(&mut self, best: &Ant) {
        let n = self.instance.dimension;
        let persistence = 1.0 - self.config.evaporation_rate;
        let deposit = self.config.q / best.length;

        for i in 0..n {
            for j in 0..n {
                let mut level = persistence * self.pheromone[i][j];
                if best.used_edges.contains(&(i, j)) {
                    level += deposit;
                }
                self.pheromone[i][j] = level;
            }
        }
    }

    /// Run the colony and return the best tour found over all iterations.
    pub fn run(&mut self) -> Solution {
        let start = std::time::Instant::now();

        for iteration in 0..self.config.iterations {
            // Per-agent seeds are drawn up front from the master
            // generator, so parallel and sequential construction walk
            // the same random sequence.
            let seeds: Vec<u64> = (0..self.config.num_ants).map(|_| self.rng.gen()).collect();

            let ants: Vec<Ant> = if self.config.parallel {
                seeds.par_iter().map(|&s| self.construct_ant(s)).collect()
            } else {
                seeds.iter().map(|&s| self.construct_ant(s)).collect()
            };

            // Round best; ties keep the earliest agent.
            if let Some(round_best) = ants.iter().min_by_key(|a| OrderedFloat(a.length)) {
                if round_best.length < self.best_length {
                    log::debug!(
                        "iteration {}: new best length {:.4}",
                        iteration,
                        round_best.length
                    );
                    self.best_length = round_best.length;
                    self.best_tour = round_best.path.clone();
                }

                let elite = Ant {
                    path: round_best.path.clone(),
                    used_edges: round_best.used_edges.clone(),
                    length: round_best.length,
                };
                self.update_pheromone(&elite);
            }
        }

        let mut solution = Solution::from_tour(&self.instance, self.best_tour.clone(), "ACO");
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.iterations = Some(self.config.iterations);
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_instance() -> TspInstance {
        TspInstance::random(12, 3).unwrap()
    }

    fn small_config() -> AcoConfig {
        AcoConfig {
            num_ants: 5,
            iterations: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(AcoConfig::default().validate().is_ok());

        let bad_rho = AcoConfig {
            evaporation_rate: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_rho.validate(),
            Err(TspError::InvalidParameter { .. })
        ));

        let bad_q = AcoConfig {
            q: 0.0,
            ..Default::default()
        };
        assert!(bad_q.validate().is_err());

        let no_ants = AcoConfig {
            num_ants: 0,
            ..Default::default()
        };
        assert!(no_ants.validate().is_err());
    }

    #[test]
    fn test_aco_produces_valid_tour() {
        let instance = create_test_instance();
        let mut aco = AntColonyOptimization::new(instance.clone(), small_config()).unwrap();
        let solution = aco.run();

        assert!(solution.verify(&instance).is_ok());
        assert_eq!(solution.tour[0], 0);
        assert_eq!(solution.iterations, Some(10));
    }

    #[test]
    fn test_aco_pheromone_stays_positive() {
        let instance = create_test_instance();
        let mut aco = AntColonyOptimization::new(instance, small_config()).unwrap();
        aco.run();

        for row in &aco.pheromone {
            for &level in row {
                assert!(level > 0.0);
            }
        }
    }

    #[test]
    fn test_aco_is_deterministic() {
        let instance = create_test_instance();
        let mut a = AntColonyOptimization::new(instance.clone(), small_config()).unwrap();
        let mut b = AntColonyOptimization::new(instance, small_config()).unwrap();

        let sol_a = a.run();
        let sol_b = b.run();

        assert_eq!(sol_a.tour, sol_b.tour);
        assert_eq!(sol_a.length, sol_b.length);
    }

    #[test]
    fn test_aco_parallel_matches_sequential() {
        let instance = create_test_instance();
        let sequential = AcoConfig {
            parallel: false,
            ..small_config()
        };
        let parallel = AcoConfig {
            parallel: true,
            ..small_config()
        };

        let sol_seq = AntColonyOptimization::new(instance.clone(), sequential)
            .unwrap()
            .run();
        let sol_par = AntColonyOptimization::new(instance, parallel)
            .unwrap()
            .run();

        assert_eq!(sol_seq.tour, sol_par.tour);
    }

    #[test]
    fn test_aco_with_two_opt_anchors_tour() {
        let instance = create_test_instance();
        let config = AcoConfig {
            apply_two_opt: true,
            ..small_config()
        };
        let mut aco = AntColonyOptimization::new(instance.clone(), config).unwrap();
        let solution = aco.run();

        assert!(solution.verify(&instance).is_ok());
        assert_eq!(solution.tour[0], 0);
    }

    #[test]
    fn test_ant_closes_cycle() {
        let instance = TspInstance::random(4, 1).unwrap();
        let mut ant = Ant::new(0);
        ant.add_to_path(&instance, 2);
        ant.add_to_path(&instance, 1);
        ant.add_to_path(&instance, 3);

        assert_eq!(ant.path, vec![0, 2, 1, 3]);
        assert!(ant.used_edges.contains(&(3, 0)));
        assert!((ant.length - instance.tour_length(&ant.path)).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "added to the path twice")]
    fn test_ant_rejects_duplicate_point() {
        let instance = TspInstance::random(4, 1).unwrap();
        let mut ant = Ant::new(0);
        ant.add_to_path(&instance, 2);
        ant.add_to_path(&instance, 2);
    }
}
