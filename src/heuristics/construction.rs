//! Constructive heuristics producing an initial feasible tour.
//!
//! All constructors visit every point exactly once, starting from the
//! anchor point (index 0 by convention), and report the cyclic tour
//! length including the closing edge.

use crate::error::TspError;
use crate::instance::TspInstance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &TspInstance) -> Solution;
    fn name(&self) -> &str;
}

/// Nearest Neighbour Heuristic
///
/// Builds a tour by repeatedly appending the unvisited point closest to
/// the last-added point. Ties go to the first point encountered in the
/// scan, which makes the construction fully deterministic.
pub struct NearestNeighborHeuristic;

impl NearestNeighborHeuristic {
    pub fn new() -> Self {
        NearestNeighborHeuristic
    }

    fn find_nearest(&self, instance: &TspInstance, current: usize, visited: &[bool]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for candidate in 0..instance.dimension {
            if visited[candidate] {
                continue;
            }
            let dist = instance.distance(current, candidate);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((candidate, dist)),
            }
        }

        best
    }
}

impl Default for NearestNeighborHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for NearestNeighborHeuristic {
    fn construct(&self, instance: &TspInstance) -> Solution {
        let start = std::time::Instant::now();

        let mut tour = vec![0];
        let mut visited = vec![false; instance.dimension];
        visited[0] = true;

        let mut current = 0;
        let mut total_length = 0.0;

        while tour.len() < instance.dimension {
            // find_nearest only returns None once everything is visited
            if let Some((next, dist)) = self.find_nearest(instance, current, &visited) {
                tour.push(next);
                visited[next] = true;
                total_length += dist;
                current = next;
            }
        }

        // Close the cycle back to the anchor
        total_length += instance.distance(current, tour[0]);

        let mut solution = Solution::from_tour(instance, tour, self.name());
        debug_assert!((solution.length - total_length).abs() < 1e-6);
        solution.length = total_length;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "NearestNeighbor"
    }
}

/// Cheapest Insertion Heuristic
///
/// Starts from a single-point tour and repeatedly inserts the unplaced
/// point whose cheapest insertion position increases the tour length
/// the least, at that position.
pub struct CheapestInsertionHeuristic;

impl CheapestInsertionHeuristic {
    pub fn new() -> Self {
        CheapestInsertionHeuristic
    }

    /// Added length of inserting `point` into the slot after position
    /// `pos` (between tour[pos] and tour[pos+1], cyclically).
    fn insertion_cost(&self, instance: &TspInstance, tour: &[usize], point: usize, pos: usize) -> f64 {
        let prev = tour[pos];
        let next = tour[(pos + 1) % tour.len()];

        instance.distance(prev, point) + instance.distance(point, next)
            - instance.distance(prev, next)
    }

    /// Find the cheapest insertion slot for a point.
    fn find_best_insertion(&self, instance: &TspInstance, tour: &[usize], point: usize) -> (usize, f64) {
        let mut best_pos = 0;
        let mut best_cost = f64::INFINITY;

        for pos in 0..tour.len() {
            let cost = self.insertion_cost(instance, tour, point, pos);
            if cost < best_cost {
                best_cost = cost;
                best_pos = pos;
            }
        }

        (best_pos, best_cost)
    }
}

impl Default for CheapestInsertionHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for CheapestInsertionHeuristic {
    fn construct(&self, instance: &TspInstance) -> Solution {
        let start = std::time::Instant::now();

        let mut tour = vec![0];
        let mut visited = vec![false; instance.dimension];
        visited[0] = true;

        while tour.len() < instance.dimension {
            let mut best_point = 0;
            let mut best_pos = 0;
            let mut best_cost = f64::INFINITY;

            for point in 0..instance.dimension {
                if visited[point] {
                    continue;
                }
                let (pos, cost) = self.find_best_insertion(instance, &tour, point);
                if cost < best_cost {
                    best_cost = cost;
                    best_point = point;
                    best_pos = pos;
                }
            }

            tour.insert(best_pos + 1, best_point);
            visited[best_point] = true;
        }

        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "CheapestInsertion"
    }
}

/// GRASP over the nearest neighbour construction.
///
/// Each of the `iterations` restarts runs a relaxed nearest neighbour:
/// at every step the candidate list holds all unvisited points within
/// `relaxation` times the distance to the closest one, and the next
/// point is drawn uniformly from that list. The best tour over all
/// restarts is kept; ties keep the first one found.
pub struct GraspNearestNeighbor {
    iterations: usize,
    relaxation: f64,
    seed: u64,
}

impl GraspNearestNeighbor {
    /// Create a GRASP constructor.
    ///
    /// `relaxation` must be at least 1.0: a smaller factor could leave
    /// the candidate list empty mid-construction.
    pub fn new(iterations: usize, relaxation: f64, seed: u64) -> Result<Self, TspError> {
        if iterations == 0 {
            return Err(TspError::invalid_parameter(
                "iterations",
                "GRASP needs at least one restart",
            ));
        }
        if !(relaxation >= 1.0) {
            return Err(TspError::invalid_parameter(
                "relaxation",
                format!("must be >= 1.0, got {}", relaxation),
            ));
        }

        Ok(GraspNearestNeighbor {
            iterations,
            relaxation,
            seed,
        })
    }

    /// One randomized-greedy construction, returning the tour and its
    /// cyclic length.
    fn construct_once(&self, instance: &TspInstance, rng: &mut ChaCha8Rng) -> (Vec<usize>, f64) {
        let n = instance.dimension;
        let mut tour = vec![0];
        let mut visited = vec![false; n];
        visited[0] = true;

        let mut current = 0;
        let mut total_length = 0.0;

        while tour.len() < n {
            let mut min_dist = f64::INFINITY;
            for candidate in 0..n {
                if !visited[candidate] {
                    min_dist = min_dist.min(instance.distance(current, candidate));
                }
            }

            let options: Vec<usize> = (0..n)
                .filter(|&c| !visited[c])
                .filter(|&c| instance.distance(current, c) <= self.relaxation * min_dist)
                .collect();

            // options is non-empty: the closest point always qualifies
            // since relaxation >= 1
            let chosen = options[rng.gen_range(0..options.len())];
            total_length += instance.distance(current, chosen);
            tour.push(chosen);
            visited[chosen] = true;
            current = chosen;
        }

        total_length += instance.distance(current, tour[0]);
        (tour, total_length)
    }
}

impl ConstructionHeuristic for GraspNearestNeighbor {
    fn construct(&self, instance: &TspInstance) -> Solution {
        let start = std::time::Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut best_tour: Vec<usize> = Vec::new();
        let mut best_length = f64::INFINITY;

        for _ in 0..self.iterations {
            let (tour, length) = self.construct_once(instance, &mut rng);
            if length < best_length {
                best_length = length;
                best_tour = tour;
            }
        }

        let mut solution = Solution::from_tour(instance, best_tour, self.name());
        debug_assert!((solution.length - best_length).abs() < 1e-6);
        solution.length = best_length;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.iterations = Some(self.iterations);
        solution
    }

    fn name(&self) -> &str {
        "GRASP-NearestNeighbor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;
    use std::collections::HashSet;

    fn square_instance() -> TspInstance {
        let points = vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, 0.0, 1.0),
            Point::new(2, 1.0, 1.0),
            Point::new(3, 1.0, 0.0),
        ];
        TspInstance::new("square", points).unwrap()
    }

    // Pairwise distances are all distinct, so every nearest neighbour
    // step has a unique minimum.
    fn tie_free_instance() -> TspInstance {
        let points = vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, 1.0, 0.1),
            Point::new(2, 2.3, 0.5),
            Point::new(3, 3.1, 2.0),
            Point::new(4, 0.5, 3.3),
            Point::new(5, 5.0, 1.2),
            Point::new(6, 4.2, 4.1),
        ];
        TspInstance::new("tie-free", points).unwrap()
    }

    fn assert_covers_all(solution: &Solution, dimension: usize) {
        assert_eq!(solution.tour.len(), dimension);
        let unique: HashSet<usize> = solution.tour.iter().cloned().collect();
        assert_eq!(unique.len(), dimension);
    }

    #[test]
    fn test_nearest_neighbor_square() {
        let instance = square_instance();
        let solution = NearestNeighborHeuristic::new().construct(&instance);

        assert_covers_all(&solution, 4);
        assert_eq!(solution.tour[0], 0);
        assert!((solution.length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_neighbor_length_consistency() {
        let instance = TspInstance::random(30, 5).unwrap();
        let solution = NearestNeighborHeuristic::new().construct(&instance);

        assert_covers_all(&solution, 30);
        assert!((solution.length - instance.tour_length(&solution.tour)).abs() < 1e-6);
    }

    #[test]
    fn test_cheapest_insertion_covers_all() {
        let instance = TspInstance::random(25, 9).unwrap();
        let solution = CheapestInsertionHeuristic::new().construct(&instance);

        assert_covers_all(&solution, 25);
        assert!((solution.length - instance.tour_length(&solution.tour)).abs() < 1e-6);
    }

    #[test]
    fn test_cheapest_insertion_square() {
        let instance = square_instance();
        let solution = CheapestInsertionHeuristic::new().construct(&instance);

        assert_covers_all(&solution, 4);
        assert!((solution.length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_grasp_rejects_relaxation_below_one() {
        assert!(matches!(
            GraspNearestNeighbor::new(10, 0.9, 42),
            Err(TspError::InvalidParameter { .. })
        ));
        assert!(matches!(
            GraspNearestNeighbor::new(0, 1.5, 42),
            Err(TspError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_grasp_with_unit_relaxation_matches_nearest_neighbor() {
        let instance = tie_free_instance();
        let nn = NearestNeighborHeuristic::new().construct(&instance);
        let grasp = GraspNearestNeighbor::new(5, 1.0, 42)
            .unwrap()
            .construct(&instance);

        // With relaxation 1.0 and no distance ties the candidate list is
        // always a singleton, so GRASP degenerates to nearest neighbour.
        assert_eq!(grasp.tour, nn.tour);
        assert!((grasp.length - nn.length).abs() < 1e-9);
    }

    #[test]
    fn test_grasp_covers_all_and_is_deterministic() {
        let instance = TspInstance::random(20, 11).unwrap();
        let constructor = GraspNearestNeighbor::new(50, 1.3, 7).unwrap();

        let a = constructor.construct(&instance);
        let b = constructor.construct(&instance);

        assert_covers_all(&a, 20);
        assert_eq!(a.tour, b.tour);
        assert!((a.length - instance.tour_length(&a.tour)).abs() < 1e-6);
    }
}
