//! Local search improvement heuristics.
//!
//! This module implements the two improvement procedures:
//! - 2-opt edge exchange, run to a local optimum
//! - generalized segment reinsertion, sweeping every segment, insertion
//!   position and orientation per pass

use crate::instance::TspInstance;
use crate::solution::Solution;

/// Trait for local search improvement methods.
///
/// `improve` mutates the caller's working copy in place and reports
/// whether any improving move was applied.
pub trait LocalSearch {
    fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> bool;
    fn name(&self) -> &str;
}

/// 2-Opt Local Search
///
/// Breaks two non-adjacent edges and reconnects them by reversing the
/// enclosed sub-path. Full sweeps repeat until one finds no move that
/// gains more than the improvement threshold, which also guards against
/// endless loops on zero-gain exchanges.
pub struct TwoOptSearch {
    /// Minimum gain for a swap to be accepted
    pub improvement_threshold: f64,
}

impl TwoOptSearch {
    pub fn new() -> Self {
        TwoOptSearch {
            improvement_threshold: 0.01,
        }
    }

    /// Gain of replacing edges (a,b) and (c,d) with (a,c) and (b,d).
    /// Negative values are improvements.
    fn cost_change(instance: &TspInstance, a: usize, b: usize, c: usize, d: usize) -> f64 {
        instance.distance(a, c) + instance.distance(b, d)
            - instance.distance(a, b)
            - instance.distance(c, d)
    }
}

impl Default for TwoOptSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for TwoOptSearch {
    fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> bool {
        let n = solution.tour.len();
        if n < 4 {
            return false;
        }

        let mut total_improved = false;
        let mut improvement = true;

        while improvement {
            improvement = false;

            for i in 0..n - 2 {
                for k in i + 2..n {
                    let prev_i = if i == 0 { n - 1 } else { i - 1 };
                    let delta = Self::cost_change(
                        instance,
                        solution.tour[prev_i],
                        solution.tour[i],
                        solution.tour[k - 1],
                        solution.tour[k],
                    );

                    if delta < -self.improvement_threshold {
                        solution.tour[i..k].reverse();
                        solution.length += delta;
                        improvement = true;
                        total_improved = true;
                    }
                }
            }
        }

        // Resynchronize with the evaluator to shed accumulated
        // floating-point drift from the incremental updates.
        solution.length = instance.tour_length(&solution.tour);
        total_improved
    }

    fn name(&self) -> &str {
        "2-Opt"
    }
}

/// Segment Reinsertion Local Search
///
/// Best-improvement sweep over every move of the general reinsertion
/// operator: all contiguous segments, all insertion positions in the
/// shortened tour, both orientations. Each pass is O(n^4) move
/// evaluations, so this is meant for small instances; passes repeat
/// until no move gains more than the threshold or the pass cap is hit.
pub struct SegmentReinsertionSearch {
    /// Maximum number of full sweeps
    pub max_passes: usize,
    /// Minimum gain for a move to be accepted
    pub improvement_threshold: f64,
}

impl SegmentReinsertionSearch {
    pub fn new() -> Self {
        SegmentReinsertionSearch {
            max_passes: 50,
            improvement_threshold: 1e-4,
        }
    }

    pub fn with_max_passes(max_passes: usize) -> Self {
        SegmentReinsertionSearch {
            max_passes,
            improvement_threshold: 1e-4,
        }
    }
}

impl Default for SegmentReinsertionSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for SegmentReinsertionSearch {
    fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> bool {
        let n = solution.tour.len();
        if n < 3 {
            return false;
        }

        let mut total_improved = false;

        for _ in 0..self.max_passes {
            let mut best: Option<Solution> = None;
            let mut best_length = solution.length;

            for seg_start in 0..n {
                for seg_end in seg_start..n {
                    let remaining = n - (seg_end - seg_start + 1);
                    if remaining == 0 {
                        continue;
                    }
                    for insert_after in 0..remaining {
                        for reverse in [false, true] {
                            let candidate = solution.reinsert_segment(
                                instance,
                                (seg_start, seg_end),
                                insert_after,
                                reverse,
                            );
                            if candidate.length < best_length - self.improvement_threshold {
                                best_length = candidate.length;
                                best = Some(candidate);
                            }
                        }
                    }
                }
            }

            match best {
                Some(better) => {
                    log::debug!(
                        "reinsertion pass improved {:.4} -> {:.4}",
                        solution.length,
                        better.length
                    );
                    solution.tour = better.tour;
                    solution.length = better.length;
                    total_improved = true;
                }
                None => break,
            }
        }

        solution.length = instance.tour_length(&solution.tour);
        total_improved
    }

    fn name(&self) -> &str {
        "SegmentReinsertion"
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

    #[test]
    fn test_two_opt_uncrosses_square() {
        let instance = square_instance();
        // (0,0) -> (1,1) -> (0,1) -> (1,0): both diagonals crossed
        let mut solution = Solution::from_tour(&instance, vec![0, 2, 1, 3], "test");
        let initial = solution.length;

        let improved = TwoOptSearch::new().improve(&instance, &mut solution);

        assert!(improved);
        assert!(solution.length < initial);
        assert!((solution.length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_opt_never_worsens() {
        let instance = TspInstance::random(25, 3).unwrap();
        let mut solution = Solution::from_tour(&instance, (0..25).collect(), "test");
        let initial = solution.length;

        TwoOptSearch::new().improve(&instance, &mut solution);

        assert!(solution.length <= initial + 1e-9);
        assert!((solution.length - instance.tour_length(&solution.tour)).abs() < 1e-6);

        let unique: HashSet<usize> = solution.tour.iter().cloned().collect();
        assert_eq!(unique.len(), 25);
    }

    #[test]
    fn test_two_opt_stops_at_local_optimum() {
        let instance = square_instance();
        let mut solution = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");

        // The square tour is already optimal, no move should apply.
        let improved = TwoOptSearch::new().improve(&instance, &mut solution);

        assert!(!improved);
        assert_eq!(solution.tour, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reinsertion_search_uncrosses_square() {
        let instance = square_instance();
        let mut solution = Solution::from_tour(&instance, vec![0, 2, 1, 3], "test");

        let improved = SegmentReinsertionSearch::new().improve(&instance, &mut solution);

        assert!(improved);
        assert!((solution.length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_reinsertion_search_never_worsens() {
        let instance = TspInstance::random(12, 4).unwrap();
        let mut solution = Solution::from_tour(&instance, (0..12).collect(), "test");
        let initial = solution.length;

        SegmentReinsertionSearch::with_max_passes(5).improve(&instance, &mut solution);

        assert!(solution.length <= initial + 1e-9);
        assert!((solution.length - instance.tour_length(&solution.tour)).abs() < 1e-6);

        let unique: HashSet<usize> = solution.tour.iter().cloned().collect();
        assert_eq!(unique.len(), 12);
    }
}
