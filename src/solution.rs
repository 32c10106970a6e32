//! Solution representation and manipulation.
//!
//! A solution is a cyclic tour over the instance points together with
//! its total length. This module also hosts the general move primitive
//! of the local searches, segment reinsertion, and the validator that
//! gates tours proposed by the heuristics.

use crate::error::TspError;
use crate::instance::TspInstance;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Absolute tolerance accepted between a reported tour length and the
/// length recomputed by the path evaluator.
pub const LENGTH_TOLERANCE: f64 = 0.1;

/// Represents a tour through all points of an instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of point indices, interpreted cyclically
    pub tour: Vec<usize>,
    /// Total tour length including the wrap-around edge
    pub length: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            length: f64::INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from a tour, scoring it with the path evaluator.
    pub fn from_tour(instance: &TspInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let length = instance.tour_length(&tour);

        Solution {
            tour,
            length,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Check if the tour visits every instance point exactly once.
    pub fn is_complete(&self, instance: &TspInstance) -> bool {
        if self.tour.len() != instance.dimension {
            return false;
        }

        let unique: HashSet<usize> = self.tour.iter().cloned().collect();
        unique.len() == instance.dimension && self.tour.iter().all(|&i| i < instance.dimension)
    }

    /// Validate the solution against the instance: exact coverage of all
    /// points plus consistency of the reported length with the evaluator
    /// within [`LENGTH_TOLERANCE`].
    pub fn verify(&self, instance: &TspInstance) -> Result<(), TspError> {
        if !self.is_complete(instance) {
            return Err(TspError::IncompleteTour);
        }

        let recomputed = instance.tour_length(&self.tour);
        if (recomputed - self.length).abs() > LENGTH_TOLERANCE {
            return Err(TspError::LengthMismatch {
                reported: self.length,
                recomputed,
            });
        }

        Ok(())
    }

    /// Extract the contiguous segment `[start, end]` from the tour and
    /// splice it back in after position `insert_after` of the shortened
    /// tour, optionally reversing its internal order.
    ///
    /// The new length is derived incrementally from the two broken edges
    /// and the new edge of the removal, plus the broken edge and two new
    /// edges of the insertion; it is never recomputed from scratch. The
    /// result matches the path evaluator within floating-point tolerance.
    ///
    /// Recoverable misuse is repaired rather than rejected: a segment
    /// given as `(end, start)` is normalized, and an `insert_after`
    /// beyond the shortened tour is clamped so the segment lands at the
    /// end. Both repairs emit a warning.
    pub fn reinsert_segment(
        &self,
        instance: &TspInstance,
        segment: (usize, usize),
        insert_after: usize,
        reverse: bool,
    ) -> Solution {
        let n = self.tour.len();
        let (mut start, mut end) = segment;

        if start > end {
            log::warn!(
                "segment ({}, {}) given in reverse order, swapping",
                start,
                end
            );
            std::mem::swap(&mut start, &mut end);
        }
        assert!(end < n, "segment end {} out of tour of {} points", end, n);

        let seg_len = end - start + 1;

        let mut piece: Vec<usize> = self.tour[start..=end].to_vec();
        if reverse {
            piece.reverse();
        }

        // A segment spanning the whole tour leaves nothing to splice
        // into; cyclic length is invariant under reversal.
        if seg_len == n {
            let mut result = Solution::from_tour(instance, piece, &self.algorithm);
            result.length = self.length;
            return result;
        }

        // Break the two edges bounding the segment, reconnect its former
        // neighbours (indices wrap cyclically).
        let left = self.tour[(start + n - 1) % n];
        let right = self.tour[(end + 1) % n];
        let length_after_removal = self.length
            - instance.distance(left, self.tour[start])
            - instance.distance(self.tour[end], right)
            + instance.distance(left, right);

        let mut remaining: Vec<usize> = Vec::with_capacity(n - seg_len);
        remaining.extend_from_slice(&self.tour[..start]);
        remaining.extend_from_slice(&self.tour[end + 1..]);
        let m = remaining.len();

        let insert_after = if insert_after >= m {
            log::warn!(
                "insertion index {} out of range for shortened tour of {} points, appending segment at the end",
                insert_after,
                m
            );
            m - 1
        } else {
            insert_after
        };

        // Break the edge at the insertion slot, connect its two ends to
        // the segment endpoints.
        let succ = (insert_after + 1) % m;
        let new_length = length_after_removal
            - instance.distance(remaining[insert_after], remaining[succ])
            + instance.distance(remaining[insert_after], piece[0])
            + instance.distance(piece[piece.len() - 1], remaining[succ]);

        let mut new_tour: Vec<usize> = Vec::with_capacity(n);
        new_tour.extend_from_slice(&remaining[..=insert_after]);
        new_tour.extend_from_slice(&piece);
        new_tour.extend_from_slice(&remaining[insert_after + 1..]);

        Solution {
            tour: new_tour,
            length: new_length,
            algorithm: self.algorithm.clone(),
            computation_time: 0.0,
            iterations: None,
        }
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Length: {:.2}", self.length)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    fn create_test_instance() -> TspInstance {
        TspInstance::random(10, 1).unwrap()
    }

    #[test]
    fn test_solution_creation() {
        let sol = Solution::new();
        assert!(sol.tour.is_empty());
        assert_eq!(sol.length, f64::INFINITY);
    }

    #[test]
    fn test_verify_accepts_within_tolerance() {
        let instance = create_test_instance();
        let mut sol = Solution::from_tour(&instance, (0..10).collect(), "test");
        sol.length += 0.05;

        assert!(sol.verify(&instance).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_length() {
        let instance = create_test_instance();
        let mut sol = Solution::from_tour(&instance, (0..10).collect(), "test");
        sol.length += 1.0;

        assert!(matches!(
            sol.verify(&instance),
            Err(TspError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_rejects_duplicates() {
        let instance = create_test_instance();
        let mut tour: Vec<usize> = (0..10).collect();
        tour[9] = 0;
        let sol = Solution::from_tour(&instance, tour, "test");

        assert!(matches!(sol.verify(&instance), Err(TspError::IncompleteTour)));
    }

    #[test]
    fn test_reinsert_segment_worked_example() {
        let instance = create_test_instance();
        let tour = vec![0, 7, 8, 2, 5, 6, 1, 4, 9, 3];
        let sol = Solution::from_tour(&instance, tour, "test");

        let moved = sol.reinsert_segment(&instance, (4, 6), 3, true);

        assert_eq!(moved.tour, vec![0, 7, 8, 2, 1, 6, 5, 4, 9, 3]);
        assert!((moved.length - instance.tour_length(&moved.tour)).abs() < 1e-6);
    }

    #[test]
    fn test_reinsert_segment_matches_evaluator_everywhere() {
        let instance = create_test_instance();
        let sol = Solution::from_tour(&instance, (0..10).collect(), "test");
        let n = sol.tour.len();

        for start in 0..n {
            for end in start..n {
                let m = n - (end - start + 1);
                if m == 0 {
                    continue;
                }
                for insert_after in 0..m {
                    for reverse in [false, true] {
                        let moved =
                            sol.reinsert_segment(&instance, (start, end), insert_after, reverse);
                        assert_eq!(moved.tour.len(), n);
                        let recomputed = instance.tour_length(&moved.tour);
                        assert!(
                            (moved.length - recomputed).abs() < 1e-3,
                            "segment ({}, {}) at {} reverse={}: {} vs {}",
                            start,
                            end,
                            insert_after,
                            reverse,
                            moved.length,
                            recomputed
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_reinsert_segment_out_of_range_appends() {
        let instance = create_test_instance();
        let sol = Solution::from_tour(&instance, (0..10).collect(), "test");

        // Shortened tour has 7 points; any index >= 7 must fall back to
        // appending the segment at the end instead of crashing.
        let clamped = sol.reinsert_segment(&instance, (4, 6), 99, false);
        let appended = sol.reinsert_segment(&instance, (4, 6), 6, false);

        assert_eq!(clamped.tour, appended.tour);
        assert!((clamped.length - instance.tour_length(&clamped.tour)).abs() < 1e-6);
    }

    #[test]
    fn test_reinsert_segment_normalizes_reversed_indices() {
        let instance = create_test_instance();
        let sol = Solution::from_tour(&instance, (0..10).collect(), "test");

        let a = sol.reinsert_segment(&instance, (6, 4), 2, false);
        let b = sol.reinsert_segment(&instance, (4, 6), 2, false);

        assert_eq!(a.tour, b.tour);
    }

    #[test]
    fn test_reinsert_segment_whole_tour() {
        let points = vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, 0.0, 1.0),
            Point::new(2, 1.0, 1.0),
            Point::new(3, 1.0, 0.0),
        ];
        let instance = TspInstance::new("square", points).unwrap();
        let sol = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");

        let reversed = sol.reinsert_segment(&instance, (0, 3), 0, true);

        assert_eq!(reversed.tour, vec![3, 2, 1, 0]);
        assert!((reversed.length - sol.length).abs() < 1e-9);
    }
}
