//! Module for representing, generating and parsing TSP instances.
//!
//! An instance is a set of points on the Euclidean plane. Distances are
//! symmetric and precomputed into a matrix at construction time. The
//! module also hosts the path evaluator used by every heuristic to score
//! candidate tours.

use crate::error::TspError;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A point (city) of the instance.
///
/// Two points are equal iff both the identifier and the coordinates
/// match; hashing follows the same convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    /// Point identifier (0-indexed internally)
    pub id: usize,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Point { id, x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.x == other.x && self.y == other.y
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

/// A complete Euclidean TSP instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Number of points
    pub dimension: usize,
    /// List of all points
    pub points: Vec<Point>,
    /// Precomputed distance matrix
    #[serde(skip)]
    pub distance_matrix: Vec<Vec<f64>>,
}

impl TspInstance {
    /// Build an instance from a list of points.
    ///
    /// Requires at least two points and unique identifiers.
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Result<Self, TspError> {
        if points.len() < 2 {
            return Err(TspError::TooFewPoints {
                min: 2,
                got: points.len(),
            });
        }

        let mut seen = HashSet::new();
        for point in &points {
            if !seen.insert(point.id) {
                return Err(TspError::DuplicatePointId { id: point.id });
            }
        }

        let distance_matrix = Self::compute_distance_matrix(&points);

        Ok(TspInstance {
            name: name.into(),
            dimension: points.len(),
            points,
            distance_matrix,
        })
    }

    /// Generate a random instance of `n` points with integer coordinates
    /// on a 100x100 canvas. Deterministic via seed.
    pub fn random(n: usize, seed: u64) -> Result<Self, TspError> {
        const MAX_X: i64 = 100;
        const MAX_Y: i64 = 100;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..n)
            .map(|id| {
                Point::new(
                    id,
                    rng.gen_range(0..=MAX_X) as f64,
                    rng.gen_range(0..=MAX_Y) as f64,
                )
            })
            .collect();

        Self::new(format!("random-{}-{}", n, seed), points)
    }

    /// Parse an instance from a TSP-LIB style coordinate file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TspError> {
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut name = String::new();
        let mut dimension = 0usize;
        let mut coords: Vec<(usize, f64, f64)> = Vec::new();
        let mut in_coords = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line == "EOF" {
                continue;
            }

            if line.starts_with("NAME:") {
                name = line.replace("NAME:", "").trim().to_string();
                continue;
            }
            if line.starts_with("COMMENT:") || line.starts_with("EDGE_WEIGHT_TYPE:") {
                continue;
            }
            if line.starts_with("DIMENSION:") {
                dimension = line
                    .replace("DIMENSION:", "")
                    .trim()
                    .parse()
                    .map_err(|_| TspError::Parse("invalid dimension".to_string()))?;
                continue;
            }
            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }

            if in_coords {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 3 {
                    let id: usize = parts[0]
                        .parse()
                        .map_err(|_| TspError::Parse("invalid point id".to_string()))?;
                    let x: f64 = parts[1]
                        .parse()
                        .map_err(|_| TspError::Parse("invalid x coordinate".to_string()))?;
                    let y: f64 = parts[2]
                        .parse()
                        .map_err(|_| TspError::Parse("invalid y coordinate".to_string()))?;
                    coords.push((id, x, y));
                }
            }
        }

        if dimension != 0 && coords.len() != dimension {
            return Err(TspError::Parse(format!(
                "DIMENSION is {} but {} coordinates were found",
                dimension,
                coords.len()
            )));
        }

        // File ids are 1-indexed; store them 0-indexed.
        let points = coords
            .into_iter()
            .map(|(id, x, y)| Point::new(id.saturating_sub(1), x, y))
            .collect();

        Self::new(name, points)
    }

    /// Compute the symmetric Euclidean distance matrix.
    fn compute_distance_matrix(points: &[Point]) -> Vec<Vec<f64>> {
        let n = points.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    matrix[i][j] = points[i].distance_to(&points[j]);
                }
            }
        }

        matrix
    }

    /// Get the distance between two points.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    /// Calculate the total cyclic tour length, including the wrap-around
    /// edge from the last point back to the first.
    ///
    /// This is the ground-truth path evaluator against which every
    /// incremental length update is checked. A tour of a single point
    /// has length zero.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for i in 0..tour.len() - 1 {
            length += self.distance(tour[i], tour[i + 1]);
        }

        length += self.distance(tour[tour.len() - 1], tour[0]);

        length
    }

    /// Get statistics about the instance.
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.distance(i, j));
            }
        }
        let avg_distance = distances.iter().sum::<f64>() / distances.len() as f64;
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);
        let min_distance = distances.iter().cloned().fold(f64::INFINITY, f64::min);

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            avg_distance,
            min_distance,
            max_distance,
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Points: {}", self.dimension)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_equality() {
        let a = Point::new(1, 2.0, 3.0);
        let b = Point::new(1, 2.0, 3.0);
        let c = Point::new(1, 2.0, 4.0);
        let d = Point::new(2, 2.0, 3.0);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_distance_calculation() {
        let points = vec![Point::new(0, 0.0, 0.0), Point::new(1, 3.0, 4.0)];
        let instance = TspInstance::new("test", points).unwrap();

        assert!((instance.distance(0, 1) - 5.0).abs() < 1e-10);
        assert!((instance.distance(1, 0) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_tour_length_square() {
        let points = vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, 0.0, 1.0),
            Point::new(2, 1.0, 1.0),
            Point::new(3, 1.0, 0.0),
        ];
        let instance = TspInstance::new("square", points).unwrap();

        assert!((instance.tour_length(&[0, 1, 2, 3]) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_tour_length_degenerate() {
        let points = vec![Point::new(0, 0.0, 0.0), Point::new(1, 3.0, 4.0)];
        let instance = TspInstance::new("test", points).unwrap();

        assert_eq!(instance.tour_length(&[0]), 0.0);
        // Out and back over the same edge
        assert!((instance.tour_length(&[0, 1]) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_too_few_points() {
        let result = TspInstance::new("tiny", vec![Point::new(0, 0.0, 0.0)]);
        assert!(matches!(result, Err(TspError::TooFewPoints { .. })));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let points = vec![Point::new(0, 0.0, 0.0), Point::new(0, 1.0, 1.0)];
        let result = TspInstance::new("dup", points);
        assert!(matches!(result, Err(TspError::DuplicatePointId { id: 0 })));
    }

    #[test]
    fn test_random_instance_is_deterministic() {
        let a = TspInstance::random(12, 7).unwrap();
        let b = TspInstance::random(12, 7).unwrap();

        assert_eq!(a.dimension, 12);
        assert_eq!(a.points, b.points);
    }
}
