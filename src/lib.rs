//! TSP Heuristics Library
//!
//! A toolbox of construction and improvement heuristics for the
//! Euclidean Traveling Salesman Problem.
//!
//! # Features
//!
//! - Construction heuristics (Nearest Neighbor, Cheapest Insertion, GRASP)
//! - Local search methods (2-opt, segment reinsertion)
//! - Ant Colony Optimization with optional parallel agent construction
//! - Tour validation and benchmarking tools
//!
//! # Example
//!
//! ```no_run
//! use tsp_heuristics::instance::TspInstance;
//! use tsp_heuristics::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
//! use tsp_heuristics::heuristics::local_search::{LocalSearch, TwoOptSearch};
//!
//! // Load instance
//! let instance = TspInstance::from_file("instance.tsp").unwrap();
//!
//! // Construct initial solution
//! let nn = NearestNeighborHeuristic::new();
//! let mut solution = nn.construct(&instance);
//!
//! // Improve with 2-opt
//! let two_opt = TwoOptSearch::new();
//! two_opt.improve(&instance, &mut solution);
//!
//! println!("Tour length: {:.2}", solution.length);
//! ```

pub mod benchmark;
pub mod error;
pub mod heuristics;
pub mod instance;
pub mod solution;

pub use error::TspError;
pub use instance::TspInstance;
pub use solution::Solution;
