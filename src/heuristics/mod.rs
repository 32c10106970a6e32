//! Heuristics module.
//!
//! This module exports all construction and improvement heuristics.

pub mod aco;
pub mod construction;
pub mod local_search;

pub use aco::*;
pub use construction::*;
pub use local_search::*;
