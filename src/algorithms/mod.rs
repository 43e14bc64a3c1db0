//! Implementation of search algorithms.
//!
//! These planners work on any `Space` with any `Heuristic`.

pub mod astar;
pub mod greedy;
pub mod rtastar;
