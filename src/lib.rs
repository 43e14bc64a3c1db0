// Internals
// ---------
pub mod data_structures;
pub mod derank;
pub mod heap_primitives;

// Search space and problems
// -------------------------
pub mod cost;
pub mod search;
pub mod space;

// Road network
// ------------
pub mod config;
pub mod dijkstra;
pub mod graph;
pub mod heuristic;

// Problems
// --------
pub mod problems;

// Algorithms
// ----------
pub mod algorithms;
