// src/resolver/mod.rs

//! Plan synthesis: closure graph, satisfiability search, ordering, and the
//! tie-break cost sweep
//!
//! Given a starting state and final-state constraints (not a literal command
//! sequence), the resolver constructs a valid, minimum-cost command sequence
//! from scratch. See `engine::synthesize` for the entry point.

mod engine;
mod graph;
mod plan;
mod policy;
mod solver;

pub use engine::synthesize;
pub use graph::DepGraph;
pub use plan::{Plan, REMOVAL_PENALTY};
pub use policy::TieBreak;
pub use solver::solve;
