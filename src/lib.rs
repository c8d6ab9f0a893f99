// src/lib.rs

//! Depsolver
//!
//! A dependency solver for versioned package repositories. Package metadata
//! (version ranges, OR-grouped optional dependencies, conflicts) and
//! final-state constraints compile down to boolean clauses over package
//! literals; an incremental single-watch propagation structure answers
//! validity questions about command sequences, and a satisfiability search
//! over tie-break policies synthesizes ordered, minimum-cost install plans.
//!
//! # Architecture
//!
//! - Literals: every (name, version) package gets a positive index; `+i`
//!   means installed, `-i` means absent
//! - Structural vs goal clauses: repository-derived clauses must hold at
//!   every step, constraint-derived clauses only in the final state
//! - One clause store per request: no cross-request caching, one owner per
//!   store, parallel attempts each build their own

pub mod cnf;
mod error;
pub mod model;
pub mod repository;
pub mod resolver;
pub mod verify;
pub mod version;

pub use cnf::{CnfStore, Lit, RangeIndex};
pub use error::{Error, Result};
pub use model::{
    Action, Command, Constraint, ConstraintKind, Package, PackageProperties, PackageRef,
    RepoRecord,
};
pub use repository::{PackageStore, Repository};
pub use resolver::{Plan, REMOVAL_PENALTY, TieBreak, synthesize};
pub use verify::{Verdict, judge};
pub use version::{PackageRange, Version};
