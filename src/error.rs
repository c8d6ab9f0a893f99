// src/error.rs

//! Error types for the dependency solver.

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the solver can surface to a caller
#[derive(Debug, Error)]
pub enum Error {
    /// A version string is not a dotted sequence of non-negative integers
    #[error("malformed version: '{0}'")]
    MalformedVersion(String),

    /// A package reference is not of the form `name=version`
    #[error("malformed package reference: '{0}'")]
    MalformedPackageReference(String),

    /// A range expression does not match `name`, `name=V`, `name<V`,
    /// `name>V`, `name<=V`, or `name>=V`
    #[error("malformed range: '{0}'")]
    MalformedRange(String),

    /// A command string is not `+name=version` or `-name=version`
    #[error("malformed command: '{0}'")]
    MalformedCommand(String),

    /// A constraint string is not `+range` or `-range`
    #[error("malformed constraint: '{0}'")]
    MalformedConstraint(String),

    /// The repository defines the same (name, version) twice
    #[error("duplicate package in repository: {0}")]
    DuplicatePackage(String),

    /// No tie-break policy produced a satisfiable plan
    #[error("no solution satisfies the given constraints")]
    Unsatisfiable,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}
