// src/model/mod.rs

//! Core data model: packages, commands, constraints, and raw repository
//! records.
//!
//! Everything here is parsed and validated once at load time; the solver
//! engine only ever manipulates well-formed values.

use crate::error::{Error, Result};
use crate::version::{PackageRange, Version};
use serde::Deserialize;
use std::fmt;

/// A concrete (name, version) pair, the atomic unit of the universe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Package {
    pub name: String,
    pub version: Version,
}

impl Package {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Parse an exact `name=version` reference
    pub fn parse(s: &str) -> Result<Self> {
        let (name, version) = s
            .split_once('=')
            .ok_or_else(|| Error::MalformedPackageReference(s.to_string()))?;
        if name.is_empty() {
            return Err(Error::MalformedPackageReference(s.to_string()));
        }
        let version = Version::parse(version)
            .map_err(|_| Error::MalformedPackageReference(s.to_string()))?;
        Ok(Self::new(name, version))
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.version)
    }
}

/// A reference to a package in the initial state: exact, or a bare name that
/// resolves to a concrete version via the active tie-break policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
    Exact(Package),
    Name(String),
}

impl PackageRef {
    pub fn parse(s: &str) -> Result<Self> {
        if s.contains('=') {
            Ok(PackageRef::Exact(Package::parse(s)?))
        } else if !s.is_empty() {
            Ok(PackageRef::Name(s.to_string()))
        } else {
            Err(Error::MalformedPackageReference(s.to_string()))
        }
    }
}

/// Install or remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Remove,
}

/// A signed reference to an exact package: `+name=version` or `-name=version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub package: Package,
}

impl Command {
    pub fn parse(s: &str) -> Result<Self> {
        let (action, rest) = match s.as_bytes().first() {
            Some(b'+') => (Action::Install, &s[1..]),
            Some(b'-') => (Action::Remove, &s[1..]),
            _ => return Err(Error::MalformedCommand(s.to_string())),
        };
        let package =
            Package::parse(rest).map_err(|_| Error::MalformedCommand(s.to_string()))?;
        Ok(Self { action, package })
    }

    pub fn install(package: Package) -> Self {
        Self {
            action: Action::Install,
            package,
        }
    }

    pub fn remove(package: Package) -> Self {
        Self {
            action: Action::Remove,
            package,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.action {
            Action::Install => '+',
            Action::Remove => '-',
        };
        write!(f, "{}{}", sign, self.package)
    }
}

/// Require or forbid matching packages in the final state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Require,
    Forbid,
}

/// A final-state constraint: `+range` or `-range`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub range: PackageRange,
}

impl Constraint {
    pub fn parse(s: &str) -> Result<Self> {
        let (kind, rest) = match s.as_bytes().first() {
            Some(b'+') => (ConstraintKind::Require, &s[1..]),
            Some(b'-') => (ConstraintKind::Forbid, &s[1..]),
            _ => return Err(Error::MalformedConstraint(s.to_string())),
        };
        let range =
            PackageRange::parse(rest).map_err(|_| Error::MalformedConstraint(s.to_string()))?;
        Ok(Self { kind, range })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.kind {
            ConstraintKind::Require => '+',
            ConstraintKind::Forbid => '-',
        };
        write!(f, "{}{}", sign, self.range)
    }
}

/// Metadata attached to each package
#[derive(Debug, Clone, Default)]
pub struct PackageProperties {
    /// Ordered dependency groups; each group is an OR over its ranges
    pub depends: Vec<Vec<PackageRange>>,
    /// Ranges that must not be installed alongside the owner
    pub conflicts: Vec<PackageRange>,
    /// Non-negative cost used for plan scoring (e.g., download size)
    pub weight: u64,
}

/// Raw repository record as it appears in the input JSON
#[derive(Debug, Clone, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub version: String,
    pub size: u64,
    #[serde(default)]
    pub depends: Vec<Vec<String>>,
    #[serde(default)]
    pub conflicts: Vec<String>,
}
