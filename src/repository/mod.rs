// src/repository/mod.rs

//! Indexed package universe
//!
//! The repository assigns every distinct (name, version) package a positive
//! integer index; literal `i` in the CNF layer means "package i installed"
//! and `-i` means "not installed". Index 0 is never used. The repository is
//! immutable once built.

mod store;

pub use store::PackageStore;

use crate::error::{Error, Result};
use crate::model::{Package, PackageProperties, PackageRef, RepoRecord};
use crate::version::{PackageRange, Version};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The immutable package universe with per-package metadata
#[derive(Debug)]
pub struct Repository {
    /// Packages in input order; the package with index `i` lives at `i - 1`
    packages: Vec<Package>,
    /// Metadata aligned with `packages`
    properties: Vec<PackageProperties>,
    /// Reverse lookup from package to index
    index: HashMap<Package, usize>,
    /// Indices of all versions sharing a name, in input order
    versions: HashMap<String, Vec<usize>>,
}

impl Repository {
    /// Build the universe from raw records, validating every version and
    /// range expression up front. Duplicate (name, version) pairs are fatal.
    pub fn from_records(records: &[RepoRecord]) -> Result<Self> {
        let mut packages = Vec::with_capacity(records.len());
        let mut properties = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());
        let mut versions: HashMap<String, Vec<usize>> = HashMap::new();

        for record in records {
            let version = Version::parse(&record.version)?;
            let package = Package::new(record.name.clone(), version);
            let idx = packages.len() + 1;
            if index.insert(package.clone(), idx).is_some() {
                return Err(Error::DuplicatePackage(package.to_string()));
            }

            let mut depends = Vec::with_capacity(record.depends.len());
            for group in &record.depends {
                let mut ranges = Vec::with_capacity(group.len());
                for expr in group {
                    ranges.push(PackageRange::parse(expr)?);
                }
                depends.push(ranges);
            }
            let mut conflicts = Vec::with_capacity(record.conflicts.len());
            for expr in &record.conflicts {
                conflicts.push(PackageRange::parse(expr)?);
            }

            versions.entry(record.name.clone()).or_default().push(idx);
            packages.push(package);
            properties.push(PackageProperties {
                depends,
                conflicts,
                weight: record.size,
            });
        }

        debug!(packages = packages.len(), "repository loaded");
        Ok(Self {
            packages,
            properties,
            index,
            versions,
        })
    }

    /// Number of packages in the universe
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate over all package indices (1-based)
    pub fn indices(&self) -> impl Iterator<Item = usize> + use<> {
        1..=self.packages.len()
    }

    /// The package at a 1-based index.
    ///
    /// Panics on an out-of-range index; indices only come from this
    /// repository's own lookups.
    pub fn package(&self, idx: usize) -> &Package {
        &self.packages[idx - 1]
    }

    /// Metadata for the package at a 1-based index
    pub fn properties(&self, idx: usize) -> &PackageProperties {
        &self.properties[idx - 1]
    }

    /// Weight shorthand for plan scoring
    pub fn weight(&self, idx: usize) -> u64 {
        self.properties[idx - 1].weight
    }

    /// Look up the index of an exact package, if present
    pub fn lookup(&self, package: &Package) -> Option<usize> {
        self.index.get(package).copied()
    }

    /// All indices of versions of `name`, in input order
    pub fn versions_of(&self, name: &str) -> &[usize] {
        self.versions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All package indices matched by a range, in input order
    pub fn matching(&self, range: &PackageRange) -> Vec<usize> {
        self.versions_of(&range.name)
            .iter()
            .copied()
            .filter(|&idx| range.contains(&self.package(idx).version))
            .collect()
    }

    /// Resolve initial-state references to a set of installed indices.
    ///
    /// Unknown packages are ignored with a warning (the universe is the
    /// repository; anything outside it cannot take part in a clause). Bare
    /// names resolve through the supplied preference over candidate indices.
    pub fn resolve_state<F>(&self, refs: &[PackageRef], mut prefer: F) -> Vec<usize>
    where
        F: FnMut(&[usize]) -> Option<usize>,
    {
        let mut resolved = Vec::with_capacity(refs.len());
        for r in refs {
            match r {
                PackageRef::Exact(package) => match self.lookup(package) {
                    Some(idx) => resolved.push(idx),
                    None => warn!(%package, "ignoring unknown package in state"),
                },
                PackageRef::Name(name) => match prefer(self.versions_of(name)) {
                    Some(idx) => resolved.push(idx),
                    None => warn!(%name, "ignoring unknown package name in state"),
                },
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, version: &str, size: u64) -> RepoRecord {
        RepoRecord {
            name: name.to_string(),
            version: version.to_string(),
            size,
            depends: vec![],
            conflicts: vec![],
        }
    }

    #[test]
    fn test_indices_are_one_based_input_order() {
        let repo = Repository::from_records(&[
            record("a", "1.0", 1),
            record("b", "2.0", 2),
        ])
        .unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.package(1).name, "a");
        assert_eq!(repo.package(2).name, "b");
        assert_eq!(repo.lookup(&Package::parse("b=2.0").unwrap()), Some(2));
        assert_eq!(repo.lookup(&Package::parse("b=9.9").unwrap()), None);
    }

    #[test]
    fn test_duplicate_package_is_fatal() {
        let result =
            Repository::from_records(&[record("a", "1.0", 1), record("a", "1.0", 2)]);
        assert!(matches!(result, Err(Error::DuplicatePackage(_))));
    }

    #[test]
    fn test_matching_filters_by_range() {
        let repo = Repository::from_records(&[
            record("a", "1.0", 1),
            record("a", "2.0", 1),
            record("a", "3.0", 1),
            record("b", "1.0", 1),
        ])
        .unwrap();

        let r = PackageRange::parse("a>1.0").unwrap();
        assert_eq!(repo.matching(&r), vec![2, 3]);
        let r = PackageRange::parse("a<=2.0").unwrap();
        assert_eq!(repo.matching(&r), vec![1, 2]);
        let r = PackageRange::parse("a=2.0").unwrap();
        assert_eq!(repo.matching(&r), vec![2]);
        let r = PackageRange::parse("c").unwrap();
        assert!(repo.matching(&r).is_empty());
    }

    #[test]
    fn test_invalid_range_in_record_is_fatal() {
        let mut rec = record("a", "1.0", 1);
        rec.depends = vec![vec!["b=<1.0".to_string()]];
        assert!(matches!(
            Repository::from_records(&[rec]),
            Err(Error::MalformedRange(_))
        ));
    }

    #[test]
    fn test_resolve_state_skips_unknown() {
        let repo = Repository::from_records(&[record("a", "1.0", 1)]).unwrap();
        let refs = vec![
            PackageRef::parse("a=1.0").unwrap(),
            PackageRef::parse("ghost=1.0").unwrap(),
            PackageRef::parse("a").unwrap(),
        ];
        let state = repo.resolve_state(&refs, |candidates| candidates.last().copied());
        assert_eq!(state, vec![1, 1]);
    }
}
