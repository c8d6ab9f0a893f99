// src/resolver/policy.rs

//! Deterministic tie-break policies
//!
//! Each policy fixes how bare names resolve to concrete versions and in
//! which order the search considers candidate packages. Different policies
//! reach different satisfying assignments; the engine runs them all and
//! keeps the cheapest plan.

use crate::repository::Repository;
use std::cmp::Reverse;
use std::fmt;

/// A deterministic rule for ranking candidate packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    LowestWeight,
    HighestWeight,
    NewestVersion,
    OldestVersion,
    FirstListed,
    LastListed,
}

impl TieBreak {
    /// Every policy the engine explores
    pub const ALL: [TieBreak; 6] = [
        TieBreak::LowestWeight,
        TieBreak::HighestWeight,
        TieBreak::NewestVersion,
        TieBreak::OldestVersion,
        TieBreak::FirstListed,
        TieBreak::LastListed,
    ];

    /// Order candidate indices in place, most-preferred first.
    ///
    /// Ties fall back to name then version so every policy is a total,
    /// deterministic order.
    pub fn rank(&self, repo: &Repository, candidates: &mut [usize]) {
        match self {
            TieBreak::LowestWeight => candidates.sort_by_key(|&i| {
                (repo.weight(i), &repo.package(i).name, &repo.package(i).version)
            }),
            TieBreak::HighestWeight => candidates.sort_by_key(|&i| {
                (
                    Reverse(repo.weight(i)),
                    &repo.package(i).name,
                    &repo.package(i).version,
                )
            }),
            TieBreak::NewestVersion => candidates.sort_by_key(|&i| {
                (&repo.package(i).name, Reverse(&repo.package(i).version))
            }),
            TieBreak::OldestVersion => candidates.sort_by_key(|&i| {
                (&repo.package(i).name, &repo.package(i).version)
            }),
            TieBreak::FirstListed => candidates.sort_unstable(),
            TieBreak::LastListed => candidates.sort_unstable_by_key(|&i| Reverse(i)),
        }
    }

    /// Pick the preferred version among candidates (used to resolve bare
    /// names)
    pub fn prefer(&self, repo: &Repository, candidates: &[usize]) -> Option<usize> {
        let mut ranked = candidates.to_vec();
        self.rank(repo, &mut ranked);
        ranked.first().copied()
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TieBreak::LowestWeight => "lowest-weight",
            TieBreak::HighestWeight => "highest-weight",
            TieBreak::NewestVersion => "newest-version",
            TieBreak::OldestVersion => "oldest-version",
            TieBreak::FirstListed => "first-listed",
            TieBreak::LastListed => "last-listed",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepoRecord;

    fn repo() -> Repository {
        let records: Vec<RepoRecord> = [("a", "1.0", 30), ("a", "2.0", 10), ("a", "3.0", 20)]
            .iter()
            .map(|(name, version, size)| RepoRecord {
                name: name.to_string(),
                version: version.to_string(),
                size: *size,
                depends: vec![],
                conflicts: vec![],
            })
            .collect();
        Repository::from_records(&records).unwrap()
    }

    #[test]
    fn test_weight_policies() {
        let repo = repo();
        assert_eq!(TieBreak::LowestWeight.prefer(&repo, &[1, 2, 3]), Some(2));
        assert_eq!(TieBreak::HighestWeight.prefer(&repo, &[1, 2, 3]), Some(1));
    }

    #[test]
    fn test_version_policies() {
        let repo = repo();
        assert_eq!(TieBreak::NewestVersion.prefer(&repo, &[1, 2, 3]), Some(3));
        assert_eq!(TieBreak::OldestVersion.prefer(&repo, &[1, 2, 3]), Some(1));
    }

    #[test]
    fn test_positional_policies() {
        let repo = repo();
        assert_eq!(TieBreak::FirstListed.prefer(&repo, &[2, 3, 1]), Some(1));
        assert_eq!(TieBreak::LastListed.prefer(&repo, &[2, 3, 1]), Some(3));
    }

    #[test]
    fn test_prefer_empty_is_none() {
        let repo = repo();
        assert_eq!(TieBreak::NewestVersion.prefer(&repo, &[]), None);
    }
}
