// src/cnf/compiler.rs

//! Repository compiler: range resolution and clause emission
//!
//! Every range appearing anywhere (dependency groups, conflicts, final
//! constraints) is resolved once against the universe; the compiler then
//! emits one clause per dependency group, one binary clause per conflict
//! match, and the goal clauses for the requested final constraints.
//!
//! Empty-group policy: a dependency group that matches nothing still emits
//! its clause, which degenerates to `(-P)` and makes the owning package
//! unconditionally uninstallable. This is the strict reading; silently
//! dropping the group would let a package with an unmeetable requirement
//! install cleanly.

use crate::model::{Constraint, ConstraintKind};
use crate::repository::Repository;
use crate::version::PackageRange;
use crate::cnf::{CnfStore, Lit};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Precomputed matches for every distinct range in a resolution request.
///
/// Shared read-only across parallel synthesis attempts.
#[derive(Debug)]
pub struct RangeIndex {
    matches: HashMap<PackageRange, Vec<usize>>,
}

impl RangeIndex {
    /// Resolve every range reachable from the repository metadata and the
    /// final constraints
    pub fn build(repo: &Repository, constraints: &[Constraint]) -> Self {
        let mut matches = HashMap::new();
        let mut resolve = |range: &PackageRange, matches: &mut HashMap<_, Vec<usize>>| {
            if !matches.contains_key(range) {
                matches.insert(range.clone(), repo.matching(range));
            }
        };

        for idx in repo.indices() {
            let props = repo.properties(idx);
            for group in &props.depends {
                for range in group {
                    resolve(range, &mut matches);
                }
            }
            for range in &props.conflicts {
                resolve(range, &mut matches);
            }
        }
        for constraint in constraints {
            resolve(&constraint.range, &mut matches);
        }

        Self { matches }
    }

    /// Indices matched by a resolved range
    pub fn matching(&self, range: &PackageRange) -> &[usize] {
        self.matches.get(range).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Compile the repository and final constraints into a clause store seeded
/// with the given installed set.
///
/// Structural clauses (dependencies, conflicts) come first and are
/// partitioned from the goal clauses via `mark_structural`.
pub fn compile(
    repo: &Repository,
    ranges: &RangeIndex,
    constraints: &[Constraint],
    installed: &HashSet<usize>,
) -> CnfStore {
    let mut store = CnfStore::new(repo.len(), installed);

    for p in repo.indices() {
        let props = repo.properties(p);
        for group in &props.depends {
            // (-P v q1 v q2 v ...) over the union of the group's ranges.
            let mut clause: Vec<Lit> = vec![-(p as Lit)];
            let mut seen = HashSet::new();
            for range in group {
                for &q in ranges.matching(range) {
                    if seen.insert(q) {
                        clause.push(q as Lit);
                    }
                }
            }
            store.add_clause(clause);
        }
        for range in &props.conflicts {
            for &q in ranges.matching(range) {
                if q == p {
                    // A self-conflict degenerates to (-P): the package can
                    // never be installed.
                    store.add_clause(vec![-(p as Lit)]);
                } else {
                    store.add_clause(vec![-(p as Lit), -(q as Lit)]);
                }
            }
        }
    }
    store.mark_structural();

    for constraint in constraints {
        let matched = ranges.matching(&constraint.range);
        match constraint.kind {
            ConstraintKind::Forbid => {
                for &q in matched {
                    store.add_clause(vec![-(q as Lit)]);
                }
            }
            ConstraintKind::Require => {
                store.add_clause(matched.iter().map(|&q| q as Lit).collect());
            }
        }
    }

    debug!(
        structural = store.structural_count(),
        total = store.clauses().len(),
        "compiled clause store"
    );
    store
}
