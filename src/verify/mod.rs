// src/verify/mod.rs

//! Validity judgment for a fixed command sequence
//!
//! Replays install/uninstall commands against a compiled clause store,
//! checking after every step that no repository-derived clause is violated.
//! Goal clauses only have to hold once the whole sequence has run.

use crate::cnf::{self, Lit, RangeIndex};
use crate::model::{Action, Command, Constraint, PackageRef};
use crate::repository::Repository;
use std::collections::HashSet;
use tracing::debug;

/// Outcome of judging a command sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    /// Literals of the first violated clause, when invalid
    pub violation: Option<Vec<Lit>>,
}

impl Verdict {
    fn valid() -> Self {
        Self {
            valid: true,
            violation: None,
        }
    }

    fn invalid(violation: Option<Vec<Lit>>) -> Self {
        Self {
            valid: false,
            violation,
        }
    }
}

/// Judge a command sequence from an initial state against the repository's
/// structural clauses and the requested final constraints.
///
/// Commands naming packages outside the repository, or requesting a state
/// already reached, are permissive no-ops. Bare-name state references
/// resolve to the newest version of that name.
pub fn judge(
    repo: &Repository,
    initial: &[PackageRef],
    commands: &[Command],
    constraints: &[Constraint],
) -> Verdict {
    let installed: HashSet<usize> = repo
        .resolve_state(initial, |candidates| {
            candidates
                .iter()
                .copied()
                .max_by_key(|&idx| &repo.package(idx).version)
        })
        .into_iter()
        .collect();

    let ranges = RangeIndex::build(repo, constraints);
    let mut store = cnf::compile(repo, &ranges, constraints, &installed);

    // The starting state must already satisfy every structural clause.
    if !store.structural_satisfied() {
        return Verdict::invalid(store.first_violation().map(<[Lit]>::to_vec));
    }

    for command in commands {
        match repo.lookup(&command.package) {
            Some(idx) => {
                match command.action {
                    Action::Install => store.install(idx),
                    Action::Remove => store.uninstall(idx),
                };
            }
            None => {
                debug!(package = %command.package, "command names unknown package; skipping");
            }
        }
        if !store.structural_satisfied() {
            return Verdict::invalid(store.first_violation().map(<[Lit]>::to_vec));
        }
    }

    // After full replay every clause, goal clauses included, must hold.
    if store.fully_satisfied() {
        Verdict::valid()
    } else {
        Verdict::invalid(store.first_violation().map(<[Lit]>::to_vec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepoRecord;

    fn record(
        name: &str,
        version: &str,
        depends: Vec<Vec<&str>>,
        conflicts: Vec<&str>,
    ) -> RepoRecord {
        RepoRecord {
            name: name.to_string(),
            version: version.to_string(),
            size: 1,
            depends: depends
                .into_iter()
                .map(|g| g.into_iter().map(String::from).collect())
                .collect(),
            conflicts: conflicts.into_iter().map(String::from).collect(),
        }
    }

    fn refs(items: &[&str]) -> Vec<PackageRef> {
        items.iter().map(|s| PackageRef::parse(s).unwrap()).collect()
    }

    fn cmds(items: &[&str]) -> Vec<Command> {
        items.iter().map(|s| Command::parse(s).unwrap()).collect()
    }

    fn cons(items: &[&str]) -> Vec<Constraint> {
        items.iter().map(|s| Constraint::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_empty_sequence_on_consistent_state_is_valid() {
        let repo = Repository::from_records(&[
            record("a", "1.0", vec![vec!["b"]], vec![]),
            record("b", "1.0", vec![], vec![]),
        ])
        .unwrap();
        let verdict = judge(&repo, &refs(&["a=1.0", "b=1.0"]), &[], &[]);
        assert!(verdict.valid);
    }

    #[test]
    fn test_initial_state_violating_structure_is_invalid() {
        let repo = Repository::from_records(&[
            record("a", "1.0", vec![vec!["b"]], vec![]),
            record("b", "1.0", vec![], vec![]),
        ])
        .unwrap();
        // a installed without its dependency b.
        let verdict = judge(&repo, &refs(&["a=1.0"]), &[], &[]);
        assert!(!verdict.valid);
        assert_eq!(verdict.violation, Some(vec![-1, 2]));
    }

    #[test]
    fn test_dependency_must_precede_dependent() {
        let repo = Repository::from_records(&[
            record("a", "1.0", vec![vec!["b"]], vec![]),
            record("b", "1.0", vec![], vec![]),
        ])
        .unwrap();

        let good = judge(&repo, &[], &cmds(&["+b=1.0", "+a=1.0"]), &[]);
        assert!(good.valid);

        let bad = judge(&repo, &[], &cmds(&["+a=1.0", "+b=1.0"]), &[]);
        assert!(!bad.valid);
    }

    #[test]
    fn test_conflict_violation_mid_sequence() {
        let repo = Repository::from_records(&[
            record("a", "1.0", vec![], vec!["b"]),
            record("b", "1.0", vec![], vec![]),
        ])
        .unwrap();

        let bad = judge(&repo, &refs(&["b=1.0"]), &cmds(&["+a=1.0"]), &[]);
        assert!(!bad.valid);

        let good = judge(&repo, &refs(&["b=1.0"]), &cmds(&["-b=1.0", "+a=1.0"]), &[]);
        assert!(good.valid);
    }

    #[test]
    fn test_goal_clauses_checked_only_at_end() {
        let repo = Repository::from_records(&[
            record("a", "1.0", vec![], vec![]),
            record("b", "1.0", vec![], vec![]),
        ])
        .unwrap();

        // Constraint requires a; sequence installs b then a.
        let verdict = judge(&repo, &[], &cmds(&["+b=1.0", "+a=1.0"]), &cons(&["+a"]));
        assert!(verdict.valid);

        // Sequence never installs a: goal clause outstanding at the end.
        let verdict = judge(&repo, &[], &cmds(&["+b=1.0"]), &cons(&["+a"]));
        assert!(!verdict.valid);
        assert_eq!(verdict.violation, Some(vec![1]));
    }

    #[test]
    fn test_forbid_constraint_rejects_final_presence() {
        let repo = Repository::from_records(&[record("a", "1.0", vec![], vec![])]).unwrap();
        let verdict = judge(&repo, &refs(&["a=1.0"]), &[], &cons(&["-a"]));
        assert!(!verdict.valid);

        let verdict = judge(&repo, &refs(&["a=1.0"]), &cmds(&["-a=1.0"]), &cons(&["-a"]));
        assert!(verdict.valid);
    }

    #[test]
    fn test_unknown_package_command_is_noop() {
        let repo = Repository::from_records(&[record("a", "1.0", vec![], vec![])]).unwrap();
        let verdict = judge(&repo, &[], &cmds(&["+ghost=1.0", "+a=1.0"]), &cons(&["+a"]));
        assert!(verdict.valid);
    }

    #[test]
    fn test_repeated_install_is_noop() {
        let repo = Repository::from_records(&[record("a", "1.0", vec![], vec![])]).unwrap();
        let verdict = judge(&repo, &[], &cmds(&["+a=1.0", "+a=1.0"]), &cons(&["+a"]));
        assert!(verdict.valid);
    }
}
