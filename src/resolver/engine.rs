// src/resolver/engine.rs

//! Plan synthesis across tie-break policies
//!
//! Each policy is an independent attempt: resolve the initial state, expand
//! the closure graph, compile the clauses, search for a satisfying
//! assignment with the policy's variable order, diff against the initial
//! state, and order the resulting commands. Attempts share only the
//! immutable repository and range index, so they run in parallel; the
//! cheapest plan wins.

use crate::cnf::{self, RangeIndex};
use crate::error::{Error, Result};
use crate::model::{Command, Constraint, PackageRef};
use crate::repository::Repository;
use crate::verify;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

use super::graph::DepGraph;
use super::plan::{self, Plan};
use super::policy::TieBreak;
use super::solver;

/// Synthesize a minimum-cost plan reaching the constraints from the initial
/// state, or `Unsatisfiable` when no explored tie-break policy admits one.
pub fn synthesize(
    repo: &Repository,
    initial: &[PackageRef],
    constraints: &[Constraint],
) -> Result<Plan> {
    let ranges = RangeIndex::build(repo, constraints);

    let mut attempts: Vec<Attempt> = TieBreak::ALL
        .par_iter()
        .filter_map(|&policy| attempt(repo, &ranges, initial, constraints, policy))
        .collect();

    // Judged-valid plans outrank any best-effort ordering regardless of
    // cost; a cycle-broken ordering is only surfaced when no policy found a
    // replayable sequence.
    attempts.sort_by_key(|a| (!a.valid, a.plan.cost));

    match attempts.into_iter().next() {
        Some(a) => {
            info!(
                cost = a.plan.cost,
                commands = a.plan.commands.len(),
                valid = a.valid,
                "plan selected"
            );
            Ok(a.plan)
        }
        None => Err(Error::Unsatisfiable),
    }
}

/// A candidate plan from one policy, with the verdict of its replay
struct Attempt {
    plan: Plan,
    valid: bool,
}

/// One synthesis attempt under a single tie-break policy
fn attempt(
    repo: &Repository,
    ranges: &RangeIndex,
    initial: &[PackageRef],
    constraints: &[Constraint],
    policy: TieBreak,
) -> Option<Attempt> {
    let installed: HashSet<usize> = repo
        .resolve_state(initial, |candidates| policy.prefer(repo, candidates))
        .into_iter()
        .collect();

    // Roots: every package a constraint can touch, plus the installed set
    // (so removal ordering sees the edges between installed packages).
    let mut roots: Vec<usize> = Vec::new();
    for constraint in constraints {
        roots.extend_from_slice(ranges.matching(&constraint.range));
    }
    // Sorted so closure discovery order, and everything downstream of it,
    // is the same on every run.
    let mut installed_roots: Vec<usize> = installed.iter().copied().collect();
    installed_roots.sort_unstable();
    roots.extend(installed_roots);
    let graph = DepGraph::closure(repo, ranges, &roots);

    // Decision order: closure packages first, then the rest of the universe
    // so the model is complete. Within each segment decisions run
    // least-preferred first; phases default to "unchanged", so propagation
    // is what installs a candidate, and it fires on the policy's preferred
    // ones because those are decided last.
    let mut order: Vec<usize> = graph.nodes().to_vec();
    policy.rank(repo, &mut order);
    order.reverse();
    let mut rest: Vec<usize> = repo.indices().filter(|&v| !graph.contains(v)).collect();
    policy.rank(repo, &mut rest);
    rest.reverse();
    order.extend(rest);

    let mut store = cnf::compile(repo, ranges, constraints, &installed);
    let model = match solver::solve(repo.len(), store.clauses(), &order, |v| {
        installed.contains(&v)
    }) {
        Some(model) => model,
        None => {
            debug!(%policy, "attempt unsatisfiable");
            return None;
        }
    };

    // Project the model back onto the state: what changes.
    let install_set: HashSet<usize> = repo
        .indices()
        .filter(|&v| model[v] && !installed.contains(&v))
        .collect();
    let removal_set: HashSet<usize> = repo
        .indices()
        .filter(|&v| !model[v] && installed.contains(&v))
        .collect();

    // Removals run dependents-first; installs are the reverse, so every
    // dependency is present before its dependent.
    let removal_order = graph.dependents_first(&removal_set);
    let mut install_order = graph.dependents_first(&install_set);
    install_order.reverse();

    let cost = plan::score(
        repo,
        &install_order,
        &removal_order,
    );

    let removals_first: Vec<Command> = removal_order
        .iter()
        .map(|&v| Command::remove(repo.package(v).clone()))
        .chain(
            install_order
                .iter()
                .map(|&v| Command::install(repo.package(v).clone())),
        )
        .collect();

    let state_refs: Vec<PackageRef> = installed
        .iter()
        .map(|&v| PackageRef::Exact(repo.package(v).clone()))
        .collect();

    // Removals-first satisfies conflicts; when it breaks a surviving
    // dependent mid-sequence (a provider swap), the installs-first
    // interleaving is tried, and failing that an interleaving is searched
    // for against the clause store directly.
    let plan = Plan {
        commands: removals_first,
        cost,
    };
    if verify::judge(repo, &state_refs, &plan.commands, constraints).valid {
        info!(%policy, cost, "attempt produced a valid plan");
        return Some(Attempt { plan, valid: true });
    }

    let installs_first: Vec<Command> = install_order
        .iter()
        .map(|&v| Command::install(repo.package(v).clone()))
        .chain(
            removal_order
                .iter()
                .map(|&v| Command::remove(repo.package(v).clone())),
        )
        .collect();
    if verify::judge(repo, &state_refs, &installs_first, constraints).valid {
        info!(%policy, cost, "attempt produced a valid plan (installs first)");
        return Some(Attempt {
            plan: Plan {
                commands: installs_first,
                cost,
            },
            valid: true,
        });
    }

    if let Some(commands) = interleave(&mut store, &removal_order, &install_order) {
        let commands: Vec<Command> = commands
            .into_iter()
            .map(|(install, v)| {
                if install {
                    Command::install(repo.package(v).clone())
                } else {
                    Command::remove(repo.package(v).clone())
                }
            })
            .collect();
        if verify::judge(repo, &state_refs, &commands, constraints).valid {
            info!(%policy, cost, "attempt produced a valid plan (interleaved)");
            return Some(Attempt {
                plan: Plan { commands, cost },
                valid: true,
            });
        }
    }

    // No interleaving replays validly: a dependency cycle forces a
    // simultaneous install. The dependents-first order with its cycle
    // broken is still the documented best effort.
    info!(%policy, cost, "attempt produced a cycle-broken plan");
    Some(Attempt { plan, valid: false })
}

/// Search for a replay-valid ordering of the state diff by trying the
/// commands against the clause store: at each step, apply the first pending
/// command that leaves every structural clause satisfied. The store must be
/// at the initial state on entry. Returns `None` when no pending command
/// can be applied, which only happens inside a dependency cycle.
fn interleave(
    store: &mut cnf::CnfStore,
    removal_order: &[usize],
    install_order: &[usize],
) -> Option<Vec<(bool, usize)>> {
    let mut pending: Vec<(bool, usize)> = removal_order
        .iter()
        .map(|&v| (false, v))
        .chain(install_order.iter().map(|&v| (true, v)))
        .collect();
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let mut placed = None;
        for (i, &(install, v)) in pending.iter().enumerate() {
            let applied = if install {
                store.install(v)
            } else {
                store.uninstall(v)
            };
            if !applied {
                continue;
            }
            if store.structural_satisfied() {
                placed = Some(i);
                break;
            }
            // Put the state back and try the next pending command.
            if install {
                store.uninstall(v);
            } else {
                store.install(v);
            }
        }
        let i = placed?;
        ordered.push(pending.remove(i));
    }
    Some(ordered)
}
