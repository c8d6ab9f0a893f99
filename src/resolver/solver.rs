// src/resolver/solver.rs

//! Boolean satisfiability search over the compiled clauses
//!
//! An iterative DPLL: unit propagation to fixpoint, then a decision on the
//! next unassigned variable in policy order, with chronological backtracking
//! on conflict. Decision phases default to the caller-supplied preference
//! (normally the current system state) so satisfying assignments stay close
//! to it. No recursion anywhere; the trail and decision stack are explicit.

use crate::cnf::{Lit, var_of};
use tracing::debug;

/// One entry per decision: trail length at the decision point, the decided
/// variable, the phase tried first, and whether the flip was already tried
struct Decision {
    trail_len: usize,
    var: usize,
    phase: bool,
    flipped: bool,
}

/// Search for a complete satisfying assignment.
///
/// `order` lists every variable to decide (most-preferred first) and
/// `phase` gives the value to try first for each. Returns the model indexed
/// by variable, or `None` when the formula is unsatisfiable.
pub fn solve(
    num_vars: usize,
    clauses: &[Vec<Lit>],
    order: &[usize],
    phase: impl Fn(usize) -> bool,
) -> Option<Vec<bool>> {
    let mut assign: Vec<Option<bool>> = vec![None; num_vars + 1];
    let mut trail: Vec<usize> = Vec::new();
    let mut decisions: Vec<Decision> = Vec::new();

    let lit_value = |assign: &[Option<bool>], lit: Lit| -> Option<bool> {
        assign[var_of(lit)].map(|v| if lit > 0 { v } else { !v })
    };

    // Propagate units to fixpoint; true on conflict.
    let propagate = |assign: &mut Vec<Option<bool>>, trail: &mut Vec<usize>| -> bool {
        loop {
            let mut changed = false;
            for clause in clauses {
                let mut unassigned: Option<Lit> = None;
                let mut satisfied = false;
                let mut open = 0usize;
                for &lit in clause {
                    match lit_value(assign, lit) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            open += 1;
                            unassigned = Some(lit);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match open {
                    0 => return true,
                    1 => {
                        if let Some(lit) = unassigned {
                            assign[var_of(lit)] = Some(lit > 0);
                            trail.push(var_of(lit));
                            changed = true;
                        }
                    }
                    _ => {}
                }
            }
            if !changed {
                return false;
            }
        }
    };

    let mut conflict = propagate(&mut assign, &mut trail);
    loop {
        if conflict {
            // Chronological backtracking: undo to the last decision with an
            // untried phase.
            loop {
                let Some(last) = decisions.last_mut() else {
                    debug!("search exhausted: unsatisfiable");
                    return None;
                };
                while trail.len() > last.trail_len {
                    if let Some(v) = trail.pop() {
                        assign[v] = None;
                    }
                }
                if last.flipped {
                    decisions.pop();
                    continue;
                }
                last.flipped = true;
                assign[last.var] = Some(!last.phase);
                trail.push(last.var);
                break;
            }
            conflict = propagate(&mut assign, &mut trail);
            continue;
        }

        // Pick the next unassigned variable in preference order.
        let Some(&var) = order.iter().find(|&&v| assign[v].is_none()) else {
            let model = (0..=num_vars)
                .map(|v| assign[v].unwrap_or(false))
                .collect();
            return Some(model);
        };
        let preferred = phase(var);
        decisions.push(Decision {
            trail_len: trail.len(),
            var,
            phase: preferred,
            flipped: false,
        });
        assign[var] = Some(preferred);
        trail.push(var);
        conflict = propagate(&mut assign, &mut trail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_vars(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_empty_formula_is_satisfiable() {
        let model = solve(2, &[], &all_vars(2), |_| false).unwrap();
        assert_eq!(model, vec![false, false, false]);
    }

    #[test]
    fn test_unit_clauses_are_forced() {
        let clauses = vec![vec![1], vec![-2]];
        let model = solve(2, &clauses, &all_vars(2), |_| false).unwrap();
        assert!(model[1]);
        assert!(!model[2]);
    }

    #[test]
    fn test_implication_chain() {
        // 1, 1->2, 2->3
        let clauses = vec![vec![1], vec![-1, 2], vec![-2, 3]];
        let model = solve(3, &clauses, &all_vars(3), |_| false).unwrap();
        assert!(model[1] && model[2] && model[3]);
    }

    #[test]
    fn test_contradiction_is_unsat() {
        let clauses = vec![vec![1], vec![-1]];
        assert!(solve(1, &clauses, &all_vars(1), |_| false).is_none());
    }

    #[test]
    fn test_backtracking_finds_the_other_branch() {
        // (1 v 2) & (-1) forces 2 even when the phase prefers everything
        // false and the order tries 1 first.
        let clauses = vec![vec![1, 2], vec![-1]];
        let model = solve(2, &clauses, &all_vars(2), |_| false).unwrap();
        assert!(!model[1]);
        assert!(model[2]);
    }

    #[test]
    fn test_phase_preference_steers_the_model() {
        // (1 v 2) with both phases preferring true: first decision settles 1.
        let clauses = vec![vec![1, 2]];
        let model = solve(2, &clauses, &all_vars(2), |_| true).unwrap();
        assert!(model[1]);

        // Reversed order settles 2 first.
        let model = solve(2, &clauses, &[2, 1], |_| true).unwrap();
        assert!(model[2]);
    }

    #[test]
    fn test_mutual_implication_cycle_terminates() {
        // 1<->2 plus a requirement for 1.
        let clauses = vec![vec![-1, 2], vec![-2, 1], vec![1]];
        let model = solve(2, &clauses, &all_vars(2), |_| false).unwrap();
        assert!(model[1] && model[2]);
    }

    #[test]
    fn test_deeper_backtracking() {
        // Forces the search to undo two decisions.
        let clauses = vec![
            vec![1, 2, 3],
            vec![-1, -2],
            vec![-1, -3],
            vec![-2, -3],
            vec![-1],
            vec![-2],
        ];
        let model = solve(3, &clauses, &all_vars(3), |_| true).unwrap();
        assert!(!model[1] && !model[2] && model[3]);
    }
}
