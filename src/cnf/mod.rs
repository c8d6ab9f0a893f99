// src/cnf/mod.rs

//! Clause store with incremental unit-propagation bookkeeping
//!
//! Each clause tracks a single watch: some literal currently true under the
//! assignment, or none, in which case the clause sits in the unsatisfied
//! set. Occurrence lists map literals to the clauses containing them, so
//! flipping one variable touches only the clauses that mention it -- never
//! the whole store.
//!
//! A `CnfStore` plus its assignment is owned by exactly one call context;
//! parallel synthesis attempts each build their own.

pub mod compiler;

pub use compiler::{RangeIndex, compile};

use std::collections::{BTreeSet, HashMap, HashSet};

/// A signed package literal: positive means installed, negative means not.
/// Literal 0 is never used.
pub type Lit = i64;

/// Variable (package index) underlying a literal
pub fn var_of(lit: Lit) -> usize {
    lit.unsigned_abs() as usize
}

/// The clause database, its watch structure, and the concrete assignment
#[derive(Debug, Clone)]
pub struct CnfStore {
    clauses: Vec<Vec<Lit>>,
    /// Clause indices containing each literal
    occurrences: HashMap<Lit, Vec<usize>>,
    /// Per-clause watch: a literal believed true, or None when unsatisfied
    watches: Vec<Option<Lit>>,
    /// Indices of clauses with no true literal; ordered so the structural
    /// prefix can be checked cheaply
    unsatisfied: BTreeSet<usize>,
    /// values[v] is v when package v is installed, -v when it is not
    values: Vec<Lit>,
    /// Mirror of the positive assignments, the concrete system state
    installed: HashSet<usize>,
    /// Clauses below this index derive from repository metadata and must
    /// hold in every state; the rest are goal clauses
    structural_count: usize,
}

impl CnfStore {
    /// Create a store over `num_vars` packages with the given installed set
    pub fn new(num_vars: usize, installed: &HashSet<usize>) -> Self {
        let mut values = vec![0; num_vars + 1];
        for v in 1..=num_vars {
            values[v] = if installed.contains(&v) {
                v as Lit
            } else {
                -(v as Lit)
            };
        }
        Self {
            clauses: Vec::new(),
            occurrences: HashMap::new(),
            watches: Vec::new(),
            unsatisfied: BTreeSet::new(),
            values,
            installed: installed.clone(),
            structural_count: 0,
        }
    }

    /// Number of variables in the universe
    pub fn num_vars(&self) -> usize {
        self.values.len() - 1
    }

    /// Add a clause and compute its initial watch
    pub fn add_clause(&mut self, clause: Vec<Lit>) {
        debug_assert!(clause.iter().all(|&l| l != 0 && var_of(l) <= self.num_vars()));
        let ci = self.clauses.len();
        for &lit in &clause {
            self.occurrences.entry(lit).or_default().push(ci);
        }
        self.clauses.push(clause);
        self.watches.push(None);
        self.unsatisfied.insert(ci);
        self.rewatch(ci);
    }

    /// Freeze the structural prefix: everything added so far is a
    /// repository-derived clause, everything after is a goal clause
    pub fn mark_structural(&mut self) {
        self.structural_count = self.clauses.len();
    }

    pub fn structural_count(&self) -> usize {
        self.structural_count
    }

    pub fn clause(&self, ci: usize) -> &[Lit] {
        &self.clauses[ci]
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Current value of a variable: `v` or `-v`
    pub fn value(&self, v: usize) -> Lit {
        self.values[v]
    }

    /// Is this literal true under the current assignment?
    pub fn is_true(&self, lit: Lit) -> bool {
        self.values[var_of(lit)] == lit
    }

    /// The concrete installed set
    pub fn installed(&self) -> &HashSet<usize> {
        &self.installed
    }

    /// Number of currently unsatisfied clauses
    pub fn unsatisfied_count(&self) -> usize {
        self.unsatisfied.len()
    }

    /// True when every structural clause has a true literal
    pub fn structural_satisfied(&self) -> bool {
        match self.unsatisfied.first() {
            Some(&ci) => ci >= self.structural_count,
            None => true,
        }
    }

    /// True when every clause, structural and goal, is satisfied
    pub fn fully_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    /// Literals of the lowest-indexed unsatisfied clause, for diagnostics
    pub fn first_violation(&self) -> Option<&[Lit]> {
        self.unsatisfied.first().map(|&ci| self.clauses[ci].as_slice())
    }

    /// Find some literal of a clause that is true under the assignment
    fn find_watch(&self, ci: usize) -> Option<Lit> {
        self.clauses[ci].iter().copied().find(|&l| self.is_true(l))
    }

    /// Recompute the watch for a clause, moving it in or out of the
    /// unsatisfied set as needed
    fn rewatch(&mut self, ci: usize) {
        if self.watches[ci].is_none() {
            self.unsatisfied.remove(&ci);
        }
        let watch = self.find_watch(ci);
        self.watches[ci] = watch;
        if watch.is_none() {
            self.unsatisfied.insert(ci);
        }
    }

    /// Set a literal true, incrementally maintaining watches.
    ///
    /// No-op when the variable already has that value. Cost is proportional
    /// to the number of clauses mentioning the flipped variable.
    pub fn set_literal(&mut self, lit: Lit) {
        let v = var_of(lit);
        if self.values[v] == lit {
            return;
        }
        self.values[v] = lit;
        if lit > 0 {
            self.installed.insert(v);
        } else {
            self.installed.remove(&v);
        }

        // Clauses watching the now-false literal must find a new watch.
        if let Some(cs) = self.occurrences.get(&-lit) {
            let affected: Vec<usize> = cs
                .iter()
                .copied()
                .filter(|&ci| self.watches[ci] == Some(-lit))
                .collect();
            for ci in affected {
                self.rewatch(ci);
                debug_assert!(
                    self.watches[ci].is_none_or(|w| self.is_true(w)),
                    "watch must point at a true literal"
                );
            }
        }

        // Previously unsatisfied clauses containing the literal are now
        // satisfied by it.
        if let Some(cs) = self.occurrences.get(&lit) {
            let satisfied: Vec<usize> = cs
                .iter()
                .copied()
                .filter(|&ci| self.watches[ci].is_none())
                .collect();
            for ci in satisfied {
                self.watches[ci] = Some(lit);
                self.unsatisfied.remove(&ci);
            }
        }
    }

    /// Flip a variable to its opposite value
    pub fn flip(&mut self, v: usize) {
        self.set_literal(-self.values[v]);
    }

    /// Install the package at `v`. Returns false (no-op) when it is already
    /// installed.
    pub fn install(&mut self, v: usize) -> bool {
        if self.installed.contains(&v) {
            return false;
        }
        self.set_literal(v as Lit);
        true
    }

    /// Uninstall the package at `v`. Returns false (no-op) when it is not
    /// installed.
    pub fn uninstall(&mut self, v: usize) -> bool {
        if !self.installed.contains(&v) {
            return false;
        }
        self.set_literal(-(v as Lit));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state() -> HashSet<usize> {
        HashSet::new()
    }

    #[test]
    fn test_new_store_assignment_matches_state() {
        let installed: HashSet<usize> = [2].into_iter().collect();
        let store = CnfStore::new(3, &installed);
        assert_eq!(store.value(1), -1);
        assert_eq!(store.value(2), 2);
        assert_eq!(store.value(3), -3);
        assert!(store.is_true(-1));
        assert!(store.is_true(2));
    }

    #[test]
    fn test_add_clause_watches_true_literal() {
        let installed: HashSet<usize> = [1].into_iter().collect();
        let mut store = CnfStore::new(2, &installed);
        store.add_clause(vec![1, 2]);
        assert!(store.fully_satisfied());

        store.add_clause(vec![2]);
        assert_eq!(store.unsatisfied_count(), 1);
        assert_eq!(store.first_violation(), Some(&[2][..]));
    }

    #[test]
    fn test_set_literal_moves_clauses_between_sets() {
        let mut store = CnfStore::new(2, &empty_state());
        store.add_clause(vec![1, 2]);
        assert_eq!(store.unsatisfied_count(), 1);

        store.set_literal(1);
        assert!(store.fully_satisfied());

        // Flipping 1 back falsifies the watch; no other literal is true.
        store.set_literal(-1);
        assert_eq!(store.unsatisfied_count(), 1);

        store.set_literal(2);
        assert!(store.fully_satisfied());
    }

    #[test]
    fn test_set_literal_is_idempotent() {
        let mut store = CnfStore::new(2, &empty_state());
        store.add_clause(vec![-1, 2]);
        store.set_literal(1);
        let unsat = store.unsatisfied_count();
        store.set_literal(1);
        assert_eq!(store.unsatisfied_count(), unsat);
    }

    #[test]
    fn test_flip_toggles_a_variable() {
        let mut store = CnfStore::new(1, &empty_state());
        store.flip(1);
        assert!(store.is_true(1));
        store.flip(1);
        assert!(store.is_true(-1));
    }

    #[test]
    fn test_install_uninstall_wrappers() {
        let mut store = CnfStore::new(2, &empty_state());
        assert!(store.install(1));
        assert!(!store.install(1));
        assert!(store.installed().contains(&1));

        assert!(store.uninstall(1));
        assert!(!store.uninstall(1));
        assert!(!store.installed().contains(&1));
    }

    #[test]
    fn test_structural_prefix_check() {
        let installed: HashSet<usize> = [1].into_iter().collect();
        let mut store = CnfStore::new(2, &installed);
        store.add_clause(vec![-1, 2]); // structural: 1 depends on 2
        store.mark_structural();
        store.add_clause(vec![2]); // goal: require 2

        assert!(!store.structural_satisfied());
        store.set_literal(2);
        assert!(store.structural_satisfied());
        assert!(store.fully_satisfied());

        store.set_literal(-2);
        assert!(!store.structural_satisfied());
        store.set_literal(-1);
        assert!(store.structural_satisfied());
        assert!(!store.fully_satisfied()); // goal clause still unmet
    }
}
