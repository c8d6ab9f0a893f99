// src/resolver/graph.rs

//! Implication graph over package indices
//!
//! Built by worklist iteration (never recursion) from a set of root
//! packages: edges point from a package to every candidate satisfier of its
//! dependency groups, and conflict targets join the node set without an
//! edge. The graph drives the search's variable order and the final
//! topological ordering of commands.

use crate::cnf::RangeIndex;
use crate::repository::Repository;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Dependency graph restricted to the packages reachable from the roots
#[derive(Debug)]
pub struct DepGraph {
    /// Nodes in discovery order
    nodes: Vec<usize>,
    /// Edges from a package to its candidate dependencies
    edges: HashMap<usize, Vec<usize>>,
    seen: HashSet<usize>,
}

impl DepGraph {
    /// Expand the closure of dependency and conflict targets from the roots
    pub fn closure(repo: &Repository, ranges: &RangeIndex, roots: &[usize]) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            edges: HashMap::new(),
            seen: HashSet::new(),
        };

        let mut queue: VecDeque<usize> = VecDeque::new();
        for &root in roots {
            if graph.seen.insert(root) {
                graph.nodes.push(root);
                queue.push_back(root);
            }
        }

        while let Some(p) = queue.pop_front() {
            let props = repo.properties(p);
            for group in &props.depends {
                for range in group {
                    for &q in ranges.matching(range) {
                        graph.edges.entry(p).or_default().push(q);
                        if graph.seen.insert(q) {
                            graph.nodes.push(q);
                            queue.push_back(q);
                        }
                    }
                }
            }
            for range in &props.conflicts {
                for &q in ranges.matching(range) {
                    // Conflict targets are part of the closure (the search
                    // must decide them) but carry no ordering edge.
                    if graph.seen.insert(q) {
                        graph.nodes.push(q);
                        queue.push_back(q);
                    }
                }
            }
        }

        debug!(nodes = graph.nodes.len(), roots = roots.len(), "closure expanded");
        graph
    }

    /// Nodes in discovery order
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn contains(&self, p: usize) -> bool {
        self.seen.contains(&p)
    }

    /// Order a subset of nodes so that dependents come before their
    /// dependencies (Kahn's algorithm over the edges within the subset).
    ///
    /// Cycles cannot stall the sort: when no zero-in-degree node remains,
    /// the earliest-discovered remaining node is forced out next, which
    /// drops the cycle's back edge. Reversing the result gives
    /// dependencies-first order for installs; the unreversed order is the
    /// removal order.
    pub fn dependents_first(&self, subset: &HashSet<usize>) -> Vec<usize> {
        let mut members: Vec<usize> = self
            .nodes
            .iter()
            .copied()
            .filter(|p| subset.contains(p))
            .collect();
        // Subset members outside the closure have no edges; order them last.
        let mut strays: Vec<usize> = subset
            .iter()
            .copied()
            .filter(|p| !self.seen.contains(p))
            .collect();
        strays.sort_unstable();
        members.extend(strays);

        let mut in_degree: HashMap<usize, usize> =
            members.iter().map(|&p| (p, 0)).collect();
        for &p in &members {
            if let Some(targets) = self.edges.get(&p) {
                let mut counted = HashSet::new();
                for &q in targets {
                    if q != p && subset.contains(&q) && counted.insert(q) {
                        if let Some(d) = in_degree.get_mut(&q) {
                            *d += 1;
                        }
                    }
                }
            }
        }

        let mut order = Vec::with_capacity(members.len());
        let mut placed: HashSet<usize> = HashSet::new();
        let mut queue: VecDeque<usize> = members
            .iter()
            .copied()
            .filter(|p| in_degree[p] == 0)
            .collect();

        loop {
            while let Some(p) = queue.pop_front() {
                if !placed.insert(p) {
                    continue;
                }
                order.push(p);
                if let Some(targets) = self.edges.get(&p) {
                    let mut counted = HashSet::new();
                    for &q in targets {
                        if q != p && subset.contains(&q) && counted.insert(q) {
                            let Some(d) = in_degree.get_mut(&q) else {
                                continue;
                            };
                            *d = d.saturating_sub(1);
                            if *d == 0 && !placed.contains(&q) {
                                queue.push_back(q);
                            }
                        }
                    }
                }
            }
            if order.len() == members.len() {
                break;
            }
            // Cycle: force the earliest-discovered unplaced member.
            let forced = members
                .iter()
                .copied()
                .find(|p| !placed.contains(p))
                .expect("unplaced member must exist");
            debug!(package = forced, "breaking dependency cycle");
            queue.push_back(forced);
        }

        order
    }
}
