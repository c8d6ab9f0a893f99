// src/resolver/plan.rs

//! Synthesized command plans and their cost model

use crate::model::Command;
use crate::repository::Repository;

/// Fixed penalty per uninstall, dwarfing any download size
pub const REMOVAL_PENALTY: u64 = 1_000_000;

/// An ordered command sequence together with its score
#[derive(Debug, Clone)]
pub struct Plan {
    pub commands: Vec<Command>,
    pub cost: u64,
}

impl Plan {
    /// Render the plan as `+name=version` / `-name=version` strings
    pub fn render(&self) -> Vec<String> {
        self.commands.iter().map(Command::to_string).collect()
    }
}

/// Total weight of new installs plus the removal penalty per uninstall
pub fn score(repo: &Repository, installs: &[usize], removals: &[usize]) -> u64 {
    let install_weight: u64 = installs.iter().map(|&p| repo.weight(p)).sum();
    install_weight + REMOVAL_PENALTY * removals.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepoRecord;

    #[test]
    fn test_score_adds_weights_and_penalties() {
        let records: Vec<RepoRecord> = [("a", 10), ("b", 25)]
            .iter()
            .map(|(name, size)| RepoRecord {
                name: name.to_string(),
                version: "1.0".to_string(),
                size: *size,
                depends: vec![],
                conflicts: vec![],
            })
            .collect();
        let repo = Repository::from_records(&records).unwrap();

        assert_eq!(score(&repo, &[1, 2], &[]), 35);
        assert_eq!(score(&repo, &[1], &[2]), 10 + REMOVAL_PENALTY);
        assert_eq!(score(&repo, &[], &[]), 0);
    }
}
