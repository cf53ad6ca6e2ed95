//! Habitat majority bonuses across players.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::Terrain;
use crate::habitat::HabitatSummary;

fn default_first_place() -> u32 {
    3
}

fn default_second_place() -> u32 {
    1
}

/// Convention for a game with a single player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinglePlayerMajority {
    /// Nobody to compare against, so no bonus.
    #[default]
    #[serde(rename = "none")]
    NoBonus,
    /// The lone player takes the first-place bonus for every terrain they have.
    FullFirst,
}

/// Dedicated two-player table: a unique leader takes `winner`, a tie pays
/// `tie` to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoPlayerMajority {
    pub winner: u32,
    pub tie: u32,
}

/// What players are ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorityBasis {
    #[default]
    TileCount,
    LargestCorridor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorityRules {
    #[serde(default = "default_first_place")]
    pub first_place: u32,
    #[serde(default = "default_second_place")]
    pub second_place: u32,
    #[serde(default)]
    pub single_player: SinglePlayerMajority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_player: Option<TwoPlayerMajority>,
    #[serde(default)]
    pub basis: MajorityBasis,
}

impl Default for MajorityRules {
    fn default() -> Self {
        Self {
            first_place: default_first_place(),
            second_place: default_second_place(),
            single_player: SinglePlayerMajority::default(),
            two_player: None,
            basis: MajorityBasis::default(),
        }
    }
}

impl MajorityRules {
    /// Bonus per player for one terrain, given each player's measure in turn
    /// order.
    pub fn award(&self, measures: &[usize]) -> Vec<u32> {
        let mut bonus = vec![0; measures.len()];
        let Some(&top) = measures.iter().max() else {
            return bonus;
        };
        if top == 0 {
            return bonus;
        }

        if measures.len() == 1 {
            if self.single_player == SinglePlayerMajority::FullFirst {
                bonus[0] = self.first_place;
            }
            return bonus;
        }

        if let (2, Some(two)) = (measures.len(), self.two_player) {
            if measures[0] == measures[1] {
                bonus = vec![two.tie, two.tie];
            } else {
                let leader = usize::from(measures[1] > measures[0]);
                bonus[leader] = two.winner;
            }
            return bonus;
        }

        let leaders: Vec<usize> = positions_of(measures, top);
        for &index in &leaders {
            bonus[index] = self.first_place;
        }
        // A shared first place uses up second place.
        if leaders.len() > 1 {
            return bonus;
        }

        let runner_up = measures.iter().copied().filter(|&m| m < top).max();
        if let Some(second) = runner_up.filter(|&m| m > 0) {
            for index in positions_of(measures, second) {
                bonus[index] = self.second_place;
            }
        }
        bonus
    }

    fn measure(&self, summary: &HabitatSummary, terrain: Terrain) -> usize {
        match self.basis {
            MajorityBasis::TileCount => summary.tile_count(terrain),
            MajorityBasis::LargestCorridor => summary.largest_corridor(terrain),
        }
    }

    /// Majority points for every player and terrain, players in turn order.
    pub fn bonuses(&self, summaries: &[HabitatSummary]) -> Vec<BTreeMap<Terrain, u32>> {
        let mut per_player = vec![BTreeMap::new(); summaries.len()];
        for terrain in Terrain::ALL {
            let measures: Vec<usize> = summaries
                .iter()
                .map(|summary| self.measure(summary, terrain))
                .collect();
            for (awards, points) in per_player.iter_mut().zip(self.award(&measures)) {
                awards.insert(terrain, points);
            }
        }
        per_player
    }
}

fn positions_of(measures: &[usize], value: usize) -> Vec<usize> {
    measures
        .iter()
        .enumerate()
        .filter(|(_, &m)| m == value)
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_first_and_second() {
        let rules = MajorityRules::default();
        assert_eq!(rules.award(&[5, 7, 3]), vec![1, 3, 0]);
    }

    #[test]
    fn tie_for_first_consumes_second() {
        let rules = MajorityRules::default();
        assert_eq!(rules.award(&[6, 6, 4]), vec![3, 3, 0]);
        assert_eq!(rules.award(&[2, 2, 2, 1]), vec![3, 3, 3, 0]);
    }

    #[test]
    fn tie_for_second_pays_each_in_full() {
        let rules = MajorityRules::default();
        assert_eq!(rules.award(&[8, 4, 4, 1]), vec![3, 1, 1, 0]);
    }

    #[test]
    fn zero_tiles_never_score() {
        let rules = MajorityRules::default();
        assert_eq!(rules.award(&[0, 0, 0]), vec![0, 0, 0]);
        assert_eq!(rules.award(&[3, 0, 0]), vec![3, 0, 0]);
    }

    #[test]
    fn single_player_conventions() {
        let none = MajorityRules::default();
        assert_eq!(none.award(&[9]), vec![0]);
        let full = MajorityRules {
            single_player: SinglePlayerMajority::FullFirst,
            ..MajorityRules::default()
        };
        assert_eq!(full.award(&[9]), vec![3]);
        assert_eq!(full.award(&[0]), vec![0]);
    }

    #[test]
    fn two_player_table() {
        let rules = MajorityRules {
            two_player: Some(TwoPlayerMajority { winner: 2, tie: 1 }),
            ..MajorityRules::default()
        };
        assert_eq!(rules.award(&[3, 5]), vec![0, 2]);
        assert_eq!(rules.award(&[4, 4]), vec![1, 1]);
        assert_eq!(rules.award(&[0, 0]), vec![0, 0]);
        // Three players fall back to the general rule.
        assert_eq!(rules.award(&[4, 3, 1]), vec![3, 1, 0]);
    }

    #[test]
    fn yaml_names() {
        let rules: MajorityRules =
            serde_yaml::from_str("single_player: none\nbasis: largest_corridor\n").unwrap();
        assert_eq!(rules.single_player, SinglePlayerMajority::NoBonus);
        assert_eq!(rules.basis, MajorityBasis::LargestCorridor);
        let full: MajorityRules = serde_yaml::from_str("single_player: full_first\n").unwrap();
        assert_eq!(full.single_player, SinglePlayerMajority::FullFirst);
    }
}
