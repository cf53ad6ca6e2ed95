//! Scoring tables and grouping policies, supplied as data.

mod table;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::{default_tie_break, TieBreaker};
use crate::board::Wildlife;
use crate::error::ConfigurationError;
use crate::grouping::{GroupingPolicy, Overflow};
use crate::habitat::CorridorRules;
use crate::majority::MajorityRules;

pub use table::{Extrapolation, PointTable, TableMiss};

/// Multiplies a group's points when it touches another species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyBonus {
    pub species: Wildlife,
    pub multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeciesScoring {
    /// Every group scores by its size.
    GroupSize {
        table: PointTable,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bonus: Option<AdjacencyBonus>,
    },
    /// Only groups of exactly `group_size` count; the count is looked up.
    GroupCount { group_size: usize, table: PointTable },
    /// Tokens with no linked neighbour of their species are counted.
    IsolatedCount { table: PointTable },
    /// Each token scores for the distinct species around it.
    NeighborVariety {
        points_per_species: u32,
        cap: u32,
        #[serde(default = "default_include_own_species")]
        include_own_species: bool,
    },
}

fn default_include_own_species() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRule {
    #[serde(default)]
    pub grouping: GroupingPolicy,
    pub scoring: SpeciesScoring,
}

impl SpeciesRule {
    pub fn bear() -> Self {
        Self {
            grouping: GroupingPolicy::capped(2, Overflow::Split),
            scoring: SpeciesScoring::GroupCount {
                group_size: 2,
                table: PointTable::sequence(0, &[0, 4, 11, 19, 27])
                    .with_beyond(Extrapolation::Linear { step: 8 }),
            },
        }
    }

    pub fn elk() -> Self {
        Self {
            grouping: GroupingPolicy::adjacent(),
            scoring: SpeciesScoring::GroupSize {
                table: PointTable::sequence(1, &[2, 4, 9, 13, 18])
                    .with_beyond(Extrapolation::Linear { step: 2 }),
                bonus: None,
            },
        }
    }

    pub fn salmon() -> Self {
        Self {
            grouping: GroupingPolicy::adjacent(),
            scoring: SpeciesScoring::GroupSize {
                table: PointTable::sequence(1, &[2, 4, 7, 10, 14, 20])
                    .with_beyond(Extrapolation::Clamp),
                bonus: Some(AdjacencyBonus {
                    species: Wildlife::Bear,
                    multiplier: 2,
                }),
            },
        }
    }

    pub fn hawk() -> Self {
        Self {
            grouping: GroupingPolicy::adjacent(),
            scoring: SpeciesScoring::IsolatedCount {
                table: PointTable::sequence(1, &[2, 4, 7, 10, 14, 20])
                    .with_beyond(Extrapolation::Clamp),
            },
        }
    }

    pub fn fox() -> Self {
        Self {
            grouping: GroupingPolicy::adjacent(),
            scoring: SpeciesScoring::NeighborVariety {
                points_per_species: 1,
                cap: 4,
                include_own_species: true,
            },
        }
    }

    pub fn default_for(species: Wildlife) -> Self {
        match species {
            Wildlife::Bear => Self::bear(),
            Wildlife::Elk => Self::elk(),
            Wildlife::Salmon => Self::salmon(),
            Wildlife::Hawk => Self::hawk(),
            Wildlife::Fox => Self::fox(),
        }
    }
}

fn default_species() -> BTreeMap<Wildlife, SpeciesRule> {
    Wildlife::ALL
        .into_iter()
        .map(|species| (species, SpeciesRule::default_for(species)))
        .collect()
}

/// The complete rule set one scoring run uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(default = "default_species")]
    pub species: BTreeMap<Wildlife, SpeciesRule>,
    #[serde(default)]
    pub majority: MajorityRules,
    #[serde(default)]
    pub corridors: CorridorRules,
    /// Criteria that order players level on total.
    #[serde(default = "default_tie_break")]
    pub tie_break: Vec<TieBreaker>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            species: default_species(),
            majority: MajorityRules::default(),
            corridors: CorridorRules::default(),
            tie_break: default_tie_break(),
        }
    }
}

impl ScoringRules {
    pub fn species_rule(&self, species: Wildlife) -> Option<&SpeciesRule> {
        self.species.get(&species)
    }

    /// Rejects rules no board could be scored with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (&species, rule) in &self.species {
            if rule.grouping.max_group_size == Some(0) {
                return Err(ConfigurationError::InvalidGroupSize { species, size: 0 });
            }
            if let SpeciesScoring::GroupCount { group_size, .. } = rule.scoring {
                let over_cap = rule
                    .grouping
                    .max_group_size
                    .is_some_and(|cap| group_size > cap);
                if group_size == 0 || over_cap {
                    return Err(ConfigurationError::InvalidGroupSize {
                        species,
                        size: group_size,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse scoring rules YAML")
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse scoring rules JSON")
    }

    /// Loads rules from a `.json` file, or YAML for any other extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let rules = if is_json(path) {
            Self::from_json_str(&data)
        } else {
            Self::from_yaml_str(&data)
        }
        .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(rules)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize scoring rules")
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
