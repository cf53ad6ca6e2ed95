//! Wildlife subtotals: one generic pass per species, driven by its rule.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::board::Wildlife;
use crate::error::ConfigurationError;
use crate::grouping::{find_groups, WildlifeGroup};
use crate::hex::AdjacencyGraph;
use crate::rules::{AdjacencyBonus, PointTable, SpeciesRule, SpeciesScoring, TableMiss};

/// One species' points on one board, with the groups that earned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesTally {
    pub species: Wildlife,
    pub points: u32,
    /// Sizes of the groups (or per-token counts) that produced points.
    pub scoring_units: Vec<usize>,
    pub note: String,
}

impl SpeciesTally {
    pub fn empty(species: Wildlife) -> Self {
        Self {
            species,
            points: 0,
            scoring_units: Vec::new(),
            note: format!("no {species}"),
        }
    }
}

pub fn score_species(
    graph: &AdjacencyGraph<'_>,
    species: Wildlife,
    rule: &SpeciesRule,
) -> Result<SpeciesTally, ConfigurationError> {
    if !graph.board().has_species(species) {
        return Ok(SpeciesTally::empty(species));
    }

    match &rule.scoring {
        SpeciesScoring::GroupSize { table, bonus } => {
            let groups = find_groups(graph, species, &rule.grouping);
            score_by_size(graph, species, &groups, table, *bonus)
        }
        SpeciesScoring::GroupCount { group_size, table } => {
            let groups = find_groups(graph, species, &rule.grouping);
            let matching = groups
                .iter()
                .filter(|group| group.size() == *group_size)
                .count();
            Ok(SpeciesTally {
                species,
                points: lookup(graph, table, species, matching)?,
                scoring_units: vec![*group_size; matching],
                note: format!("{matching} group(s) of exactly {group_size}"),
            })
        }
        SpeciesScoring::IsolatedCount { table } => {
            let groups = find_groups(graph, species, &rule.grouping);
            let isolated = groups
                .iter()
                .filter(|group| group.size() == 1 && is_isolated(graph, species, rule, group))
                .count();
            Ok(SpeciesTally {
                species,
                points: lookup(graph, table, species, isolated)?,
                scoring_units: vec![1; isolated],
                note: format!("{isolated} isolated {species}"),
            })
        }
        SpeciesScoring::NeighborVariety {
            points_per_species,
            cap,
            include_own_species,
        } => {
            let mut points: u32 = 0;
            let mut seen_counts = Vec::new();
            for coord in graph.board().coords_with(species) {
                let around: BTreeSet<Wildlife> = graph
                    .neighbors(coord)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|next| graph.board().wildlife_at(*next))
                    .filter(|other| *include_own_species || *other != species)
                    .collect();
                let counted = around.len().min(*cap as usize);
                points = u32::try_from(counted)
                    .ok()
                    .and_then(|counted| counted.checked_mul(*points_per_species))
                    .and_then(|earned| points.checked_add(earned))
                    .ok_or_else(|| overflow(graph, species))?;
                seen_counts.push(counted);
            }
            Ok(SpeciesTally {
                species,
                points,
                note: format!("distinct neighbours per {species}: {seen_counts:?}"),
                scoring_units: seen_counts,
            })
        }
    }
}

fn score_by_size(
    graph: &AdjacencyGraph<'_>,
    species: Wildlife,
    groups: &[WildlifeGroup],
    table: &PointTable,
    bonus: Option<AdjacencyBonus>,
) -> Result<SpeciesTally, ConfigurationError> {
    let mut points: u32 = 0;
    let mut boosted = 0;
    for group in groups {
        let mut value = lookup(graph, table, species, group.size())?;
        if let Some(bonus) = bonus {
            let touches = group
                .coords()
                .iter()
                .any(|coord| graph.touches_species(*coord, bonus.species));
            if touches {
                value = value
                    .checked_mul(bonus.multiplier)
                    .ok_or_else(|| overflow(graph, species))?;
                boosted += 1;
            }
        }
        points = points
            .checked_add(value)
            .ok_or_else(|| overflow(graph, species))?;
    }
    let sizes: Vec<usize> = groups.iter().map(WildlifeGroup::size).collect();
    let mut note = format!("group sizes {sizes:?}");
    if let (Some(bonus), true) = (bonus, boosted > 0) {
        note.push_str(&format!(
            ", {boosted} touching {} (x{})",
            bonus.species, bonus.multiplier
        ));
    }
    Ok(SpeciesTally {
        species,
        points,
        scoring_units: sizes,
        note,
    })
}

fn is_isolated(
    graph: &AdjacencyGraph<'_>,
    species: Wildlife,
    rule: &SpeciesRule,
    group: &WildlifeGroup,
) -> bool {
    let coord = group.coords()[0];
    graph
        .neighbors_with(coord, species)
        .into_iter()
        .all(|next| !rule.grouping.linkage.connects(graph, species, coord, next))
}

fn lookup(
    graph: &AdjacencyGraph<'_>,
    table: &PointTable,
    species: Wildlife,
    key: usize,
) -> Result<u32, ConfigurationError> {
    let key = u32::try_from(key).unwrap_or(u32::MAX);
    table.lookup(key).map_err(|miss| match miss {
        TableMiss::Missing => ConfigurationError::MissingTableEntry {
            table: species.to_string(),
            key,
            player: graph.board().id().clone(),
        },
        TableMiss::Overflow => overflow(graph, species),
    })
}

fn overflow(graph: &AdjacencyGraph<'_>, species: Wildlife) -> ConfigurationError {
    ConfigurationError::PointsOverflow {
        category: species.to_string(),
        player: graph.board().id().clone(),
    }
}
