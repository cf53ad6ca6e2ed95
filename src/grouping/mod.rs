//! Connected-component grouping of wildlife tokens.
//!
//! The traversal knows nothing about individual species: everything that
//! differs between them lives in a [`GroupingPolicy`].

mod split;

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::board::{Coord, Wildlife};
use crate::hex::AdjacencyGraph;

/// Which adjacent same-species tokens may share a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Linkage {
    #[default]
    Adjacent,
    /// Tokens link only while both touch at most `max_neighbors` tokens of
    /// their species.
    Run { max_neighbors: usize },
}

impl Linkage {
    pub fn connects(
        self,
        graph: &AdjacencyGraph<'_>,
        species: Wildlife,
        a: Coord,
        b: Coord,
    ) -> bool {
        match self {
            Linkage::Adjacent => true,
            Linkage::Run { max_neighbors } => {
                graph.neighbors_with(a, species).len() <= max_neighbors
                    && graph.neighbors_with(b, species).len() <= max_neighbors
            }
        }
    }
}

/// What happens to a connected cluster larger than the group-size cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Carve the cluster into capped groups: the most pairs possible for a
    /// cap of 2, a greedy pass for larger caps.
    #[default]
    Split,
    /// Break the cluster into singletons.
    Shatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupingPolicy {
    #[serde(default)]
    pub linkage: Linkage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_group_size: Option<usize>,
    #[serde(default)]
    pub overflow: Overflow,
}

impl GroupingPolicy {
    pub fn adjacent() -> Self {
        Self::default()
    }

    pub fn capped(max_group_size: usize, overflow: Overflow) -> Self {
        Self {
            max_group_size: Some(max_group_size),
            overflow,
            ..Self::default()
        }
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }
}

/// A set of same-species tokens on one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildlifeGroup {
    species: Wildlife,
    coords: Vec<Coord>,
}

impl WildlifeGroup {
    fn new(species: Wildlife, mut coords: Vec<Coord>) -> Self {
        coords.sort();
        Self { species, coords }
    }

    pub fn species(&self) -> Wildlife {
        self.species
    }

    pub fn size(&self) -> usize {
        self.coords.len()
    }

    /// Members in ascending order.
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.coords.binary_search(&coord).is_ok()
    }

    fn anchor(&self) -> Coord {
        self.coords[0]
    }
}

/// Partitions every `species` token on the graph's board into groups.
///
/// Groups come back ordered by their smallest coordinate.
pub fn find_groups(
    graph: &AdjacencyGraph<'_>,
    species: Wildlife,
    policy: &GroupingPolicy,
) -> Vec<WildlifeGroup> {
    let mut visited = BTreeSet::new();
    let mut groups = Vec::new();

    for start in graph.board().coords_with(species) {
        if !visited.insert(start) {
            continue;
        }
        let cluster = collect_cluster(graph, species, policy.linkage, start, &mut visited);

        match policy.max_group_size {
            Some(cap) if cluster.len() > cap => match policy.overflow {
                Overflow::Split => {
                    for part in split::split_capped(graph, species, policy.linkage, &cluster, cap)
                    {
                        groups.push(WildlifeGroup::new(species, part));
                    }
                }
                Overflow::Shatter => {
                    groups.extend(
                        cluster
                            .into_iter()
                            .map(|coord| WildlifeGroup::new(species, vec![coord])),
                    );
                }
            },
            _ => groups.push(WildlifeGroup::new(species, cluster)),
        }
    }

    groups.sort_by_key(WildlifeGroup::anchor);
    groups
}

fn collect_cluster(
    graph: &AdjacencyGraph<'_>,
    species: Wildlife,
    linkage: Linkage,
    start: Coord,
    visited: &mut BTreeSet<Coord>,
) -> Vec<Coord> {
    let mut cluster = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors_with(current, species) {
            if visited.contains(&next) || !linkage.connects(graph, species, current, next) {
                continue;
            }
            visited.insert(next);
            cluster.push(next);
            queue.push_back(next);
        }
    }
    cluster.sort();
    cluster
}
