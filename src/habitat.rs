//! Per-terrain measurements of one board: tile counts and largest corridors.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::board::{Coord, Terrain};
use crate::hex::AdjacencyGraph;

fn default_points_per_tile() -> u32 {
    1
}

/// Optional points for the largest contiguous area of each terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorRules {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_points_per_tile")]
    pub points_per_tile: u32,
}

impl Default for CorridorRules {
    fn default() -> Self {
        Self {
            enabled: false,
            points_per_tile: default_points_per_tile(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitatSummary {
    pub tile_counts: BTreeMap<Terrain, usize>,
    pub largest_corridors: BTreeMap<Terrain, usize>,
}

impl HabitatSummary {
    pub fn measure(graph: &AdjacencyGraph<'_>) -> Self {
        let board = graph.board();
        let tile_counts = Terrain::ALL
            .into_iter()
            .map(|terrain| (terrain, board.terrain_count(terrain)))
            .collect();
        let largest_corridors = Terrain::ALL
            .into_iter()
            .map(|terrain| (terrain, largest_corridor(graph, terrain)))
            .collect();
        Self {
            tile_counts,
            largest_corridors,
        }
    }

    pub fn tile_count(&self, terrain: Terrain) -> usize {
        self.tile_counts.get(&terrain).copied().unwrap_or(0)
    }

    pub fn largest_corridor(&self, terrain: Terrain) -> usize {
        self.largest_corridors.get(&terrain).copied().unwrap_or(0)
    }
}

/// Size of the biggest edge-connected area of `terrain`.
pub fn largest_corridor(graph: &AdjacencyGraph<'_>, terrain: Terrain) -> usize {
    let board = graph.board();
    let mut visited: BTreeSet<Coord> = BTreeSet::new();
    let mut largest = 0;

    for start in board.tiles().filter(|tile| tile.terrain == terrain) {
        if !visited.insert(start.coord) {
            continue;
        }
        let mut area = 0;
        let mut queue = VecDeque::from([start.coord]);
        while let Some(current) = queue.pop_front() {
            area += 1;
            for &next in graph.neighbors(current).unwrap_or_default() {
                let same = board.tile(next).is_some_and(|tile| tile.terrain == terrain);
                if same && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        largest = largest.max(area);
    }
    largest
}
