//! Hex adjacency derived from axial tile coordinates.

use std::collections::BTreeMap;

use crate::board::{Coord, PlayerBoard, Wildlife};

/// The six axial neighbour offsets.
pub const AXIAL_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl Coord {
    /// All six neighbouring positions, whether or not a tile sits there.
    pub fn neighbors(self) -> [Coord; 6] {
        AXIAL_DIRECTIONS.map(|(dq, dr)| Coord::new(self.q + dq, self.r + dr))
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self.neighbors().contains(&other)
    }
}

/// Neighbour lists for every tile of one board, restricted to that board.
pub struct AdjacencyGraph<'a> {
    board: &'a PlayerBoard,
    edges: BTreeMap<Coord, Vec<Coord>>,
}

impl<'a> AdjacencyGraph<'a> {
    pub fn new(board: &'a PlayerBoard) -> Self {
        let edges = board
            .tiles()
            .map(|tile| {
                let mut present: Vec<Coord> = tile
                    .coord
                    .neighbors()
                    .into_iter()
                    .filter(|coord| board.contains(*coord))
                    .collect();
                present.sort();
                (tile.coord, present)
            })
            .collect();
        Self { board, edges }
    }

    pub fn board(&self) -> &'a PlayerBoard {
        self.board
    }

    /// Neighbours of `coord` in ascending order, or `None` when the board has
    /// no tile there.
    pub fn neighbors(&self, coord: Coord) -> Option<&[Coord]> {
        self.edges.get(&coord).map(Vec::as_slice)
    }

    /// Neighbours of `coord` carrying `species`.
    pub fn neighbors_with(&self, coord: Coord, species: Wildlife) -> Vec<Coord> {
        self.neighbors(coord)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|next| self.board.wildlife_at(*next) == Some(species))
            .collect()
    }

    pub fn touches_species(&self, coord: Coord, species: Wildlife) -> bool {
        self.neighbors(coord)
            .unwrap_or_default()
            .iter()
            .any(|next| self.board.wildlife_at(*next) == Some(species))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Terrain, Tile};

    fn rosette() -> PlayerBoard {
        let mut tiles = vec![Tile::new(0, 0, Terrain::Forest, Some(Wildlife::Fox))];
        for (dq, dr) in AXIAL_DIRECTIONS {
            tiles.push(Tile::new(dq, dr, Terrain::River, Some(Wildlife::Salmon)));
        }
        tiles.push(Tile::new(5, 5, Terrain::Prairie, None));
        PlayerBoard::new("p", 0, tiles).unwrap()
    }

    #[test]
    fn centre_has_six_neighbors() {
        let board = rosette();
        let graph = AdjacencyGraph::new(&board);
        assert_eq!(graph.neighbors(Coord::new(0, 0)).unwrap().len(), 6);
    }

    #[test]
    fn edge_tile_only_sees_present_tiles() {
        let board = rosette();
        let graph = AdjacencyGraph::new(&board);
        // (1, 0) touches the centre, (1, -1) and (0, 1)
        assert_eq!(
            graph.neighbors(Coord::new(1, 0)).unwrap(),
            &[Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, -1)]
        );
        assert!(graph.neighbors(Coord::new(5, 5)).unwrap().is_empty());
    }

    #[test]
    fn absent_coordinate_is_rejected() {
        let board = rosette();
        let graph = AdjacencyGraph::new(&board);
        assert!(graph.neighbors(Coord::new(3, 3)).is_none());
    }

    #[test]
    fn adjacency_is_symmetric() {
        let board = rosette();
        let graph = AdjacencyGraph::new(&board);
        for tile in board.tiles() {
            for next in graph.neighbors(tile.coord).unwrap() {
                assert!(graph.neighbors(*next).unwrap().contains(&tile.coord));
                assert!(tile.coord.is_adjacent(*next));
            }
        }
    }

    #[test]
    fn species_filtered_neighbors() {
        let board = rosette();
        let graph = AdjacencyGraph::new(&board);
        assert_eq!(
            graph.neighbors_with(Coord::new(0, 0), Wildlife::Salmon).len(),
            6
        );
        assert!(graph.touches_species(Coord::new(0, 1), Wildlife::Fox));
        assert!(!graph.touches_species(Coord::new(5, 5), Wildlife::Fox));
    }
}
