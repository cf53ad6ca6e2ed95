use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MalformedInputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Forest,
    Mountain,
    Prairie,
    Wetland,
    River,
}

impl Terrain {
    /// Reporting order for per-terrain subtotals.
    pub const ALL: [Terrain; 5] = [
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Prairie,
        Terrain::Wetland,
        Terrain::River,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Forest => "forest",
            Terrain::Mountain => "mountain",
            Terrain::Prairie => "prairie",
            Terrain::Wetland => "wetland",
            Terrain::River => "river",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Terrain {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Terrain::ALL
            .into_iter()
            .find(|terrain| terrain.as_str().eq_ignore_ascii_case(value))
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wildlife {
    Bear,
    Elk,
    Salmon,
    Hawk,
    Fox,
}

impl Wildlife {
    pub const ALL: [Wildlife; 5] = [
        Wildlife::Bear,
        Wildlife::Elk,
        Wildlife::Salmon,
        Wildlife::Hawk,
        Wildlife::Fox,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Wildlife::Bear => "bear",
            Wildlife::Elk => "elk",
            Wildlife::Salmon => "salmon",
            Wildlife::Hawk => "hawk",
            Wildlife::Fox => "fox",
        }
    }

    /// Parses a wildlife slot. `Ok(None)` means the tile carries no token.
    pub fn parse_slot(value: &str) -> Result<Option<Wildlife>, ()> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        Wildlife::ALL
            .into_iter()
            .find(|species| species.as_str().eq_ignore_ascii_case(value))
            .map(Some)
            .ok_or(())
    }
}

impl fmt::Display for Wildlife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axial hex coordinate. Ordering is by `q`, then `r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub q: i32,
    pub r: i32,
}

impl Coord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Coord,
    pub terrain: Terrain,
    pub wildlife: Option<Wildlife>,
}

impl Tile {
    pub fn new(q: i32, r: i32, terrain: Terrain, wildlife: Option<Wildlife>) -> Self {
        Self {
            coord: Coord::new(q, r),
            terrain,
            wildlife,
        }
    }
}

/// One player's finished board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerBoard {
    id: PlayerId,
    tiles: BTreeMap<Coord, Tile>,
    nature_tokens: u32,
}

impl PlayerBoard {
    pub fn new(
        id: impl Into<PlayerId>,
        nature_tokens: u32,
        tiles: impl IntoIterator<Item = Tile>,
    ) -> Result<Self, MalformedInputError> {
        let id = id.into();
        let mut by_coord = BTreeMap::new();
        for tile in tiles {
            if by_coord.insert(tile.coord, tile).is_some() {
                return Err(MalformedInputError::DuplicateCoordinate {
                    player: id,
                    coord: tile.coord,
                });
            }
        }
        Ok(Self {
            id,
            tiles: by_coord,
            nature_tokens,
        })
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn nature_tokens(&self) -> u32 {
        self.nature_tokens
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn wildlife_at(&self, coord: Coord) -> Option<Wildlife> {
        self.tiles.get(&coord).and_then(|tile| tile.wildlife)
    }

    /// Tiles in ascending coordinate order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Coordinates holding `species`, ascending.
    pub fn coords_with(&self, species: Wildlife) -> Vec<Coord> {
        self.tiles
            .values()
            .filter(|tile| tile.wildlife == Some(species))
            .map(|tile| tile.coord)
            .collect()
    }

    pub fn has_species(&self, species: Wildlife) -> bool {
        self.tiles.values().any(|tile| tile.wildlife == Some(species))
    }

    pub fn terrain_count(&self, terrain: Terrain) -> usize {
        self.tiles
            .values()
            .filter(|tile| tile.terrain == terrain)
            .count()
    }
}

/// All player boards of a finished game, in turn order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    players: Vec<PlayerBoard>,
}

impl BoardState {
    pub fn new(players: Vec<PlayerBoard>) -> Result<Self, MalformedInputError> {
        let Some(reference) = players.first() else {
            return Err(MalformedInputError::NoPlayers);
        };

        let mut seen = HashSet::new();
        for (position, board) in players.iter().enumerate() {
            if board.id.as_str().trim().is_empty() {
                return Err(MalformedInputError::EmptyPlayerId {
                    position: position + 1,
                });
            }
            if !seen.insert(board.id.clone()) {
                return Err(MalformedInputError::DuplicatePlayer {
                    player: board.id.clone(),
                });
            }
            if board.is_empty() {
                return Err(MalformedInputError::EmptyBoard {
                    player: board.id.clone(),
                });
            }
        }

        if let Some(board) = players.iter().find(|board| board.len() != reference.len()) {
            return Err(MalformedInputError::TileCountMismatch {
                player: board.id.clone(),
                found: board.len(),
                reference: reference.id.clone(),
                expected: reference.len(),
            });
        }

        Ok(Self { players })
    }

    pub fn players(&self) -> &[PlayerBoard] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerBoard> {
        self.players.iter().find(|board| &board.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(id: &str, len: i32) -> PlayerBoard {
        PlayerBoard::new(
            id,
            0,
            (0..len).map(|q| Tile::new(q, 0, Terrain::Forest, None)),
        )
        .unwrap()
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Wetland".parse::<Terrain>(), Ok(Terrain::Wetland));
        assert_eq!(" RIVER ".parse::<Terrain>(), Ok(Terrain::River));
        assert!("ocean".parse::<Terrain>().is_err());
        assert_eq!(Wildlife::parse_slot("Hawk"), Ok(Some(Wildlife::Hawk)));
        assert_eq!(Wildlife::parse_slot("none"), Ok(None));
        assert_eq!(Wildlife::parse_slot(""), Ok(None));
        assert!(Wildlife::parse_slot("wolf").is_err());
    }

    #[test]
    fn coordinates_order_by_q_then_r() {
        let mut coords = vec![Coord::new(1, -1), Coord::new(0, 2), Coord::new(0, -3)];
        coords.sort();
        assert_eq!(
            coords,
            vec![Coord::new(0, -3), Coord::new(0, 2), Coord::new(1, -1)]
        );
    }

    #[test]
    fn rejects_duplicate_coordinates() {
        let err = PlayerBoard::new(
            "ana",
            0,
            [
                Tile::new(0, 0, Terrain::Forest, None),
                Tile::new(0, 0, Terrain::River, Some(Wildlife::Salmon)),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MalformedInputError::DuplicateCoordinate {
                player: "ana".into(),
                coord: Coord::new(0, 0),
            }
        );
    }

    #[test]
    fn rejects_empty_state_and_duplicate_players() {
        assert_eq!(
            BoardState::new(Vec::new()).unwrap_err(),
            MalformedInputError::NoPlayers
        );
        let err = BoardState::new(vec![strip("a", 3), strip("a", 3)]).unwrap_err();
        assert_eq!(
            err,
            MalformedInputError::DuplicatePlayer { player: "a".into() }
        );
    }

    #[test]
    fn rejects_mismatched_board_sizes() {
        let err = BoardState::new(vec![strip("a", 4), strip("b", 4), strip("c", 3)]).unwrap_err();
        assert_eq!(
            err,
            MalformedInputError::TileCountMismatch {
                player: "c".into(),
                found: 3,
                reference: "a".into(),
                expected: 4,
            }
        );
    }

    #[test]
    fn counts_species_and_terrain() {
        let board = PlayerBoard::new(
            "a",
            2,
            [
                Tile::new(0, 0, Terrain::Forest, Some(Wildlife::Bear)),
                Tile::new(1, 0, Terrain::Forest, None),
                Tile::new(-1, 0, Terrain::River, Some(Wildlife::Bear)),
            ],
        )
        .unwrap();
        assert_eq!(board.terrain_count(Terrain::Forest), 2);
        assert_eq!(board.terrain_count(Terrain::Prairie), 0);
        assert_eq!(
            board.coords_with(Wildlife::Bear),
            vec![Coord::new(-1, 0), Coord::new(0, 0)]
        );
        assert!(!board.has_species(Wildlife::Fox));
    }
}
