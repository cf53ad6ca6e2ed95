use thiserror::Error;

use crate::board::{Coord, PlayerId, Wildlife};

/// Structural problems in a board document or board state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    #[error("board state contains no players")]
    NoPlayers,
    #[error("player #{position} has an empty id")]
    EmptyPlayerId { position: usize },
    #[error("player '{player}' appears more than once")]
    DuplicatePlayer { player: PlayerId },
    #[error("player '{player}' has no tiles")]
    EmptyBoard { player: PlayerId },
    #[error(
        "player '{player}' has {found} tiles but player '{reference}' has {expected}; boards must be the same size"
    )]
    TileCountMismatch {
        player: PlayerId,
        found: usize,
        reference: PlayerId,
        expected: usize,
    },
    #[error("player '{player}' has more than one tile at {coord}")]
    DuplicateCoordinate { player: PlayerId, coord: Coord },
    #[error("player '{player}' tile {coord}: unknown terrain '{value}'")]
    UnknownTerrain {
        player: PlayerId,
        coord: Coord,
        value: String,
    },
    #[error("player '{player}' tile {coord}: unknown wildlife '{value}'")]
    UnknownWildlife {
        player: PlayerId,
        coord: Coord,
        value: String,
    },
    #[error("player '{player}' has a negative nature token count ({value})")]
    NegativeNatureTokens { player: PlayerId, value: i64 },
    #[error("player '{player}' has {value} nature tokens, more than can be scored")]
    NatureTokensOutOfRange { player: PlayerId, value: i64 },
}

/// Rule tables that cannot answer a lookup the board requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no scoring rule configured for {species} (player '{player}' has {species} tokens)")]
    MissingSpeciesRule { species: Wildlife, player: PlayerId },
    #[error("{table} table has no entry for {key} and no extrapolation rule (player '{player}')")]
    MissingTableEntry {
        table: String,
        key: u32,
        player: PlayerId,
    },
    #[error("{category} points for player '{player}' exceed the scorable range")]
    PointsOverflow { category: String, player: PlayerId },
    #[error("{species} rule uses an invalid group size of {size}")]
    InvalidGroupSize { species: Wildlife, size: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInputError),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl ScoringError {
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::MalformedInput(_) => "malformed_input",
            ScoringError::Configuration(_) => "configuration",
        }
    }
}
