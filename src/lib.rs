pub mod aggregate;
pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod habitat;
pub mod hex;
pub mod input;
pub mod logging;
pub mod majority;
pub mod report;
pub mod rules;
pub mod species;
pub mod web;

pub use aggregate::{Category, Outcome, ScoreBreakdown, Scoreboard, TieBreaker};
pub use board::{BoardState, Coord, PlayerBoard, PlayerId, Terrain, Tile, Wildlife};
pub use engine::ScoringEngine;
pub use error::{ConfigurationError, MalformedInputError, ScoringError};
pub use input::{BoardDocument, BoardLoader};
pub use rules::ScoringRules;
