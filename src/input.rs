//! Board documents as produced by the recognition step, and loading them.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::board::{BoardState, Coord, PlayerBoard, PlayerId, Terrain, Tile, Wildlife};
use crate::error::MalformedInputError;

/// Player ids may arrive as numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerKey {
    Number(u64),
    Text(String),
}

impl From<PlayerKey> for PlayerId {
    fn from(value: PlayerKey) -> Self {
        match value {
            PlayerKey::Number(number) => PlayerId::new(number.to_string()),
            PlayerKey::Text(text) => PlayerId::new(text.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDocument {
    pub q: i32,
    pub r: i32,
    pub terrain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildlife: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDocument {
    #[serde(default)]
    pub id: Option<PlayerKey>,
    #[serde(default)]
    pub tiles: Vec<TileDocument>,
    #[serde(default)]
    pub nature_tokens: i64,
}

/// Untyped board state; names are checked when converting to [`BoardState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDocument {
    #[serde(default)]
    pub players: Vec<PlayerDocument>,
}

impl PlayerDocument {
    fn into_board(self, position: usize) -> Result<PlayerBoard, MalformedInputError> {
        let id: PlayerId = self
            .id
            .map(PlayerId::from)
            .filter(|id| !id.as_str().is_empty())
            .ok_or(MalformedInputError::EmptyPlayerId { position })?;

        let nature_tokens = match u32::try_from(self.nature_tokens) {
            Ok(count) => count,
            Err(_) if self.nature_tokens < 0 => {
                return Err(MalformedInputError::NegativeNatureTokens {
                    player: id,
                    value: self.nature_tokens,
                });
            }
            Err(_) => {
                return Err(MalformedInputError::NatureTokensOutOfRange {
                    player: id,
                    value: self.nature_tokens,
                });
            }
        };

        let mut tiles = Vec::with_capacity(self.tiles.len());
        for tile in self.tiles {
            let coord = Coord::new(tile.q, tile.r);
            let terrain: Terrain = tile.terrain.parse().map_err(|_| {
                MalformedInputError::UnknownTerrain {
                    player: id.clone(),
                    coord,
                    value: tile.terrain.clone(),
                }
            })?;
            let wildlife = match tile.wildlife.as_deref() {
                None => None,
                Some(name) => {
                    Wildlife::parse_slot(name).map_err(|_| MalformedInputError::UnknownWildlife {
                        player: id.clone(),
                        coord,
                        value: name.to_string(),
                    })?
                }
            };
            tiles.push(Tile {
                coord,
                terrain,
                wildlife,
            });
        }

        PlayerBoard::new(id, nature_tokens, tiles)
    }
}

impl TryFrom<BoardDocument> for BoardState {
    type Error = MalformedInputError;

    fn try_from(document: BoardDocument) -> Result<Self, Self::Error> {
        let players = document
            .players
            .into_iter()
            .enumerate()
            .map(|(index, player)| player.into_board(index + 1))
            .collect::<Result<Vec<_>, _>>()?;
        BoardState::new(players)
    }
}

impl BoardDocument {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse board JSON")
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse board YAML")
    }
}

/// Reads board documents relative to a base directory.
pub struct BoardLoader {
    base_dir: PathBuf,
}

impl BoardLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// `.yaml`/`.yml` files are read as YAML, everything else as JSON.
    pub fn load(&self, file: impl AsRef<Path>) -> Result<BoardDocument> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read board file {}", path.display()))?;
        let document = if is_yaml(&path) {
            BoardDocument::from_yaml_str(&data)
        } else {
            BoardDocument::from_json_str(&data)
        }
        .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(document)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
