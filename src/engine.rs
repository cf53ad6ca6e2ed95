use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{aggregate, Category, PlayerSubtotals, Scoreboard};
use crate::board::{BoardState, PlayerBoard, PlayerId, Terrain, Wildlife};
use crate::error::{ConfigurationError, ScoringError};
use crate::habitat::HabitatSummary;
use crate::hex::AdjacencyGraph;
use crate::input::BoardDocument;
use crate::rules::ScoringRules;
use crate::species::{score_species, SpeciesTally};

/// Per-player work that does not depend on other players.
struct BoardScore {
    wildlife: Vec<SpeciesTally>,
    habitat: HabitatSummary,
}

/// Stateless scorer bound to one validated rule set.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    rules: ScoringRules,
}

impl ScoringEngine {
    pub fn new(rules: ScoringRules) -> Result<Self, ConfigurationError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Scores every player. Any error aborts the whole run.
    pub fn score(&self, state: &BoardState) -> Result<Scoreboard, ScoringError> {
        let boards: Vec<BoardScore> = state
            .players()
            .par_iter()
            .map(|board| self.score_board(board))
            .collect::<Result<_, _>>()?;

        let summaries: Vec<HabitatSummary> =
            boards.iter().map(|board| board.habitat.clone()).collect();
        let majorities = self.rules.majority.bonuses(&summaries);

        let subtotals: Vec<PlayerSubtotals> = state
            .players()
            .iter()
            .zip(boards)
            .zip(majorities)
            .map(|((player, board), majority)| {
                Ok(PlayerSubtotals {
                    player: player.id().clone(),
                    nature_tokens: player.nature_tokens(),
                    corridors: self.corridor_points(player.id(), &board.habitat)?,
                    wildlife: board.wildlife,
                    majority,
                    habitat: board.habitat,
                })
            })
            .collect::<Result<_, ConfigurationError>>()?;

        let scoreboard = aggregate(&subtotals, &self.rules.tie_break)?;
        info!(
            players = state.player_count(),
            outcome = %scoreboard.outcome.describe(),
            "scored game"
        );
        Ok(scoreboard)
    }

    /// Converts an untyped document and scores it.
    pub fn score_document(&self, document: BoardDocument) -> Result<Scoreboard, ScoringError> {
        let state = BoardState::try_from(document)?;
        self.score(&state)
    }

    fn score_board(&self, board: &PlayerBoard) -> Result<BoardScore, ScoringError> {
        let graph = AdjacencyGraph::new(board);
        let mut wildlife = Vec::with_capacity(Wildlife::ALL.len());
        for species in Wildlife::ALL {
            let tally = match self.rules.species_rule(species) {
                Some(rule) => score_species(&graph, species, rule)?,
                None if board.has_species(species) => {
                    return Err(ConfigurationError::MissingSpeciesRule {
                        species,
                        player: board.id().clone(),
                    }
                    .into());
                }
                None => SpeciesTally::empty(species),
            };
            debug!(
                player = %board.id(),
                species = %species,
                points = tally.points,
                note = %tally.note,
                "species scored"
            );
            wildlife.push(tally);
        }

        Ok(BoardScore {
            wildlife,
            habitat: HabitatSummary::measure(&graph),
        })
    }

    fn corridor_points(
        &self,
        player: &PlayerId,
        habitat: &HabitatSummary,
    ) -> Result<Option<BTreeMap<Terrain, u32>>, ConfigurationError> {
        let corridors = self.rules.corridors;
        if !corridors.enabled {
            return Ok(None);
        }
        Terrain::ALL
            .into_iter()
            .map(|terrain| {
                u32::try_from(habitat.largest_corridor(terrain))
                    .ok()
                    .and_then(|size| size.checked_mul(corridors.points_per_tile))
                    .map(|points| (terrain, points))
                    .ok_or_else(|| ConfigurationError::PointsOverflow {
                        category: Category::Corridor(terrain).to_string(),
                        player: player.clone(),
                    })
            })
            .collect::<Result<_, _>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Outcome, TieBreaker};
    use crate::board::Tile;
    use crate::error::MalformedInputError;
    use crate::rules::{PointTable, SpeciesScoring};

    fn board(id: &str, nature: u32, tiles: Vec<Tile>) -> PlayerBoard {
        PlayerBoard::new(id, nature, tiles).unwrap()
    }

    #[test]
    fn totals_combine_every_category() {
        let a = board(
            "a",
            2,
            vec![
                Tile::new(0, 0, Terrain::Forest, Some(Wildlife::Bear)),
                Tile::new(1, 0, Terrain::Forest, Some(Wildlife::Bear)),
                Tile::new(2, 0, Terrain::River, None),
            ],
        );
        let b = board(
            "b",
            0,
            vec![
                Tile::new(0, 0, Terrain::River, Some(Wildlife::Hawk)),
                Tile::new(1, 0, Terrain::River, None),
                Tile::new(2, 0, Terrain::Forest, None),
            ],
        );
        let state = BoardState::new(vec![a, b]).unwrap();
        let scoreboard = ScoringEngine::default().score(&state).unwrap();

        let a = scoreboard.breakdown(&"a".into()).unwrap();
        assert_eq!(a.points(Category::Wildlife(Wildlife::Bear)), 4);
        assert_eq!(a.points(Category::Nature), 2);
        assert_eq!(a.points(Category::Majority(Terrain::Forest)), 3);
        assert_eq!(a.points(Category::Majority(Terrain::River)), 1);
        assert_eq!(a.total, 10);

        let b = scoreboard.breakdown(&"b".into()).unwrap();
        assert_eq!(b.points(Category::Wildlife(Wildlife::Hawk)), 2);
        assert_eq!(b.points(Category::Majority(Terrain::River)), 3);
        assert_eq!(b.points(Category::Majority(Terrain::Forest)), 1);
        assert_eq!(b.total, 6);

        assert_eq!(
            scoreboard.outcome,
            Outcome::Outright {
                winner: "a".into(),
                total: 10
            }
        );
    }

    #[test]
    fn missing_rule_for_a_present_species_is_reported() {
        let mut rules = ScoringRules::default();
        rules.species.remove(&Wildlife::Fox);
        let engine = ScoringEngine::new(rules).unwrap();

        let without_fox = board("a", 0, vec![Tile::new(0, 0, Terrain::Forest, None)]);
        let state = BoardState::new(vec![without_fox]).unwrap();
        assert!(engine.score(&state).is_ok());

        let with_fox = board("a", 0, vec![Tile::new(0, 0, Terrain::Forest, Some(Wildlife::Fox))]);
        let state = BoardState::new(vec![with_fox]).unwrap();
        assert_eq!(
            engine.score(&state),
            Err(ScoringError::Configuration(
                ConfigurationError::MissingSpeciesRule {
                    species: Wildlife::Fox,
                    player: "a".into(),
                }
            ))
        );
    }

    #[test]
    fn corridors_score_only_when_enabled() {
        let tiles = vec![
            Tile::new(0, 0, Terrain::Wetland, None),
            Tile::new(1, 0, Terrain::Wetland, None),
            Tile::new(3, 0, Terrain::Wetland, None),
        ];
        let state = BoardState::new(vec![board("a", 0, tiles)]).unwrap();

        let plain = ScoringEngine::default().score(&state).unwrap();
        assert_eq!(plain.players[0].breakdown.corridor_total(), 0);

        let mut rules = ScoringRules::default();
        rules.corridors.enabled = true;
        let scored = ScoringEngine::new(rules).unwrap().score(&state).unwrap();
        let breakdown = &scored.players[0].breakdown;
        assert_eq!(breakdown.points(Category::Corridor(Terrain::Wetland)), 2);
        assert_eq!(breakdown.total, 2);
    }

    #[test]
    fn oversized_rule_values_fail_instead_of_wrapping() {
        let elk = board(
            "a",
            0,
            vec![
                Tile::new(0, 0, Terrain::Prairie, Some(Wildlife::Elk)),
                Tile::new(2, 0, Terrain::Prairie, Some(Wildlife::Elk)),
            ],
        );
        let state = BoardState::new(vec![elk]).unwrap();

        let mut rules = ScoringRules::default();
        if let Some(rule) = rules.species.get_mut(&Wildlife::Elk) {
            rule.scoring = SpeciesScoring::GroupSize {
                table: PointTable::new([(1, 3_000_000_000)]),
                bonus: None,
            };
        }
        let engine = ScoringEngine::new(rules).unwrap();
        let err = engine.score(&state).unwrap_err();
        assert_eq!(
            err,
            ScoringError::Configuration(ConfigurationError::PointsOverflow {
                category: "elk".into(),
                player: "a".into(),
            })
        );
        assert_eq!(err.kind(), "configuration");

        let meadow = board(
            "a",
            0,
            vec![
                Tile::new(0, 0, Terrain::Prairie, None),
                Tile::new(1, 0, Terrain::Prairie, None),
            ],
        );
        let state = BoardState::new(vec![meadow]).unwrap();
        let mut rules = ScoringRules::default();
        rules.corridors.enabled = true;
        rules.corridors.points_per_tile = u32::MAX;
        let engine = ScoringEngine::new(rules).unwrap();
        assert_eq!(
            engine.score(&state),
            Err(ScoringError::Configuration(
                ConfigurationError::PointsOverflow {
                    category: "corridor:prairie".into(),
                    player: "a".into(),
                }
            ))
        );
    }

    #[test]
    fn tie_break_comes_from_the_rules() {
        let tiles = |wildlife| {
            vec![
                Tile::new(0, 0, Terrain::Forest, wildlife),
                Tile::new(1, 0, Terrain::River, None),
            ]
        };
        // Both total 8: a lone hawk against two nature tokens.
        let a = board("a", 0, tiles(Some(Wildlife::Hawk)));
        let b = board("b", 2, tiles(None));
        let state = BoardState::new(vec![a, b]).unwrap();

        let default = ScoringEngine::default().score(&state).unwrap();
        assert_eq!(default.outcome.winners(), vec![&PlayerId::from("b")]);

        let mut rules = ScoringRules::default();
        rules.tie_break = vec![TieBreaker::WildlifePoints];
        let scoreboard = ScoringEngine::new(rules).unwrap().score(&state).unwrap();
        assert_eq!(scoreboard.outcome.winners(), vec![&PlayerId::from("a")]);
    }

    #[test]
    fn malformed_documents_are_rejected_whole() {
        let json = r#"{"players": [
            {"id": "a", "tiles": [{"q": 0, "r": 0, "terrain": "forest"}]},
            {"id": "b", "tiles": [{"q": 0, "r": 0, "terrain": "lava"}]}
        ]}"#;
        let document = BoardDocument::from_json_str(json).unwrap();
        let err = ScoringEngine::default().score_document(document).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::MalformedInput(MalformedInputError::UnknownTerrain { .. })
        ));
        assert_eq!(err.kind(), "malformed_input");
    }
}
