//! Combining subtotals into breakdowns, standings and the game outcome.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::board::{PlayerId, Terrain, Wildlife};
use crate::error::ConfigurationError;
use crate::habitat::HabitatSummary;
use crate::species::SpeciesTally;

/// A line of a score breakdown. The derived order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Wildlife(Wildlife),
    Nature,
    Majority(Terrain),
    Corridor(Terrain),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Wildlife(species) => write!(f, "{species}"),
            Category::Nature => f.write_str("nature"),
            Category::Majority(terrain) => write!(f, "majority:{terrain}"),
            Category::Corridor(terrain) => write!(f, "corridor:{terrain}"),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Orders players level on total. Criteria apply in sequence; players level
/// on every criterion share a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    /// Most nature tokens first.
    NatureTokens,
    /// Most wildlife points first.
    WildlifePoints,
    /// Earlier turn first. Never leaves two players level.
    TurnOrder,
}

impl TieBreaker {
    /// Smaller keys rank higher.
    fn key(self, turn: usize, breakdown: &ScoreBreakdown) -> i64 {
        match self {
            TieBreaker::NatureTokens => -i64::from(breakdown.points(Category::Nature)),
            TieBreaker::WildlifePoints => -i64::from(breakdown.wildlife_total()),
            TieBreaker::TurnOrder => i64::try_from(turn).unwrap_or(i64::MAX),
        }
    }
}

pub fn default_tie_break() -> Vec<TieBreaker> {
    vec![TieBreaker::NatureTokens]
}

/// Everything the aggregator needs about one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSubtotals {
    pub player: PlayerId,
    pub nature_tokens: u32,
    pub wildlife: Vec<SpeciesTally>,
    pub majority: BTreeMap<Terrain, u32>,
    /// `None` when corridor scoring is switched off.
    pub corridors: Option<BTreeMap<Terrain, u32>>,
    pub habitat: HabitatSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub player: PlayerId,
    pub categories: BTreeMap<Category, u32>,
    pub total: u32,
}

impl ScoreBreakdown {
    pub fn points(&self, category: Category) -> u32 {
        self.categories.get(&category).copied().unwrap_or(0)
    }

    pub fn wildlife_total(&self) -> u32 {
        self.sum(|category| matches!(category, Category::Wildlife(_)))
    }

    pub fn majority_total(&self) -> u32 {
        self.sum(|category| matches!(category, Category::Majority(_)))
    }

    pub fn corridor_total(&self) -> u32 {
        self.sum(|category| matches!(category, Category::Corridor(_)))
    }

    fn sum(&self, keep: impl Fn(&Category) -> bool) -> u32 {
        self.categories
            .iter()
            .filter(|(category, _)| keep(*category))
            .map(|(_, points)| points)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerResult {
    pub breakdown: ScoreBreakdown,
    pub wildlife: Vec<SpeciesTally>,
    pub habitat: HabitatSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub place: usize,
    pub player: PlayerId,
    pub total: u32,
    pub nature_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Outright { winner: PlayerId, total: u32 },
    /// Top total shared, settled by the tie-break criteria.
    TieBreak { winner: PlayerId, total: u32 },
    Shared { winners: Vec<PlayerId>, total: u32 },
}

impl Outcome {
    pub fn winners(&self) -> Vec<&PlayerId> {
        match self {
            Outcome::Outright { winner, .. } | Outcome::TieBreak { winner, .. } => vec![winner],
            Outcome::Shared { winners, .. } => winners.iter().collect(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Outcome::Outright { winner, total } => {
                format!("Player {winner} wins with {total} points")
            }
            Outcome::TieBreak { winner, total } => {
                format!("Player {winner} wins on the tiebreaker with {total} points")
            }
            Outcome::Shared { winners, total } => {
                let names: Vec<&str> = winners.iter().map(PlayerId::as_str).collect();
                format!(
                    "Players {} share the victory with {total} points",
                    names.join(", ")
                )
            }
        }
    }
}

/// Final result of a scoring run. Players stay in turn order; `standings`
/// holds the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub players: Vec<PlayerResult>,
    pub standings: Vec<Standing>,
    pub outcome: Outcome,
}

impl Scoreboard {
    pub fn breakdowns(&self) -> impl Iterator<Item = &ScoreBreakdown> {
        self.players.iter().map(|result| &result.breakdown)
    }

    pub fn breakdown(&self, player: &PlayerId) -> Option<&ScoreBreakdown> {
        self.breakdowns().find(|breakdown| &breakdown.player == player)
    }

    pub fn place_of(&self, player: &PlayerId) -> Option<usize> {
        self.standings
            .iter()
            .find(|standing| &standing.player == player)
            .map(|standing| standing.place)
    }
}

pub fn breakdown(subtotals: &PlayerSubtotals) -> Result<ScoreBreakdown, ConfigurationError> {
    let mut categories = BTreeMap::new();
    for species in Wildlife::ALL {
        let category = Category::Wildlife(species);
        let points = checked_sum(
            subtotals
                .wildlife
                .iter()
                .filter(|tally| tally.species == species)
                .map(|tally| tally.points),
        )
        .ok_or_else(|| overflow(subtotals, category))?;
        categories.insert(category, points);
    }
    categories.insert(Category::Nature, subtotals.nature_tokens);
    for terrain in Terrain::ALL {
        let points = subtotals.majority.get(&terrain).copied().unwrap_or(0);
        categories.insert(Category::Majority(terrain), points);
    }
    if let Some(corridors) = &subtotals.corridors {
        for terrain in Terrain::ALL {
            let points = corridors.get(&terrain).copied().unwrap_or(0);
            categories.insert(Category::Corridor(terrain), points);
        }
    }
    let total =
        checked_sum(categories.values().copied()).ok_or_else(|| overflow(subtotals, "total"))?;
    Ok(ScoreBreakdown {
        player: subtotals.player.clone(),
        categories,
        total,
    })
}

fn checked_sum(values: impl IntoIterator<Item = u32>) -> Option<u32> {
    values.into_iter().try_fold(0u32, u32::checked_add)
}

fn overflow(subtotals: &PlayerSubtotals, category: impl fmt::Display) -> ConfigurationError {
    ConfigurationError::PointsOverflow {
        category: category.to_string(),
        player: subtotals.player.clone(),
    }
}

/// Ranks by total, then by `tie_break`. Players still level share a place
/// and keep turn order.
pub fn standings(breakdowns: &[ScoreBreakdown], tie_break: &[TieBreaker]) -> Vec<Standing> {
    let mut order: Vec<(Reverse<u32>, Vec<i64>, usize, &ScoreBreakdown)> = breakdowns
        .iter()
        .enumerate()
        .map(|(turn, breakdown)| {
            let keys = tie_break
                .iter()
                .map(|criterion| criterion.key(turn, breakdown))
                .collect();
            (Reverse(breakdown.total), keys, turn, breakdown)
        })
        .collect();
    order.sort_by(|a, b| (a.0, &a.1, a.2).cmp(&(b.0, &b.1, b.2)));

    let mut ranked: Vec<Standing> = Vec::with_capacity(order.len());
    for (index, (total, keys, _, breakdown)) in order.iter().enumerate() {
        let level_with_previous = index
            .checked_sub(1)
            .map(|previous| &order[previous])
            .is_some_and(|(previous_total, previous_keys, _, _)| {
                previous_total == total && previous_keys == keys
            });
        let place = match ranked.last() {
            Some(previous) if level_with_previous => previous.place,
            _ => index + 1,
        };
        ranked.push(Standing {
            place,
            player: breakdown.player.clone(),
            total: breakdown.total,
            nature_tokens: breakdown.points(Category::Nature),
        });
    }
    ranked
}

fn outcome(standings: &[Standing]) -> Outcome {
    let top = &standings[0];
    let level_on_total = standings
        .iter()
        .filter(|standing| standing.total == top.total)
        .count();
    let sharing: Vec<PlayerId> = standings
        .iter()
        .filter(|standing| standing.place == 1)
        .map(|standing| standing.player.clone())
        .collect();

    if sharing.len() > 1 {
        Outcome::Shared {
            winners: sharing,
            total: top.total,
        }
    } else if level_on_total > 1 {
        Outcome::TieBreak {
            winner: top.player.clone(),
            total: top.total,
        }
    } else {
        Outcome::Outright {
            winner: top.player.clone(),
            total: top.total,
        }
    }
}

/// Pure join of per-player subtotals; `subtotals` must be non-empty and in
/// turn order.
pub fn aggregate(
    subtotals: &[PlayerSubtotals],
    tie_break: &[TieBreaker],
) -> Result<Scoreboard, ConfigurationError> {
    let players: Vec<PlayerResult> = subtotals
        .iter()
        .map(|player| {
            Ok(PlayerResult {
                breakdown: breakdown(player)?,
                wildlife: player.wildlife.clone(),
                habitat: player.habitat.clone(),
            })
        })
        .collect::<Result<_, ConfigurationError>>()?;
    let breakdowns: Vec<ScoreBreakdown> =
        players.iter().map(|result| result.breakdown.clone()).collect();
    let standings = standings(&breakdowns, tie_break);
    let outcome = if standings.is_empty() {
        Outcome::Shared {
            winners: Vec::new(),
            total: 0,
        }
    } else {
        outcome(&standings)
    };
    Ok(Scoreboard {
        players,
        standings,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtotals(player: &str, bear: u32, nature: u32, forest_majority: u32) -> PlayerSubtotals {
        PlayerSubtotals {
            player: player.into(),
            nature_tokens: nature,
            wildlife: vec![SpeciesTally {
                species: Wildlife::Bear,
                points: bear,
                scoring_units: Vec::new(),
                note: String::new(),
            }],
            majority: BTreeMap::from([(Terrain::Forest, forest_majority)]),
            corridors: None,
            habitat: HabitatSummary {
                tile_counts: BTreeMap::new(),
                largest_corridors: BTreeMap::new(),
            },
        }
    }

    fn rank(input: &[PlayerSubtotals]) -> Scoreboard {
        aggregate(input, &default_tie_break()).unwrap()
    }

    #[test]
    fn breakdown_lists_every_category_in_order() {
        let result = breakdown(&subtotals("a", 11, 2, 3)).unwrap();
        let names: Vec<String> = result.categories.keys().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec![
                "bear",
                "elk",
                "salmon",
                "hawk",
                "fox",
                "nature",
                "majority:forest",
                "majority:mountain",
                "majority:prairie",
                "majority:wetland",
                "majority:river",
            ]
        );
        assert_eq!(result.total, 16);
        assert_eq!(result.wildlife_total(), 11);
        assert_eq!(result.majority_total(), 3);
        assert_eq!(result.corridor_total(), 0);
    }

    #[test]
    fn corridor_lines_appear_when_scored() {
        let mut input = subtotals("a", 0, 0, 0);
        input.corridors = Some(BTreeMap::from([(Terrain::River, 4)]));
        let result = breakdown(&input).unwrap();
        assert_eq!(result.points(Category::Corridor(Terrain::River)), 4);
        assert_eq!(result.categories.len(), 16);
        assert_eq!(result.total, 4);
    }

    #[test]
    fn outright_winner() {
        let board = rank(&[subtotals("a", 4, 0, 0), subtotals("b", 11, 0, 0)]);
        assert_eq!(
            board.outcome,
            Outcome::Outright {
                winner: "b".into(),
                total: 11
            }
        );
        assert_eq!(board.place_of(&"a".into()), Some(2));
        // Turn order is preserved in the per-player list.
        assert_eq!(board.players[0].breakdown.player, PlayerId::from("a"));
    }

    #[test]
    fn nature_tokens_break_ties() {
        let board = rank(&[subtotals("a", 10, 1, 0), subtotals("b", 9, 2, 0)]);
        assert_eq!(
            board.outcome,
            Outcome::TieBreak {
                winner: "b".into(),
                total: 11
            }
        );
        assert_eq!(board.place_of(&"a".into()), Some(2));
    }

    #[test]
    fn full_ties_share_a_place() {
        let board = rank(&[
            subtotals("a", 4, 1, 0),
            subtotals("b", 0, 0, 0),
            subtotals("c", 4, 1, 0),
        ]);
        let places: Vec<(String, usize)> = board
            .standings
            .iter()
            .map(|s| (s.player.to_string(), s.place))
            .collect();
        assert_eq!(
            places,
            vec![("a".into(), 1), ("c".into(), 1), ("b".into(), 3)]
        );
        assert_eq!(board.outcome.winners().len(), 2);
        assert!(board.outcome.describe().contains("a, c"));
    }

    #[test]
    fn tie_break_priority_is_configurable() {
        let input = [
            subtotals("a", 9, 1, 0),
            subtotals("b", 6, 4, 0),
            subtotals("c", 6, 4, 0),
        ];

        let by_wildlife = aggregate(
            &input,
            &[TieBreaker::WildlifePoints, TieBreaker::NatureTokens],
        )
        .unwrap();
        assert_eq!(
            by_wildlife.outcome,
            Outcome::TieBreak {
                winner: "a".into(),
                total: 10
            }
        );
        assert_eq!(by_wildlife.place_of(&"b".into()), Some(2));
        assert_eq!(by_wildlife.place_of(&"c".into()), Some(2));

        let by_turn =
            aggregate(&input, &[TieBreaker::NatureTokens, TieBreaker::TurnOrder]).unwrap();
        let places: Vec<(String, usize)> = by_turn
            .standings
            .iter()
            .map(|s| (s.player.to_string(), s.place))
            .collect();
        assert_eq!(
            places,
            vec![("b".into(), 1), ("c".into(), 2), ("a".into(), 3)]
        );
        assert!(by_turn.outcome.describe().contains("wins on the tiebreaker"));

        // With no criteria, equal totals share first place.
        let plain = aggregate(&input, &[]).unwrap();
        assert_eq!(plain.outcome.winners().len(), 3);
    }

    #[test]
    fn overflowing_totals_are_reported() {
        let input = [subtotals("a", u32::MAX, 1, 0)];
        assert_eq!(
            aggregate(&input, &default_tie_break()),
            Err(ConfigurationError::PointsOverflow {
                category: "total".into(),
                player: "a".into(),
            })
        );
    }

    #[test]
    fn aggregation_is_idempotent() {
        let input = vec![subtotals("a", 19, 3, 3), subtotals("b", 4, 5, 1)];
        assert_eq!(rank(&input), rank(&input));
    }

    #[test]
    fn serializes_categories_as_an_ordered_object() {
        let result = breakdown(&subtotals("a", 4, 1, 0)).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let bear = json.find("\"bear\"").unwrap();
        let nature = json.find("\"nature\"").unwrap();
        let river = json.find("\"majority:river\"").unwrap();
        assert!(bear < nature && nature < river);
    }
}
