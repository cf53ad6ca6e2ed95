//! Console and JSON renderings of a scoreboard.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::aggregate::{Category, Scoreboard};

/// JSON export of one scoring run.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub generated_at: String,
    pub engine_version: &'static str,
    #[serde(flatten)]
    pub scoreboard: &'a Scoreboard,
}

impl<'a> Report<'a> {
    pub fn new(scoreboard: &'a Scoreboard) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            engine_version: env!("CARGO_PKG_VERSION"),
            scoreboard,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize score report")
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_json()? + "\n")
            .with_context(|| format!("Failed to write report {}", path.display()))
    }
}

/// One row per category, one column per player in turn order.
pub fn render_table(scoreboard: &Scoreboard) -> String {
    let players: Vec<String> = scoreboard
        .breakdowns()
        .map(|breakdown| breakdown.player.to_string())
        .collect();
    let categories: Vec<Category> = scoreboard
        .breakdowns()
        .next()
        .map(|breakdown| breakdown.categories.keys().copied().collect())
        .unwrap_or_default();

    let label_width = categories
        .iter()
        .map(|category| category.to_string().len())
        .chain(["category".len(), "total".len()])
        .max()
        .unwrap_or(0);
    let column_width = players.iter().map(String::len).max().unwrap_or(0).max(5);

    let mut out = String::new();
    let _ = write!(out, "{:<label_width$}", "category");
    for player in &players {
        let _ = write!(out, "  {player:>column_width$}");
    }
    out.push('\n');
    let rule_width = label_width + players.len() * (column_width + 2);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');

    for category in &categories {
        let _ = write!(out, "{:<label_width$}", category.to_string());
        for breakdown in scoreboard.breakdowns() {
            let _ = write!(out, "  {:>column_width$}", breakdown.points(*category));
        }
        out.push('\n');
    }

    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    let _ = write!(out, "{:<label_width$}", "total");
    for breakdown in scoreboard.breakdowns() {
        let _ = write!(out, "  {:>column_width$}", breakdown.total);
    }
    out.push_str("\n\n");

    for standing in &scoreboard.standings {
        let _ = writeln!(
            out,
            "{}. {} ({} points, {} nature tokens)",
            standing.place, standing.player, standing.total, standing.nature_tokens
        );
    }
    let _ = writeln!(out, "{}", scoreboard.outcome.describe());
    out
}
