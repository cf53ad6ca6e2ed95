use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use cascadia_score::{
    config::AppConfig,
    engine::ScoringEngine,
    input::BoardLoader,
    logging,
    report::{render_table, Report},
    rules::ScoringRules,
    web,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Cascadia final-score calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a recognized board document
    Score {
        /// Path to the board JSON or YAML file
        board: PathBuf,

        /// Scoring rules file (overrides the rules in --config)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Application config YAML
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write the result here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the scoring engine over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        rules: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the built-in scoring rules as YAML
    Rules {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn load_config(config: Option<&Path>, rules: Option<&Path>) -> Result<AppConfig> {
    let mut app = match config {
        Some(path) => AppConfig::from_yaml(path)?,
        None => AppConfig::default(),
    };
    if let Some(path) = rules {
        app.rules = ScoringRules::load(path)?;
    }
    Ok(app)
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Score {
            board,
            rules,
            config,
            format,
            output,
        } => {
            let app = load_config(config.as_deref(), rules.as_deref())?;
            logging::init(&app.logging)?;

            let engine = ScoringEngine::new(app.rules).context("Invalid scoring rules")?;
            let document = BoardLoader::new(".").load(&board)?;
            let scoreboard = engine
                .score_document(document)
                .with_context(|| format!("Failed to score {}", board.display()))?;

            match (format, output.as_deref()) {
                (Format::Json, Some(path)) => Report::new(&scoreboard).write(path)?,
                (Format::Json, None) => println!("{}", Report::new(&scoreboard).to_json()?),
                (Format::Table, path) => emit(&render_table(&scoreboard), path)?,
            }
            if let Some(path) = &output {
                info!(path = %path.display(), "wrote score report");
            }
        }
        Command::Serve {
            host,
            port,
            rules,
            config,
        } => {
            let mut app = load_config(config.as_deref(), rules.as_deref())?;
            logging::init(&app.logging)?;
            if let Some(host) = host {
                app.server.host = host;
            }
            if let Some(port) = port {
                app.server.port = port;
            }

            let engine = ScoringEngine::new(app.rules).context("Invalid scoring rules")?;
            web::run(engine, &app.server).await?;
        }
        Command::Rules { output } => {
            let yaml = ScoringRules::default().to_yaml()?;
            emit(&yaml, output.as_deref())?;
        }
    }
    Ok(())
}
