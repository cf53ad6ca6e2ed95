use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    aggregate::Scoreboard,
    config::ServerConfig,
    engine::ScoringEngine,
    error::ScoringError,
    input::BoardDocument,
    rules::ScoringRules,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<ScoringEngine>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    error: String,
}

/// Failures a request can end in.
#[derive(Debug)]
enum ApiError {
    Scoring(ScoringError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Scoring(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    kind: err.kind(),
                    error: err.to_string(),
                },
            ),
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    kind: "internal",
                    error,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(engine: ScoringEngine) -> Router {
    let state = AppState {
        engine: Arc::new(engine),
    };
    Router::new()
        .route("/health", get(health))
        .route("/api/rules", get(rules))
        .route("/api/score", post(score))
        .with_state(state)
}

pub async fn run(engine: ScoringEngine, server: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = server
        .address()
        .parse()
        .with_context(|| format!("Invalid listen address {}", server.address()))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "scoring service listening (Ctrl+C to stop)");

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down scoring service");
}

async fn health() -> &'static str {
    "ok"
}

async fn rules(State(state): State<AppState>) -> Json<ScoringRules> {
    Json(state.engine.rules().clone())
}

async fn score(
    State(state): State<AppState>,
    Json(document): Json<BoardDocument>,
) -> Result<Json<Scoreboard>, ApiError> {
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || engine.score_document(document))
        .await
        .map_err(|err| ApiError::Internal(format!("scoring task failed: {err}")))?;

    match result {
        Ok(scoreboard) => Ok(Json(scoreboard)),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "rejected board");
            Err(ApiError::Scoring(err))
        }
    }
}
