//! HTTP surface: JSON handlers over the shared game session.
//!
//! One `tokio` mutex serializes every state-mutating request. For AI moves
//! the lock is held across the whole search-then-apply sequence, so the
//! position the engine analyzed is exactly the one its move is applied to,
//! and snapshots can never observe a half-applied mutation.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::engine::{self, EngineClient};
use crate::error::{ApiError, EngineError};
use crate::game::{BoardState, GameSession};
use crate::session::SessionConfig;

#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<GameSession>>,
    config: Arc<Mutex<SessionConfig>>,
    engine_path: Arc<str>,
}

pub fn router(engine_path: String) -> Router {
    let state = AppState {
        session: Arc::new(Mutex::new(GameSession::new())),
        config: Arc::new(Mutex::new(SessionConfig::default())),
        engine_path: engine_path.into(),
    };

    Router::new()
        .route("/set_difficulty", post(set_difficulty))
        .route("/set_color", post(set_color))
        .route("/reset", post(reset))
        .route("/move", post(make_move))
        .route("/ai_move", get(ai_move))
        .route("/undo", post(undo))
        .route("/redo", post(redo))
        .route("/hint", get(hint))
        .route("/board", get(board))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: Option<String>,
}

#[derive(Serialize)]
pub struct SetDifficultyResponse {
    pub message: String,
    pub difficulty: String,
}

#[derive(Deserialize)]
pub struct SetColorRequest {
    pub color: Option<String>,
}

#[derive(Serialize)]
pub struct SetColorResponse {
    pub message: String,
    pub color: String,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub mv: Option<String>,
}

#[derive(Serialize)]
pub struct HintResponse {
    pub best_move: String,
    pub evaluation: String,
}

/// Unknown labels fall back to the default level; the label is echoed back
/// either way, so this endpoint never fails.
async fn set_difficulty(
    State(state): State<AppState>,
    Json(payload): Json<SetDifficultyRequest>,
) -> Json<SetDifficultyResponse> {
    let label = payload
        .difficulty
        .unwrap_or_else(|| "medium".to_string())
        .to_lowercase();
    let level = state.config.lock().await.set_difficulty(&label);
    info!(label = %label, level, "AI difficulty set");

    Json(SetDifficultyResponse {
        message: "AI difficulty set".to_string(),
        difficulty: label,
    })
}

async fn set_color(
    State(state): State<AppState>,
    Json(payload): Json<SetColorRequest>,
) -> Result<Json<SetColorResponse>, ApiError> {
    let label = payload
        .color
        .unwrap_or_else(|| "white".to_string())
        .to_lowercase();
    let color = state.config.lock().await.set_color(&label)?;
    info!(color = color.as_str(), "player color set");

    Ok(Json(SetColorResponse {
        message: "Player color set".to_string(),
        color: color.as_str().to_string(),
    }))
}

async fn reset(State(state): State<AppState>) -> Json<BoardState> {
    let mut session = state.session.lock().await;
    session.reset();
    info!("game reset");
    Json(session.snapshot())
}

async fn make_move(
    State(state): State<AppState>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<BoardState>, ApiError> {
    let notation = payload.mv.ok_or(ApiError::MissingMove)?;
    let mut session = state.session.lock().await;
    let snapshot = session.apply_move(&notation)?;
    info!(mv = %notation, "move applied");
    Ok(Json(snapshot))
}

async fn ai_move(State(state): State<AppState>) -> Result<Json<BoardState>, ApiError> {
    // Lock the session for the whole search-then-apply sequence.
    let mut session = state.session.lock().await;
    let skill_level = state.config.lock().await.skill_level();

    let mut client = EngineClient::spawn(&state.engine_path).await?;
    let result = client
        .play(&session.fen(), skill_level, engine::MOVE_TIME)
        .await;
    client.quit().await;
    let best_move = result?;

    // The engine's move goes through the same legality gate as a human move,
    // so a misbehaving engine cannot corrupt the history.
    let snapshot = session.apply_move(&best_move).map_err(|err| {
        error!(mv = %best_move, error = %err, "engine proposed a move the rules reject");
        ApiError::Engine(EngineError::Protocol(format!(
            "engine move {best_move} rejected: {err}"
        )))
    })?;
    info!(mv = %best_move, skill_level, "AI move applied");
    Ok(Json(snapshot))
}

async fn undo(State(state): State<AppState>) -> Json<BoardState> {
    Json(state.session.lock().await.undo())
}

async fn redo(State(state): State<AppState>) -> Json<BoardState> {
    Json(state.session.lock().await.redo())
}

async fn hint(State(state): State<AppState>) -> Result<Json<HintResponse>, ApiError> {
    let session = state.session.lock().await;

    let mut client = EngineClient::spawn(&state.engine_path).await?;
    let result = client.analyse(&session.fen(), engine::HINT_DEPTH).await;
    client.quit().await;
    let evaluation = result?;

    Ok(Json(HintResponse {
        best_move: evaluation.best_move,
        evaluation: evaluation.score.display(),
    }))
}

async fn board(State(state): State<AppState>) -> Json<BoardState> {
    Json(state.session.lock().await.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_state_serializes_with_the_wire_field_names() {
        let snapshot = GameSession::new().snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        for key in [
            "fen",
            "legal_moves",
            "game_over",
            "turn",
            "is_check",
            "is_checkmate",
            "is_stalemate",
        ] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
        assert_eq!(json["turn"], "white");
        assert_eq!(json["game_over"], false);
    }

    #[test]
    fn move_request_reads_the_move_key() {
        let request: MoveRequest = serde_json::from_str(r#"{"move": "e2e4"}"#).unwrap();
        assert_eq!(request.mv.as_deref(), Some("e2e4"));

        let request: MoveRequest = serde_json::from_str("{}").unwrap();
        assert!(request.mv.is_none());
    }

    #[test]
    fn hint_response_serializes_best_move_and_evaluation() {
        let response = HintResponse {
            best_move: "e2e4".to_string(),
            evaluation: "0.35".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("best_move"));
        assert!(json.contains("0.35"));
    }
}
