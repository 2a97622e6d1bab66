//! Error types for the chess server.
//!
//! Game and session errors map to 400 responses, engine failures to 503.
//! Every error is recovered at the handler boundary and serialized as
//! `{"error": message}`; nothing here can take down the shared game state.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors from applying a move to the game session.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The notation could not be parsed as a coordinate move.
    #[error("Invalid move format")]
    InvalidFormat,

    /// Well-formed notation, but not a legal move in the current position.
    #[error("Illegal move")]
    IllegalMove,
}

/// Errors from session configuration updates.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid color choice")]
    InvalidChoice,
}

/// Failures talking to the external UCI engine process.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The process could not be spawned or the pipe broke mid-conversation.
    #[error("engine unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// The process is alive but speaks something other than UCI.
    #[error("engine protocol error: {0}")]
    Protocol(String),
}

/// Request-level error, produced by handlers and turned into a JSON response.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Move not provided")]
    MissingMove,

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Engine(err) => {
                tracing::error!(error = %err, "engine request failed");
                (StatusCode::SERVICE_UNAVAILABLE, "Engine unavailable".to_string())
            }
            other => (StatusCode::BAD_REQUEST, other.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_use_client_facing_messages() {
        assert_eq!(GameError::InvalidFormat.to_string(), "Invalid move format");
        assert_eq!(GameError::IllegalMove.to_string(), "Illegal move");
        assert_eq!(SessionError::InvalidChoice.to_string(), "Invalid color choice");
        assert_eq!(ApiError::MissingMove.to_string(), "Move not provided");
    }

    #[test]
    fn transparent_wrapping_keeps_the_message() {
        let err: ApiError = GameError::IllegalMove.into();
        assert_eq!(err.to_string(), "Illegal move");
    }
}
