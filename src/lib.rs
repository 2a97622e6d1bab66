//! Single-game chess server.
//!
//! Exposes one mutable chess game over a JSON HTTP API: board state, legal
//! move application with undo/redo, and AI play / hints delegated to an
//! external UCI engine process (Stockfish by default).

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod session;

pub use api::router;
pub use config::ServerConfig;
