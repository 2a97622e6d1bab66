//! Process configuration loaded from the environment.

use std::net::SocketAddr;

use anyhow::Context;

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// UCI engine binary; resolved via `$PATH` when not an absolute path.
    pub engine_path: String,
    pub listen_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let engine_path =
            std::env::var("STOCKFISH_PATH").unwrap_or_else(|_| "stockfish".to_string());
        let listen_addr = std::env::var("CHESS_SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse()
            .context("CHESS_SERVER_ADDR is not a valid socket address")?;

        Ok(Self {
            engine_path,
            listen_addr,
        })
    }
}
