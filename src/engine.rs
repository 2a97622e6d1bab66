//! UCI engine gateway.
//!
//! Each request spawns a fresh engine process, runs exactly one query, and
//! shuts the process down on completion. `kill_on_drop` covers every failure
//! path, so an error can never leak a running engine. Keeping the invocation
//! per-request trades startup latency for simplicity: the engine can never
//! drift out of sync with the game it is asked about.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::trace;

use crate::error::EngineError;

/// Wall-clock budget for an AI move search.
pub const MOVE_TIME: Duration = Duration::from_secs(1);

/// Search depth for hint analysis.
pub const HINT_DEPTH: u32 = 15;

/// Engine evaluation score, relative to the side to move at analysis time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Forced mate in the given number of moves (negative: getting mated).
    Mate(i32),
}

impl Score {
    /// Client-facing rendering: forced mates get a distinguished marker,
    /// everything else is pawns with two decimals.
    pub fn display(self) -> String {
        match self {
            Score::Centipawns(cp) => format!("{:.2}", f64::from(cp) / 100.0),
            Score::Mate(_) => "Checkmate!".to_string(),
        }
    }
}

/// Result of a depth-bounded analysis.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Principal move in coordinate notation.
    pub best_move: String,
    pub score: Score,
}

/// One live conversation with a spawned UCI engine process.
#[derive(Debug)]
pub struct EngineClient {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl EngineClient {
    /// Spawn the engine binary and complete the `uci` handshake.
    pub async fn spawn(path: &str) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdout not captured".to_string()))?;

        let mut client = Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        };
        client.send("uci").await?;
        client.wait_for("uciok").await?;
        Ok(client)
    }

    /// Ask the engine to choose a move at the given skill level, bounded by
    /// wall-clock time. Returns the move in coordinate notation; the caller
    /// is responsible for applying it through the normal legality gate.
    pub async fn play(
        &mut self,
        fen: &str,
        skill_level: u8,
        movetime: Duration,
    ) -> Result<String, EngineError> {
        self.send(&format!("setoption name Skill Level value {skill_level}"))
            .await?;
        self.ready().await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go movetime {}", movetime.as_millis()))
            .await?;
        let line = self.wait_for("bestmove").await?;
        parse_bestmove(&line)
    }

    /// Depth-bounded analysis: the principal move plus a score relative to
    /// the side to move.
    pub async fn analyse(&mut self, fen: &str, depth: u32) -> Result<Evaluation, EngineError> {
        self.ready().await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        // The last score before `bestmove` belongs to the deepest completed
        // iteration.
        let mut score = None;
        loop {
            let line = self.read_line().await?;
            if line.starts_with("info") {
                if let Some(parsed) = parse_score(&line) {
                    score = Some(parsed);
                }
            } else if line.starts_with("bestmove") {
                let best_move = parse_bestmove(&line)?;
                let score = score
                    .ok_or_else(|| EngineError::Protocol("engine reported no score".to_string()))?;
                return Ok(Evaluation { best_move, score });
            }
        }
    }

    /// Polite shutdown. If this is skipped (or the engine ignores it), the
    /// process is killed when the client drops.
    pub async fn quit(mut self) {
        if self.send("quit").await.is_ok() {
            let _ = self.child.wait().await;
        }
    }

    async fn ready(&mut self) -> Result<(), EngineError> {
        self.send("isready").await?;
        self.wait_for("readyok").await?;
        Ok(())
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        trace!(command, "uci send");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        match self.lines.next_line().await? {
            Some(line) => {
                trace!(line = %line, "uci recv");
                Ok(line)
            }
            None => Err(EngineError::Protocol(
                "engine closed its output stream".to_string(),
            )),
        }
    }

    /// Drain engine output until a line starting with `token` arrives.
    async fn wait_for(&mut self, token: &str) -> Result<String, EngineError> {
        loop {
            let line = self.read_line().await?;
            if line.starts_with(token) {
                return Ok(line);
            }
        }
    }
}

fn parse_bestmove(line: &str) -> Result<String, EngineError> {
    line.split_whitespace()
        .nth(1)
        .filter(|mv| *mv != "(none)")
        .map(str::to_owned)
        .ok_or_else(|| EngineError::Protocol(format!("unexpected bestmove line: {line}")))
}

/// Extract `score cp N` or `score mate N` from a UCI `info` line.
fn parse_score(line: &str) -> Option<Score> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "score" {
            return match (tokens.next()?, tokens.next()?) {
                ("cp", value) => value.parse().ok().map(Score::Centipawns),
                ("mate", value) => value.parse().ok().map(Score::Mate),
                _ => None,
            };
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_centipawn_scores_from_info_lines() {
        let line = "info depth 15 seldepth 21 multipv 1 score cp 35 nodes 2048 pv e2e4 e7e5";
        assert_eq!(parse_score(line), Some(Score::Centipawns(35)));

        let line = "info depth 12 score cp -210 nodes 99 pv d7d5";
        assert_eq!(parse_score(line), Some(Score::Centipawns(-210)));
    }

    #[test]
    fn parses_mate_scores_from_info_lines() {
        let line = "info depth 10 score mate 3 nodes 512 pv d1h5";
        assert_eq!(parse_score(line), Some(Score::Mate(3)));

        let line = "info depth 10 score mate -2 pv e8e7";
        assert_eq!(parse_score(line), Some(Score::Mate(-2)));
    }

    #[test]
    fn info_lines_without_a_score_are_skipped() {
        assert_eq!(parse_score("info string NNUE evaluation enabled"), None);
        assert_eq!(parse_score("info currmove e2e4 currmovenumber 1"), None);
    }

    #[test]
    fn parses_bestmove_with_and_without_ponder() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5").unwrap(), "e2e4");
        assert_eq!(parse_bestmove("bestmove g7g8q").unwrap(), "g7g8q");
    }

    #[test]
    fn bestmove_none_is_a_protocol_error() {
        // Stockfish answers `bestmove (none)` for terminal positions.
        assert!(parse_bestmove("bestmove (none)").is_err());
        assert!(parse_bestmove("bestmove").is_err());
    }

    #[test]
    fn centipawn_scores_display_as_pawn_decimals() {
        assert_eq!(Score::Centipawns(35).display(), "0.35");
        assert_eq!(Score::Centipawns(-210).display(), "-2.10");
        assert_eq!(Score::Centipawns(0).display(), "0.00");
    }

    #[test]
    fn mate_scores_display_the_forced_mate_marker() {
        assert_eq!(Score::Mate(3).display(), "Checkmate!");
        assert_eq!(Score::Mate(-1).display(), "Checkmate!");
    }

    #[tokio::test]
    async fn spawn_failure_is_engine_unavailable() {
        let err = EngineClient::spawn("/nonexistent/path/to/stockfish")
            .await
            .expect_err("spawn must fail");
        assert!(matches!(err, EngineError::Unavailable(_)));
    }
}
