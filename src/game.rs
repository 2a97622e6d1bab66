//! Game state core: one authoritative position plus undo/redo history.
//!
//! `GameSession` owns the board and two ordered move lists: the applied
//! history (play order) and a redo buffer of undone moves. Replaying the
//! applied history from the initial position always reproduces the current
//! position; `undo` restores the prior position by exactly that replay.
//!
//! Move legality and board bookkeeping are delegated to `shakmaty`; this
//! module never second-guesses the rules library.

use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode, Position};

use crate::error::GameError;

/// Read-only board snapshot returned by every endpoint that touches the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardState {
    pub fen: String,
    /// Legal moves in coordinate (UCI) notation.
    pub legal_moves: Vec<String>,
    pub game_over: bool,
    /// `"white"` or `"black"`.
    pub turn: String,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
}

/// The single authoritative game: current position plus undo/redo history.
#[derive(Debug, Default)]
pub struct GameSession {
    position: Chess,
    applied: Vec<UciMove>,
    undone: Vec<UciMove>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over from the standard initial position. Any pending redo
    /// moves are discarded along with the history.
    pub fn reset(&mut self) {
        self.position = Chess::default();
        self.applied.clear();
        self.undone.clear();
    }

    /// Parse and apply a move given in coordinate notation (e.g. `e2e4`,
    /// `e7e8q`).
    ///
    /// Fails with [`GameError::InvalidFormat`] when the notation does not
    /// parse and [`GameError::IllegalMove`] when the parsed move is not legal
    /// in the current position; neither failure mutates any state. A
    /// successful application clears the redo buffer.
    pub fn apply_move(&mut self, notation: &str) -> Result<BoardState, GameError> {
        let uci: UciMove = notation.parse().map_err(|_| GameError::InvalidFormat)?;
        self.push(uci)?;
        self.undone.clear();
        Ok(self.snapshot())
    }

    /// Take back the most recent move, leaving it on the redo buffer.
    /// Silent no-op on an empty history; callers always get a snapshot.
    pub fn undo(&mut self) -> BoardState {
        if let Some(uci) = self.applied.pop() {
            self.undone.push(uci);
            self.position = replay(&self.applied);
        }
        self.snapshot()
    }

    /// Re-apply the most recently undone move. Silent no-op when the redo
    /// buffer is empty.
    pub fn redo(&mut self) -> BoardState {
        if let Some(uci) = self.undone.pop() {
            // The buffer only ever holds moves popped off the applied
            // history against this exact position, so this cannot fail.
            let _ = self.push(uci);
        }
        self.snapshot()
    }

    /// Current position in FEN, for handing to the engine gateway.
    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// Pure read of the current board state.
    pub fn snapshot(&self) -> BoardState {
        let castling_mode = self.position.castles().mode();
        BoardState {
            fen: self.fen(),
            legal_moves: self
                .position
                .legal_moves()
                .iter()
                .map(|m| m.to_uci(castling_mode).to_string())
                .collect(),
            game_over: self.position.is_game_over(),
            turn: if self.position.turn().is_white() {
                "white".to_string()
            } else {
                "black".to_string()
            },
            is_check: self.position.is_check(),
            is_checkmate: self.position.is_checkmate(),
            is_stalemate: self.position.is_stalemate(),
        }
    }

    /// Apply an already-parsed move through the legality gate and record it.
    fn push(&mut self, uci: UciMove) -> Result<(), GameError> {
        let mv = uci
            .to_move(&self.position)
            .map_err(|_| GameError::IllegalMove)?;
        self.position = self
            .position
            .clone()
            .play(&mv)
            .map_err(|_| GameError::IllegalMove)?;
        self.applied.push(uci);
        Ok(())
    }
}

/// Rebuild a position by replaying moves from the standard initial position.
///
/// The moves come straight off the applied history, so each conversion is
/// known-legal; a failure here would mean the history invariant was already
/// broken, and the replay simply stops at the last reachable position.
fn replay(moves: &[UciMove]) -> Chess {
    let mut position = Chess::default();
    for uci in moves {
        let Ok(mv) = uci.to_move(&position) else {
            break;
        };
        match position.clone().play(&mv) {
            Ok(next) => position = next,
            Err(_) => break,
        }
    }
    position
}
