//! Process-wide session settings: AI strength and the human player's color.
//!
//! The two setters are intentionally asymmetric, matching what clients
//! already expect: unknown difficulty labels silently fall back to the
//! default level, while a bad color is rejected outright.

use crate::error::SessionError;

/// Stockfish skill level used when no (or an unknown) difficulty is chosen.
pub const DEFAULT_SKILL_LEVEL: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }
}

/// Session configuration. Lives for the whole process and survives game
/// resets.
#[derive(Debug)]
pub struct SessionConfig {
    skill_level: u8,
    player_color: PlayerColor,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            skill_level: DEFAULT_SKILL_LEVEL,
            player_color: PlayerColor::White,
        }
    }
}

impl SessionConfig {
    /// Map a difficulty label to an engine skill level. Unknown labels fall
    /// back to the default level without signalling an error.
    pub fn set_difficulty(&mut self, label: &str) -> u8 {
        self.skill_level = match label {
            "easy" => 1,
            "medium" => 10,
            "hard" => 20,
            _ => DEFAULT_SKILL_LEVEL,
        };
        self.skill_level
    }

    /// Set the human player's color. Anything other than white or black is
    /// rejected and the stored color is left untouched.
    pub fn set_color(&mut self, color: &str) -> Result<PlayerColor, SessionError> {
        let parsed = match color {
            "white" => PlayerColor::White,
            "black" => PlayerColor::Black,
            _ => return Err(SessionError::InvalidChoice),
        };
        self.player_color = parsed;
        Ok(parsed)
    }

    pub fn skill_level(&self) -> u8 {
        self.skill_level
    }

    pub fn player_color(&self) -> PlayerColor {
        self.player_color
    }
}
