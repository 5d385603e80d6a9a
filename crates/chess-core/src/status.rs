//! Game status, derived on demand from the client. Never stored.

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::client::GameClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Starting,
    Active,
    WhiteWon,
    BlackWon,
    Draw,
}

impl GameStatus {
    pub fn of(client: &GameClient) -> GameStatus {
        if client.is_empty() {
            GameStatus::Starting
        } else if client.is_checkmate() {
            // The side to move is the side that got mated.
            match client.turn() {
                Color::Black => GameStatus::WhiteWon,
                Color::White => GameStatus::BlackWon,
            }
        } else if client.is_draw() {
            GameStatus::Draw
        } else {
            GameStatus::Active
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Starting => "Starting",
            GameStatus::Active => "Playing",
            GameStatus::WhiteWon => "1 - 0",
            GameStatus::BlackWon => "0 - 1",
            GameStatus::Draw => "\u{00bd} - \u{00bd}",
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(
            self,
            GameStatus::WhiteWon | GameStatus::BlackWon | GameStatus::Draw
        )
    }
}

/// Human-readable explanation of how a finished game ended.
pub fn game_over_message(client: &GameClient) -> Option<String> {
    if client.is_checkmate() {
        Some(match client.turn() {
            Color::Black => "White won!".to_string(),
            Color::White => "Black won!".to_string(),
        })
    } else if client.is_stalemate() {
        Some(match client.turn() {
            Color::Black => "Black is in stalemate!".to_string(),
            Color::White => "White is in stalemate!".to_string(),
        })
    } else if client.is_insufficient_material() {
        Some("Draw by insufficient material!".to_string())
    } else if client.is_threefold_repetition() {
        Some("Draw by threefold repetition!".to_string())
    } else if client.is_fifty_moves() {
        Some("Draw by 50 move rule!".to_string())
    } else {
        None
    }
}
