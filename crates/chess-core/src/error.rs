//! Error types for game-state operations. Nothing here is fatal: every
//! variant maps to a rejected user action.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid move notation: {0}")]
    InvalidNotation(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}
