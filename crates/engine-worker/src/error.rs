//! Engine worker error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Stockfish error: {0}")]
    Stockfish(String),

    #[error("no legal moves in position: {0}")]
    NoLegalMoves(String),

    #[error("invalid position: {0}")]
    Position(#[from] chess_core::GameError),
}
