//! The skill-0 mover: a uniformly random legal move.

use chess_core::shakmaty::CastlingMode;
use chess_core::GameClient;
use rand::seq::SliceRandom;

use crate::error::EngineError;

pub fn random_move(fen: &str) -> Result<String, EngineError> {
    let game = GameClient::from_fen(fen)?;
    let moves = game.legal_moves();
    let m = moves
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| EngineError::NoLegalMoves(fen.to_string()))?;
    Ok(m.to_uci(CastlingMode::Standard).to_string())
}
