//! Turn coordination: deciding whose move it is and describing the
//! request/reply handshake with the move recommender.
//!
//! Requests carry a generation number. The session bumps the generation on
//! every request and on every authoritative change, so a reply that raced a
//! takeback or reset identifies itself as stale and is dropped at the gate;
//! a reply that passes the gate still goes through full move validation.

use std::time::Duration;

use chess_core::shakmaty::Color;

use crate::settings::{Settings, Strength};

/// Whether the human is on move. Manual play (auto-move off) means every
/// move is the human's.
pub fn is_human_turn(settings: &Settings, color_to_move: Color) -> bool {
    !settings.auto_move || settings.own_color() == color_to_move
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub generation: u64,
    pub fen: String,
    pub strength: Strength,
}

/// The recommender's answer, in UCI notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub generation: u64,
    pub uci: String,
}

/// Window for the board-reveal animation before the engine answer lands.
pub const REVEAL_DELAY: Duration = Duration::from_millis(200);

/// Delay before dispatching an engine request, if any: only needed when the
/// board is revealed and animating.
pub fn reveal_delay(settings: &Settings) -> Option<Duration> {
    settings.reveal_board.then_some(REVEAL_DELAY)
}
