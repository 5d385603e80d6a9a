//! Core chess state for blindfold play: authoritative game log, status
//! derivation, SAN display filtering and PGN export. Move legality is
//! delegated entirely to shakmaty.

pub use shakmaty;

pub mod client;
pub mod display;
pub mod error;
pub mod pgn;
pub mod status;

pub use client::{GameClient, MoveInput, STANDARD_START_FEN};
pub use error::GameError;
pub use status::GameStatus;
