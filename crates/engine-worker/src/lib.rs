//! Move recommender for the session: a Stockfish UCI wrapper for skill
//! levels 1..=20 and a random mover for skill 0, behind one channel-based
//! service task.

pub mod error;
pub mod random;
pub mod service;
pub mod stockfish;

pub use error::EngineError;
pub use service::{spawn, EngineService};
pub use stockfish::StockfishEngine;
