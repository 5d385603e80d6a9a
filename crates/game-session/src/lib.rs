//! Session layer for blindfold play: one live game, the settings around it,
//! takeback/redo, click-to-move selection, history browsing and the
//! request/reply handshake with the engine worker.

pub mod coordinator;
pub mod history;
pub mod session;
pub mod settings;

pub use coordinator::{is_human_turn, reveal_delay, EngineReply, EngineRequest, REVEAL_DELAY};
pub use history::HistoryCursor;
pub use session::{Interaction, MoveOutcome, SelectOutcome, Session, TargetKind};
pub use settings::{Settings, Strength};
