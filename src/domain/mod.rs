//! Domain layer: the closed stage vocabulary, classifier decision parsing,
//! the per-turn phase machine, and the durable session record. Pure
//! in-memory logic, no I/O.

pub mod classifier;
pub mod conversation;
pub mod session;
pub mod stage;

pub use classifier::{parse_stage_output, StageDecision};
pub use conversation::{ConversationState, TurnPhase};
pub use session::SessionRecord;
pub use stage::{Stage, UnknownStage};
