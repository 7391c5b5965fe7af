//! Application layer: orchestrates a full message pass over the ports.

pub mod locks;
pub mod router;

pub use locks::ChatLocks;
pub use router::{
    AmbiguityPolicy, Router, TurnReport, APOLOGY_REPLY, MEMORY_NOTE, RESET_COMMAND, RESET_REPLY,
};
