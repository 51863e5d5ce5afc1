//! folio-chat: streaming transcript assembly
//!
//! Turns a streamed answer from the QA endpoint into an in-place updated
//! chat transcript, one turn at a time.

pub mod assembler;
pub mod chat;
pub mod error;
pub mod events;
pub mod transcript;
pub mod turn;

pub use assembler::TurnAssembler;
pub use chat::{Chat, FAILURE_PREFIX};
pub use error::{Error, Result};
pub use events::ChatEvent;
pub use transcript::{HISTORY_PAIRS, Transcript, derive_history};
pub use turn::{TurnOutcome, TurnState};
