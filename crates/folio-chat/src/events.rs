//! Chat event types

use folio_qa::Message;
use serde::{Deserialize, Serialize};

/// Events broadcast while a turn runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// User message and placeholder were appended
    TurnStart { question: String, index: usize },

    /// The placeholder at `index` changed
    MessageUpdate { index: usize, message: Message },

    /// The stream completed; `message` is final
    TurnEnd { message: Message },

    /// The turn failed; `message` carries the inline error text
    TurnFailed { reason: String, message: Message },
}
