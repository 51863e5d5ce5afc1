//! Custom widgets for the TUI

pub mod input_box;
pub mod message_list;
pub mod spinner;

pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageList, SourceLine, Speaker, calculate_message_height};
pub use spinner::Spinner;
