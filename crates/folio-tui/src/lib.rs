//! folio-tui: terminal widgets for the QA chat
//!
//! Built on ratatui and crossterm. The widgets know nothing about the QA
//! wire format; callers convert transcript messages into [`ChatMessage`]s.
//!
//! [`ChatMessage`]: widgets::ChatMessage

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
