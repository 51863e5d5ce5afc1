//! Error types for folio-chat

use thiserror::Error;

/// Result type alias using folio-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a chat operation is refused or fails
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the QA layer
    #[error(transparent)]
    Qa(#[from] folio_qa::Error),

    /// A turn is still streaming
    #[error("a response is still streaming")]
    TurnInFlight,

    /// The question was empty or whitespace-only
    #[error("question is empty")]
    EmptyQuestion,
}
