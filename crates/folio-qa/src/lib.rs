//! folio-qa: wire contract for the question-answering endpoint
//!
//! This crate holds the message types shared by the chat front-ends, the
//! `data:` line protocol spoken by the QA service, the pure tag extraction
//! that splits reasoning from the final answer, and the HTTP client.

pub mod client;
pub mod error;
pub mod extract;
pub mod stream;
pub mod types;

pub use client::{ByteStream, QaBackend, QaClient};
pub use error::{Error, Result};
pub use extract::{Extracted, display_text, extract};
pub use stream::{LineDecoder, QaEvent, QaResult, parse_line};
pub use types::*;
