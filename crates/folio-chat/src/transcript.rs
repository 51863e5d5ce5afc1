//! Transcript: an append-only message log with one active slot.

use folio_qa::{HistoryPair, Message};

use crate::error::{Error, Result};

/// How many earlier question/answer pairs accompany a new question.
pub const HISTORY_PAIRS: usize = 2;

/// Collect adjacent (user, assistant) pairs in order and keep the last
/// `max_pairs` of them.
pub fn derive_history(messages: &[Message], max_pairs: usize) -> Vec<HistoryPair> {
    let pairs: Vec<HistoryPair> = messages
        .windows(2)
        .filter(|w| w[0].is_user() && w[1].is_assistant())
        .map(|w| HistoryPair::new(w[0].content.clone(), w[1].content.clone()))
        .collect();
    let skip = pairs.len().saturating_sub(max_pairs);
    pairs.into_iter().skip(skip).collect()
}

/// Ordered chat messages. Only the message at the active index may change.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    active: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Index of the assistant message currently being streamed
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&Message> {
        self.active.and_then(|i| self.messages.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Message> {
        self.active.and_then(|i| self.messages.get_mut(i))
    }

    /// History that would accompany the next question
    pub fn history(&self) -> Vec<HistoryPair> {
        derive_history(&self.messages, HISTORY_PAIRS)
    }

    /// Append the user question and an empty assistant placeholder, and make
    /// the placeholder active. Returns the placeholder's index.
    pub fn begin_turn(&mut self, question: impl Into<String>) -> Result<usize> {
        if self.active.is_some() {
            return Err(Error::TurnInFlight);
        }
        self.messages.push(Message::user(question));
        self.messages.push(Message::assistant_placeholder());
        let index = self.messages.len() - 1;
        self.active = Some(index);
        Ok(index)
    }

    /// Freeze the active message and return a copy of it
    pub fn finish_turn(&mut self) -> Option<Message> {
        let index = self.active.take()?;
        self.messages.get(index).cloned()
    }

    /// Remove every message; refused while a turn is streaming
    pub fn clear(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::TurnInFlight);
        }
        self.messages.clear();
        Ok(())
    }
}
