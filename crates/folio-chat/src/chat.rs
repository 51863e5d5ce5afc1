//! Chat orchestration: one question in, one streamed answer out

use folio_qa::{HistoryPair, Message, QaBackend, QaRequest};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    assembler::TurnAssembler,
    error::{Error, Result},
    events::ChatEvent,
    transcript::Transcript,
    turn::{TurnOutcome, TurnState},
};

/// First line of the text written into a failed turn's placeholder
pub const FAILURE_PREFIX: &str = "Sorry, the request failed:";

/// Owns the transcript and drives one turn at a time against a backend
pub struct Chat {
    transcript: Transcript,
    state: TurnState,
    assembler: TurnAssembler,
    backend: Arc<dyn QaBackend>,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl Chat {
    pub fn new(backend: Arc<dyn QaBackend>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            transcript: Transcript::new(),
            state: TurnState::Idle,
            assembler: TurnAssembler::new(),
            backend,
            event_tx,
        }
    }

    /// Subscribe to chat events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    /// History that would accompany the next question
    pub fn history(&self) -> Vec<HistoryPair> {
        self.transcript.history()
    }

    /// Drop every message and go back to `Idle`
    pub fn clear(&mut self) -> Result<()> {
        if self.state.is_streaming() {
            return Err(Error::TurnInFlight);
        }
        self.transcript.clear()?;
        self.state = TurnState::Idle;
        Ok(())
    }

    /// Ask a question and stream the answer into the transcript.
    ///
    /// Refused without touching the transcript when the question is blank
    /// or a turn is already streaming. Otherwise the turn always runs to a
    /// resting state: transport failures are written into the placeholder
    /// and reported as [`TurnOutcome::Failed`].
    pub async fn submit(&mut self, question: &str) -> Result<TurnOutcome> {
        if question.trim().is_empty() {
            return Err(Error::EmptyQuestion);
        }
        if self.state.is_streaming() {
            return Err(Error::TurnInFlight);
        }

        // History is taken before the new question is appended.
        let history = self.transcript.history();
        let index = self.transcript.begin_turn(question)?;
        self.state = TurnState::Streaming { active: index };
        self.assembler.reset();

        tracing::debug!(index, history = history.len(), "turn started");
        let _ = self.event_tx.send(ChatEvent::TurnStart {
            question: question.to_string(),
            index,
        });

        let request = QaRequest::new(question, history);
        let outcome = match self.stream_answer(&request, index).await {
            Ok(()) => self.complete(),
            Err(e) => self.fail(e.to_string()),
        };
        Ok(outcome)
    }

    async fn stream_answer(&mut self, request: &QaRequest, index: usize) -> folio_qa::Result<()> {
        use futures::StreamExt;

        let mut body = self.backend.open(request).await?;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let Some(message) = self.transcript.active_mut() else {
                break;
            };
            if self.assembler.feed(&chunk, message) > 0 {
                let _ = self.event_tx.send(ChatEvent::MessageUpdate {
                    index,
                    message: message.clone(),
                });
            }
        }
        self.assembler.finish();
        Ok(())
    }

    fn complete(&mut self) -> TurnOutcome {
        let message = self
            .transcript
            .finish_turn()
            .unwrap_or_else(Message::assistant_placeholder);
        self.state = TurnState::Idle;
        tracing::debug!(
            chars = message.content.chars().count(),
            sources = message.source_list().len(),
            malformed = self.assembler.malformed_lines(),
            "turn completed"
        );
        let _ = self.event_tx.send(ChatEvent::TurnEnd { message });
        TurnOutcome::Completed
    }

    fn fail(&mut self, reason: String) -> TurnOutcome {
        tracing::warn!(error = %reason, "turn failed");
        if let Some(message) = self.transcript.active_mut() {
            message.content = format!("{FAILURE_PREFIX}\n{reason}");
        }
        self.assembler.finish();
        let message = self
            .transcript
            .finish_turn()
            .unwrap_or_else(Message::assistant_placeholder);
        self.state = TurnState::Failed {
            reason: reason.clone(),
        };
        let _ = self.event_tx.send(ChatEvent::TurnFailed {
            reason: reason.clone(),
            message,
        });
        TurnOutcome::Failed(reason)
    }
}
