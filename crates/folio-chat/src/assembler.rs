//! Applying streamed QA events to the in-flight assistant message

use folio_qa::{Extracted, LineDecoder, Message, QaEvent, extract, parse_line};

/// Per-turn state: the line buffer and the raw answer accumulated so far.
///
/// Every event re-extracts the whole accumulated answer rather than
/// parsing tags incrementally, so the message always reflects exactly
/// what [`extract`] says about the text received so far.
#[derive(Debug, Default)]
pub struct TurnAssembler {
    decoder: LineDecoder,
    buffer: String,
    malformed: usize,
}

impl TurnAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything from the previous turn
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.buffer.clear();
        self.malformed = 0;
    }

    /// Raw answer text received so far
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Number of `data:` lines skipped because their JSON did not parse
    pub fn malformed_lines(&self) -> usize {
        self.malformed
    }

    /// Feed one body chunk and apply every event it completes to `message`.
    ///
    /// Returns how many events were applied. A line with bad JSON is logged
    /// and skipped; the lines around it are still applied.
    pub fn feed(&mut self, chunk: &[u8], message: &mut Message) -> usize {
        let mut applied = 0;
        for line in self.decoder.push(chunk) {
            match parse_line(&line) {
                None => {}
                Some(Ok(event)) => {
                    self.apply(&event, message);
                    applied += 1;
                }
                Some(Err(e)) => {
                    self.malformed += 1;
                    tracing::warn!(error = %e, line = %line, "skipping malformed QA event");
                }
            }
        }
        applied
    }

    /// Apply one decoded event
    pub fn apply(&mut self, event: &QaEvent, message: &mut Message) {
        if let Some(fragment) = event.fragment() {
            self.buffer.push_str(fragment);
        }
        if let Some(sources) = event.sources() {
            message.sources = Some(sources.to_vec());
        }

        let Extracted { think, content } = extract(&self.buffer);
        message.content = content;
        message.think_content = think;
    }

    /// End of stream: an unterminated trailing line is dropped
    pub fn finish(&mut self) {
        let pending = self.decoder.pending();
        if !pending.is_empty() {
            tracing::debug!(
                bytes = pending.len(),
                "discarding unterminated line at end of stream"
            );
        }
        self.decoder.reset();
    }
}
