//! The `data:` line protocol spoken by the QA endpoint

use crate::types::{Source, sources_from_wire};
use serde::{Deserialize, Serialize};

/// Marker that introduces an event payload
pub const DATA_PREFIX: &str = "data:";

/// Splits a byte stream into complete newline-terminated lines.
///
/// Bytes are buffered until a `\n` arrives and only then decoded, so a
/// multi-byte character split across two chunks is reassembled intact.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, without the `\n`
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            lines.push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }

    /// Bytes received after the last newline
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Drop any buffered partial line
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

/// One decoded event: `{"result": {"response": "...", "source": [...]}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaEvent {
    #[serde(default)]
    pub result: Option<QaResult>,
}

/// Payload of an event; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "sources_from_wire")]
    pub source: Option<Vec<Source>>,
}

impl QaEvent {
    /// Answer fragment carried by this event, if non-empty
    pub fn fragment(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|r| r.response.as_deref())
            .filter(|fragment| !fragment.is_empty())
    }

    /// Source list carried by this event, if non-empty
    pub fn sources(&self) -> Option<&[Source]> {
        self.result
            .as_ref()
            .and_then(|r| r.source.as_deref())
            .filter(|sources| !sources.is_empty())
    }
}

/// Parse one line of the stream.
///
/// Returns `None` for lines that carry no event (blank lines, comments,
/// anything not prefixed with `data:`, or an empty payload), and the JSON
/// result otherwise so the caller can decide how to treat a bad payload.
pub fn parse_line(line: &str) -> Option<serde_json::Result<QaEvent>> {
    let payload = line.trim().strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }
    Some(serde_json::from_str(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_holds_partial_line() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert_eq!(decoder.pending(), b"data: {\"a\"");
        let lines = decoder.push(b":1}\n\ndata: x\n");
        assert_eq!(lines, vec!["data: {\"a\":1}", "", "data: x"]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_decoder_reassembles_split_utf8() {
        let text = "data: 您好\n".as_bytes();
        // Split inside the three-byte encoding of 您
        let (head, tail) = text.split_at(8);
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["data: 您好"]);
    }

    #[test]
    fn test_decoder_reset() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"partial");
        decoder.reset();
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_parse_line_ignores_non_data() {
        assert!(parse_line("").is_none());
        assert!(parse_line(": keep-alive").is_none());
        assert!(parse_line("event: message").is_none());
        assert!(parse_line("data:   ").is_none());
    }

    #[test]
    fn test_parse_line_trims_and_handles_crlf() {
        let event = parse_line("  data: {\"result\":{\"response\":\"hi\"}}\r")
            .unwrap()
            .unwrap();
        assert_eq!(event.fragment(), Some("hi"));
    }

    #[test]
    fn test_parse_line_reports_bad_json() {
        assert!(parse_line("data: not-json").unwrap().is_err());
    }

    #[test]
    fn test_missing_fields_are_valid() {
        let event = parse_line("data: {}").unwrap().unwrap();
        assert_eq!(event.fragment(), None);
        assert_eq!(event.sources(), None);

        let event = parse_line(r#"data: {"result":{"response":null,"source":[]}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(event.fragment(), None);
        assert_eq!(event.sources(), None);
    }

    #[test]
    fn test_odd_source_entries_keep_fragment() {
        let event = parse_line(
            r#"data: {"result":{"response":"Hi","source":[{"fileId":"1","fileName":"a","content":"c","score":null},"junk"]}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(event.fragment(), Some("Hi"));
        let sources = event.sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].file_name, "a");
        assert_eq!(sources[0].score, "");

        let event = parse_line(r#"data: {"result":{"response":"Hi","source":"none"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(event.fragment(), Some("Hi"));
        assert_eq!(event.sources(), None);
    }

    #[test]
    fn test_sources_parsed() {
        let event = parse_line(
            r#"data: {"result":{"source":[{"fileId":"1","fileName":"a.pdf","content":"c","score":"0.91"}]}}"#,
        )
        .unwrap()
        .unwrap();
        let sources = event.sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].file_name, "a.pdf");
    }
}
