//! Splitting raw answer text into reasoning and final answer.
//!
//! The QA service wraps its reasoning in `<think>…</think>` and, when it
//! emits one, the final answer in `<response>…</response>`. Extraction is a
//! pure function of the text so it can be re-run on the whole accumulated
//! answer after every streamed fragment.

use regex::Regex;
use std::sync::LazyLock;

static THINK_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>(.*?)</think>").unwrap());

static RESPONSE_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<response>(.*?)</response>").unwrap());

/// Result of splitting an answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Trimmed inner text of the first closed `<think>` region
    pub think: Option<String>,
    /// Text to display as the answer
    pub content: String,
}

/// Split `text` into reasoning and display content.
///
/// A closed `<response>` region wins outright and everything around it is
/// dropped. Otherwise the first closed `<think>` region is cut out. Text
/// with neither tag passes through trimmed. Unclosed tags are left in place
/// until their closing tag arrives.
pub fn extract(text: &str) -> Extracted {
    let think = THINK_REGION
        .captures(text)
        .map(|caps| caps[1].trim().to_string());

    let content = if let Some(caps) = RESPONSE_REGION.captures(text) {
        caps[1].trim().to_string()
    } else if think.is_some() {
        THINK_REGION.replace(text, "").trim().to_string()
    } else {
        text.trim().to_string()
    };

    Extracted { think, content }
}

/// Display-only normalization for text that may still carry raw tags.
pub fn display_text(text: &str) -> String {
    extract(text).content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_region_wins() {
        let out = extract("<think>plan</think>noise<response>  the answer \n</response>tail");
        assert_eq!(out.content, "the answer");
        assert_eq!(out.think.as_deref(), Some("plan"));
    }

    #[test]
    fn test_response_without_think() {
        let out = extract("prefix <response>X</response>");
        assert_eq!(out.content, "X");
        assert_eq!(out.think, None);
    }

    #[test]
    fn test_response_spans_lines() {
        let out = extract("<response>line one\nline two</response>");
        assert_eq!(out.content, "line one\nline two");
    }

    #[test]
    fn test_think_stripped_when_no_response() {
        let out = extract("<think>\n  weighing options \n</think>\n\nFinal words.  ");
        assert_eq!(out.think.as_deref(), Some("weighing options"));
        assert_eq!(out.content, "Final words.");
    }

    #[test]
    fn test_only_first_think_region_removed() {
        let out = extract("<think>a</think>keep<think>b</think>");
        assert_eq!(out.think.as_deref(), Some("a"));
        assert_eq!(out.content, "keep<think>b</think>");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let out = extract("  just an answer\n");
        assert_eq!(out.content, "just an answer");
        assert_eq!(out.think, None);
    }

    #[test]
    fn test_unclosed_tags_are_kept() {
        let out = extract("<think>校验</think><response>您好");
        assert_eq!(out.think.as_deref(), Some("校验"));
        assert_eq!(out.content, "<response>您好");

        let out = extract("<think>still going");
        assert_eq!(out.think, None);
        assert_eq!(out.content, "<think>still going");
    }

    #[test]
    fn test_empty_think_region() {
        let out = extract("<think></think>answer");
        assert_eq!(out.think.as_deref(), Some(""));
        assert_eq!(out.content, "answer");
    }

    #[test]
    fn test_extraction_is_idempotent_on_its_output() {
        let samples = [
            "<think>t</think><response> r </response>",
            "<think>t</think> body ",
            "plain",
            "",
            "<response>多行\n回答</response>",
        ];
        for sample in samples {
            let once = extract(sample).content;
            let twice = extract(&once).content;
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_display_text_matches_content() {
        assert_eq!(display_text("<think>x</think>y"), "y");
        assert_eq!(display_text("<response>z</response>"), "z");
    }
}
