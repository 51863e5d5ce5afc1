//! Core types shared by the QA client and the chat front-ends

use serde::{Deserialize, Deserializer, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A retrieval citation backing an answer
///
/// Every field tolerates `null`, numbers and absence, so one odd entry
/// never costs the answer text it arrived with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, deserialize_with = "text_from_wire")]
    pub file_id: String,
    #[serde(default, deserialize_with = "text_from_wire")]
    pub file_name: String,
    /// Excerpt of the cited file
    #[serde(default, deserialize_with = "text_from_wire")]
    pub content: String,
    /// Relevance score, kept as the decimal string the service sent
    #[serde(default, deserialize_with = "text_from_wire")]
    pub score: String,
}

impl Source {
    /// Relevance formatted for display: two decimals when numeric, verbatim otherwise
    pub fn relevance(&self) -> String {
        match self.score.trim().parse::<f64>() {
            Ok(value) => format!("{:.2}", value),
            Err(_) => self.score.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireText {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

/// Some deployments send ids and scores as bare numbers, or `null`.
fn text_from_wire<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<WireText>::deserialize(deserializer)? {
        Some(WireText::Text(text)) => text,
        Some(WireText::Number(number)) => number.to_string(),
        Some(WireText::Bool(flag)) => flag.to_string(),
        None => String::new(),
    })
}

/// Read a `source` list entry by entry, skipping entries that are not objects.
pub(crate) fn sources_from_wire<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<Source>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let serde_json::Value::Array(entries) = value else {
        tracing::warn!("ignoring non-list source field");
        return Ok(None);
    };

    let total = entries.len();
    let sources: Vec<Source> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if sources.len() < total {
        tracing::warn!(skipped = total - sources.len(), "ignoring unreadable source entries");
    }
    Ok(Some(sources))
}

/// A chat message as shown in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    /// Final display text
    pub content: String,
    /// Reasoning text emitted inside `<think>` tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think_content: Option<String>,
    /// Citations attached by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into())
    }

    /// Create an assistant message with final text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text.into())
    }

    /// Create the empty assistant message that a streaming turn fills in
    pub fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new())
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            think_content: None,
            sources: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// Reasoning text, if any non-blank reasoning was captured
    pub fn thinking(&self) -> Option<&str> {
        self.think_content
            .as_deref()
            .filter(|think| !think.trim().is_empty())
    }

    /// Attached sources, empty when none were sent
    pub fn source_list(&self) -> &[Source] {
        self.sources.as_deref().unwrap_or(&[])
    }
}

/// One earlier question/answer pair sent as conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPair {
    pub question: String,
    pub response: String,
}

impl HistoryPair {
    pub fn new(question: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            response: response.into(),
        }
    }
}

/// Request body accepted by the QA endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRequest {
    pub question: String,
    pub history: Vec<HistoryPair>,
}

impl QaRequest {
    pub fn new(question: impl Into<String>, history: Vec<HistoryPair>) -> Self {
        Self {
            question: question.into(),
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_accepts_string_score() {
        let source: Source = serde_json::from_str(
            r#"{"fileId":"f1","fileName":"notes.md","content":"excerpt","score":"0.8731"}"#,
        )
        .unwrap();
        assert_eq!(source.file_id, "f1");
        assert_eq!(source.file_name, "notes.md");
        assert_eq!(source.score, "0.8731");
        assert_eq!(source.relevance(), "0.87");
    }

    #[test]
    fn test_source_accepts_numeric_score() {
        let source: Source =
            serde_json::from_str(r#"{"fileId":"f1","fileName":"a","content":"b","score":0.5}"#)
                .unwrap();
        assert_eq!(source.score, "0.5");
        assert_eq!(source.relevance(), "0.50");
    }

    #[test]
    fn test_source_tolerates_null_fields() {
        let source: Source = serde_json::from_str(
            r#"{"fileId":null,"fileName":"a","content":null,"score":null}"#,
        )
        .unwrap();
        assert_eq!(source.file_id, "");
        assert_eq!(source.file_name, "a");
        assert_eq!(source.content, "");
        assert_eq!(source.score, "");
        assert_eq!(source.relevance(), "");
    }

    #[test]
    fn test_source_accepts_numeric_file_id() {
        let source: Source = serde_json::from_str(r#"{"fileId":42,"fileName":"a"}"#).unwrap();
        assert_eq!(source.file_id, "42");
        assert_eq!(source.score, "");
    }

    #[test]
    fn test_source_non_numeric_score_shown_verbatim() {
        let source = Source {
            score: "high".into(),
            ..Default::default()
        };
        assert_eq!(source.relevance(), "high");
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let mut msg = Message::assistant("hi");
        msg.think_content = Some("hmm".into());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["thinkContent"], "hmm");
        assert!(json.get("sources").is_none());
    }

    #[test]
    fn test_thinking_ignores_blank() {
        let mut msg = Message::assistant_placeholder();
        assert_eq!(msg.thinking(), None);
        msg.think_content = Some("  ".into());
        assert_eq!(msg.thinking(), None);
        msg.think_content = Some("checking".into());
        assert_eq!(msg.thinking(), Some("checking"));
    }

    #[test]
    fn test_request_body_shape() {
        let req = QaRequest::new("q3", vec![HistoryPair::new("q1", "a1")]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "question": "q3",
                "history": [{"question": "q1", "response": "a1"}]
            })
        );
    }
}
