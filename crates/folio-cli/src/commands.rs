//! Slash commands for interactive mode

use folio_qa::HistoryPair;

use crate::utils::truncate_chars;

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Expand or collapse source lists
    ToggleSources,
    /// Show the history the next question will carry
    History,
    /// Show a message to the user
    Message(String),
    Exit,
    Unknown(String),
}

/// Parse a slash command; `None` when `input` is not one
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let input = input.trim();
    let command = input.strip_prefix('/')?;
    let command = command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),
        "clear" | "c" => CommandResult::Clear,
        "history" => CommandResult::History,
        "sources" | "s" => CommandResult::ToggleSources,
        "quit" | "exit" | "q" => CommandResult::Exit,
        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /history             Show the earlier exchanges sent with the next question
  /sources, /s         Expand or collapse the sources under each answer
  /clear, /c           Clear the conversation
  /quit, /exit, /q     Exit folio"#
        .to_string()
}

/// Describe the history pairs the next question will carry
pub fn format_history(history: &[HistoryPair]) -> String {
    if history.is_empty() {
        return "No earlier exchanges; the next question is sent on its own.".to_string();
    }
    let mut out = format!("Next question carries {} earlier exchange(s):", history.len());
    for (i, pair) in history.iter().enumerate() {
        out.push_str(&format!(
            "\n  {}. Q: {}\n     A: {}",
            i + 1,
            truncate_chars(&pair.question.replace('\n', " "), 60),
            truncate_chars(&pair.response.replace('\n', " "), 60),
        ));
    }
    out
}
