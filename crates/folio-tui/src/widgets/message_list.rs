//! Message list widget for displaying the chat transcript

use crate::theme::Theme;
use crate::widgets::spinner::wall_clock_frame;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Excerpt rows shown per source when sources are expanded
const EXCERPT_LINES: usize = 2;

const CONTENT_INDENT: &str = "  ";
const THINK_INDENT: &str = "  ┆ ";
const EXCERPT_INDENT: &str = "       ";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    /// Local notices: command output, portfolio listings
    System,
}

/// One retrieved document as shown under an answer
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    pub file_name: String,
    pub excerpt: String,
    pub relevance: String,
}

/// A single message in the chat
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    pub thinking: Option<String>,
    pub sources: Vec<SourceLine>,
    pub is_error: bool,
    pub is_streaming: bool,
}

impl ChatMessage {
    fn new(speaker: Speaker, content: String) -> Self {
        Self {
            speaker,
            content,
            thinking: None,
            sources: Vec::new(),
            is_error: false,
            is_streaming: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, content.into())
    }

    pub fn assistant_streaming(content: impl Into<String>) -> Self {
        Self {
            is_streaming: true,
            ..Self::assistant(content)
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Speaker::System, content.into())
    }

    pub fn with_thinking(mut self, thinking: Option<String>) -> Self {
        self.thinking = thinking.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceLine>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_error(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }
}

fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    text: &str,
    indent: &'static str,
    width: usize,
    style: Style,
) {
    let columns = width.saturating_sub(indent.width()).max(1);
    for row in textwrap::wrap(text, columns) {
        lines.push(Line::from(vec![
            Span::styled(indent, style),
            Span::styled(row.into_owned(), style),
        ]));
    }
}

fn sources_label(count: usize) -> String {
    if count == 1 {
        "1 source".to_string()
    } else {
        format!("{count} sources")
    }
}

fn push_sources(
    lines: &mut Vec<Line<'static>>,
    sources: &[SourceLine],
    theme: &Theme,
    width: usize,
    expanded: bool,
) {
    let label = sources_label(sources.len());
    if !expanded {
        lines.push(Line::from(Span::styled(
            format!("  ▸ {label} (Ctrl+O to expand)"),
            theme.dim_style(),
        )));
        return;
    }

    lines.push(Line::from(Span::styled(
        format!("  ▾ {label}"),
        theme.dim_style(),
    )));
    for (i, source) in sources.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("    {}. ", i + 1), theme.dim_style()),
            Span::styled(source.file_name.clone(), theme.source_style()),
            Span::styled(format!("  relevance {}", source.relevance), theme.dim_style()),
        ]));

        let excerpt = source.excerpt.split_whitespace().collect::<Vec<_>>().join(" ");
        if excerpt.is_empty() {
            continue;
        }
        let columns = width.saturating_sub(EXCERPT_INDENT.len()).max(1);
        let rows = textwrap::wrap(&excerpt, columns);
        let truncated = rows.len() > EXCERPT_LINES;
        for (n, row) in rows.into_iter().take(EXCERPT_LINES).enumerate() {
            let mut text = row.into_owned();
            if truncated && n + 1 == EXCERPT_LINES {
                text.push('…');
            }
            lines.push(Line::from(vec![
                Span::styled(EXCERPT_INDENT, theme.dim_style()),
                Span::styled(text, theme.dim_style()),
            ]));
        }
    }
}

/// Lay out one message as pre-wrapped lines for the given width.
pub fn render_message(
    msg: &ChatMessage,
    theme: &Theme,
    width: usize,
    show_sources: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (name, style, prefix) = match msg.speaker {
        Speaker::User => ("You", theme.accent_bold(), "▶ "),
        Speaker::Assistant => (
            "Assistant",
            theme.success_style().add_modifier(Modifier::BOLD),
            "◀ ",
        ),
        Speaker::System => ("folio", theme.dim_style(), "● "),
    };
    let header = if msg.is_streaming {
        format!("{prefix}{name} ▌")
    } else {
        format!("{prefix}{name}")
    };
    lines.push(Line::from(Span::styled(header, style)));

    if let Some(thinking) = &msg.thinking {
        lines.push(Line::from(Span::styled(
            "  ┆ Thinking",
            theme.think_style().add_modifier(Modifier::BOLD),
        )));
        push_wrapped(&mut lines, thinking, THINK_INDENT, width, theme.think_style());
    }

    if msg.content.is_empty() && msg.is_streaming {
        lines.push(Line::from(Span::styled(
            format!("  {} thinking...", wall_clock_frame()),
            theme.warning_style(),
        )));
    } else {
        let style = match (msg.is_error, msg.speaker) {
            (true, _) => theme.error_style(),
            (false, Speaker::System) => theme.dim_style(),
            (false, _) => theme.base_style(),
        };
        push_wrapped(&mut lines, &msg.content, CONTENT_INDENT, width, style);
    }

    if !msg.sources.is_empty() {
        push_sources(&mut lines, &msg.sources, theme, width, show_sources);
    }

    lines.push(Line::from(""));
    lines
}

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
    show_sources: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
            show_sources: false,
        }
    }

    /// Lines hidden above the viewport
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Expand every source list instead of showing a count
    pub fn show_sources(mut self, show: bool) -> Self {
        self.show_sources = show;
        self
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let visible: Vec<Line> = self
            .messages
            .iter()
            .flat_map(|msg| render_message(msg, self.theme, width, self.show_sources))
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Total rendered height of `messages`, matching [`MessageList`] line for line
pub fn calculate_message_height(
    messages: &[ChatMessage],
    width: usize,
    show_sources: bool,
) -> usize {
    let theme = Theme::default();
    messages
        .iter()
        .map(|msg| render_message(msg, &theme, width, show_sources).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn answer_with_sources() -> ChatMessage {
        ChatMessage::assistant("The answer.").with_sources(vec![
            SourceLine {
                file_name: "notes.md".into(),
                excerpt: "first   excerpt\nspans lines".into(),
                relevance: "0.87".into(),
            },
            SourceLine {
                file_name: "faq.md".into(),
                excerpt: String::new(),
                relevance: "0.40".into(),
            },
        ])
    }

    #[test]
    fn test_thinking_block_rendered_above_answer() {
        let msg = ChatMessage::assistant("您好！").with_thinking(Some("校验".into()));
        let text = text_of(&render_message(&msg, &Theme::default(), 40, false));
        assert_eq!(text[1], "  ┆ Thinking");
        assert_eq!(text[2], "  ┆ 校验");
        assert_eq!(text[3], "  您好！");
    }

    #[test]
    fn test_blank_thinking_is_dropped() {
        let msg = ChatMessage::assistant("hi").with_thinking(Some("  ".into()));
        assert!(msg.thinking.is_none());
    }

    #[test]
    fn test_sources_collapsed_by_default() {
        let text = text_of(&render_message(
            &answer_with_sources(),
            &Theme::default(),
            60,
            false,
        ));
        assert!(text.iter().any(|l| l.contains("▸ 2 sources")));
        assert!(!text.iter().any(|l| l.contains("notes.md")));
    }

    #[test]
    fn test_sources_expanded() {
        let text = text_of(&render_message(
            &answer_with_sources(),
            &Theme::default(),
            60,
            true,
        ));
        assert!(text.iter().any(|l| l.contains("▾ 2 sources")));
        assert!(text.iter().any(|l| l == "    1. notes.md  relevance 0.87"));
        assert!(text.iter().any(|l| l.contains("first excerpt spans lines")));
        assert!(text.iter().any(|l| l == "    2. faq.md  relevance 0.40"));
    }

    #[test]
    fn test_streaming_placeholder_shows_indicator() {
        let msg = ChatMessage::assistant_streaming("");
        let text = text_of(&render_message(&msg, &Theme::default(), 40, false));
        assert_eq!(text[0], "◀ Assistant ▌");
        assert!(text[1].ends_with("thinking..."));
    }

    #[test]
    fn test_height_matches_rendered_lines() {
        let msgs = vec![
            ChatMessage::user("a question long enough to wrap across several rows"),
            answer_with_sources(),
            ChatMessage::system("Cleared"),
        ];
        let theme = Theme::default();
        for show in [false, true] {
            let rendered: usize = msgs
                .iter()
                .map(|m| render_message(m, &theme, 20, show).len())
                .sum();
            assert_eq!(calculate_message_height(&msgs, 20, show), rendered);
        }
    }

    #[test]
    fn test_render_into_buffer_respects_scroll() {
        let msgs = vec![ChatMessage::user("first"), ChatMessage::assistant("second")];
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        MessageList::new(&msgs, &theme).scroll(3).render(area, &mut buf);

        let screen: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("Assistant"));
        assert!(screen.contains("second"));
        assert!(!screen.contains("first"));
    }
}
