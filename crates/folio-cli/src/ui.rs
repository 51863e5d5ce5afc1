//! TUI implementation for folio

use tokio::sync::mpsc;

use crossterm::{
    event::{Event, EventStream, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use folio_chat::{Chat, ChatEvent};
use folio_qa::{Message, Role, display_text};
use folio_tui::{
    Theme,
    input::Action,
    widgets::{ChatMessage, InputBox, MessageList, SourceLine, Spinner, calculate_message_height},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::io::{self, Stdout};
use std::time::Instant;

use crate::commands::{CommandResult, execute_command, format_history};
use crate::utils::truncate_chars;

/// Messages sent from UI to the chat loop
#[derive(Debug)]
pub enum UiMessage {
    Submit(String),
    Command(String),
    Clear,
    Quit,
}

/// Widget view of a transcript message
pub fn to_chat_message(message: &Message, streaming: bool) -> ChatMessage {
    let content = display_text(&message.content);
    match message.role {
        Role::User => ChatMessage::user(&content),
        Role::Assistant => {
            let base = if streaming {
                ChatMessage::assistant_streaming(&content)
            } else {
                ChatMessage::assistant(&content)
            };
            let sources = message
                .source_list()
                .iter()
                .map(|s| SourceLine {
                    file_name: s.file_name.clone(),
                    excerpt: s.content.clone(),
                    relevance: s.relevance(),
                })
                .collect();
            base.with_thinking(message.thinking().map(str::to_string))
                .with_sources(sources)
        }
    }
}

/// TUI application state
pub struct TuiState {
    messages: Vec<ChatMessage>,
    input: InputBox,
    scroll: usize,
    show_sources: bool,
    is_processing: bool,
    status: String,
    theme: Theme,
    endpoint: String,
    ui_tx: mpsc::Sender<UiMessage>,
    spinner_start: Instant,
    /// Row of the assistant placeholder being streamed
    active_row: Option<usize>,
}

impl TuiState {
    pub fn new(endpoint: impl Into<String>, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        let mut input = InputBox::new().with_placeholder("Ask a question...");
        input.set_focused(true);

        Self {
            messages: vec![],
            input,
            scroll: 0,
            show_sources: false,
            is_processing: false,
            status: "Ready".to_string(),
            theme: Theme::dark(),
            endpoint: endpoint.into(),
            ui_tx,
            spinner_start: Instant::now(),
            active_row: None,
        }
    }

    /// Append the assistant placeholder for a turn that is about to start
    fn begin_turn(&mut self) {
        self.is_processing = true;
        self.input.set_locked(true);
        self.spinner_start = Instant::now();
        self.status = "Waiting for the answer...".to_string();
        self.messages.push(ChatMessage::assistant_streaming(""));
        self.active_row = Some(self.messages.len() - 1);
        self.scroll_to_bottom();
    }

    fn end_turn(&mut self, status: String) {
        self.is_processing = false;
        self.input.set_locked(false);
        self.active_row = None;
        self.status = status;
    }

    pub fn handle_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::TurnStart { .. } => {
                self.status = "Streaming...".to_string();
            }
            ChatEvent::MessageUpdate { message, .. } => {
                if let Some(row) = self.active_row {
                    self.messages[row] = to_chat_message(&message, true);
                    self.scroll_to_bottom();
                }
            }
            ChatEvent::TurnEnd { message } => {
                if let Some(row) = self.active_row {
                    self.messages[row] = to_chat_message(&message, false);
                }
                self.end_turn("Ready".to_string());
                self.scroll_to_bottom();
            }
            ChatEvent::TurnFailed { reason, message } => {
                if let Some(row) = self.active_row {
                    self.messages[row] = to_chat_message(&message, false).with_error(true);
                }
                self.end_turn(format!("Failed: {}", truncate_chars(&reason, 60)));
                self.scroll_to_bottom();
            }
        }
    }

    /// The chat refused the question before streaming started
    fn abandon_turn(&mut self, reason: &str) {
        if let Some(row) = self.active_row {
            self.messages.remove(row);
        }
        self.end_turn("Ready".to_string());
        self.show_system_message(reason);
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved against the content height during render
        self.scroll = usize::MAX;
    }

    pub fn show_system_message(&mut self, content: &str) {
        self.messages.push(ChatMessage::system(content));
        self.scroll_to_bottom();
    }

    fn clear(&mut self) {
        self.messages.clear();
        self.scroll = 0;
        self.status = "Cleared".to_string();
    }

    pub fn toggle_sources(&mut self) {
        self.show_sources = !self.show_sources;
    }

    /// Handle keyboard action; `false` means quit
    pub async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        match action {
            Action::Submit => {
                if self.is_processing || self.input.content().trim().is_empty() {
                    return true;
                }
                let content = self.input.take();
                let content = content.trim().to_string();
                if content.starts_with('/') {
                    let _ = self.ui_tx.send(UiMessage::Command(content)).await;
                } else {
                    self.messages.push(ChatMessage::user(&content));
                    self.scroll_to_bottom();
                    let _ = self.ui_tx.send(UiMessage::Submit(content)).await;
                }
                true
            }
            Action::Quit | Action::Interrupt | Action::Eof => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                false
            }
            Action::Escape => {
                self.input.clear();
                true
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            Action::Clear => {
                if !self.is_processing {
                    let _ = self.ui_tx.send(UiMessage::Clear).await;
                }
                true
            }
            Action::ToggleSources => {
                self.toggle_sources();
                true
            }
            _ => {
                self.input.handle_action(&action, width);
                true
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Messages
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);
    }

    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        let key = |k: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("    {k:<10}"), self.theme.accent_style()),
                Span::styled(what, self.theme.base_style()),
            ])
        };
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  folio", self.theme.accent_bold()),
                Span::styled(" - ask the portfolio", self.theme.dim_style()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Endpoint: {}", self.endpoint),
                self.theme.dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "  Keybindings",
                self.theme.warning_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            key("Enter", "Ask the question"),
            key("Ctrl+O", "Expand or collapse sources"),
            key("Ctrl+L", "Clear conversation"),
            key("PgUp/Dn", "Scroll history"),
            key("Ctrl+C", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "  Type a question to get started, or /help for commands.",
                self.theme.dim_style(),
            )),
        ]);
        frame.render_widget(welcome, area);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(" folio ");

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || self.messages.is_empty() {
            self.render_welcome(frame, inner);
            return;
        }

        let content_height =
            calculate_message_height(&self.messages, inner.width as usize, self.show_sources);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let list = MessageList::new(&self.messages, &self.theme)
            .scroll(self.scroll)
            .show_sources(self.show_sources);
        frame.render_widget(list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.is_processing {
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left = self.status.clone();
        let right = "Ctrl+O: sources │ Ctrl+L: clear │ Ctrl+C: quit";
        let left_width = left.chars().count();
        let right_width = right.chars().count();
        let available = area.width as usize;

        let style = if self.status.starts_with("Failed") {
            self.theme.error_style()
        } else {
            self.theme.dim_style()
        };
        let line = if left_width + right_width + 2 <= available {
            Line::from(vec![
                Span::styled(left, style),
                Span::raw(" ".repeat(available - left_width - right_width)),
                Span::styled(right, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(left, style))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Owns the terminal in raw mode on the alternate screen; restores it on drop
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(e.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Run the TUI application
pub async fn run_tui(chat: &mut Chat, endpoint: &str) -> anyhow::Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let terminal = &mut guard.terminal;

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);
    let mut state = TuiState::new(endpoint, ui_tx);
    let mut chat_rx = chat.subscribe();
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    // Started at the top of the next iteration so the question outlives the future.
    let mut pending_prompt: Option<String> = None;

    let result = loop {
        if let Some(question) = pending_prompt.take() {
            state.begin_turn();

            let outcome = {
                let mut prompt_future = std::pin::pin!(chat.submit(&question));

                loop {
                    terminal.draw(|frame| state.render(frame))?;
                    let area_width = terminal.size()?.width;

                    tokio::select! {
                        biased;

                        result = &mut prompt_future => {
                            break Some(result);
                        }

                        event = chat_rx.recv() => {
                            if let Ok(chat_event) = event {
                                state.handle_chat_event(chat_event);
                            }
                        }

                        event = event_stream.next() => {
                            match event {
                                Some(Ok(Event::Key(key))) => {
                                    let action = folio_tui::input::key_to_action(key);
                                    match action {
                                        Action::Quit | Action::Interrupt => break None,
                                        Action::Submit => {}
                                        Action::PageUp => state.scroll = state.scroll.saturating_sub(10),
                                        Action::PageDown => state.scroll = state.scroll.saturating_add(10),
                                        Action::ToggleSources => state.toggle_sources(),
                                        _ => {
                                            state.input.handle_action(&action, area_width);
                                        }
                                    }
                                }
                                Some(Ok(Event::Paste(text))) => {
                                    state.input.handle_action(&Action::Paste(text), area_width);
                                }
                                Some(Ok(Event::Mouse(mouse))) => match mouse.kind {
                                    MouseEventKind::ScrollUp => state.scroll = state.scroll.saturating_sub(3),
                                    MouseEventKind::ScrollDown => state.scroll = state.scroll.saturating_add(3),
                                    _ => {}
                                },
                                Some(Err(_)) | None => break None,
                                _ => {}
                            }
                        }

                        _ = tick_interval.tick() => {}
                    }
                }
            };

            // Quitting mid-turn leaves the turn unfinished.
            let Some(outcome) = outcome else {
                break Ok(());
            };

            while let Ok(chat_event) = chat_rx.try_recv() {
                state.handle_chat_event(chat_event);
            }
            match outcome {
                Ok(turn) => tracing::debug!(?turn, "turn finished"),
                Err(e) => state.abandon_turn(&e.to_string()),
            }

            terminal.draw(|frame| state.render(frame))?;
            continue;
        }

        terminal.draw(|frame| state.render(frame))?;
        let area_width = terminal.size()?.width;

        tokio::select! {
            biased;

            event = chat_rx.recv() => {
                if let Ok(chat_event) = event {
                    state.handle_chat_event(chat_event);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => {
                        let action = folio_tui::input::key_to_action(key);
                        if !state.handle_action(action, area_width).await {
                            break Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        state.handle_action(Action::Paste(text), area_width).await;
                    }
                    Some(Ok(Event::Mouse(mouse))) => match mouse.kind {
                        MouseEventKind::ScrollUp => state.scroll = state.scroll.saturating_sub(3),
                        MouseEventKind::ScrollDown => state.scroll = state.scroll.saturating_add(3),
                        _ => {}
                    },
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                    _ => {}
                }
            }

            _ = tick_interval.tick() => {}

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit(question)) => {
                        pending_prompt = Some(question);
                    }
                    Some(UiMessage::Command(cmd)) => {
                        match execute_command(&cmd) {
                            Some(CommandResult::Message(msg)) => state.show_system_message(&msg),
                            Some(CommandResult::Clear) => {
                                if let Err(e) = chat.clear() {
                                    state.show_system_message(&e.to_string());
                                } else {
                                    state.clear();
                                }
                            }
                            Some(CommandResult::ToggleSources) => {
                                state.toggle_sources();
                                let shown = if state.show_sources { "expanded" } else { "collapsed" };
                                state.show_system_message(&format!("Sources {shown}."));
                            }
                            Some(CommandResult::History) => {
                                state.show_system_message(&format_history(&chat.history()));
                            }
                            Some(CommandResult::Exit) => break Ok(()),
                            Some(CommandResult::Unknown(cmd)) => {
                                state.show_system_message(&format!(
                                    "Unknown command: /{}\nType /help for available commands.",
                                    cmd
                                ));
                            }
                            None => {}
                        }
                    }
                    Some(UiMessage::Clear) => {
                        if chat.clear().is_ok() {
                            state.clear();
                        }
                    }
                    Some(UiMessage::Quit) | None => {
                        break Ok(());
                    }
                }
            }
        }
    };

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_qa::Source;
    use folio_tui::widgets::Speaker;

    fn state() -> (TuiState, mpsc::Receiver<UiMessage>) {
        let (tx, rx) = mpsc::channel(8);
        (TuiState::new("http://localhost:3000/api/qanything", tx), rx)
    }

    fn answer(content: &str) -> Message {
        let mut message = Message::assistant(content);
        message.think_content = Some("checking".into());
        message.sources = Some(vec![Source {
            file_id: "1".into(),
            file_name: "notes.md".into(),
            content: "excerpt".into(),
            score: "0.8731".into(),
        }]);
        message
    }

    #[test]
    fn test_to_chat_message_carries_think_and_sources() {
        let view = to_chat_message(&answer("done"), false);
        assert_eq!(view.speaker, Speaker::Assistant);
        assert_eq!(view.thinking.as_deref(), Some("checking"));
        assert_eq!(view.sources.len(), 1);
        assert_eq!(view.sources[0].relevance, "0.87");
        assert!(!view.is_streaming);
    }

    #[test]
    fn test_to_chat_message_strips_raw_tags() {
        let raw = Message::assistant("<think>x</think>  <response>y</response>");
        assert_eq!(to_chat_message(&raw, false).content, "y");

        let user = Message::user("<think>x</think>why?");
        assert_eq!(to_chat_message(&user, false).content, "why?");
    }

    #[test]
    fn test_events_update_placeholder_row() {
        let (mut state, _rx) = state();
        state.messages.push(ChatMessage::user("q"));
        state.begin_turn();
        assert!(state.input.is_locked());

        state.handle_chat_event(ChatEvent::MessageUpdate {
            index: 1,
            message: answer("part"),
        });
        assert!(state.messages[1].is_streaming);
        assert_eq!(state.messages[1].content, "part");

        state.handle_chat_event(ChatEvent::TurnEnd {
            message: answer("final"),
        });
        assert_eq!(state.messages[1].content, "final");
        assert!(!state.messages[1].is_streaming);
        assert!(!state.is_processing);
        assert!(!state.input.is_locked());
        assert_eq!(state.status, "Ready");
    }

    #[test]
    fn test_failed_turn_marks_error() {
        let (mut state, _rx) = state();
        state.begin_turn();
        state.handle_chat_event(ChatEvent::TurnFailed {
            reason: "timeout".into(),
            message: Message::assistant("Sorry, the request failed:\ntimeout"),
        });
        assert!(state.messages[0].is_error);
        assert_eq!(state.status, "Failed: timeout");
        assert!(state.active_row.is_none());
    }

    #[tokio::test]
    async fn test_submit_ignored_while_processing() {
        let (mut state, mut rx) = state();
        state.begin_turn();
        for c in "next".chars() {
            state.handle_action(Action::Char(c), 80).await;
        }
        state.handle_action(Action::Submit, 80).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(state.input.content(), "next");
    }

    #[tokio::test]
    async fn test_submit_sends_question_and_commands() {
        let (mut state, mut rx) = state();
        for c in "hello ".chars() {
            state.handle_action(Action::Char(c), 80).await;
        }
        state.handle_action(Action::Submit, 80).await;
        assert!(matches!(rx.try_recv(), Ok(UiMessage::Submit(q)) if q == "hello"));
        assert_eq!(state.messages.len(), 1);

        for c in "/sources".chars() {
            state.handle_action(Action::Char(c), 80).await;
        }
        state.handle_action(Action::Submit, 80).await;
        assert!(matches!(rx.try_recv(), Ok(UiMessage::Command(c)) if c == "/sources"));
    }

    #[tokio::test]
    async fn test_blank_submit_does_nothing() {
        let (mut state, mut rx) = state();
        state.handle_action(Action::Char(' '), 80).await;
        state.handle_action(Action::Submit, 80).await;
        assert!(rx.try_recv().is_err());
        assert!(state.messages.is_empty());
    }
}
