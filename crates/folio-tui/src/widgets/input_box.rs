//! Single-line question input

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input. The cursor is a char index into `chars`.
#[derive(Debug, Default)]
pub struct InputBox {
    chars: Vec<char>,
    cursor: usize,
    /// Display columns hidden off the left edge
    scroll: usize,
    placeholder: String,
    focused: bool,
    /// A turn is streaming; the text stays editable but is not sent
    locked: bool,
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn content(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Return the current text and empty the box
    pub fn take(&mut self) -> String {
        let text = self.content();
        self.clear();
        text
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn columns_before_cursor(&self) -> usize {
        self.chars[..self.cursor].iter().map(|c| char_width(*c)).sum()
    }

    fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Start of the word before the cursor, skipping trailing spaces first
    fn word_start(&self) -> usize {
        let mut at = self.cursor;
        while at > 0 && self.chars[at - 1] == ' ' {
            at -= 1;
        }
        while at > 0 && self.chars[at - 1] != ' ' {
            at -= 1;
        }
        at
    }

    /// Apply an editing action. Returns whether the box consumed it.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let handled = match action {
            Action::Char(c) => {
                self.insert(*c);
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        let after_space = self.cursor > 0 && self.chars[self.cursor - 1] == ' ';
                        if self.cursor > 0 && !after_space {
                            self.insert(' ');
                        }
                    } else {
                        self.insert(c);
                    }
                }
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
                true
            }
            Action::Delete if self.cursor < self.chars.len() => {
                self.chars.remove(self.cursor);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < self.chars.len() => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = self.chars.len();
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let start = self.word_start();
                self.chars.drain(start..self.cursor);
                self.cursor = start;
                true
            }
            _ => false,
        };
        if handled {
            self.follow_cursor(width as usize);
        }
        handled
    }

    fn follow_cursor(&mut self, width: usize) {
        // Two border columns plus one for the cursor cell.
        let visible = width.saturating_sub(3).max(1);
        let column = self.columns_before_cursor();
        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + visible {
            self.scroll = column + 1 - visible;
        }
    }

    /// Slice of the text that fits in `columns` after scrolling
    fn visible_text(&self, columns: usize) -> String {
        let mut skipped = 0;
        let mut used = 0;
        let mut out = String::new();
        for c in &self.chars {
            let w = char_width(*c);
            if skipped < self.scroll {
                skipped += w;
                continue;
            }
            if used + w > columns {
                break;
            }
            out.push(*c);
            used += w;
        }
        out
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused && !self.locked {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        if self.locked {
            block = block.title(" waiting for the answer ");
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let (text, style) = if self.chars.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_text(inner.width as usize), theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if self.focused && inner.width > 0 {
            let x = self.columns_before_cursor().saturating_sub(self.scroll);
            if x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}
