//! # InputBox Component
//!
//! Single text field for questions.
//!
//! ## Responsibilities
//!
//! - Capture and edit text (multi-line via Shift+Enter / Ctrl+J, paste)
//! - Emit `Submit` on Enter when there is something to send
//! - Look and act disabled while a query is in flight
//!
//! The buffer and cursor are internal state; `disabled`, `focused` and the
//! palette are props set by the event loop every frame. The box never clears
//! itself on submit: the caller clears it once the submission is accepted.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::core::theme::Theme;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

/// Border (2) + padding (2) consumed horizontally
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
const VERTICAL_OVERHEAD: u16 = 2;
/// Content lines shown before the box scrolls internally
const MAX_VISIBLE_LINES: u16 = 5;

const PLACEHOLDER: &str = "Ask about courses, lessons or specific content...";
const WAITING: &str = "Waiting for the answer...";
const HINTS: &str = " Enter send · Ctrl+N new chat · Ctrl+T theme · Ctrl+C quit ";

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with non-blank text
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Byte offset of the cursor, always on a char boundary
    cursor: usize,
    /// First visible visual line
    scroll_offset: u16,
    /// Width the box was last drawn at, for Up/Down
    last_width: u16,
    /// Prop: query in flight, ignore all input
    pub disabled: bool,
    /// Prop: keystrokes are routed here
    pub focused: bool,
    /// Prop: current colours
    pub palette: Palette,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll_offset: 0,
            last_width: 80,
            disabled: false,
            focused: true,
            palette: Palette::for_theme(Theme::default()),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    pub fn calculate_height(&self, width: u16) -> u16 {
        let lines = visual_lines(&self.buffer, inner_width(width)).len() as u16;
        lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// (line, column) of the cursor among the wrapped lines.
    fn cursor_cell(&self, width: u16) -> (usize, u16) {
        let lines = visual_lines(&self.buffer, width);
        let line = lines
            .iter()
            .rposition(|&(start, _)| start <= self.cursor)
            .unwrap_or(0);
        let (start, _) = lines[line];
        (line, display_width(&self.buffer[start..self.cursor]))
    }

    fn move_vertically(&mut self, delta: isize) -> bool {
        let width = inner_width(self.last_width);
        let lines = visual_lines(&self.buffer, width);
        let (line, col) = self.cursor_cell(width);
        let Some(target) = line.checked_add_signed(delta).filter(|t| *t < lines.len()) else {
            return false;
        };

        let (start, end) = lines[target];
        let mut pos = start;
        let mut used = 0u16;
        for (i, c) in self.buffer[start..end].char_indices() {
            let w = c.width().unwrap_or(0) as u16;
            if used + w > col {
                break;
            }
            used += w;
            pos = start + i + c.len_utf8();
        }
        self.cursor = pos;
        true
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_width = area.width;
        let width = inner_width(area.width);
        let palette = self.palette;

        let border = if self.disabled || !self.focused {
            Style::default().fg(palette.border)
        } else {
            Style::default().fg(palette.accent)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Span::styled(" Ask a question ", border))
            .title_bottom(Line::from(Span::styled(HINTS, palette.muted_style())).right_aligned())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);

        if self.disabled || self.buffer.is_empty() {
            let hint = if self.disabled { WAITING } else { PLACEHOLDER };
            let style = palette.muted_style().add_modifier(Modifier::ITALIC);
            frame.render_widget(Paragraph::new(Span::styled(hint, style)).block(block), area);
            if self.focused && !self.disabled {
                frame.set_cursor_position((inner.x, inner.y));
            }
            return;
        }

        let lines = visual_lines(&self.buffer, width);
        let (cursor_line, cursor_col) = self.cursor_cell(width);

        // Keep the cursor line inside the visible window
        let cursor_line = cursor_line as u16;
        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = cursor_line + 1 - MAX_VISIBLE_LINES;
        }

        let text_style = Style::default().fg(palette.fg);
        let visible: Vec<Line> = lines
            .iter()
            .skip(self.scroll_offset as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .map(|&(start, end)| Line::from(Span::styled(&self.buffer[start..end], text_style)))
            .collect();

        frame.render_widget(Paragraph::new(visible).block(block), area);

        if self.focused {
            let x = inner.x + cursor_col.min(inner.width.saturating_sub(1));
            let y = inner.y + (cursor_line - self.scroll_offset);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                let mut utf8 = [0u8; 4];
                self.insert(c.encode_utf8(&mut utf8));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Terminals send CR for newlines in bracketed paste
                self.insert(&text.replace("\r\n", "\n").replace('\r', "\n"));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = self.prev_boundary();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = self.next_boundary();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorUp => self.move_vertically(-1).then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self.move_vertically(1).then_some(InputEvent::ContentChanged),
            TuiEvent::Submit if !self.buffer.trim().is_empty() => {
                Some(InputEvent::Submit(self.buffer.clone()))
            }
            _ => None,
        }
    }
}

fn inner_width(width: u16) -> u16 {
    width.saturating_sub(HORIZONTAL_OVERHEAD).max(1)
}

fn display_width(s: &str) -> u16 {
    s.chars().map(|c| c.width().unwrap_or(0) as u16).sum()
}

/// Byte ranges of the lines the buffer occupies at `width` columns: split on
/// '\n', then hard-wrapped by display width. Never empty.
fn visual_lines(buffer: &str, width: u16) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut col = 0u16;
    for (i, c) in buffer.char_indices() {
        if c == '\n' {
            lines.push((start, i));
            start = i + 1;
            col = 0;
            continue;
        }
        let w = c.width().unwrap_or(0) as u16;
        if col > 0 && col + w > width {
            lines.push((start, i));
            start = i;
            col = 0;
        }
        col += w;
    }
    lines.push((start, buffer.len()));
    lines
}
