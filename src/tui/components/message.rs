use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::conversation::{ContentFormat, Role, Turn};
use crate::tui::markdown;
use crate::tui::palette::Palette;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Frames of the pending indicator, one dot lit at a time.
const PENDING_FRAMES: [&str; 3] = ["● · ·", "· ● ·", "· · ●"];

/// A single turn of the conversation.
///
/// `TurnView` is transient: built each frame from the turn and the
/// presentation flags the parent `MessageList` tracks. Rich turns go through
/// the markdown renderer; literal turns are laid out exactly as typed.
#[derive(Clone, Copy)]
pub struct TurnView<'a> {
    pub turn: &'a Turn,
    pub palette: &'a Palette,
    pub is_selected: bool,
    pub sources_expanded: bool,
    /// Animation tick, only read while the turn is pending.
    pub frame: usize,
}

impl<'a> TurnView<'a> {
    pub fn new(
        turn: &'a Turn,
        palette: &'a Palette,
        is_selected: bool,
        sources_expanded: bool,
        frame: usize,
    ) -> Self {
        Self {
            turn,
            palette,
            is_selected,
            sources_expanded,
            frame,
        }
    }

    /// Rows this turn needs at `width`, borders included.
    ///
    /// Measures the same `Paragraph` that `render` draws so the scroll
    /// layout and the actual output never disagree.
    pub fn calculate_height(turn: &Turn, palette: &Palette, sources_expanded: bool, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let body = TurnView::new(turn, palette, false, sources_expanded, 0).body();
        let lines = paragraph(body).line_count(content_width) as u16;
        lines.max(1) + VERTICAL_OVERHEAD
    }

    fn title(&self) -> &'static str {
        match self.turn.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        }
    }

    fn accent(&self) -> Style {
        let fg = match self.turn.role {
            Role::User => self.palette.user,
            Role::Assistant if self.turn.is_error() => self.palette.error,
            Role::Assistant => self.palette.assistant,
        };
        Style::default().fg(fg)
    }

    fn body(&self) -> Text<'static> {
        if self.turn.pending {
            let dots = PENDING_FRAMES[self.frame % PENDING_FRAMES.len()];
            return Text::from(Span::styled(dots, Style::default().fg(self.palette.muted)));
        }

        let mut text = match self.turn.format {
            ContentFormat::Rich => markdown::render(&self.turn.content, self.palette),
            ContentFormat::Literal => {
                // Text::styled splits on '\n' and never interprets markup
                Text::styled(self.turn.content.clone(), self.accent())
            }
        };

        if let Some(sources) = self.turn.sources_line() {
            let header = Style::default()
                .fg(self.palette.muted)
                .add_modifier(Modifier::BOLD);
            let (marker, hint) = if self.sources_expanded {
                ("▾ ", "")
            } else {
                ("▸ ", "  (space to show)")
            };
            text.lines.push(Line::default());
            text.lines.push(Line::from(vec![
                Span::styled(format!("{marker}Sources"), header),
                Span::styled(hint, Style::default().fg(self.palette.muted)),
            ]));
            if self.sources_expanded {
                text.lines.push(Line::from(Span::styled(
                    sources,
                    Style::default().fg(self.palette.muted),
                )));
            }
        }
        text
    }
}

fn paragraph(text: Text<'static>) -> Paragraph<'static> {
    Paragraph::new(text).wrap(Wrap { trim: false })
}

impl<'a> Widget for TurnView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let accent = self.accent();
        let border_style = if self.is_selected {
            Style::default().fg(self.palette.accent)
        } else {
            Style::default().fg(self.palette.border)
        };

        let mut block = Block::bordered()
            .title(self.title())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(accent.add_modifier(Modifier::BOLD))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        if self.is_selected {
            block = block.style(Style::default().bg(self.palette.selection_bg));
        }

        let inner = block.inner(area);
        block.render(area, buf);
        paragraph(self.body()).render(inner, buf);
    }
}
