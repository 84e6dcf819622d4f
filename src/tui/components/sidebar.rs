//! # Navigation Panel
//!
//! The menu shared by the wide-layout sidebar and the narrow-layout drawer:
//! a new-chat entry, course stats, suggested questions and theme selectors.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `NavMenuState` lives in `TuiState`, one per placement
//! - `NavPanel` is created each frame with borrowed state and props
//!
//! Entry rows are recorded while rendering so mouse clicks can be resolved
//! against what was actually drawn. Every course title is listed; when the
//! panel is taller than its area it scrolls to keep the selected entry
//! visible and clips the rest.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

use crate::core::state::SUGGESTED_QUESTIONS;
use crate::core::stats::StatsSlot;
use crate::core::theme::{Theme, ThemeSelector};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    NewChat,
    Suggestion(usize),
    Theme(Theme),
}

impl MenuEntry {
    /// Every entry, in display order.
    pub fn all() -> Vec<MenuEntry> {
        let mut entries = vec![MenuEntry::NewChat];
        entries.extend((0..SUGGESTED_QUESTIONS.len()).map(MenuEntry::Suggestion));
        entries.extend(Theme::ALL.into_iter().map(MenuEntry::Theme));
        entries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    Activate(MenuEntry),
    Dismiss,
}

/// Persistent state for one navigation panel.
#[derive(Debug, Default)]
pub struct NavMenuState {
    pub selected: usize,
    /// First panel line shown
    scroll: usize,
    /// Rows drawn last frame, for mouse hit testing
    hits: Vec<(Rect, MenuEntry)>,
}

impl NavMenuState {
    pub fn selected_entry(&self) -> Option<MenuEntry> {
        MenuEntry::all().get(self.selected).copied()
    }

    /// Entry drawn at the given screen cell, if any.
    pub fn entry_at(&self, column: u16, row: u16) -> Option<MenuEntry> {
        let position = Position::new(column, row);
        self.hits
            .iter()
            .find(|(rect, _)| rect.contains(position))
            .map(|(_, entry)| *entry)
    }
}

impl EventHandler for NavMenuState {
    type Event = NavEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<NavEvent> {
        let count = MenuEntry::all().len();
        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(count - 1);
                None
            }
            TuiEvent::Submit | TuiEvent::InputChar(' ') => {
                self.selected_entry().map(NavEvent::Activate)
            }
            TuiEvent::MouseClick(column, row) => {
                self.entry_at(*column, *row).map(NavEvent::Activate)
            }
            TuiEvent::Escape => Some(NavEvent::Dismiss),
            _ => None,
        }
    }
}

/// Transient render wrapper around [`NavMenuState`].
pub struct NavPanel<'a> {
    state: &'a mut NavMenuState,
    stats: &'a StatsSlot,
    selectors: Vec<ThemeSelector>,
    palette: Palette,
    /// Keyboard focus is in this panel: highlight the selected entry
    pub focused: bool,
    /// A query is in flight: conversation entries are dimmed
    pub busy: bool,
    /// Draw a right border separating the sidebar from the main column
    pub edge: bool,
}

impl<'a> NavPanel<'a> {
    pub fn new(
        state: &'a mut NavMenuState,
        stats: &'a StatsSlot,
        selectors: Vec<ThemeSelector>,
        palette: Palette,
    ) -> Self {
        Self {
            state,
            stats,
            selectors,
            palette,
            focused: false,
            busy: false,
            edge: true,
        }
    }

    fn entry_style(&self, entry: MenuEntry, enabled: bool) -> Style {
        let selected = self.focused && self.state.selected_entry() == Some(entry);
        let base = if enabled {
            Style::default().fg(self.palette.fg)
        } else {
            self.palette.muted_style()
        };
        if selected {
            base.bg(self.palette.selection_bg).add_modifier(Modifier::BOLD)
        } else {
            base
        }
    }

    fn stats_lines(&self, width: usize) -> Vec<Line<'static>> {
        let muted = self.palette.muted_style();
        let Some(view) = &self.stats.view else {
            return vec![
                Line::from(Span::styled("Courses: -", muted)),
                Line::from(Span::styled("Loading...", muted)),
            ];
        };

        let mut lines = vec![Line::from(vec![
            Span::styled("Courses: ", muted),
            Span::styled(view.count_label(), self.palette.heading_style()),
        ])];
        for title in view.course_lines() {
            for (i, part) in textwrap::wrap(&title, width.saturating_sub(2).max(1))
                .into_iter()
                .enumerate()
            {
                let bullet = if i == 0 { "• " } else { "  " };
                lines.push(Line::from(Span::styled(
                    format!("{bullet}{part}"),
                    Style::default().fg(self.palette.fg),
                )));
            }
        }
        lines
    }
}

impl<'a> Component for NavPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let palette = self.palette;
        let borders = if self.edge { Borders::RIGHT } else { Borders::NONE };
        let block = Block::default()
            .borders(borders)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(palette.border))
            .padding(Padding::horizontal(1))
            .style(palette.base());
        let inner = block.inner(area);
        let width = inner.width as usize;

        let mut lines: Vec<Line> = Vec::new();
        let mut rows: Vec<(usize, usize, MenuEntry)> = Vec::new();

        let header = |text: &'static str| {
            Line::from(Span::styled(text, palette.muted_style().add_modifier(Modifier::BOLD)))
        };

        rows.push((lines.len(), 1, MenuEntry::NewChat));
        lines.push(Line::from(Span::styled(
            "+ New chat",
            self.entry_style(MenuEntry::NewChat, !self.busy),
        )));
        lines.push(Line::default());

        lines.push(header("COURSES"));
        lines.extend(self.stats_lines(width));
        lines.push(Line::default());

        lines.push(header("TRY ASKING"));
        for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
            let entry = MenuEntry::Suggestion(i);
            let style = self.entry_style(entry, !self.busy);
            let wrapped = textwrap::wrap(question, width.saturating_sub(2).max(1));
            rows.push((lines.len(), wrapped.len(), entry));
            for (j, part) in wrapped.into_iter().enumerate() {
                let marker = if j == 0 { "› " } else { "  " };
                lines.push(Line::from(Span::styled(format!("{marker}{part}"), style)));
            }
        }
        lines.push(Line::default());

        lines.push(header("THEME"));
        for selector in &self.selectors {
            let entry = MenuEntry::Theme(selector.theme);
            let marker = if selector.active { "● " } else { "○ " };
            let mut style = self.entry_style(entry, true);
            if selector.active {
                style = style.fg(palette.accent);
            }
            rows.push((lines.len(), 1, entry));
            lines.push(Line::from(Span::styled(
                format!("{marker}{}", selector.theme.label()),
                style,
            )));
        }

        let visible = inner.height as usize;
        let mut scroll = self.state.scroll;
        if self.focused
            && let Some(selected) = self.state.selected_entry()
            && let Some(&(row, height, _)) = rows.iter().find(|(_, _, e)| *e == selected)
        {
            if row < scroll {
                scroll = row;
            } else if row + height > scroll + visible {
                scroll = (row + height).saturating_sub(visible);
            }
        }
        scroll = scroll.min(lines.len().saturating_sub(visible));
        self.state.scroll = scroll;

        self.state.hits = rows
            .into_iter()
            .filter(|(row, _, _)| *row >= scroll && *row < scroll + visible)
            .map(|(row, height, entry)| {
                let y = inner.y + (row - scroll) as u16;
                let rect = Rect {
                    x: inner.x,
                    y,
                    width: inner.width,
                    height: (height as u16).min(inner.bottom().saturating_sub(y)),
                };
                (rect, entry)
            })
            .collect();

        frame.render_widget(
            Paragraph::new(lines).block(block).scroll((scroll as u16, 0)),
            area,
        );
    }
}
