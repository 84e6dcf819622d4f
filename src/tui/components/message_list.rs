//! # MessageList Component
//!
//! Scrollable view of the conversation, and the conversation's [`TurnSink`].
//!
//! ## Responsibilities
//!
//! - Display the turns in order
//! - Follow the newest turn (`scroll_to_latest`) unless the user scrolled up
//! - Hit testing for mouse clicks
//! - Cache per-turn heights so only new or toggled turns are measured
//!
//! ## Architecture
//!
//! `MessageListState` is persistent and owned by the conversation renderer
//! (it is the sink). `MessageList` is a transient component created each
//! frame with `&mut MessageListState` and the turns as props.

use std::collections::{HashMap, HashSet};

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::conversation::{Turn, TurnId, TurnSink};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::TurnView;
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Turn highlighted by keyboard navigation or a click
    pub selected: Option<TurnId>,
    /// Turns whose sources section is open
    pub expanded: HashSet<TurnId>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// True when there is content below the viewport
    pub has_unseen_content: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::default(),
            stick_to_bottom: true,
            selected: None,
            expanded: HashSet::new(),
            viewport_height: 0,
            has_unseen_content: false,
        }
    }

    pub fn toggle_sources(&mut self, id: TurnId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        self.layout.invalidate(id);
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.layout.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.layout.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Scroll so the selected turn is fully visible (top edge wins when it is
    /// taller than the viewport).
    pub fn scroll_to_selected(&mut self) {
        let Some((top, bottom)) = self.selected.and_then(|id| self.layout.span_of(id)) else {
            return;
        };
        let offset_y = self.scroll_state.offset().y;
        if top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: top });
            self.stick_to_bottom = false;
        } else if bottom > offset_y + self.viewport_height {
            let new_y = bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            let max_y = self.layout.total_height().saturating_sub(self.viewport_height);
            self.stick_to_bottom = new_y >= max_y;
        }
    }

    /// Move the selection one turn up (or onto the last turn).
    pub fn select_previous(&mut self) {
        let order = &self.layout.order;
        let idx = match self.selected.and_then(|id| order.iter().position(|t| *t == id)) {
            Some(i) => i.saturating_sub(1),
            None => match order.len().checked_sub(1) {
                Some(last) => last,
                None => return,
            },
        };
        self.selected = order.get(idx).copied();
        self.scroll_to_selected();
    }

    pub fn select_next(&mut self) {
        let order = &self.layout.order;
        if let Some(i) = self.selected.and_then(|id| order.iter().position(|t| *t == id))
            && let Some(next) = order.get(i + 1).copied()
        {
            self.selected = Some(next);
            self.scroll_to_selected();
        }
    }

    /// The turn under `viewport_row` (0 = top row of the list area).
    pub fn turn_at(&self, viewport_row: u16) -> Option<TurnId> {
        let content_y = viewport_row.saturating_add(self.scroll_state.offset().y);
        self.layout.hit_test(content_y)
    }
}

impl TurnSink for MessageListState {
    fn turn_appended(&mut self, _turn: &Turn) {
        // Measured lazily on the next render, once the width is known
    }

    fn turn_removed(&mut self, id: TurnId) {
        self.layout.invalidate(id);
        self.expanded.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    fn cleared(&mut self) {
        self.layout = LayoutCache::default();
        self.expanded.clear();
        self.selected = None;
        self.scroll_state = ScrollViewState::default();
    }

    fn scroll_to_latest(&mut self) {
        self.stick_to_bottom = true;
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub turns: &'a [Turn],
    pub palette: &'a Palette,
    pub frame_tick: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        turns: &'a [Turn],
        palette: &'a Palette,
        frame_tick: usize,
    ) -> Self {
        Self {
            state,
            turns,
            palette,
            frame_tick,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar

        // 1. Refresh the layout cache
        let expanded = &self.state.expanded;
        let palette = self.palette;
        self.state.layout.sync(self.turns, content_width, |turn| {
            TurnView::calculate_height(turn, palette, expanded.contains(&turn.id), content_width)
        });
        let total_height = self.state.layout.total_height();

        // 2. Settle the offset before picking the visible window
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            let bottom = total_height.saturating_sub(area.height);
            self.state.scroll_state.set_offset(Position { x: 0, y: bottom });
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible turns into the ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for (idx, turn) in self.turns.iter().enumerate().take(visible.end).skip(visible.start) {
            let y_offset = self.state.layout.top_of(idx);
            let height = self
                .state
                .layout
                .height_of(turn.id)
                .min(total_height.saturating_sub(y_offset));
            let view = TurnView::new(
                turn,
                self.palette,
                self.state.selected == Some(turn.id),
                self.state.expanded.contains(&turn.id),
                self.frame_tick,
            );
            scroll_view.render_widget(view, Rect::new(0, y_offset, content_width, height));
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let offset = self.state.scroll_state.offset().y;
        self.state.has_unseen_content = offset.saturating_add(area.height) < total_height;
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements, keyed by turn so removal of the pending
/// placeholder doesn't shift anything else.
#[derive(Debug, Default)]
pub struct LayoutCache {
    heights: HashMap<TurnId, u16>,
    /// Turn ids in display order, parallel to `prefix_heights`.
    order: Vec<TurnId>,
    /// Running bottom edge of each turn.
    prefix_heights: Vec<u16>,
    content_width: u16,
}

impl LayoutCache {
    /// Measures turns that have no cached height and rebuilds the prefix sums.
    pub fn sync(&mut self, turns: &[Turn], content_width: u16, mut measure: impl FnMut(&Turn) -> u16) {
        if self.content_width != content_width {
            self.heights.clear();
            self.content_width = content_width;
        }
        // Pending turns animate but keep a fixed height, so they are cached too
        for turn in turns {
            self.heights.entry(turn.id).or_insert_with(|| measure(turn));
        }
        self.heights.retain(|id, _| turns.iter().any(|t| t.id == *id));

        self.order = turns.iter().map(|t| t.id).collect();
        self.prefix_heights = self
            .order
            .iter()
            .scan(0u16, |acc, id| {
                *acc = acc.saturating_add(self.heights.get(id).copied().unwrap_or(0));
                Some(*acc)
            })
            .collect();
    }

    pub fn invalidate(&mut self, id: TurnId) {
        self.heights.remove(&id);
    }

    pub fn height_of(&self, id: TurnId) -> u16 {
        self.heights.get(&id).copied().unwrap_or(0)
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Top edge of the turn at display index `idx`.
    pub fn top_of(&self, idx: usize) -> u16 {
        match idx {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or(0),
        }
    }

    /// (top, bottom) rows of a turn on the canvas.
    pub fn span_of(&self, id: TurnId) -> Option<(u16, u16)> {
        let idx = self.order.iter().position(|t| *t == id)?;
        Some((self.top_of(idx), self.prefix_heights[idx]))
    }

    pub fn hit_test(&self, content_y: u16) -> Option<TurnId> {
        let idx = self.prefix_heights.partition_point(|&end| end <= content_y);
        self.order.get(idx).copied()
    }

    /// Display indices worth rendering, with half a viewport of slack on
    /// each side.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end.max(start)
    }
}
