//! Frame composition and mouse hit testing.
//!
//! ```text
//! wide (>= LAYOUT_BREAKPOINT)          narrow
//! ┌─────────┬──────────────────┐      ┌──────────────────┐
//! │ sidebar │ title            │      │ title    Ctrl+O  │
//! │         ├──────────────────┤      ├──────────────────┤
//! │         │ messages         │      │ messages         │
//! │         ├──────────────────┤      ├──────────────────┤
//! │         │ input            │      │ input            │
//! └─────────┴──────────────────┘      └──────────────────┘
//! ```
//!
//! The narrow layout reaches the same menu through the drawer overlay.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::widgets::Block;

use crate::core::conversation::TurnId;
use crate::core::state::App;
use crate::core::stats::Placement;
use crate::tui::TuiState;
use crate::tui::InputMode;
use crate::tui::component::Component;
use crate::tui::components::{
    InputBox, MenuEntry, MessageList, MessageListState, NavDrawer, NavPanel, TitleBar,
};
use crate::tui::palette::Palette;

/// Terminal width from which the sidebar is shown instead of the drawer.
pub const LAYOUT_BREAKPOINT: u16 = 100;
pub const SIDEBAR_WIDTH: u16 = 34;

/// Screen regions of the last drawn frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    pub area: Rect,
    pub sidebar: Option<Rect>,
    pub title: Rect,
    pub messages: Rect,
    pub input: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect, input_box: &InputBox) -> Self {
        use Constraint::{Length, Min};

        let (sidebar, main) = if area.width >= LAYOUT_BREAKPOINT {
            let [sidebar, main] = Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(area);
            (Some(sidebar), main)
        } else {
            (None, area)
        };

        let input_height = input_box.calculate_height(main.width);
        let [title, messages, input] =
            Layout::vertical([Length(1), Min(0), Length(input_height)]).areas(main);

        Self {
            area,
            sidebar,
            title,
            messages,
            input,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.sidebar.is_none()
    }
}

/// What a mouse click landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Turn(TurnId),
    Menu(Placement, MenuEntry),
    Input,
    /// Outside the open drawer
    DrawerBackdrop,
    Nothing,
}

pub fn draw_ui(
    frame: &mut Frame,
    app: &mut App<MessageListState>,
    tui: &mut TuiState,
    frame_tick: usize,
) {
    let palette = Palette::for_theme(app.themes.current());
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let layout = ScreenLayout::compute(area, &tui.input_box);
    if !layout.is_compact() {
        tui.drawer_open = false;
    }
    let busy = app.is_busy();

    if let Some(sidebar_area) = layout.sidebar {
        let selectors = app.themes.selectors_for(Placement::Desktop).copied().collect();
        let mut panel = NavPanel::new(
            &mut tui.desktop_menu,
            app.stats(Placement::Desktop),
            selectors,
            palette,
        );
        panel.focused = tui.input_mode == InputMode::Sidebar;
        panel.busy = busy;
        panel.render(frame, sidebar_area);
    }

    // Messages before the title bar: rendering settles `has_unseen_content`
    {
        let (turns, list) = app.controller.conversation_mut().split_mut();
        MessageList::new(list, turns, &palette, frame_tick).render(frame, layout.messages);
    }

    let has_unseen = app.controller.conversation().sink().has_unseen_content;
    let mut title_bar = TitleBar::new(app.status_message.clone(), has_unseen, palette);
    title_bar.theme_label = app.themes.current().label();
    title_bar.compact = layout.is_compact();
    title_bar.transition = tui.theme_transition;
    title_bar.render(frame, layout.title);

    tui.input_box.palette = palette;
    tui.input_box.disabled = busy;
    tui.input_box.focused = tui.input_mode == InputMode::Input && !tui.drawer_open;
    tui.input_box.render(frame, layout.input);

    if tui.drawer_open {
        let selectors = app.themes.selectors_for(Placement::Mobile).copied().collect();
        let mut panel = NavPanel::new(
            &mut tui.mobile_menu,
            app.stats(Placement::Mobile),
            selectors,
            palette,
        );
        panel.busy = busy;
        NavDrawer::new(panel, palette).render(frame, area);
    }

    tui.layout = layout;
}

/// Resolve a click against the regions of the last drawn frame.
pub fn hit_test(tui: &TuiState, list: &MessageListState, column: u16, row: u16) -> Hit {
    let layout = &tui.layout;
    let position = Position::new(column, row);

    if tui.drawer_open {
        if !NavDrawer::area(layout.area).contains(position) {
            return Hit::DrawerBackdrop;
        }
        return match tui.mobile_menu.entry_at(column, row) {
            Some(entry) => Hit::Menu(Placement::Mobile, entry),
            None => Hit::Nothing,
        };
    }

    if let Some(sidebar) = layout.sidebar
        && sidebar.contains(position)
    {
        return match tui.desktop_menu.entry_at(column, row) {
            Some(entry) => Hit::Menu(Placement::Desktop, entry),
            None => Hit::Nothing,
        };
    }

    if layout.messages.contains(position) {
        return match list.turn_at(row - layout.messages.y) {
            Some(id) => Hit::Turn(id),
            None => Hit::Nothing,
        };
    }

    if layout.input.contains(position) {
        return Hit::Input;
    }

    Hit::Nothing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preferences::MemoryPreferenceStore;
    use crate::core::theme::{Theme, ThemeController};
    use crate::test_support::{ScriptedTransport, answer};
    use crate::core::action::Action;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn test_app() -> App<MessageListState> {
        let themes = ThemeController::new(Box::new(MemoryPreferenceStore::default()), Theme::Dark);
        App::new(Arc::new(ScriptedTransport::default()), MessageListState::new(), themes)
    }

    fn draw(app: &mut App<MessageListState>, tui: &mut TuiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_wide_layout_has_sidebar() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 120, 40), &InputBox::new());
        assert!(!layout.is_compact());
        assert_eq!(layout.sidebar.map(|s| s.width), Some(SIDEBAR_WIDTH));
        assert_eq!(layout.title.x, SIDEBAR_WIDTH);
        assert_eq!(layout.input.height, 3);
    }

    #[test]
    fn test_narrow_layout_has_no_sidebar() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 60, 20), &InputBox::new());
        assert!(layout.is_compact());
        assert_eq!(layout.title, Rect::new(0, 0, 60, 1));
    }

    #[test]
    fn test_draw_wide() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        let screen = draw(&mut app, &mut tui, 120, 40);
        assert!(screen.contains("Lectern | Ready"));
        assert!(screen.contains("Welcome to the Course Materials Assistant"));
        assert!(screen.contains("TRY ASKING"));
        assert!(!screen.contains("Ctrl+O menu"));
    }

    #[test]
    fn test_draw_narrow_with_drawer() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        let screen = draw(&mut app, &mut tui, 70, 30);
        assert!(screen.contains("Ctrl+O menu"));
        assert!(!screen.contains("TRY ASKING"));

        tui.drawer_open = true;
        let screen = draw(&mut app, &mut tui, 70, 30);
        assert!(screen.contains("Menu"));
        assert!(screen.contains("TRY ASKING"));
    }

    #[test]
    fn test_drawer_closes_when_layout_widens() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        tui.drawer_open = true;
        draw(&mut app, &mut tui, 120, 40);
        assert!(!tui.drawer_open);
    }

    #[test]
    fn test_busy_dims_input() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        app.submit("What is MCP?").unwrap();
        let screen = draw(&mut app, &mut tui, 120, 40);
        assert!(tui.input_box.disabled);
        assert!(screen.contains("Waiting for the answer"));
        assert!(screen.contains("Thinking..."));

        app.update(Action::QueryFinished(Ok(answer("MCP is a protocol", "s1", &[]))));
        let screen = draw(&mut app, &mut tui, 120, 40);
        assert!(!tui.input_box.disabled);
        assert!(screen.contains("MCP is a protocol"));
    }

    #[test]
    fn test_hit_test_regions() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        draw(&mut app, &mut tui, 120, 40);
        let list = app.controller.conversation().sink();

        // sidebar text starts after one column of padding
        assert_eq!(
            hit_test(&tui, list, 3, 0),
            Hit::Menu(Placement::Desktop, MenuEntry::NewChat)
        );
        let welcome = app.controller.conversation().turns()[0].id;
        assert_eq!(hit_test(&tui, list, 60, 1), Hit::Turn(welcome));
        assert_eq!(hit_test(&tui, list, 60, 39), Hit::Input);
    }

    #[test]
    fn test_hit_test_drawer_backdrop() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        tui.drawer_open = true;
        draw(&mut app, &mut tui, 70, 30);
        let list = app.controller.conversation().sink();
        assert_eq!(hit_test(&tui, list, 69, 10), Hit::DrawerBackdrop);
        assert_eq!(
            hit_test(&tui, list, 3, 1),
            Hit::Menu(Placement::Mobile, MenuEntry::NewChat)
        );
    }
}
