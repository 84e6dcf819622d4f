//! # Navigation Drawer
//!
//! Narrow-layout overlay holding the mobile [`NavPanel`]. Opened with
//! Ctrl+O, dismissed with Esc, a click outside, or after an entry is chosen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear};

use crate::tui::component::Component;
use crate::tui::components::sidebar::NavPanel;
use crate::tui::palette::Palette;

const DRAWER_WIDTH: u16 = 36;

pub struct NavDrawer<'a> {
    panel: NavPanel<'a>,
    palette: Palette,
}

impl<'a> NavDrawer<'a> {
    pub fn new(mut panel: NavPanel<'a>, palette: Palette) -> Self {
        panel.edge = false;
        panel.focused = true;
        Self { panel, palette }
    }

    /// Area the drawer occupies inside `area`: anchored left, full height.
    pub fn area(area: Rect) -> Rect {
        let [drawer] = Layout::horizontal([Constraint::Length(DRAWER_WIDTH.min(area.width))])
            .flex(Flex::Start)
            .areas(area);
        drawer
    }
}

impl<'a> Component for NavDrawer<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let drawer = Self::area(area);
        frame.render_widget(Clear, drawer);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.palette.accent))
            .title(" Menu ")
            .title_bottom(Line::from(" ↑↓ move · Enter select · Esc close ").centered())
            .style(self.palette.base());
        let inner = block.inner(drawer);
        frame.render_widget(block, drawer);
        self.panel.render(frame, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stats::{Placement, StatsSlot, StatsTarget, StatsView};
    use crate::core::theme::{Theme, ThemeSelector};
    use crate::tui::components::sidebar::{MenuEntry, NavMenuState};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_drawer_overlays_left_edge() {
        let mut state = NavMenuState::default();
        let mut stats = StatsSlot::default();
        stats.show(StatsView::failed());
        let palette = Palette::for_theme(Theme::Terminal);
        let selectors = vec![ThemeSelector {
            placement: Placement::Mobile,
            theme: Theme::Terminal,
            active: true,
        }];

        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                let panel = NavPanel::new(&mut state, &stats, selectors, palette);
                NavDrawer::new(panel, palette).render(f, area);
            })
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Menu"));
        assert!(screen.contains("Failed to load courses"));
        assert!(screen.contains("● Terminal"));

        // rounded border at x=0, text from x=2 (border + panel padding)
        assert_eq!(state.entry_at(3, 1), Some(MenuEntry::NewChat));
        assert_eq!(state.entry_at(DRAWER_WIDTH + 2, 1), None);
    }

    #[test]
    fn test_drawer_area_fits_narrow_terminal() {
        let area = NavDrawer::area(Rect::new(0, 0, 20, 10));
        assert_eq!(area.width, 20);
        assert_eq!(NavDrawer::area(Rect::new(0, 0, 80, 10)).width, DRAWER_WIDTH);
    }
}
