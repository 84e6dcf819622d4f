//! # TitleBar Component
//!
//! Single status line at the top of the main column.
//!
//! Shows the app name, the current status ("Ready", "Thinking...", "Query
//! failed"), the active theme and a "↓ New" marker when the conversation has
//! content below the viewport. On narrow terminals it also hints at the
//! drawer shortcut.
//!
//! Purely presentational: every field is a prop.
//!
//! ## Conditional Formatting
//!
//! 1. **Unseen content**: `"Lectern | Thinking... | ↓ New"`
//! 2. **Status message**: `"Lectern | Ready"`
//! 3. **Empty status**: `"Lectern"`
//!
//! While a theme switch animates, a band in the accent colour sweeps across
//! the bar, `transition` going from 0.0 to 1.0.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::palette::Palette;

pub struct TitleBar {
    pub status_message: String,
    pub has_unseen_content: bool,
    /// Label of the active theme
    pub theme_label: &'static str,
    /// Narrow layout: the navigation lives in a drawer
    pub compact: bool,
    /// Progress of an animated theme switch, `None` when idle
    pub transition: Option<f32>,
    pub palette: Palette,
}

impl TitleBar {
    pub fn new(status_message: String, has_unseen_content: bool, palette: Palette) -> Self {
        Self {
            status_message,
            has_unseen_content,
            theme_label: "",
            compact: false,
            transition: None,
            palette,
        }
    }

    fn left_text(&self) -> String {
        if self.has_unseen_content {
            format!("Lectern | {} | ↓ New", self.status_message)
        } else if self.status_message.is_empty() {
            String::from("Lectern")
        } else {
            format!("Lectern | {}", self.status_message)
        }
    }

    fn right_text(&self) -> String {
        let mut parts = Vec::new();
        if !self.theme_label.is_empty() {
            parts.push(format!("theme: {}", self.theme_label));
        }
        if self.compact {
            parts.push(String::from("Ctrl+O menu"));
        }
        parts.join(" · ")
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let palette = self.palette;
        let left = self.left_text();
        let right = self.right_text();

        let used = left.chars().count() + right.chars().count();
        let gap = (area.width as usize).saturating_sub(used).max(1);
        let line = Line::from(vec![
            Span::styled(left, palette.heading_style()),
            Span::raw(" ".repeat(gap)),
            Span::styled(right, palette.muted_style()),
        ]);
        frame.render_widget(Paragraph::new(line).style(palette.base()), area);

        if let Some(progress) = self.transition {
            let swept = (area.width as f32 * progress.clamp(0.0, 1.0)).round() as u16;
            let band = Rect { width: swept.min(area.width), ..area };
            frame.buffer_mut().set_style(
                band,
                Style::default()
                    .bg(palette.accent)
                    .fg(palette.bg)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theme::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(title_bar: &mut TitleBar) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                title_bar.render(f, area);
            })
            .unwrap();
        terminal
    }

    fn text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn palette() -> Palette {
        Palette::for_theme(Theme::Dark)
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new("Thinking...".to_string(), true, palette());
        let screen = text(&draw(&mut title_bar));
        assert!(screen.contains("Lectern"));
        assert!(screen.contains("Thinking..."));
        assert!(screen.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_empty_status() {
        let mut title_bar = TitleBar::new(String::new(), false, palette());
        let screen = text(&draw(&mut title_bar));
        assert!(screen.contains("Lectern"));
        assert!(!screen.contains('|'));
    }

    #[test]
    fn test_compact_shows_drawer_hint() {
        let mut title_bar = TitleBar::new("Ready".to_string(), false, palette());
        title_bar.theme_label = "Dark";
        assert!(!text(&draw(&mut title_bar)).contains("Ctrl+O"));

        title_bar.compact = true;
        let screen = text(&draw(&mut title_bar));
        assert!(screen.contains("Ctrl+O menu"));
        assert!(screen.contains("theme: Dark"));
    }

    #[test]
    fn test_transition_band_covers_progress() {
        let palette = palette();
        let mut title_bar = TitleBar::new("Ready".to_string(), false, palette);
        title_bar.transition = Some(0.5);
        let terminal = draw(&mut title_bar);
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(0, 0)].bg, palette.accent);
        assert_eq!(buffer[(39, 0)].bg, palette.accent);
        assert_eq!(buffer[(40, 0)].bg, palette.bg);
    }
}
