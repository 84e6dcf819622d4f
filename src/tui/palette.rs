//! Colours for each [`Theme`].
//!
//! `Terminal` sticks to the 16 ANSI colours and the terminal's own
//! background so it blends with whatever scheme the user already runs.

use ratatui::style::{Color, Modifier, Style};

use crate::core::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub error: Color,
    pub border: Color,
    pub selection_bg: Color,
    pub code_fg: Color,
    pub code_bg: Color,
    /// syntect theme for fenced code, `None` = plain code blocks.
    pub syntax_theme: Option<&'static str>,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Rgb(15, 23, 42),
                fg: Color::Rgb(226, 232, 240),
                muted: Color::Rgb(148, 163, 184),
                accent: Color::Rgb(37, 99, 235),
                user: Color::Rgb(96, 165, 250),
                assistant: Color::Rgb(226, 232, 240),
                error: Color::Rgb(248, 113, 113),
                border: Color::Rgb(51, 65, 85),
                selection_bg: Color::Rgb(30, 41, 59),
                code_fg: Color::Rgb(226, 232, 240),
                code_bg: Color::Rgb(51, 65, 85),
                syntax_theme: Some("base16-ocean.dark"),
            },
            Theme::Light => Self {
                bg: Color::Rgb(248, 250, 252),
                fg: Color::Rgb(15, 23, 42),
                muted: Color::Rgb(100, 116, 139),
                accent: Color::Rgb(37, 99, 235),
                user: Color::Rgb(29, 78, 216),
                assistant: Color::Rgb(15, 23, 42),
                error: Color::Rgb(185, 28, 28),
                border: Color::Rgb(203, 213, 225),
                selection_bg: Color::Rgb(226, 232, 240),
                code_fg: Color::Rgb(15, 23, 42),
                code_bg: Color::Rgb(226, 232, 240),
                syntax_theme: Some("InspiredGitHub"),
            },
            Theme::Terminal => Self {
                bg: Color::Reset,
                fg: Color::Reset,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                user: Color::Green,
                assistant: Color::Blue,
                error: Color::Red,
                border: Color::DarkGray,
                selection_bg: Color::DarkGray,
                code_fg: Color::White,
                code_bg: Color::DarkGray,
                syntax_theme: None,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn heading_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}
