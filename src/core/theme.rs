//! # Theme Controller
//!
//! Persisted visual preference. Entirely orthogonal to the conversation:
//! nothing here touches turns or the session.
//!
//! Every theme has one selector per [`Placement`]; exactly the selectors of
//! the current theme are active. Other presentations follow changes through
//! a `tokio::sync::watch` channel.

use std::fmt;
use std::str::FromStr;

use log::{info, warn};
use tokio::sync::watch;

use crate::core::preferences::PreferenceStore;
use crate::core::stats::Placement;

pub const THEME_PREFERENCE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Terminal,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::Terminal];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Terminal => "terminal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::Terminal => "Terminal",
        }
    }

    /// Cycles to the next theme (wraps around).
    pub fn next(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Terminal,
            Theme::Terminal => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    Unknown(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::Unknown(name) => write!(f, "unknown theme: {name}"),
        }
    }
}

impl std::error::Error for ThemeError {}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Theme::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ThemeError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Broadcast after every applied theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    pub theme: Theme,
    /// Whether presentations should animate the switch.
    pub animate: bool,
}

/// One theme-selection control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSelector {
    pub placement: Placement,
    pub theme: Theme,
    pub active: bool,
}

pub struct ThemeController {
    store: Box<dyn PreferenceStore>,
    current: Theme,
    selectors: Vec<ThemeSelector>,
    notifier: watch::Sender<ThemeChange>,
}

impl ThemeController {
    /// Reads the stored preference; `fallback` applies when none is stored or
    /// the stored name is not a known theme.
    pub fn new(store: Box<dyn PreferenceStore>, fallback: Theme) -> Self {
        let current = match store.get(THEME_PREFERENCE_KEY) {
            Some(name) => name.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored theme: {}", e);
                fallback
            }),
            None => fallback,
        };

        let selectors = Placement::ALL
            .into_iter()
            .flat_map(|placement| {
                Theme::ALL.into_iter().map(move |theme| ThemeSelector {
                    placement,
                    theme,
                    active: theme == current,
                })
            })
            .collect();

        let (notifier, _) = watch::channel(ThemeChange {
            theme: current,
            animate: false,
        });

        info!("Theme initialised: {}", current);
        Self {
            store,
            current,
            selectors,
            notifier,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn selectors(&self) -> &[ThemeSelector] {
        &self.selectors
    }

    pub fn selectors_for(&self, placement: Placement) -> impl Iterator<Item = &ThemeSelector> {
        self.selectors.iter().filter(move |s| s.placement == placement)
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeChange> {
        self.notifier.subscribe()
    }

    /// Applies, persists and announces a theme by name.
    pub fn set_theme(&mut self, name: &str, animate: bool) -> Result<(), ThemeError> {
        let theme: Theme = name.parse()?;
        self.apply(theme, animate);
        Ok(())
    }

    pub fn cycle(&mut self, animate: bool) -> Theme {
        let next = self.current.next();
        self.apply(next, animate);
        next
    }

    fn apply(&mut self, theme: Theme, animate: bool) {
        self.current = theme;

        if let Err(e) = self.store.set(THEME_PREFERENCE_KEY, theme.name()) {
            warn!("Failed to persist theme {}: {}", theme, e);
        }

        for selector in &mut self.selectors {
            selector.active = selector.theme == theme;
        }

        // send_replace never fails, even with no receivers alive.
        self.notifier.send_replace(ThemeChange { theme, animate });
        info!("Theme set to {} (animate={})", theme, animate);
    }
}
