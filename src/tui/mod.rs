//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into calls on the core `App`.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (query in flight, theme wipe): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms, only redraws on events, background
//!   results or terminal resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
pub mod palette;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use futures::FutureExt;

use crate::api::{HttpTransport, QueryRequest, Transport, TransportError};
use crate::core::action::Action;
use crate::core::config::ResolvedConfig;
use crate::core::preferences;
use crate::core::state::{App, SUGGESTED_QUESTIONS};
use crate::core::stats::{Placement, StatsPanel};
use crate::core::theme::ThemeController;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MenuEntry, MessageListState, NavEvent, NavMenuState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::{Hit, ScreenLayout};

/// Length of the animated theme switch.
const THEME_TRANSITION: Duration = Duration::from_millis(300);

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigate turns with arrow keys. Typing auto-switches to Input.
    Cursor,
    /// Text editing in the input box. Esc switches to Cursor.
    Input,
    /// Keyboard focus in the wide-layout sidebar.
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic).
///
/// The message list state is not here: it is the conversation's sink and
/// lives inside `App`.
pub struct TuiState {
    pub input_box: InputBox,
    pub input_mode: InputMode,
    pub desktop_menu: NavMenuState,
    pub mobile_menu: NavMenuState,
    pub drawer_open: bool,
    /// Progress of the theme wipe, `None` when idle
    pub theme_transition: Option<f32>,
    /// Regions of the last drawn frame
    pub layout: ScreenLayout,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            input_box: InputBox::new(),
            input_mode: InputMode::Input, // User expects to type immediately
            desktop_menu: NavMenuState::default(),
            mobile_menu: NavMenuState::default(),
            drawer_open: false,
            theme_transition: None,
            layout: ScreenLayout::default(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol allows Shift+Enter detection; terminals
        // without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Build the app from resolved configuration: HTTP transport, persisted
/// theme (with any command-line override applied) and an empty conversation.
pub fn build_app(config: &ResolvedConfig) -> App<MessageListState> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.base_url.clone()));

    let store = preferences::open_or_memory(config.preferences_path.clone());
    let mut themes = ThemeController::new(store, config.default_theme);
    if let Some(theme) = config.theme_override
        && let Err(e) = themes.set_theme(theme.name(), false)
    {
        warn!("Ignoring theme override: {}", e);
    }

    App::new(transport, MessageListState::new(), themes)
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = build_app(&config);
    let mut tui = TuiState::new();
    let mut theme_changes = app.themes.subscribe();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    spawn_stats_refresh(app.controller.transport(), tx.clone());

    let start_time = Instant::now();
    let mut wipe_started: Option<Instant> = None;
    let mut needs_redraw = true; // Force first frame

    loop {
        if theme_changes.has_changed().unwrap_or(false) {
            let change = *theme_changes.borrow_and_update();
            debug!("Theme change observed: {:?}", change);
            if change.animate {
                wipe_started = Some(Instant::now());
            }
            needs_redraw = true;
        }
        tui.theme_transition = wipe_started
            .map(|t| t.elapsed().as_secs_f32() / THEME_TRANSITION.as_secs_f32())
            .filter(|progress| *progress < 1.0);
        if wipe_started.is_some() && tui.theme_transition.is_none() {
            // One last frame without the band
            wipe_started = None;
            needs_redraw = true;
        }

        let animating = app.is_busy() || tui.theme_transition.is_some();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let frame_tick = (start_time.elapsed().as_secs_f32() * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &mut app, &mut tui, frame_tick))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if dispatch(event, &mut app, &mut tui, &tx) == Flow::Quit {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            app.update(action);
        }
    }

    info!("Lectern shutting down");
    ratatui::restore();
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Route one terminal event. Global shortcuts first, then the drawer when
/// open, then mouse and scroll, then the current input mode.
fn dispatch(
    event: TuiEvent,
    app: &mut App<MessageListState>,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
) -> Flow {
    match event {
        TuiEvent::Resize => return Flow::Continue,
        TuiEvent::ForceQuit => return Flow::Quit,
        TuiEvent::NewChat => {
            new_chat(app, tui);
            return Flow::Continue;
        }
        TuiEvent::CycleTheme => {
            app.themes.cycle(true);
            return Flow::Continue;
        }
        TuiEvent::ToggleDrawer => {
            if tui.layout.is_compact() {
                tui.drawer_open = !tui.drawer_open;
            } else {
                toggle_sidebar_focus(tui);
            }
            return Flow::Continue;
        }
        _ => {}
    }

    if tui.drawer_open {
        let outcome = match event {
            TuiEvent::MouseClick(column, row) => {
                match ui::hit_test(tui, app.controller.conversation().sink(), column, row) {
                    Hit::Menu(Placement::Mobile, entry) => Some(NavEvent::Activate(entry)),
                    Hit::DrawerBackdrop => Some(NavEvent::Dismiss),
                    _ => None,
                }
            }
            TuiEvent::FocusSidebar => Some(NavEvent::Dismiss),
            other => tui.mobile_menu.handle_event(&other),
        };
        match outcome {
            Some(NavEvent::Activate(entry)) => {
                tui.drawer_open = false;
                activate(entry, app, tui, tx);
            }
            Some(NavEvent::Dismiss) => tui.drawer_open = false,
            None => {}
        }
        return Flow::Continue;
    }

    if let TuiEvent::MouseClick(column, row) = event {
        match ui::hit_test(tui, app.controller.conversation().sink(), column, row) {
            Hit::Turn(id) => {
                let (turns, list) = app.controller.conversation_mut().split_mut();
                list.selected = Some(id);
                if turns.iter().any(|t| t.id == id && !t.sources.is_empty()) {
                    list.toggle_sources(id);
                }
                tui.input_mode = InputMode::Cursor;
            }
            Hit::Menu(Placement::Desktop, entry) => activate(entry, app, tui, tx),
            Hit::Input => {
                app.controller.conversation_mut().sink_mut().selected = None;
                tui.input_mode = InputMode::Input;
            }
            Hit::Menu(Placement::Mobile, _) | Hit::DrawerBackdrop | Hit::Nothing => {}
        }
        return Flow::Continue;
    }

    // Scroll events always go to the conversation
    if matches!(
        event,
        TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown
    ) {
        app.controller.conversation_mut().sink_mut().handle_event(&event);
        return Flow::Continue;
    }

    if matches!(event, TuiEvent::FocusSidebar) {
        if tui.layout.is_compact() {
            tui.drawer_open = true;
        } else {
            toggle_sidebar_focus(tui);
        }
        return Flow::Continue;
    }

    match tui.input_mode {
        InputMode::Sidebar => match event {
            TuiEvent::InputChar(c) if c != ' ' => {
                tui.input_mode = InputMode::Input;
                tui.input_box.handle_event(&event);
            }
            TuiEvent::Paste(_) => {
                tui.input_mode = InputMode::Input;
                tui.input_box.handle_event(&event);
            }
            _ => match tui.desktop_menu.handle_event(&event) {
                Some(NavEvent::Activate(entry)) => activate(entry, app, tui, tx),
                Some(NavEvent::Dismiss) => tui.input_mode = InputMode::Input,
                None => {}
            },
        },
        InputMode::Input => {
            // Esc → switch to Cursor mode with the latest turn selected
            if matches!(event, TuiEvent::Escape) {
                tui.input_mode = InputMode::Cursor;
                let list = app.controller.conversation_mut().sink_mut();
                list.selected = None;
                list.select_previous();
                return Flow::Continue;
            }

            if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                submit(&text, app, tui, tx);
            }
        }
        InputMode::Cursor => {
            let (turns, list) = app.controller.conversation_mut().split_mut();
            match event {
                // Space toggles the sources of the selected turn
                TuiEvent::InputChar(' ') => {
                    if let Some(id) = list.selected
                        && turns.iter().any(|t| t.id == id && !t.sources.is_empty())
                    {
                        list.toggle_sources(id);
                    }
                }
                // Typing auto-switches to Input mode and forwards the event
                TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                    tui.input_mode = InputMode::Input;
                    list.selected = None;
                    tui.input_box.handle_event(&event);
                }
                TuiEvent::Submit | TuiEvent::Escape => {
                    tui.input_mode = InputMode::Input;
                    list.selected = None;
                }
                TuiEvent::CursorUp => list.select_previous(),
                TuiEvent::CursorDown => list.select_next(),
                _ => {}
            }
        }
    }

    Flow::Continue
}

fn toggle_sidebar_focus(tui: &mut TuiState) {
    tui.input_mode = if tui.input_mode == InputMode::Sidebar {
        InputMode::Input
    } else {
        InputMode::Sidebar
    };
}

fn activate(
    entry: MenuEntry,
    app: &mut App<MessageListState>,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
) {
    debug!("Menu entry activated: {:?}", entry);
    match entry {
        MenuEntry::NewChat => new_chat(app, tui),
        MenuEntry::Suggestion(i) => {
            if let Some(question) = SUGGESTED_QUESTIONS.get(i) {
                submit(question, app, tui, tx);
            }
        }
        MenuEntry::Theme(theme) => {
            if let Err(e) = app.themes.set_theme(theme.name(), false) {
                warn!("Theme selection failed: {}", e);
            }
        }
    }
}

fn new_chat(app: &mut App<MessageListState>, tui: &mut TuiState) {
    if app.new_chat() {
        tui.input_mode = InputMode::Input;
    }
}

/// Hand text to the gate; on acceptance clear the field and send the query.
fn submit(text: &str, app: &mut App<MessageListState>, tui: &mut TuiState, tx: &mpsc::Sender<Action>) {
    let Some(request) = app.submit(text) else {
        return;
    };
    tui.input_box.clear();
    tui.input_mode = InputMode::Input;
    app.controller.conversation_mut().sink_mut().selected = None;
    spawn_query(app.controller.transport(), request, tx.clone());
}

fn spawn_query(transport: Arc<dyn Transport>, request: QueryRequest, tx: mpsc::Sender<Action>) {
    info!(
        "Spawning query ({} chars, session={:?})",
        request.query.len(),
        request.session_id
    );
    tokio::spawn(async move {
        let outcome = AssertUnwindSafe(transport.post_query(&request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                warn!("Query task panicked");
                Err(TransportError::Aborted)
            });
        if tx.send(Action::QueryFinished(outcome)).is_err() {
            warn!("Failed to send query result: receiver dropped");
        }
    });
}

/// One fetch per placement; each panel fills in independently.
fn spawn_stats_refresh(transport: Arc<dyn Transport>, tx: mpsc::Sender<Action>) {
    for placement in Placement::ALL {
        let panel = StatsPanel::new(Arc::clone(&transport));
        let tx = tx.clone();
        tokio::spawn(async move {
            let view = panel.fetch().await;
            if tx.send(Action::StatsLoaded(placement, view)).is_err() {
                warn!("Failed to send stats for {:?}: receiver dropped", placement);
            }
        });
    }
}
