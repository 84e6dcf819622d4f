//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: status line with theme and drawer hints
//! - `TurnView`: a single conversation turn
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: question field, disabled while a query is in flight
//! - `MessageList`: scrollable conversation with layout caching; its state
//!   doubles as the conversation's `TurnSink`
//! - `NavPanel`: menu for the sidebar (wide) and the drawer (narrow)
//!
//! Stateful components split into a persistent `*State` kept in `TuiState`
//! and a transient wrapper built every frame around borrowed state and props.
//!
//! ```text
//! components/
//! ├── title_bar.rs     (status line)
//! ├── message.rs       (single turn)
//! ├── message_list.rs  (scrollable conversation, layout cache)
//! ├── input_box.rs     (question field)
//! ├── sidebar.rs       (navigation panel + menu state)
//! └── nav_drawer.rs    (narrow-layout overlay around the panel)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod nav_drawer;
pub mod sidebar;
pub use nav_drawer::NavDrawer;
pub use sidebar::{MenuEntry, NavEvent, NavMenuState, NavPanel};
