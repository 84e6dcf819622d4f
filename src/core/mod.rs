//! # Core Application Logic
//!
//! Lectern's business logic. It knows nothing about any specific UI
//! technology; presentation plugs in through [`conversation::TurnSink`] and
//! [`stats::StatsTarget`].
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • controller (submit)  │
//!                    │  • conversation (turns) │
//!                    │  • stats / theme        │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │    API     │
//!     │  Adapter   │                          │ (reqwest)  │
//!     │ (ratatui)  │                          │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum, results reported by background tasks
//! - [`controller`]: Submit lifecycle tying gate, session and conversation
//! - [`gate`]: Single-flight busy flag
//! - [`session`]: Server-assigned session id
//! - [`conversation`]: Ordered turns and the `TurnSink` seam
//! - [`stats`]: Course statistics panel
//! - [`theme`] / [`preferences`]: Persisted theme choice
//! - [`config`]: Layered configuration

pub mod action;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod gate;
pub mod preferences;
pub mod session;
pub mod state;
pub mod stats;
pub mod theme;
