//! # Actions
//!
//! Everything a background task can report back to the event loop becomes
//! an `Action`. Tasks never touch state themselves; they send an action over
//! the channel and `App::update` applies it on the UI thread.
//!
//! ```text
//! tokio task ──► mpsc::Sender<Action> ──► event loop ──► App::update(action)
//! ```

use crate::api::{QueryResponse, TransportError};
use crate::core::stats::{Placement, StatsView};

#[derive(Debug)]
pub enum Action {
    /// Terminal outcome of the in-flight query.
    QueryFinished(Result<QueryResponse, TransportError>),
    /// A stats refresh for one placement landed.
    StatsLoaded(Placement, StatsView),
}
