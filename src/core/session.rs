//! # Session Tracker
//!
//! Holds the backend-issued conversation id. The backend keeps the history;
//! the client only has to echo the id back on every query.
//!
//! The id is adopted from the *first* response that carries one and is never
//! overwritten afterwards, so a late response with a different id cannot hijack
//! an established conversation. Only [`SessionTracker::reset`] (new
//! conversation) clears it.

use log::{debug, info};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionTracker {
    current: Option<String>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Adopts `id` only if no session is tracked yet. Empty ids are ignored.
    /// Returns true if the id was adopted.
    pub fn adopt_if_absent(&mut self, id: &str) -> bool {
        if id.is_empty() {
            debug!("Ignoring empty session id");
            return false;
        }
        match &self.current {
            Some(existing) => {
                if existing != id {
                    debug!("Keeping session {} (response carried {})", existing, id);
                }
                false
            }
            None => {
                info!("Session established: {}", id);
                self.current = Some(id.to_string());
                true
            }
        }
    }

    pub fn reset(&mut self) {
        if let Some(old) = self.current.take() {
            info!("Session {} dropped", old);
        }
    }
}
