//! # Input Gate
//!
//! Single-flight guard for queries. Holding a [`BusyGuard`] *is* being busy:
//! the flag is cleared in `Drop`, so every exit path (normal completion, early
//! return, error, panic unwind) releases it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct InputGate {
    busy: Arc<AtomicBool>,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the gate if it is free. `None` means a query is already in flight.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof that the gate is held. Dropping it re-enables input.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_rejected_while_held() {
        let gate = InputGate::new();
        let guard = gate.try_acquire();
        assert!(guard.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn test_drop_releases() {
        let gate = InputGate::new();
        let guard = gate.try_acquire().unwrap();
        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_panic() {
        let gate = InputGate::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = gate.try_acquire().unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!gate.is_busy());
    }
}
