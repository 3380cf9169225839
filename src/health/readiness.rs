//! Process readiness state.
//!
//! # States
//! - Ready (0): the service accepts new work
//! - Not ready (nonzero): shutdown has begun
//!
//! # State Transitions
//! ```text
//! Ready → Not ready: first call to mark_not_ready()
//! Not ready → Ready: never
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared readiness flag.
///
/// Cloning shares the same underlying atomic. Writes use release ordering and
/// reads use acquire ordering, so a request that observes the flag after
/// [`ReadinessFlag::mark_not_ready`] returned always sees "not ready".
#[derive(Debug, Clone, Default)]
pub struct ReadinessFlag {
    state: Arc<AtomicU64>,
}

impl ReadinessFlag {
    /// A flag in the ready state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == 0
    }

    /// Flip the flag to not ready.
    ///
    /// Returns `true` if this call performed the transition.
    pub fn mark_not_ready(&self) -> bool {
        self.state
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Raw counter value (0 = ready).
    pub fn value(&self) -> u64 {
        self.state.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_ready() {
        let flag = ReadinessFlag::new();
        assert!(flag.is_ready());
        assert_eq!(flag.value(), 0);
    }

    #[test]
    fn transition_is_monotonic() {
        let flag = ReadinessFlag::new();
        assert!(flag.mark_not_ready());
        assert!(!flag.is_ready());

        assert!(!flag.mark_not_ready());
        assert!(!flag.is_ready());
        assert_eq!(flag.value(), 1);
    }

    #[test]
    fn clones_share_state() {
        let flag = ReadinessFlag::new();
        let reader = flag.clone();
        flag.mark_not_ready();
        assert!(!reader.is_ready());
    }

    #[test]
    fn concurrent_writers_flip_once() {
        let flag = ReadinessFlag::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let flag = flag.clone();
                std::thread::spawn(move || flag.mark_not_ready())
            })
            .collect();

        let flips = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|flipped| *flipped)
            .count();
        assert_eq!(flips, 1);
        assert!(!flag.is_ready());
    }
}
