//! # Lifecycle sequence counter.
//!
//! One counter per runtime. Orchestrator sequences are folded in with
//! [`Sequencer::observe`] so a locally stamped command never orders before a
//! remote command that was already submitted.
//!
//! The counter does not wrap within a process lifetime (`u64`).

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic sequence source shared by every submitter.
#[derive(Debug, Default)]
pub struct Sequencer {
    value: AtomicU64,
}

impl Sequencer {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh sequence past everything issued or observed.
    ///
    /// Commands stamped by [`RuntimeHandle`](crate::RuntimeHandle) use
    /// [`current`](Self::current) instead.
    #[inline]
    pub fn next_seq(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns the latest issued or observed sequence.
    #[inline]
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Raises the counter to at least `seq`.
    #[inline]
    pub fn observe(&self, seq: u64) {
        self.value.fetch_max(seq, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_seq_is_strictly_increasing() {
        let seq = Sequencer::new();
        let a = seq.next_seq();
        let b = seq.next_seq();
        assert!(b > a);
        assert_eq!(seq.current(), b);
    }

    #[test]
    fn observe_never_moves_backwards() {
        let seq = Sequencer::new();
        seq.observe(5);
        seq.observe(3);
        assert_eq!(seq.current(), 5);
        assert_eq!(seq.next_seq(), 6);
    }

    #[test]
    fn concurrent_next_seq_yields_unique_values() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let seq = Arc::new(Sequencer::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let seq = Arc::clone(&seq);
                std::thread::spawn(move || (0..250).map(|_| seq.next_seq()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for h in handles {
            for v in h.join().unwrap() {
                assert!(all.insert(v));
            }
        }
        assert_eq!(all.len(), 1000);
        assert_eq!(seq.current(), 1000);
    }
}
