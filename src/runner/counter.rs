//! Lock-free record tally shared by every delivery thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts delivery events. Increments never lose an update, however many
/// threads call [`increment`](Self::increment) at once.
#[derive(Debug, Default)]
pub struct RecordCounter(AtomicU64);

impl RecordCounter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Add one and return the new total.
    #[inline]
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Current total.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(RecordCounter::new().get(), 0);
    }

    #[test]
    fn test_increment_returns_new_total() {
        let counter = RecordCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_concurrent_increments_are_exact() {
        let counter = Arc::new(RecordCounter::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..250 {
                        counter.increment();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.get(), 1000);
    }

    #[test]
    fn test_many_threads_no_lost_updates() {
        let counter = Arc::new(RecordCounter::new());

        thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    for _ in 0..10_000 {
                        counter.increment();
                    }
                });
            }
        });

        assert_eq!(counter.get(), 160_000);
    }
}
