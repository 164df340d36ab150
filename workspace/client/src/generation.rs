//! Stale-request detection.
//!
//! Each fetch cycle takes a [`FetchToken`] from the shared [`FetchGeneration`].
//! Starting a newer cycle bumps the counter, so every token handed out before
//! it stops being current. Sub-fetches check their token after each await and
//! drop their result when it is stale. In-flight requests are not aborted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic fetch-cycle counter shared by a dashboard and its cycles.
#[derive(Debug, Clone, Default)]
pub struct FetchGeneration(Arc<AtomicU64>);

impl FetchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new cycle, invalidating every earlier token.
    pub fn begin(&self) -> FetchToken {
        let generation = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        FetchToken {
            generation,
            counter: Arc::clone(&self.0),
        }
    }

    /// Generation of the most recently started cycle (0 before the first).
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// The generation a cycle started with.
#[derive(Debug, Clone)]
pub struct FetchToken {
    generation: u64,
    counter: Arc<AtomicU64>,
}

impl FetchToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while no newer cycle has started. Must be read after the await
    /// whose result it guards, never cached across it.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cycle_invalidates_older_tokens() {
        let generation = FetchGeneration::new();
        assert_eq!(generation.current(), 0);

        let first = generation.begin();
        assert_eq!(first.generation(), 1);
        assert!(first.is_current());

        let second = generation.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(generation.current(), 2);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let generation = FetchGeneration::new();
        let token = generation.begin();
        generation.clone().begin();
        assert!(!token.is_current());
    }
}
