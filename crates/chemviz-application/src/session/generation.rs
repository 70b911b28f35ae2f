use std::sync::atomic::{AtomicU64, Ordering};

/// Token stamped on a request when it is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic counter for one slot of session state.
///
/// Issuing a token supersedes every token issued before it. A response may
/// only be applied while its token is still current.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    pub fn current(&self) -> Generation {
        Generation(self.latest.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let counter = GenerationCounter::new();
        let first = counter.issue();
        let second = counter.issue();
        assert!(second > first);
        assert_eq!(counter.current(), second);
    }

    #[test]
    fn test_newer_token_supersedes_older() {
        let counter = GenerationCounter::new();
        let first = counter.issue();
        assert!(counter.is_current(first));

        let second = counter.issue();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }
}
