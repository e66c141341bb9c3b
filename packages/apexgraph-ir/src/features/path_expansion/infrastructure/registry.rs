//! Process-wide expansion counters
//!
//! Shared by every expander of one analysis run, possibly across rayon
//! workers. Limit checks happen before the fork is created, in the same
//! atomic update that counts it, so the limit is never exceeded even
//! transiently.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use crate::config::{EngineConfig, Limit};
use crate::errors::{EngineError, Result};

#[derive(Debug)]
pub struct PathExpansionRegistry {
    limit: Limit,
    expanders: AtomicUsize,
    forks: AtomicUsize,
}

impl PathExpansionRegistry {
    pub fn new(limit: Limit) -> Self {
        Self {
            limit,
            expanders: AtomicUsize::new(0),
            forks: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.expansion_limit())
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }

    /// Count one expansion unit (a callee frame)
    pub fn register_expander(&self) -> usize {
        self.expanders.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count `count` new forked paths, failing if that would pass the limit
    pub fn register_forks(&self, count: usize) -> Result<usize> {
        if count == 0 {
            return Ok(self.forks());
        }
        let limit = self.limit;
        match self
            .forks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let next = current.checked_add(count)?;
                limit.allows(next).then_some(next)
            }) {
            Ok(previous) => Ok(previous + count),
            Err(current) => {
                let max = limit.max().unwrap_or(usize::MAX);
                warn!(forks = current, requested = count, limit = max, "path expansion limit reached");
                Err(EngineError::PathExpansionLimitReached { limit: max })
            }
        }
    }

    pub fn register_fork(&self) -> Result<usize> {
        self.register_forks(1)
    }

    pub fn forks(&self) -> usize {
        self.forks.load(Ordering::Acquire)
    }

    pub fn expanders(&self) -> usize {
        self.expanders.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.forks.store(0, Ordering::Release);
        self.expanders.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_limit_one_fails_on_second_fork() {
        let registry = PathExpansionRegistry::new(Limit::bounded(1));
        assert_eq!(registry.register_fork().unwrap(), 1);
        let err = registry.register_fork().unwrap_err();
        assert!(matches!(err, EngineError::PathExpansionLimitReached { limit: 1 }));
        assert_eq!(registry.forks(), 1);
    }

    #[test]
    fn test_unlimited_allows_many_forks() {
        let registry = PathExpansionRegistry::new(Limit::from_raw(-1));
        for _ in 0..25_000 {
            registry.register_fork().unwrap();
        }
        assert_eq!(registry.forks(), 25_000);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let registry = PathExpansionRegistry::new(Limit::bounded(3));
        registry.register_forks(2).unwrap();
        assert!(registry.register_forks(2).is_err());
        assert_eq!(registry.forks(), 2);
        registry.register_fork().unwrap();
    }

    #[test]
    fn test_concurrent_forks_never_pass_the_limit() {
        let registry = Arc::new(PathExpansionRegistry::new(Limit::bounded(1_000)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || (0..200).filter(|_| registry.register_fork().is_ok()).count())
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 1_000);
        assert_eq!(registry.forks(), 1_000);
    }
}
