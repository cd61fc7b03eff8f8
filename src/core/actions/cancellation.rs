use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use thiserror::Error;

pub const CANCEL_CHECK_INTERVAL_PIXELS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame superseded before it finished")]
pub struct Cancelled;

/// Polled by long-running renders; a newer request flips it to supersede the
/// one in flight.
pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;

    fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> CancelToken for F
where
    F: Fn() -> bool + Send + Sync,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Fires once `latest` no longer holds `generation`, or on shutdown.
#[derive(Debug, Clone, Copy)]
pub struct GenerationToken<'a> {
    generation: u64,
    latest: &'a AtomicU64,
    shutdown: &'a AtomicBool,
}

impl<'a> GenerationToken<'a> {
    #[must_use]
    pub fn new(generation: u64, latest: &'a AtomicU64, shutdown: &'a AtomicBool) -> Self {
        Self {
            generation,
            latest,
            shutdown,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl CancelToken for GenerationToken<'_> {
    fn is_cancelled(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed) || self.latest.load(Ordering::Relaxed) != self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_cancel_passes_checks() {
        assert!(!NeverCancel.is_cancelled());
        assert_eq!(NeverCancel.check(), Ok(()));
    }

    #[test]
    fn test_closure_token_reflects_flag() {
        let flag = AtomicBool::new(false);
        let token = || flag.load(Ordering::Relaxed);

        assert_eq!(token.check(), Ok(()));

        flag.store(true, Ordering::Relaxed);
        assert_eq!(token.check(), Err(Cancelled));
    }

    #[test]
    fn test_generation_token_fires_on_newer_request() {
        let latest = AtomicU64::new(3);
        let shutdown = AtomicBool::new(false);
        let token = GenerationToken::new(3, &latest, &shutdown);

        assert!(!token.is_cancelled());

        latest.store(4, Ordering::Relaxed);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_generation_token_fires_on_shutdown() {
        let latest = AtomicU64::new(1);
        let shutdown = AtomicBool::new(false);
        let token = GenerationToken::new(1, &latest, &shutdown);

        shutdown.store(true, Ordering::Relaxed);

        assert_eq!(token.check(), Err(Cancelled));
        assert_eq!(token.generation(), 1);
    }
}
