use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub trait CancelToken: Send + Sync {
    /// True once the work guarded by this token should stop at the next row
    /// boundary.
    fn is_cancelled(&self) -> bool;

    /// True when the token belongs to a run that is no longer current.
    fn is_stale(&self) -> bool {
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

/// Cancellation handle for one run.
///
/// A run is cancelled when its abort flag is raised or when the shared
/// generation counter has moved past the generation the token was minted for.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    current_generation: Arc<AtomicU64>,
    abort: Arc<AtomicBool>,
}

impl RunToken {
    #[must_use]
    pub fn new(generation: u64, current_generation: Arc<AtomicU64>, abort: Arc<AtomicBool>) -> Self {
        Self {
            generation,
            current_generation,
            abort,
        }
    }

    /// Token for a run that owns its own generation counter, for callers
    /// driving a policy directly.
    #[must_use]
    pub fn standalone() -> Self {
        Self::new(1, Arc::new(AtomicU64::new(1)), Arc::new(AtomicBool::new(false)))
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.current_generation.load(Ordering::Acquire)
    }

    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn abort_requested(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }
}

impl CancelToken for RunToken {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.abort_requested() || self.is_stale()
    }

    #[inline]
    fn is_stale(&self) -> bool {
        self.generation != self.current_generation()
    }
}
