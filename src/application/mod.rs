pub mod indicator_service;
pub mod news_ingestor;
pub mod pacing;
pub mod price_updater;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation signal, checked between instruments by the
/// batch drivers. A cancelled batch finishes the in-flight instrument and
/// stops cleanly, still reporting its tally.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Aggregate outcome of a full-universe batch run. Per-instrument
/// failures are contained and tallied, never propagated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}
