//! Fixed-interval pacing for external calls.
//!
//! External sources are rate-limited; the batch drivers process
//! instruments strictly sequentially and gate every call through a
//! `PacingGate` instead of sprinkling raw sleeps. The delay computation
//! is a pure function so the schedule is testable without wall-clock
//! waits.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub struct PacingGate {
    interval: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl PacingGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_slot: Mutex::new(None),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Wait until at least `interval` has passed since the previous
    /// paced call. The first call passes immediately.
    pub async fn pace(&self) {
        let wait = {
            let mut last = self.last_slot.lock().await;
            let now = Instant::now();
            let wait = delay_needed(*last, now, self.interval);
            // Reserve the slot before sleeping so concurrent callers
            // queue behind it.
            *last = Some(now + wait);
            wait
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

fn delay_needed(last_slot: Option<Instant>, now: Instant, interval: Duration) -> Duration {
    match last_slot {
        None => Duration::ZERO,
        Some(slot) => {
            let next_allowed = slot + interval;
            if next_allowed > now {
                next_allowed - now
            } else {
                Duration::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_passes_immediately() {
        let now = Instant::now();
        assert_eq!(delay_needed(None, now, Duration::from_millis(500)), Duration::ZERO);
    }

    #[test]
    fn test_back_to_back_call_waits_full_interval() {
        let now = Instant::now();
        let wait = delay_needed(Some(now), now, Duration::from_millis(350));
        assert_eq!(wait, Duration::from_millis(350));
    }

    #[test]
    fn test_partial_elapse_waits_remainder() {
        let interval = Duration::from_millis(500);
        let slot = Instant::now();
        let now = slot + Duration::from_millis(200);
        assert_eq!(delay_needed(Some(slot), now, interval), Duration::from_millis(300));
    }

    #[test]
    fn test_long_elapse_passes_immediately() {
        let interval = Duration::from_millis(100);
        let slot = Instant::now();
        let now = slot + Duration::from_secs(5);
        assert_eq!(delay_needed(Some(slot), now, interval), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_gate_with_zero_interval_never_blocks() {
        let gate = PacingGate::from_millis(0);
        for _ in 0..10 {
            gate.pace().await;
        }
    }
}
