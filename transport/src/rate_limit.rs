//! Sliding-window rate limiting of outbound carrier calls.
//!
//! Bounds calls within *any* trailing one-second window, not aligned
//! buckets, so bursts are smoothed but never exceed the limit.

use std::collections::VecDeque;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep_until};

const WINDOW: Duration = Duration::from_millis(1000);

/// Sliding-window rate limiter.
///
/// `acquire` suspends the caller until a slot is free; there are no error
/// conditions. The window of recorded call timestamps is guarded by a
/// mutex held only for pruning and bookkeeping, never across a sleep.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `limit` calls per rolling second.
    ///
    /// A limit of zero is clamped to one.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit: (limit.max(1)) as usize,
            window: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until a slot is available, then record the call and return.
    pub async fn acquire(&self) {
        loop {
            let deadline = {
                let mut window = self.window.lock().await;
                let now = Instant::now();
                Self::prune(&mut window, now);

                if window.len() < self.limit {
                    window.push_back(now);
                    return;
                }
                // Earliest retained call leaves the window at this point.
                match window.front() {
                    Some(&earliest) => earliest + WINDOW,
                    None => now,
                }
            };
            sleep_until(deadline).await;
        }
    }

    /// Slots currently free in the trailing window.
    pub async fn available(&self) -> usize {
        let mut window = self.window.lock().await;
        Self::prune(&mut window, Instant::now());
        self.limit - window.len()
    }

    fn prune(window: &mut VecDeque<Instant>, now: Instant) {
        while window
            .front()
            .is_some_and(|&t| now.duration_since(t) >= WINDOW)
        {
            window.pop_front();
        }
    }
}
