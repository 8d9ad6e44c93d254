//! Fixed-window pacing for outbound embedding calls.
//!
//! This is a fixed window, not a sliding window or token bucket: a burst that
//! straddles a window boundary can momentarily exceed the nominal rate. That
//! approximation matches the budget the upstream service actually enforces
//! and is accepted here.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::models::RateLimitConfig;

#[derive(Debug)]
struct WindowState {
    requests_made: u32,
    window_start: Instant,
}

/// Suspends callers so the number of `acquire` returns never exceeds the
/// window budget. Owned by the pipeline run; not a global.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests_per_window: u32,
    window_duration: Duration,
    inter_request_delay: Duration,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests_per_window: config.max_requests_per_window.max(1),
            window_duration: Duration::from_millis(config.window_duration_ms),
            inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
            state: Mutex::new(WindowState {
                requests_made: 0,
                window_start: Instant::now(),
            }),
        }
    }

    /// Returns once the caller is permitted to make one outbound call.
    ///
    /// Reaching the window budget blocks until the window has fully elapsed,
    /// then opens a fresh window. Below the budget, callers are paced by the
    /// inter-request delay. The lock is held across the sleep, so concurrent
    /// acquirers queue and the aggregate rate stays within budget.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        state.requests_made += 1;

        if state.requests_made >= self.max_requests_per_window {
            let elapsed = state.window_start.elapsed();
            if elapsed < self.window_duration {
                tokio::time::sleep(self.window_duration - elapsed).await;
            }
            state.requests_made = 0;
            state.window_start = Instant::now();
        } else {
            tokio::time::sleep(self.inter_request_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_ms: u64, delay_ms: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests_per_window: max,
            window_duration_ms: window_ms,
            inter_request_delay_ms: delay_ms,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_paces_requests_under_budget() {
        let limiter = limiter(100, 60_000, 1_000);
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert_eq!(start.elapsed(), Duration::from_millis(3_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_for_window_remainder_at_budget() {
        let limiter = limiter(3, 60_000, 1_000);
        let start = Instant::now();

        limiter.acquire().await; // +1s pacing
        limiter.acquire().await; // +1s pacing
        limiter.acquire().await; // budget reached, sleeps out the window

        assert_eq!(start.elapsed(), Duration::from_millis(60_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_blocking() {
        let limiter = limiter(2, 10_000, 100);
        let start = Instant::now();

        limiter.acquire().await; // +100ms
        limiter.acquire().await; // blocks until 10s, resets window
        assert_eq!(start.elapsed(), Duration::from_millis(10_000));

        // A fresh window: back to plain pacing.
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_millis(10_100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_budget_within_any_window() {
        let max = 3u32;
        let window = Duration::from_millis(5_000);
        let limiter = limiter(max, 5_000, 0);
        let start = Instant::now();

        let mut grant_times = Vec::new();
        for _ in 0..10 {
            limiter.acquire().await;
            grant_times.push(start.elapsed());
        }

        for (i, t) in grant_times.iter().enumerate() {
            let in_window = grant_times[i..]
                .iter()
                .take_while(|u| **u < *t + window)
                .count();
            assert!(
                in_window as u32 <= max,
                "{} grants within the window starting at {:?}",
                in_window,
                t
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_limiter_serializes_concurrent_acquirers() {
        use std::sync::Arc;

        let limiter = Arc::new(limiter(100, 60_000, 500));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Four acquisitions paced 500ms apart, regardless of task count.
        assert_eq!(start.elapsed(), Duration::from_millis(2_000));
    }
}
