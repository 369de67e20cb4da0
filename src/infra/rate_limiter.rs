use {
    super::lock_unpoisoned,
    crate::domain::limiter::RateLimiter,
    std::{collections::VecDeque, future::Future, pin::Pin, sync::Mutex, time::Duration},
    tokio::time::Instant,
};

/// Sliding-log limiter: at most `limit` grants inside any window of
/// length `window`. The lock covers bookkeeping only and is never held
/// across an await.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            window,
            grants: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    pub fn per_second(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Grants a slot at `now`, or returns the instant the oldest grant
    /// leaves the window.
    fn try_grant(&self, now: Instant) -> Result<(), Instant> {
        let mut grants = lock_unpoisoned(&self.grants);
        while let Some(&oldest) = grants.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                grants.pop_front();
            } else {
                break;
            }
        }
        if grants.len() < self.limit {
            grants.push_back(now);
            return Ok(());
        }
        match grants.front() {
            Some(&oldest) => Err(oldest + self.window),
            None => Err(now),
        }
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn tick(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            loop {
                match self.try_grant(Instant::now()) {
                    Ok(()) => return,
                    Err(retry_at) => {
                        tracing::debug!(limit = self.limit, "rate limit reached, waiting for window");
                        tokio::time::sleep_until(retry_at).await;
                    }
                }
            }
        })
    }
}
