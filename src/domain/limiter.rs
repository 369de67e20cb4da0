use std::{future::Future, pin::Pin};

/// Throughput ceiling. `tick` waits until a slot in the current window is
/// granted; it never fails.
pub trait RateLimiter: Send + Sync {
    fn tick(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}
