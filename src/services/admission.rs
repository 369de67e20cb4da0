use {
    crate::domain::{error::DispatchError, limiter::RateLimiter},
    std::sync::Arc,
    tokio::sync::{OwnedSemaphorePermit, Semaphore},
};

/// Concurrency ceiling followed by the throughput ceiling. A caller only
/// contends for the rate limiter once it holds a concurrency slot.
#[derive(Clone)]
pub struct AdmissionGate {
    slots: Arc<Semaphore>,
    capacity: usize,
    limiter: Arc<dyn RateLimiter>,
}

/// Held for the duration of one attempt. Dropping it returns the slot, so
/// every exit path of an attempt releases, including panics and task
/// cancellation.
#[derive(Debug)]
pub struct AdmissionPermit {
    _slot: OwnedSemaphorePermit,
}

impl AdmissionGate {
    pub fn new(parallel_requests: usize, limiter: Arc<dyn RateLimiter>) -> Self {
        let capacity = parallel_requests.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            // tokio's semaphore queues waiters in FIFO order.
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            limiter,
        }
    }

    pub async fn acquire(&self) -> Result<AdmissionPermit, DispatchError> {
        let slot = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| DispatchError::Config(format!("admission gate unusable: {e}")))?;
        tracing::debug!(in_use = self.in_use(), "concurrency slot acquired, waiting for rate limiter");
        self.limiter.tick().await;
        Ok(AdmissionPermit { _slot: slot })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }
}
