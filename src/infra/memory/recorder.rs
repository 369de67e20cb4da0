use {
    crate::domain::{
        error::DispatchError,
        id::{PaymentId, TransactionId},
        payment::Outcome,
        recorder::OutcomeRecorder,
    },
    crate::infra::lock_unpoisoned,
    chrono::{DateTime, Utc},
    serde::Serialize,
    std::{collections::HashMap, future::Future, pin::Pin, sync::Mutex, time::Duration},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedEvent {
    pub transaction_id: TransactionId,
    pub at: DateTime<Utc>,
    pub outcome: Outcome,
    /// Only set on the Accepted record.
    pub elapsed_since_start: Option<Duration>,
}

/// Process-local event log keyed by payment. Used by the demo binary and
/// tests; production deployments plug in a durable store.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    events: Mutex<HashMap<PaymentId, Vec<RecordedEvent>>>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, payment_id: PaymentId) -> Vec<RecordedEvent> {
        lock_unpoisoned(&self.events)
            .get(&payment_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn submissions_for(&self, payment_id: PaymentId) -> Vec<RecordedEvent> {
        self.events_for(payment_id)
            .into_iter()
            .filter(|e| e.outcome == Outcome::Accepted)
            .collect()
    }

    /// Terminal outcomes in the order they were recorded.
    pub fn outcomes_for(&self, payment_id: PaymentId) -> Vec<RecordedEvent> {
        self.events_for(payment_id)
            .into_iter()
            .filter(|e| e.outcome != Outcome::Accepted)
            .collect()
    }

    pub fn final_outcome(&self, payment_id: PaymentId) -> Option<Outcome> {
        self.outcomes_for(payment_id).pop().map(|e| e.outcome)
    }

    pub fn payment_ids(&self) -> Vec<PaymentId> {
        lock_unpoisoned(&self.events).keys().copied().collect()
    }

    fn push(&self, payment_id: PaymentId, event: RecordedEvent) {
        lock_unpoisoned(&self.events)
            .entry(payment_id)
            .or_default()
            .push(event);
    }
}

impl OutcomeRecorder for InMemoryRecorder {
    fn record_submission(
        &self,
        payment_id: PaymentId,
        transaction_id: TransactionId,
        at: DateTime<Utc>,
        elapsed_since_start: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + '_>> {
        Box::pin(async move {
            let mut events = lock_unpoisoned(&self.events);
            let log = events.entry(payment_id).or_default();
            if log.iter().any(|e| e.outcome == Outcome::Accepted) {
                tracing::warn!(payment_id = %payment_id, "duplicate submission ignored");
                return Ok::<(), DispatchError>(());
            }
            log.push(RecordedEvent {
                transaction_id,
                at,
                outcome: Outcome::Accepted,
                elapsed_since_start: Some(elapsed_since_start),
            });
            Ok::<(), DispatchError>(())
        })
    }

    fn record_outcome(
        &self,
        payment_id: PaymentId,
        success: bool,
        at: DateTime<Utc>,
        transaction_id: TransactionId,
        reason: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + '_>> {
        Box::pin(async move {
            let outcome = if success {
                Outcome::Succeeded
            } else {
                Outcome::Failed(reason.unwrap_or_default())
            };
            self.push(
                payment_id,
                RecordedEvent {
                    transaction_id,
                    at,
                    outcome,
                    elapsed_since_start: None,
                },
            );
            Ok::<(), DispatchError>(())
        })
    }
}
