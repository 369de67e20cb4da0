use {
    super::error::DispatchError,
    super::id::{PaymentId, TransactionId},
    chrono::{DateTime, Utc},
    std::{future::Future, pin::Pin, time::Duration},
};

/// Durable store of payment events. Implementations own conflict
/// resolution and must return in bounded time: a gate slot is held while
/// an outcome is being recorded.
pub trait OutcomeRecorder: Send + Sync {
    fn record_submission(
        &self,
        payment_id: PaymentId,
        transaction_id: TransactionId,
        at: DateTime<Utc>,
        elapsed_since_start: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + '_>>;

    fn record_outcome(
        &self,
        payment_id: PaymentId,
        success: bool,
        at: DateTime<Utc>,
        transaction_id: TransactionId,
        reason: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + '_>>;
}
