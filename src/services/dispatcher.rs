use {
    crate::domain::{
        account::{AccountProperties, RetryPolicy},
        error::DispatchError,
        id::{PaymentId, TransactionId},
        limiter::RateLimiter,
        money::MoneyAmount,
        payment::{AttemptOutcome, ControllerState, Submission},
        provider::{PaymentTransport, ProcessingRequest},
        recorder::OutcomeRecorder,
    },
    crate::services::{admission::AdmissionGate, attempt::execute_attempt},
    chrono::{DateTime, Utc},
    std::sync::Arc,
};

/// Dispatcher for a single external account. Built once and shared across
/// all payments routed to that account.
pub struct PaymentDispatcher {
    account: AccountProperties,
    retry: RetryPolicy,
    gate: AdmissionGate,
    transport: Arc<dyn PaymentTransport>,
    recorder: Arc<dyn OutcomeRecorder>,
}

impl PaymentDispatcher {
    pub fn new(
        account: AccountProperties,
        retry: RetryPolicy,
        transport: Arc<dyn PaymentTransport>,
        recorder: Arc<dyn OutcomeRecorder>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self, DispatchError> {
        account.validate()?;
        if retry.max_attempts == 0 {
            return Err(DispatchError::Config("max_attempts must be at least 1".into()));
        }
        let gate = AdmissionGate::new(account.parallel_requests, limiter);
        Ok(Self {
            account,
            retry,
            gate,
            transport,
            recorder,
        })
    }

    pub fn name(&self) -> &str {
        &self.account.account_name
    }

    pub fn price(&self) -> i64 {
        self.account.price
    }

    pub fn is_enabled(&self) -> bool {
        self.account.enabled
    }

    pub fn account(&self) -> &AccountProperties {
        &self.account
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Runs the attempt loop for one payment. Failures of the external
    /// system are only visible through the recorder; `Err` is reserved for
    /// a disabled account and recorder failures.
    pub async fn perform_payment(
        &self,
        payment_id: PaymentId,
        amount: MoneyAmount,
        started_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Result<(), DispatchError> {
        if !self.account.enabled {
            return Err(DispatchError::Validation(format!(
                "account {} is disabled",
                self.account.account_name
            )));
        }
        let submission = Submission::new(payment_id, amount, started_at, deadline);

        let mut transaction_id = TransactionId::mint();
        let mut state = ControllerState::Pending;

        // Accepted is written before the first gate acquisition.
        let now = Utc::now();
        self.recorder
            .record_submission(
                payment_id,
                transaction_id,
                now,
                submission.elapsed_at(now),
            )
            .await
            .inspect_err(|e| {
                tracing::error!(payment_id = %payment_id, error = %e, "failed to record submission")
            })?;
        tracing::info!(
            payment_id = %payment_id,
            transaction_id = %transaction_id,
            account = %self.account.account_name,
            amount = %amount,
            "payment submission accepted"
        );

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            advance(payment_id, &mut state, ControllerState::Attempting);

            let request = self.build_request(&submission, transaction_id);
            let outcome =
                execute_attempt(&self.gate, &*self.transport, &*self.recorder, &request).await?;

            match outcome {
                AttemptOutcome::Succeeded => {
                    advance(payment_id, &mut state, ControllerState::Succeeded);
                    tracing::info!(
                        payment_id = %payment_id,
                        transaction_id = %transaction_id,
                        attempt,
                        "payment processed"
                    );
                    return Ok(());
                }
                AttemptOutcome::Failed(reason) | AttemptOutcome::Errored(reason) => {
                    if attempt >= self.retry.max_attempts || self.past_deadline(&submission) {
                        advance(payment_id, &mut state, ControllerState::Exhausted);
                        tracing::warn!(
                            payment_id = %payment_id,
                            transaction_id = %transaction_id,
                            attempt,
                            reason = %reason,
                            "payment attempts exhausted"
                        );
                        return Ok(());
                    }

                    advance(payment_id, &mut state, ControllerState::Retrying);
                    tracing::warn!(
                        payment_id = %payment_id,
                        transaction_id = %transaction_id,
                        attempt,
                        reason = %reason,
                        delay_ms = self.retry.delay.as_millis() as u64,
                        "payment attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    transaction_id = TransactionId::mint();
                }
            }
        }
    }

    fn build_request(
        &self,
        submission: &Submission,
        transaction_id: TransactionId,
    ) -> ProcessingRequest {
        ProcessingRequest {
            service_name: self.account.service_name.clone(),
            account_name: self.account.account_name.clone(),
            transaction_id,
            payment_id: submission.payment_id(),
            amount: submission.amount(),
        }
    }

    /// Whether the next attempt, started after the retry delay, would begin
    /// past the deadline. Always false unless the policy opts in.
    fn past_deadline(&self, submission: &Submission) -> bool {
        if !self.retry.respect_deadline {
            return false;
        }
        let next_start = chrono::Duration::from_std(self.retry.delay)
            .ok()
            .and_then(|delay| Utc::now().checked_add_signed(delay));
        match next_start {
            Some(start) => start > submission.deadline(),
            None => true,
        }
    }
}

fn advance(payment_id: PaymentId, state: &mut ControllerState, next: ControllerState) {
    debug_assert!(
        state.can_transition_to(&next),
        "illegal controller transition {state} -> {next}"
    );
    tracing::trace!(payment_id = %payment_id, from = %state, to = %next, "controller transition");
    *state = next;
}
