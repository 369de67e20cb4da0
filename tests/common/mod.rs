#![allow(dead_code)]

use chrono::{DateTime, Utc};
use pay_dispatch::PaymentDispatcher;
use pay_dispatch::domain::account::{AccountProperties, RetryPolicy};
use pay_dispatch::domain::error::TransportError;
use pay_dispatch::domain::id::{PaymentId, TransactionId};
use pay_dispatch::domain::limiter::RateLimiter;
use pay_dispatch::domain::money::MoneyAmount;
use pay_dispatch::domain::provider::{PaymentTransport, ProcessingRequest, RawResponse};
use pay_dispatch::infra::memory::recorder::InMemoryRecorder;
use pay_dispatch::infra::rate_limiter::SlidingWindowLimiter;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const APPROVED: &str = r#"{"result":true,"message":null}"#;

pub fn declined(message: &str) -> String {
    serde_json::json!({ "result": false, "message": message }).to_string()
}

/// What the fake endpoint does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Timeout,
    Fault(String),
}

impl Step {
    pub fn approve() -> Self {
        Self::Reply(APPROVED.to_string())
    }

    pub fn decline(message: &str) -> Self {
        Self::Reply(declined(message))
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub payment_id: PaymentId,
    pub transaction_id: TransactionId,
    pub started: Instant,
    pub finished: Instant,
}

/// Transport that replays a fixed script, then falls back to approving.
/// Tracks how many calls overlap.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    latency: Duration,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Step>, latency: Duration) -> Self {
        Self {
            script: Mutex::new(script.into()),
            latency,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn approving(latency: Duration) -> Self {
        Self::new(Vec::new(), latency)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, payment_id: PaymentId) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.payment_id == payment_id)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn run(&self, request: ProcessingRequest) -> Result<RawResponse, TransportError> {
        let started = Instant::now();
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Step::approve);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call {
            payment_id: request.payment_id,
            transaction_id: request.transaction_id,
            started,
            finished: Instant::now(),
        });

        match step {
            Step::Reply(body) => Ok(RawResponse { status: 200, body }),
            Step::Timeout => Err(TransportError::Timeout),
            Step::Fault(msg) => Err(TransportError::Other(msg)),
        }
    }
}

impl PaymentTransport for ScriptedTransport {
    fn send(
        &self,
        request: &ProcessingRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + '_>> {
        let request = request.clone();
        Box::pin(self.run(request))
    }
}

pub fn account(parallel_requests: usize, rate_limit_per_sec: usize) -> AccountProperties {
    AccountProperties {
        service_name: "onlineStore".to_string(),
        account_name: "acc-test".to_string(),
        average_processing_time: Duration::from_millis(100),
        rate_limit_per_sec,
        parallel_requests,
        price: 30,
        enabled: true,
    }
}

pub fn retry(max_attempts: u32, delay_ms: u64) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(delay_ms)).unwrap()
}

pub struct Harness {
    pub dispatcher: Arc<PaymentDispatcher>,
    pub transport: Arc<ScriptedTransport>,
    pub recorder: Arc<InMemoryRecorder>,
}

pub fn harness(
    account: AccountProperties,
    retry: RetryPolicy,
    transport: ScriptedTransport,
) -> Harness {
    let limiter: Arc<dyn RateLimiter> =
        Arc::new(SlidingWindowLimiter::per_second(account.rate_limit_per_sec));
    let transport = Arc::new(transport);
    let recorder = Arc::new(InMemoryRecorder::new());
    let dispatcher = PaymentDispatcher::new(
        account,
        retry,
        transport.clone(),
        recorder.clone(),
        limiter,
    )
    .unwrap();
    Harness {
        dispatcher: Arc::new(dispatcher),
        transport,
        recorder,
    }
}

pub fn amount(minor_units: i64) -> MoneyAmount {
    MoneyAmount::new(minor_units).unwrap()
}

/// Start now, deadline 3.5 s later.
pub fn window() -> (DateTime<Utc>, DateTime<Utc>) {
    let started_at = Utc::now();
    (started_at, started_at + chrono::Duration::milliseconds(3500))
}

pub async fn pay(dispatcher: &PaymentDispatcher, payment_id: PaymentId) {
    let (started_at, deadline) = window();
    dispatcher
        .perform_payment(payment_id, amount(100), started_at, deadline)
        .await
        .unwrap();
}
