use {
    chrono::Utc,
    pay_dispatch::{
        PaymentDispatcher,
        adapters::http_transport::HttpTransport,
        config::DispatcherConfig,
        domain::{error::DispatchError, id::PaymentId, money::MoneyAmount, payment::Outcome},
        infra::{memory::recorder::InMemoryRecorder, rate_limiter::SlidingWindowLimiter},
    },
    std::sync::Arc,
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        signal,
        task::JoinSet,
    },
};

/// Caller-side deadline for each payment read from stdin.
const PAYMENT_DEADLINE_MS: i64 = 3500;

/// Accepts `<amount>` or `<payment_id> <amount>`.
fn parse_line(raw: &str) -> Result<(PaymentId, MoneyAmount), DispatchError> {
    let mut parts = raw.split_whitespace();
    let (id, amount) = match (parts.next(), parts.next(), parts.next()) {
        (Some(amount), None, None) => (PaymentId::new(), amount),
        (Some(id), Some(amount), None) => (id.parse()?, amount),
        _ => {
            return Err(DispatchError::Validation(format!(
                "expected `<amount>` or `<payment_id> <amount>`, got: {raw}"
            )));
        }
    };
    let amount = amount
        .parse::<i64>()
        .map_err(|e| DispatchError::Validation(format!("invalid amount {amount}: {e}")))?;
    Ok((id, MoneyAmount::new(amount)?))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = DispatcherConfig::from_env().expect("invalid dispatcher configuration");
    let transport = HttpTransport::new(&config.provider_url, config.request_timeout)
        .expect("failed to build http transport");
    let recorder = Arc::new(InMemoryRecorder::new());
    let limiter = Arc::new(SlidingWindowLimiter::per_second(
        config.account.rate_limit_per_sec,
    ));

    let dispatcher = Arc::new(
        PaymentDispatcher::new(
            config.account.clone(),
            config.retry,
            Arc::new(transport),
            recorder.clone(),
            limiter,
        )
        .expect("failed to build dispatcher"),
    );
    tracing::info!(
        account = dispatcher.name(),
        price = dispatcher.price(),
        enabled = dispatcher.is_enabled(),
        endpoint = %config.provider_url,
        "dispatcher ready, reading amounts from stdin"
    );

    let mut tasks = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = signal::ctrl_c() => {
                tracing::info!("received ctrl+c, no longer accepting payments");
                break;
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let (payment_id, amount) = match parse_line(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(input = raw, error = %e, "skipping invalid line");
                continue;
            }
        };

        let dispatcher = dispatcher.clone();
        tasks.spawn(async move {
            let started_at = Utc::now();
            let deadline = started_at + chrono::Duration::milliseconds(PAYMENT_DEADLINE_MS);
            if let Err(e) = dispatcher
                .perform_payment(payment_id, amount, started_at, deadline)
                .await
            {
                tracing::error!(payment_id = %payment_id, error = %e, "payment dispatch failed");
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        if let Err(e) = res {
            tracing::error!(error = %e, "payment task panicked");
        }
    }

    let ids = recorder.payment_ids();
    let succeeded = ids
        .iter()
        .filter(|id| recorder.final_outcome(**id) == Some(Outcome::Succeeded))
        .count();
    tracing::info!(
        total = ids.len(),
        succeeded,
        not_succeeded = ids.len() - succeeded,
        "dispatch finished"
    );
}
