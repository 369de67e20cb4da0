use {
    crate::domain::{
        account::{AccountProperties, RetryPolicy},
        error::DispatchError,
    },
    std::{env, str::FromStr, time::Duration},
};

/// Everything needed to build one dispatcher and its HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub provider_url: String,
    pub account: AccountProperties,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl DispatcherConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, DispatchError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DispatchError> {
        let provider_url = required(&lookup, "PAYMENT_PROVIDER_URL")?;
        let account_name = required(&lookup, "ACCOUNT_NAME")?;
        let service_name =
            lookup("ACCOUNT_SERVICE_NAME").unwrap_or_else(|| "onlineStore".to_string());

        let average_processing_time =
            Duration::from_millis(parsed(&lookup, "ACCOUNT_AVG_PROCESSING_MS", 100u64)?);

        let account = AccountProperties {
            service_name,
            account_name,
            average_processing_time,
            rate_limit_per_sec: parsed(&lookup, "ACCOUNT_RATE_LIMIT_PER_SEC", 10usize)?,
            parallel_requests: parsed(&lookup, "ACCOUNT_PARALLEL_REQUESTS", 10usize)?,
            price: parsed(&lookup, "ACCOUNT_PRICE", 0i64)?,
            enabled: parsed(&lookup, "ACCOUNT_ENABLED", true)?,
        };
        account.validate()?;

        let retry = RetryPolicy::new(
            parsed(&lookup, "RETRY_MAX_ATTEMPTS", RetryPolicy::DEFAULT_MAX_ATTEMPTS)?,
            Duration::from_millis(parsed(
                &lookup,
                "RETRY_DELAY_MS",
                RetryPolicy::DEFAULT_DELAY.as_millis() as u64,
            )?),
        )?
        .respecting_deadline(parsed(&lookup, "RESPECT_DEADLINE", false)?);

        let request_timeout = match lookup("REQUEST_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_value("REQUEST_TIMEOUT_MS", &raw)?),
            None => average_processing_time * 2,
        };

        Ok(Self {
            provider_url,
            account,
            retry,
            request_timeout,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, DispatchError> {
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DispatchError::Config(format!("{key} must be set"))),
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, DispatchError> {
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, DispatchError> {
    raw.trim()
        .parse()
        .map_err(|_| DispatchError::Config(format!("{key} has invalid value: {raw}")))
}
