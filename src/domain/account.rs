use {
    super::error::DispatchError,
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

/// Static description of one external account. Never mutated after the
/// dispatcher is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProperties {
    pub service_name: String,
    pub account_name: String,
    #[serde(with = "millis")]
    pub average_processing_time: Duration,
    pub rate_limit_per_sec: usize,
    pub parallel_requests: usize,
    pub price: i64,
    pub enabled: bool,
}

impl AccountProperties {
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.account_name.trim().is_empty() {
            return Err(DispatchError::Config("account name must not be empty".into()));
        }
        if self.rate_limit_per_sec == 0 {
            return Err(DispatchError::Config(format!(
                "rate limit of {} must be at least 1",
                self.account_name
            )));
        }
        if self.parallel_requests == 0 {
            return Err(DispatchError::Config(format!(
                "parallel requests of {} must be at least 1",
                self.account_name
            )));
        }
        if self.price < 0 {
            return Err(DispatchError::Config(format!(
                "price of {} cannot be negative, got: {}",
                self.account_name, self.price
            )));
        }
        Ok(())
    }
}

/// Attempt budget and spacing. Fixed delay, not exponential: the defaults
/// fit two ~100 ms attempts and one pause inside a 3.5 s deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// Skip attempts that would start after the submission deadline.
    pub respect_deadline: bool,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self, DispatchError> {
        if max_attempts == 0 {
            return Err(DispatchError::Config("max_attempts must be at least 1".into()));
        }
        Ok(Self {
            max_attempts,
            delay,
            respect_deadline: false,
        })
    }

    pub fn respecting_deadline(mut self, respect: bool) -> Self {
        self.respect_deadline = respect;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            delay: Self::DEFAULT_DELAY,
            respect_deadline: false,
        }
    }
}

mod millis {
    use {
        serde::{Deserialize, Deserializer, Serializer},
        std::time::Duration,
    };

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
