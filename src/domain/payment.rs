use {
    super::id::{PaymentId, TransactionId},
    super::money::MoneyAmount,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// One payment submission cycle as handed over by the upstream scheduler.
/// Lives for the duration of a single `perform_payment` call.
#[derive(Debug, Clone)]
pub struct Submission {
    payment_id: PaymentId,
    amount: MoneyAmount,
    started_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        payment_id: PaymentId,
        amount: MoneyAmount,
        started_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        if deadline < started_at {
            tracing::warn!(
                payment_id = %payment_id,
                %started_at,
                %deadline,
                "payment handed over with deadline already before its start"
            );
        }
        Self {
            payment_id,
            amount,
            started_at,
            deadline,
        }
    }

    pub fn payment_id(&self) -> PaymentId {
        self.payment_id
    }

    pub fn amount(&self) -> MoneyAmount {
        self.amount
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Time spent since the caller began the cycle, clamped at zero.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.started_at).to_std().unwrap_or_default()
    }
}

/// Terminal classification of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    /// Well-formed response with `result = false`.
    Failed(String),
    /// Timeout, transport fault or unreadable response.
    Errored(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Succeeded => None,
            Self::Failed(reason) | Self::Errored(reason) => Some(reason),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
            Self::Errored(_) => "errored",
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {reason}", self.as_str()),
            None => f.write_str(self.as_str()),
        }
    }
}

/// What the recorder holds for a payment. Errored attempts arrive as
/// unsuccessful with a reason and are stored as `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Succeeded,
    Failed(String),
}

/// Retry controller state, exposed for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Pending,
    Attempting,
    Retrying,
    Succeeded,
    Exhausted,
}

impl ControllerState {
    /// Legal transitions of the attempt loop.
    pub fn can_transition_to(&self, next: &ControllerState) -> bool {
        use ControllerState::*;
        matches!(
            (self, next),
            (Pending, Attempting)
                | (Attempting, Succeeded)
                | (Attempting, Retrying)
                | (Attempting, Exhausted)
                | (Retrying, Attempting)
        )
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Attempting => "attempting",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::Exhausted => "exhausted",
        };
        f.write_str(s)
    }
}

/// Wire envelope returned by the payment endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResponse {
    pub result: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl ProcessingResponse {
    pub fn into_outcome(self) -> AttemptOutcome {
        if self.result {
            AttemptOutcome::Succeeded
        } else {
            AttemptOutcome::Failed(self.message.unwrap_or_default())
        }
    }
}
