use {
    super::error::DispatchError,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Strictly positive amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MoneyAmount(i64);

impl MoneyAmount {
    pub fn new(minor_units: i64) -> Result<Self, DispatchError> {
        if minor_units <= 0 {
            return Err(DispatchError::Validation(format!(
                "MoneyAmount must be positive, got: {minor_units}"
            )));
        }
        Ok(Self(minor_units))
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for MoneyAmount {
    type Error = DispatchError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MoneyAmount> for i64 {
    fn from(amount: MoneyAmount) -> Self {
        amount.0
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
