use {
    derive_more::Display,
    serde::{Deserialize, Serialize},
    std::str::FromStr,
    uuid::Uuid,
};

use super::error::DispatchError;

/// Key of one payment submission cycle, shared by all of its attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PaymentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for PaymentId {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DispatchError::Validation(format!("invalid payment id {s}: {e}")))
    }
}

/// Identifier of a single attempt. Minted fresh for every retry so the
/// provider can tell attempts of the same payment apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn mint() -> Self {
        Self(Uuid::now_v7())
    }
}
