use {
    super::error::TransportError,
    super::id::{PaymentId, TransactionId},
    super::money::MoneyAmount,
    std::{future::Future, pin::Pin},
};

/// Outbound call to the payment endpoint. Carried as query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingRequest {
    pub service_name: String,
    pub account_name: String,
    pub transaction_id: TransactionId,
    pub payment_id: PaymentId,
    pub amount: MoneyAmount,
}

impl ProcessingRequest {
    pub fn query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("serviceName", self.service_name.clone()),
            ("accountName", self.account_name.clone()),
            ("transactionId", self.transaction_id.to_string()),
            ("paymentId", self.payment_id.to_string()),
            ("amount", self.amount.to_string()),
        ]
    }
}

/// Raw reply; the body is decoded by the attempt executor.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub trait PaymentTransport: Send + Sync {
    fn send(
        &self,
        request: &ProcessingRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + '_>>;
}
