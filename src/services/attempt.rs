use {
    crate::domain::{
        error::{DispatchError, TransportError},
        payment::{AttemptOutcome, ProcessingResponse},
        provider::{PaymentTransport, ProcessingRequest, RawResponse},
        recorder::OutcomeRecorder,
    },
    crate::services::admission::AdmissionGate,
    chrono::Utc,
};

/// One network attempt: pass the gate, send, classify, record. The gate
/// permit lives until the outcome has been recorded and is dropped on
/// every return path.
pub async fn execute_attempt(
    gate: &AdmissionGate,
    transport: &dyn PaymentTransport,
    recorder: &dyn OutcomeRecorder,
    request: &ProcessingRequest,
) -> Result<AttemptOutcome, DispatchError> {
    let _permit = gate.acquire().await?;

    let outcome = classify(transport.send(request).await);

    recorder
        .record_outcome(
            request.payment_id,
            outcome.is_success(),
            Utc::now(),
            request.transaction_id,
            outcome.reason().map(str::to_owned),
        )
        .await
        .inspect_err(|e| {
            tracing::error!(
                payment_id = %request.payment_id,
                transaction_id = %request.transaction_id,
                error = %e,
                "failed to record attempt outcome"
            )
        })?;

    Ok(outcome)
}

/// Maps a transport result onto an attempt outcome. Never fails: a
/// malformed or missing body becomes `Errored`.
pub fn classify(result: Result<RawResponse, TransportError>) -> AttemptOutcome {
    match result {
        Err(e) => AttemptOutcome::Errored(e.to_string()),
        Ok(raw) => match serde_json::from_str::<ProcessingResponse>(&raw.body) {
            Ok(response) => response.into_outcome(),
            Err(e) => {
                tracing::warn!(status = raw.status, error = %e, "unreadable processing response");
                AttemptOutcome::Errored(format!(
                    "unreadable response (HTTP {}): {e}",
                    raw.status
                ))
            }
        },
    }
}
