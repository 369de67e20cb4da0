use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("config: {0}")]
    Config(String),

    #[error("recorder: {0}")]
    Recorder(String),

    #[error("transport: {0}")]
    Transport(String),
}

/// Failure of a single network round-trip. Never leaves the attempt
/// executor: it is converted into a recorded outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timeout.")]
    Timeout,

    #[error("{0}")]
    Other(String),
}
