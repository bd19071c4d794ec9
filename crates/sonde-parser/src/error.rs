use sonde_payload::PayloadError;
use thiserror::Error;

/// Failures the parser contains and reports as a sentinel record
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("invalid payload envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("payload value is not text")]
    PayloadNotText,

    #[error(transparent)]
    Payload(#[from] PayloadError),
}
