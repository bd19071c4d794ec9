use crate::encoding::PayloadEncoding;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid {encoding} payload: {reason}")]
    Encoding {
        encoding: PayloadEncoding,
        reason: String,
    },

    #[error("field {field} needs {needed} bytes at offset {offset}, payload has {available}")]
    BufferUnderrun {
        field: String,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("field {field} needs token {index}, payload has {available} tokens")]
    MissingToken {
        field: String,
        index: usize,
        available: usize,
    },

    #[error("field {field} token {index} is not a number: {token:?}")]
    NonNumericToken {
        field: String,
        index: usize,
        token: String,
    },
}

pub type Result<T> = std::result::Result<T, PayloadError>;
