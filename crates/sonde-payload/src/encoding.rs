use crate::error::{PayloadError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text encoding of a raw payload string
///
/// The encoding is its own decode step, so substituting one never touches
/// field extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    #[default]
    Hex,
    Base64,
}

impl PayloadEncoding {
    /// Decode payload text into raw bytes
    ///
    /// Malformed input (odd-length hex, non-hex characters, bad base64) is
    /// a [`PayloadError::Encoding`] failure, never a panic.
    pub fn decode(&self, raw: &str) -> Result<Vec<u8>> {
        match self {
            PayloadEncoding::Hex => hex::decode(raw).map_err(|err| PayloadError::Encoding {
                encoding: *self,
                reason: err.to_string(),
            }),
            PayloadEncoding::Base64 => {
                STANDARD.decode(raw).map_err(|err| PayloadError::Encoding {
                    encoding: *self,
                    reason: err.to_string(),
                })
            }
        }
    }
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadEncoding::Hex => f.write_str("hex"),
            PayloadEncoding::Base64 => f.write_str("base64"),
        }
    }
}
