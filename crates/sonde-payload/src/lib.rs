pub mod decoder;
pub mod encoding;
mod error;
pub mod layout;
pub mod text;

pub use decoder::{DecodedField, DecodedFieldSet, LayoutDecoder};
pub use encoding::PayloadEncoding;
pub use error::{PayloadError, Result};
pub use layout::{FieldSpec, NumericKind, PayloadLayout};
pub use text::{DelimitedDecoder, TokenSpec};

/// Trait for decoding raw payload text into typed fields
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PayloadDecoder: Send + Sync {
    /// Decode payload text into the field set the device contract declares
    fn decode(&self, raw: &str) -> Result<DecodedFieldSet>;
}
