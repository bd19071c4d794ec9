use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use rand::RngCore;

/// Random bytes behind a gateway serie (96 bits)
const GATEWAY_SERIE_BYTES: usize = 12;

/// Trait for synthesizing correlation keys ("series")
///
/// The two sources of non-determinism in the pipeline, wall clock and
/// randomness, live behind this seam so tests can pin them down.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SerieProvider: Send + Sync {
    /// Serie shared by every record derived from one uplink
    fn sample_serie(&self) -> String;

    /// Fresh serie for one gateway report, distinct on every call
    fn gateway_serie(&self) -> String;
}

/// System clock and RNG backed implementation of SerieProvider
pub struct SystemSerieProvider;

impl SystemSerieProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemSerieProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SerieProvider for SystemSerieProvider {
    fn sample_serie(&self) -> String {
        Utc::now().timestamp_millis().to_string()
    }

    fn gateway_serie(&self) -> String {
        let mut random_bytes = [0u8; GATEWAY_SERIE_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        // Encode as URL-safe base64 (no padding)
        URL_SAFE_NO_PAD.encode(random_bytes)
    }
}
