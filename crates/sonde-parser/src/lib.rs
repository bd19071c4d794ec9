pub mod config;
mod error;
pub mod flatten;
pub mod gateway;
pub mod location;
pub mod uplink;

pub use config::{EnvelopeMode, FailureMode, ParserConfig, PayloadMarker};
pub use error::UplinkError;
pub use flatten::flatten;
pub use gateway::{fan_out_gateways, GATEWAY_PREFIX};
pub use location::extract_location;
pub use uplink::{UplinkParser, PARSE_ERROR_VARIABLE};
