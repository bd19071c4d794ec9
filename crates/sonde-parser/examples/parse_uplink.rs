//! End-to-end run of the uplink pipeline over one TTN-style message
//!
//! This example demonstrates:
//! - Declaring a fixed-width payload layout for a device type
//! - Decoding the raw payload and flattening auxiliary fields
//! - Per-gateway serie assignment for the metadata fan-out
//!
//! Run with: cargo run -p sonde-parser --example parse_uplink

use anyhow::Result;
use sonde_domain::{Record, ScalarValue, SystemSerieProvider};
use sonde_parser::{ParserConfig, UplinkParser};
use sonde_payload::{FieldSpec, LayoutDecoder, NumericKind, PayloadEncoding, PayloadLayout};
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let config = ParserConfig::from_env()?;

    // Environmental sensor contract: version byte, then two scaled readings
    let layout = PayloadLayout::new(vec![
        FieldSpec::new("protocol_version", 0, NumericKind::Uint8),
        FieldSpec::scaled("temperature", 1, NumericKind::Int16Be, 100.0, "°C"),
        FieldSpec::scaled("humidity", 3, NumericKind::Uint16Be, 100.0, "%"),
    ]);
    let decoder = LayoutDecoder::new(layout, PayloadEncoding::Hex);

    let parser = UplinkParser::new(
        config,
        Arc::new(decoder),
        Arc::new(SystemSerieProvider::default()),
    );

    let uplink = r#"{
        "payload_raw": "0109611395",
        "payload_fields": {"lat": 51.998, "lng": 4.379, "battery": 94},
        "metadata": {
            "gateways": [{"lat": 52.0, "lng": 4.35, "rssi": -53, "snr": 9.5}],
            "frequency": 868.1
        }
    }"#;

    let envelope = vec![Record {
        variable: "ttn_payload".to_string(),
        value: Some(ScalarValue::String(uplink.to_string())),
        ..Record::default()
    }];

    let records = parser.parse(envelope);
    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
