use sonde_domain::{MockSerieProvider, Record, ScalarValue, SerieProvider, SystemSerieProvider};
use sonde_parser::{ParserConfig, UplinkParser, PARSE_ERROR_VARIABLE};
use sonde_payload::{
    DelimitedDecoder, FieldSpec, LayoutDecoder, NumericKind, PayloadEncoding, PayloadLayout,
    TokenSpec,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Helper: the environmental sensor contract used across the suite
fn environmental_layout() -> PayloadLayout {
    PayloadLayout::new(vec![
        FieldSpec::new("protocol_version", 0, NumericKind::Uint8),
        FieldSpec::scaled("temperature", 1, NumericKind::Int16Be, 100.0, "°C"),
        FieldSpec::scaled("humidity", 3, NumericKind::Uint16Be, 100.0, "%"),
    ])
}

fn environmental_parser(series: Arc<dyn SerieProvider>) -> UplinkParser {
    let decoder = LayoutDecoder::new(environmental_layout(), PayloadEncoding::Hex);
    UplinkParser::new(ParserConfig::default(), Arc::new(decoder), series)
}

/// Helper: the comma-separated text contract MQTT field gateways report
fn delimited_parser(series: Arc<dyn SerieProvider>) -> UplinkParser {
    let decoder = DelimitedDecoder::comma(vec![
        TokenSpec::with_unit("temperature", 1, "°C"),
        TokenSpec::with_unit("humidity", 3, "%"),
    ]);
    UplinkParser::new(ParserConfig::default(), Arc::new(decoder), series)
}

fn text_entry(variable: &str, value: &str) -> Record {
    Record {
        variable: variable.to_string(),
        value: Some(ScalarValue::String(value.to_string())),
        ..Record::default()
    }
}

#[test]
fn test_reference_uplink_decodes_under_one_synthesized_serie() {
    let parser = environmental_parser(Arc::new(SystemSerieProvider::default()));

    let output = parser.parse(vec![text_entry(
        "ttn_payload",
        r#"{"payload_raw":"0109611395"}"#,
    )]);

    assert_eq!(output.len(), 3);
    assert_eq!(output[0].variable, "protocol_version");
    assert_eq!(output[0].value, Some(ScalarValue::Int(1)));
    assert_eq!(output[1].variable, "temperature");
    assert_eq!(output[1].value, Some(ScalarValue::Float(24.01)));
    assert_eq!(output[1].unit, Some("°C".to_string()));
    assert_eq!(output[2].variable, "humidity");
    assert_eq!(output[2].value, Some(ScalarValue::Float(50.13)));
    assert_eq!(output[2].unit, Some("%".to_string()));

    let serie = output[0].serie.as_deref().expect("synthesized serie");
    assert!(!serie.is_empty());
    assert!(output.iter().all(|r| r.serie.as_deref() == Some(serie)));
}

#[test]
fn test_malformed_payload_yields_exactly_one_error_record() {
    let parser = environmental_parser(Arc::new(SystemSerieProvider::default()));

    let output = parser.parse(vec![text_entry("ttn_payload", r#"{"payload_raw":"zz"}"#)]);

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].variable, PARSE_ERROR_VARIABLE);
    match &output[0].value {
        Some(ScalarValue::String(message)) => {
            assert!(message.contains("invalid hex payload"), "got: {}", message);
        }
        other => panic!("expected text value, got {:?}", other),
    }
}

#[test]
fn test_gateway_metadata_fans_out_under_fresh_series() {
    // Arrange
    let mut series = MockSerieProvider::new();
    series
        .expect_gateway_serie()
        .times(1)
        .return_once(|| "gtw-serie".to_string());
    let parser = environmental_parser(Arc::new(series));

    let mut entry = text_entry(
        "ttn_payload",
        r#"{"metadata":{"gateways":[{"lat":1,"lng":2,"rssi":-80}],"channel":3}}"#,
    );
    entry.serie = Some("s0".to_string());

    // Act
    let output = parser.parse(vec![entry]);

    // Assert
    let names: Vec<&str> = output.iter().map(|r| r.variable.as_str()).collect();
    assert_eq!(names, vec!["gtw_location", "gtw_rssi", "channel"]);
    assert_eq!(output[0].serie, Some("gtw-serie".to_string()));
    assert_eq!(
        output[0].value,
        Some(ScalarValue::String("1, 2".to_string()))
    );
    assert_eq!(output[1].serie, Some("gtw-serie".to_string()));
    assert_eq!(output[1].value, Some(ScalarValue::Int(-80)));
    assert_eq!(output[2].serie, Some("s0".to_string()));
    assert_eq!(output[2].value, Some(ScalarValue::Int(3)));
}

#[test]
fn test_multiple_gateways_get_distinct_series() {
    let parser = environmental_parser(Arc::new(SystemSerieProvider::default()));

    let mut entry = text_entry(
        "ttn_payload",
        r#"{"metadata":{"gateways":[{"rssi":-80},{"rssi":-82},{"rssi":-85}]}}"#,
    );
    entry.serie = Some("s0".to_string());

    let output = parser.parse(vec![entry]);

    assert_eq!(output.len(), 3);
    let series: HashSet<&str> = output.iter().filter_map(|r| r.serie.as_deref()).collect();
    assert_eq!(series.len(), 3);
    assert!(!series.contains("s0"));
}

#[test]
fn test_full_uplink_concatenates_decode_fields_then_metadata() {
    // Arrange
    let mut series = MockSerieProvider::new();
    series
        .expect_sample_serie()
        .times(1)
        .return_once(|| "sample".to_string());
    series
        .expect_gateway_serie()
        .times(1)
        .return_once(|| "gtw".to_string());
    let parser = environmental_parser(Arc::new(series));

    let value = r#"{
        "payload_raw": "0109611395",
        "payload_fields": {"latitude": 51.9, "longitude": 4.48, "battery": {"value": 3.7, "unit": "V"}},
        "metadata": {"gateways": [{"lat": 1, "lng": 2, "rssi": -80}], "frequency": 868.1}
    }"#;

    // Act
    let output = parser.parse(vec![text_entry("ttn_payload", value)]);

    // Assert
    let names: Vec<&str> = output.iter().map(|r| r.variable.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "protocol_version",
            "temperature",
            "humidity",
            "location",
            "battery",
            "gtw_location",
            "gtw_rssi",
            "frequency"
        ]
    );

    assert_eq!(
        output[3].value,
        Some(ScalarValue::String("51.9, 4.48".to_string()))
    );
    assert_eq!(output[3].serie, Some("sample".to_string()));
    assert_eq!(output[4].unit, Some("V".to_string()));
    assert_eq!(output[4].serie, Some("sample".to_string()));
    assert_eq!(output[5].serie, Some("gtw".to_string()));
    assert_eq!(output[6].serie, Some("gtw".to_string()));
    assert_eq!(output[7].serie, Some("sample".to_string()));
}

#[test]
fn test_bare_hex_value_decodes_directly() {
    let parser = environmental_parser(Arc::new(SystemSerieProvider::default()));

    let output = parser.parse(vec![text_entry("payload", "0109611395")]);

    assert_eq!(output.len(), 3);
    assert_eq!(output[1].variable, "temperature");
    assert_eq!(output[1].value, Some(ScalarValue::Float(24.01)));
}

#[test]
fn test_whitespace_padded_json_envelope_decodes() {
    let parser = environmental_parser(Arc::new(SystemSerieProvider::default()));

    let output = parser.parse(vec![text_entry(
        "ttn_payload",
        r#" {"payload_raw":"0109611395"}"#,
    )]);

    assert_eq!(output.len(), 3);
    assert_eq!(output[1].variable, "temperature");
    assert_eq!(output[1].value, Some(ScalarValue::Float(24.01)));
}

#[test]
fn test_comma_separated_payload_decodes_named_fields() {
    // Arrange
    let mut series = MockSerieProvider::new();
    series
        .expect_sample_serie()
        .times(1)
        .return_once(|| "1692000000000".to_string());
    let parser = delimited_parser(Arc::new(series));

    let envelope: Vec<Record> = serde_json::from_str(
        r#"[{ "variable": "payload", "value": "temp,12,hum,50", "metadata": { "mqtt_topic": "data" } }]"#,
    )
    .unwrap();

    // Act
    let output = parser.parse(envelope);

    // Assert
    assert_eq!(output.len(), 2);
    assert_eq!(output[0].variable, "temperature");
    assert_eq!(output[0].value, Some(ScalarValue::Int(12)));
    assert_eq!(output[0].unit, Some("°C".to_string()));
    assert_eq!(output[0].serie, Some("1692000000000".to_string()));
    assert_eq!(output[1].variable, "humidity");
    assert_eq!(output[1].value, Some(ScalarValue::Int(50)));
    assert_eq!(output[1].unit, Some("%".to_string()));
    assert_eq!(output[1].serie, Some("1692000000000".to_string()));
}

#[test]
fn test_non_numeric_token_yields_one_error_record() {
    let parser = delimited_parser(Arc::new(SystemSerieProvider::default()));

    let output = parser.parse(vec![text_entry("payload", "temp,warm,hum,50")]);

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].variable, PARSE_ERROR_VARIABLE);
    match &output[0].value {
        Some(ScalarValue::String(message)) => {
            assert!(message.contains("is not a number"), "got: {}", message);
        }
        other => panic!("expected text value, got {:?}", other),
    }
}

#[test]
fn test_envelope_without_marker_passes_through() {
    let parser = environmental_parser(Arc::new(SystemSerieProvider::default()));
    let envelope = vec![text_entry("temperature", "21.5"), text_entry("humidity", "40")];

    assert_eq!(parser.parse(envelope.clone()), envelope);
}

#[test]
fn test_output_records_serialize_to_platform_shape() {
    // Arrange
    let mut series = MockSerieProvider::new();
    series
        .expect_sample_serie()
        .times(1)
        .return_once(|| "1692000000000".to_string());
    let parser = environmental_parser(Arc::new(series));

    // Act
    let output = parser.parse(vec![text_entry(
        "ttn_payload",
        r#"{"payload_raw":"0109611395"}"#,
    )]);

    // Assert: absent attributes are omitted, not nulled
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(
        json[1],
        serde_json::json!({
            "variable": "temperature",
            "value": 24.01,
            "serie": "1692000000000",
            "unit": "°C"
        })
    );
}
