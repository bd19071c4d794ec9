//! Delimited-text payload decoder.
//!
//! Some MQTT field gateways report readings as separator-joined text
//! (`"temp,12,hum,50"`) rather than an encoded byte buffer. A
//! [`DelimitedDecoder`] declares, per field, which token position holds
//! the value; label tokens and anything else in the string are ignored.
//! Tokens are trimmed and parsed as numbers, keeping the integer type
//! when the text carries no fraction. Every failure mode comes back as a
//! [`PayloadError`].

use crate::decoder::{DecodedField, DecodedFieldSet};
use crate::error::{PayloadError, Result};
use crate::PayloadDecoder;
use serde::{Deserialize, Serialize};
use sonde_domain::ScalarValue;

/// One field of a delimited text payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSpec {
    /// Output variable name
    pub name: String,
    /// Zero-based token position of the value
    pub index: usize,
    /// Unit attached to the decoded record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl TokenSpec {
    /// Field without a unit
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            unit: None,
        }
    }

    /// Field reported in `unit`
    pub fn with_unit(name: impl Into<String>, index: usize, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index,
            unit: Some(unit.into()),
        }
    }
}

/// Decoder driven by token positions in separator-joined text
///
/// The payload text is consumed directly; there is no byte-decoding
/// step.
#[derive(Debug, Clone)]
pub struct DelimitedDecoder {
    fields: Vec<TokenSpec>,
    delimiter: char,
}

impl DelimitedDecoder {
    pub fn new(fields: Vec<TokenSpec>, delimiter: char) -> Self {
        Self { fields, delimiter }
    }

    /// Comma-separated decoder, the common gateway convention
    pub fn comma(fields: Vec<TokenSpec>) -> Self {
        Self::new(fields, ',')
    }

    fn decode_field(spec: &TokenSpec, tokens: &[&str]) -> Result<DecodedField> {
        let token = tokens
            .get(spec.index)
            .ok_or_else(|| PayloadError::MissingToken {
                field: spec.name.clone(),
                index: spec.index,
                available: tokens.len(),
            })?;

        let value = parse_number(token).ok_or_else(|| PayloadError::NonNumericToken {
            field: spec.name.clone(),
            index: spec.index,
            token: (*token).to_string(),
        })?;

        Ok(DecodedField {
            name: spec.name.clone(),
            value,
            unit: spec.unit.clone(),
        })
    }
}

/// Integer tokens stay integers, anything else must read as a float
fn parse_number(token: &str) -> Option<ScalarValue> {
    if let Ok(int) = token.parse::<i64>() {
        return Some(ScalarValue::Int(int));
    }
    token.parse::<f64>().ok().map(ScalarValue::Float)
}

impl PayloadDecoder for DelimitedDecoder {
    fn decode(&self, raw: &str) -> Result<DecodedFieldSet> {
        let tokens: Vec<&str> = raw.split(self.delimiter).map(str::trim).collect();

        let mut fields = Vec::with_capacity(self.fields.len());
        for spec in &self.fields {
            fields.push(Self::decode_field(spec, &tokens)?);
        }

        Ok(DecodedFieldSet { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environmental_fields() -> Vec<TokenSpec> {
        vec![
            TokenSpec::with_unit("temperature", 1, "°C"),
            TokenSpec::with_unit("humidity", 3, "%"),
        ]
    }

    #[test]
    fn test_decode_comma_separated_payload() {
        let decoder = DelimitedDecoder::comma(environmental_fields());

        // Tokens: ["temp", "12", "hum", "50"], values at 1 and 3
        let decoded = decoder.decode("temp,12,hum,50").unwrap();

        assert_eq!(decoded.fields.len(), 2);
        assert_eq!(decoded.fields[0].name, "temperature");
        assert_eq!(decoded.fields[0].value, ScalarValue::Int(12));
        assert_eq!(decoded.fields[0].unit, Some("°C".to_string()));
        assert_eq!(decoded.fields[1].name, "humidity");
        assert_eq!(decoded.fields[1].value, ScalarValue::Int(50));
        assert_eq!(decoded.fields[1].unit, Some("%".to_string()));
    }

    #[test]
    fn test_decode_fractional_token_becomes_float() {
        let decoder = DelimitedDecoder::comma(vec![TokenSpec::new("temperature", 1)]);
        let decoded = decoder.decode("temp,12.5").unwrap();
        assert_eq!(decoded.fields[0].value, ScalarValue::Float(12.5));
    }

    #[test]
    fn test_decode_negative_token() {
        let decoder = DelimitedDecoder::comma(vec![TokenSpec::new("rssi", 0)]);
        let decoded = decoder.decode("-80").unwrap();
        assert_eq!(decoded.fields[0].value, ScalarValue::Int(-80));
    }

    #[test]
    fn test_decode_trims_whitespace_around_tokens() {
        let decoder = DelimitedDecoder::comma(vec![TokenSpec::new("temperature", 1)]);
        let decoded = decoder.decode("temp, 12 ,hum,50").unwrap();
        assert_eq!(decoded.fields[0].value, ScalarValue::Int(12));
    }

    #[test]
    fn test_decode_ignores_unclaimed_tokens() {
        let decoder = DelimitedDecoder::comma(vec![TokenSpec::new("humidity", 3)]);
        let decoded = decoder.decode("temp,12,hum,50,extra").unwrap();
        assert_eq!(decoded.fields.len(), 1);
        assert_eq!(decoded.fields[0].value, ScalarValue::Int(50));
    }

    #[test]
    fn test_decode_missing_token_reports_field() {
        let decoder = DelimitedDecoder::comma(environmental_fields());

        // Two tokens: enough for temperature, not for humidity
        let result = decoder.decode("temp,12");
        match result {
            Err(PayloadError::MissingToken {
                field,
                index,
                available,
            }) => {
                assert_eq!(field, "humidity");
                assert_eq!(index, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected missing token, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_non_numeric_token_is_an_error() {
        let decoder = DelimitedDecoder::comma(vec![TokenSpec::new("temperature", 1)]);
        let result = decoder.decode("temp,warm");
        match result {
            Err(PayloadError::NonNumericToken {
                field,
                index,
                token,
            }) => {
                assert_eq!(field, "temperature");
                assert_eq!(index, 1);
                assert_eq!(token, "warm");
            }
            other => panic!("expected non-numeric token, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_token_is_an_error() {
        let decoder = DelimitedDecoder::comma(vec![TokenSpec::new("temperature", 1)]);
        let result = decoder.decode("temp,,hum,50");
        assert!(matches!(
            result,
            Err(PayloadError::NonNumericToken { .. })
        ));
    }

    #[test]
    fn test_decode_custom_delimiter() {
        let decoder = DelimitedDecoder::new(vec![TokenSpec::new("count", 1)], ';');
        let decoded = decoder.decode("count;42").unwrap();
        assert_eq!(decoded.fields[0].value, ScalarValue::Int(42));
    }

    #[test]
    fn test_decode_empty_field_list_yields_no_fields() {
        let decoder = DelimitedDecoder::comma(vec![]);
        let decoded = decoder.decode("temp,12").unwrap();
        assert!(decoded.fields.is_empty());
    }

    #[test]
    fn test_into_field_map_keeps_declaration_order() {
        let decoder = DelimitedDecoder::comma(environmental_fields());
        let fields = decoder.decode("temp,12,hum,50").unwrap().into_field_map();

        let keys: Vec<&str> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["temperature", "humidity"]);
    }

    #[test]
    fn test_token_spec_deserializes_without_unit() {
        let spec: TokenSpec =
            serde_json::from_str(r#"{"name": "temperature", "index": 1}"#).unwrap();
        assert_eq!(spec, TokenSpec::new("temperature", 1));
    }
}
