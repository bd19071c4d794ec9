use crate::config::{EnvelopeMode, FailureMode, ParserConfig};
use crate::error::UplinkError;
use crate::flatten::flatten;
use crate::gateway::fan_out_gateways;
use crate::location::extract_location;
use serde::Deserialize;
use serde_json::{Map, Value};
use sonde_domain::{FieldMap, Record, ScalarValue, SerieProvider};
use sonde_payload::PayloadDecoder;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Variable name of the sentinel record reporting a contained failure
pub const PARSE_ERROR_VARIABLE: &str = "parse_error";

/// Vendor envelope wrapped inside the marker entry's value
#[derive(Debug, Default, Deserialize)]
struct UplinkEnvelope {
    payload_raw: Option<String>,
    payload_fields: Option<Map<String, Value>>,
    metadata: Option<Map<String, Value>>,
}

/// Service that normalizes one device uplink into flat records
///
/// Flow:
/// 1. Locate the payload-carrying entry via the configured markers
/// 2. Read the correlation serie from the entry, or synthesize one
/// 3. Unwrap the vendor envelope (a bare value is the raw payload itself)
/// 4. Decode the raw payload and flatten the typed fields
/// 5. Extract location from auxiliary fields, then flatten the rest
/// 6. Fan out gateway metadata under fresh series
/// 7. Emit decode, auxiliary, metadata, per the envelope mode
///
/// Failures caused by device bytes never escape: they come back as a
/// single `parse_error` record.
pub struct UplinkParser {
    config: ParserConfig,
    decoder: Arc<dyn PayloadDecoder>,
    series: Arc<dyn SerieProvider>,
}

impl UplinkParser {
    /// Create a new UplinkParser with dependencies
    pub fn new(
        config: ParserConfig,
        decoder: Arc<dyn PayloadDecoder>,
        series: Arc<dyn SerieProvider>,
    ) -> Self {
        Self {
            config,
            decoder,
            series,
        }
    }

    /// Run the pipeline over one input envelope
    ///
    /// An envelope without a payload-carrying entry passes through
    /// unchanged. Never returns an error: envelope and decode failures
    /// become the sentinel record, emitted per the configured failure
    /// mode.
    #[instrument(skip(self, envelope), fields(entries = envelope.len()))]
    pub fn parse(&self, envelope: Vec<Record>) -> Vec<Record> {
        // 1. Locate the payload-carrying entry
        let index = envelope.iter().position(|entry| {
            self.config
                .markers
                .iter()
                .any(|marker| marker.matches(entry))
        });
        let entry = match index {
            Some(index) => &envelope[index],
            None => {
                debug!("no payload marker matched, passing envelope through");
                return envelope;
            }
        };

        debug!(entry = %entry.variable, "processing uplink envelope");

        // 2. Read or synthesize the correlation serie
        let serie = match &entry.serie {
            Some(serie) => serie.clone(),
            None => self.series.sample_serie(),
        };

        match self.process(entry, &serie) {
            Ok(records) => match self.config.envelope_mode {
                EnvelopeMode::Replace => records,
                EnvelopeMode::Extend => {
                    let mut output = envelope;
                    output.extend(records);
                    output
                }
            },
            Err(err) => {
                warn!(error = %err, "uplink parse failed");
                let sentinel = Record {
                    variable: PARSE_ERROR_VARIABLE.to_string(),
                    value: Some(ScalarValue::String(err.to_string())),
                    serie: Some(serie),
                    ..Record::default()
                };
                match self.config.failure_mode {
                    FailureMode::Replace => vec![sentinel],
                    FailureMode::Append => {
                        let mut output = envelope;
                        output.push(sentinel);
                        output
                    }
                }
            }
        }
    }

    fn process(&self, entry: &Record, serie: &str) -> Result<Vec<Record>, UplinkError> {
        let text = match &entry.value {
            Some(ScalarValue::String(text)) => text,
            _ => return Err(UplinkError::PayloadNotText),
        };

        // 3. Unwrap: a bare value is the raw payload itself, a JSON object
        //    wraps it
        let trimmed = text.trim_start();
        let uplink = if trimmed.starts_with('{') {
            serde_json::from_str(trimmed)?
        } else {
            UplinkEnvelope {
                payload_raw: Some(text.clone()),
                ..UplinkEnvelope::default()
            }
        };

        let ignore = &self.config.ignored_fields;
        let mut records = Vec::new();

        // 4. Decode the raw payload
        match &uplink.payload_raw {
            Some(raw) => {
                let decoded = self.decoder.decode(raw)?;
                records.extend(flatten(&decoded.into_field_map(), serie, "", ignore));
            }
            None => debug!("uplink envelope carries no raw payload"),
        }

        // 5. Auxiliary fields, location first so its keys are not re-emitted
        if let Some(fields) = uplink.payload_fields {
            let fields = FieldMap::from_json(fields);
            match extract_location(&fields, serie, "") {
                Some((location, reduced)) => {
                    records.push(location);
                    records.extend(flatten(&reduced, serie, "", ignore));
                }
                None => records.extend(flatten(&fields, serie, "", ignore)),
            }
        }

        // 6. Gateway metadata
        if let Some(metadata) = uplink.metadata {
            records.extend(fan_out_gateways(
                metadata,
                serie,
                self.series.as_ref(),
                ignore,
            ));
        }

        Ok(records)
    }
}
