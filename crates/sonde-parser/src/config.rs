use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use sonde_domain::Record;
use std::collections::HashSet;

/// Envelope entry pattern that marks the payload-carrying record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadMarker {
    /// Entry whose variable equals the given name
    Variable(String),
    /// Entry whose metadata object contains the given key
    MetadataKey(String),
}

impl PayloadMarker {
    /// Parse the textual form: a "metadata." prefix names a metadata key,
    /// anything else a variable
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix("metadata.") {
            Some(key) => PayloadMarker::MetadataKey(key.to_string()),
            None => PayloadMarker::Variable(text.to_string()),
        }
    }

    /// Whether the given record is the payload carrier this marker names
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            PayloadMarker::Variable(name) => record.variable == *name,
            PayloadMarker::MetadataKey(key) => record
                .metadata
                .as_ref()
                .is_some_and(|metadata| metadata.contains_key(key)),
        }
    }
}

/// What the parser emits around produced records on success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeMode {
    /// Output only the produced records
    #[default]
    Replace,
    /// Output the original entries untouched, then the produced records
    Extend,
}

/// What the parser emits around the sentinel record on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Output only the sentinel
    #[default]
    Replace,
    /// Output the original entries, then the sentinel
    Append,
}

/// Parser behavior knobs
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Markers tried against every envelope entry, first match wins
    pub markers: Vec<PayloadMarker>,
    /// Field names the flattener drops everywhere
    pub ignored_fields: HashSet<String>,
    pub envelope_mode: EnvelopeMode,
    pub failure_mode: FailureMode,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            markers: parse_list(&default_markers())
                .map(PayloadMarker::parse)
                .collect(),
            ignored_fields: HashSet::new(),
            envelope_mode: EnvelopeMode::default(),
            failure_mode: FailureMode::default(),
        }
    }
}

impl ParserConfig {
    /// Load overrides from SONDE_-prefixed environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let env: EnvParserConfig = Config::builder()
            .add_source(Environment::with_prefix("SONDE"))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            markers: parse_list(&env.markers).map(PayloadMarker::parse).collect(),
            ignored_fields: parse_list(&env.ignored_fields)
                .map(str::to_string)
                .collect(),
            envelope_mode: parse_envelope_mode(&env.envelope_mode)?,
            failure_mode: parse_failure_mode(&env.failure_mode)?,
        })
    }
}

/// Environment shape of the parser configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
struct EnvParserConfig {
    /// Comma-separated markers; a "metadata." prefix matches a metadata key
    #[serde(default = "default_markers")]
    markers: String,

    /// Comma-separated field names the flattener drops
    #[serde(default)]
    ignored_fields: String,

    /// Success output: replace | extend
    #[serde(default = "default_mode")]
    envelope_mode: String,

    /// Failure output: replace | append
    #[serde(default = "default_mode")]
    failure_mode: String,
}

fn default_markers() -> String {
    "ttn_payload,payload,metadata.mqtt_topic".to_string()
}

fn default_mode() -> String {
    "replace".to_string()
}

fn parse_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_envelope_mode(text: &str) -> Result<EnvelopeMode, ConfigError> {
    match text {
        "replace" => Ok(EnvelopeMode::Replace),
        "extend" => Ok(EnvelopeMode::Extend),
        other => Err(ConfigError::Message(format!(
            "unknown envelope mode: {}",
            other
        ))),
    }
}

fn parse_failure_mode(text: &str) -> Result<FailureMode, ConfigError> {
    match text {
        "replace" => Ok(FailureMode::Replace),
        "append" => Ok(FailureMode::Append),
        other => Err(ConfigError::Message(format!(
            "unknown failure mode: {}",
            other
        ))),
    }
}
