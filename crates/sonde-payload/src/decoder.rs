//! Layout-driven payload decoder.
//!
//! A [`LayoutDecoder`] turns a raw payload string into typed fields in three
//! steps: decode the text encoding into bytes, read each declared field at
//! its offset with its kind's width and signedness, then apply the field's
//! scale divisor. Decoding is total over well-formed input of sufficient
//! length; every failure mode comes back as a [`PayloadError`].
//!
//! # Field extraction
//!
//! Each field reads exactly `kind.width()` bytes big-endian starting at its
//! declared offset. Fields may overlap or leave gaps; trailing bytes beyond
//! the last field are ignored. An unscaled field (scale 1) keeps its integer
//! type, a scaled one becomes a float (e.g. raw / 100 recovers two decimal
//! places).

use crate::encoding::PayloadEncoding;
use crate::error::{PayloadError, Result};
use crate::layout::{FieldSpec, PayloadLayout};
use crate::PayloadDecoder;
use sonde_domain::{FieldMap, FieldValue, OverrideField, ScalarValue};

/// One decoded payload field
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub name: String,
    pub value: ScalarValue,
    pub unit: Option<String>,
}

/// Ordered set of decoded fields, one per layout field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedFieldSet {
    pub fields: Vec<DecodedField>,
}

impl DecodedFieldSet {
    /// Convert into the flattener's input shape, carrying units through
    pub fn into_field_map(self) -> FieldMap {
        let mut map = FieldMap::new();
        for field in self.fields {
            map.insert(
                field.name,
                FieldValue::Override(OverrideField {
                    value: Some(field.value),
                    unit: field.unit,
                    ..OverrideField::default()
                }),
            );
        }
        map
    }
}

/// Decoder driven by a declared fixed-width layout
#[derive(Debug, Clone)]
pub struct LayoutDecoder {
    layout: PayloadLayout,
    encoding: PayloadEncoding,
}

impl LayoutDecoder {
    pub fn new(layout: PayloadLayout, encoding: PayloadEncoding) -> Self {
        Self { layout, encoding }
    }

    fn decode_field(spec: &FieldSpec, bytes: &[u8]) -> Result<DecodedField> {
        let width = spec.kind.width();
        if bytes.len() < spec.offset + width {
            return Err(PayloadError::BufferUnderrun {
                field: spec.name.clone(),
                offset: spec.offset,
                needed: width,
                available: bytes.len(),
            });
        }

        let raw = spec.kind.extract(&bytes[spec.offset..spec.offset + width]);
        let value = if spec.scale == 1.0 {
            ScalarValue::Int(raw)
        } else {
            ScalarValue::Float(raw as f64 / spec.scale)
        };

        Ok(DecodedField {
            name: spec.name.clone(),
            value,
            unit: spec.unit.clone(),
        })
    }
}

impl PayloadDecoder for LayoutDecoder {
    fn decode(&self, raw: &str) -> Result<DecodedFieldSet> {
        let bytes = self.encoding.decode(raw)?;

        let mut fields = Vec::with_capacity(self.layout.fields.len());
        for spec in &self.layout.fields {
            fields.push(Self::decode_field(spec, &bytes)?);
        }

        Ok(DecodedFieldSet { fields })
    }
}
