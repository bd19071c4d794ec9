use sonde_domain::{FieldMap, FieldValue, Record};
use std::collections::HashSet;

/// Flatten an ordered field map into records under the given serie
///
/// Keys in `ignore` are skipped entirely. `prefix` is prepended to every
/// derived variable name. Override attributes win over the derived
/// defaults; attributes an override leaves out stay absent on the record,
/// except the serie, which falls back to the ambient one.
pub fn flatten(
    fields: &FieldMap,
    serie: &str,
    prefix: &str,
    ignore: &HashSet<String>,
) -> Vec<Record> {
    let mut records = Vec::with_capacity(fields.len());

    for (key, value) in fields.iter() {
        if ignore.contains(key) {
            continue;
        }

        match value {
            FieldValue::Scalar(scalar) => records.push(Record {
                variable: format!("{}{}", prefix, key),
                value: Some(scalar.clone()),
                serie: Some(serie.to_string()),
                ..Record::default()
            }),
            FieldValue::Override(field) => records.push(Record {
                variable: field
                    .variable
                    .clone()
                    .unwrap_or_else(|| format!("{}{}", prefix, key)),
                value: field.value.clone(),
                serie: field.serie.clone().or_else(|| Some(serie.to_string())),
                unit: field.unit.clone(),
                location: field.location,
                metadata: field.metadata.clone(),
                time: None,
            }),
        }
    }

    records
}
