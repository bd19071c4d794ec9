use sonde_domain::{FieldMap, FieldValue, Location, Record, ScalarValue};

const LOCATION_KEYS: [&str; 4] = ["lat", "lng", "latitude", "longitude"];

/// Pull a coordinate pair out of a field map as one location record
///
/// Recognizes `lat`/`lng` and `latitude`/`longitude`, case-sensitively,
/// with the short form winning when both are present. Both values must
/// be numeric scalars. On a match, returns the record and a reduced copy
/// of the map with all four key names removed so the flattening step
/// that follows does not re-emit them. No match returns `None` and the
/// caller keeps its map as-is.
pub fn extract_location(
    fields: &FieldMap,
    serie: &str,
    prefix: &str,
) -> Option<(Record, FieldMap)> {
    let short = (numeric_field(fields, "lat"), numeric_field(fields, "lng"));
    let (lat, lng) = match short {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => match (
            numeric_field(fields, "latitude"),
            numeric_field(fields, "longitude"),
        ) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return None,
        },
    };

    let mut reduced = fields.clone();
    for key in LOCATION_KEYS {
        reduced.remove(key);
    }

    let record = Record {
        variable: format!("{}location", prefix),
        value: Some(ScalarValue::String(format!("{}, {}", lat, lng))),
        serie: Some(serie.to_string()),
        location: Some(Location { lat, lng }),
        ..Record::default()
    };

    Some((record, reduced))
}

fn numeric_field(fields: &FieldMap, key: &str) -> Option<f64> {
    match fields.get(key)? {
        FieldValue::Scalar(scalar) => scalar.as_f64(),
        FieldValue::Override(_) => None,
    }
}
