use crate::flatten::flatten;
use crate::location::extract_location;
use serde_json::{Map, Value};
use sonde_domain::{FieldMap, Record, SerieProvider};
use std::collections::HashSet;
use tracing::warn;

/// Key prefix for records derived from gateway entries
pub const GATEWAY_PREFIX: &str = "gtw_";

const GATEWAYS_KEY: &str = "gateways";

/// Fan out gateway reports into per-gateway record groups
///
/// Each gateway entry gets a fresh serie so reports of the same uplink
/// by different gateways do not collide in a time-series group; location
/// extraction and flattening run per entry with the `gtw_` prefix. The
/// remaining metadata flattens last under `default_serie`, no prefix.
/// Without a `gateways` key nothing is emitted at all.
pub fn fan_out_gateways(
    mut metadata: Map<String, Value>,
    default_serie: &str,
    series: &dyn SerieProvider,
    ignore: &HashSet<String>,
) -> Vec<Record> {
    let gateways = match metadata.shift_remove(GATEWAYS_KEY) {
        Some(value) => value,
        None => return Vec::new(),
    };

    let mut records = Vec::new();

    match gateways {
        Value::Array(entries) => {
            for (index, entry) in entries.into_iter().enumerate() {
                match entry {
                    Value::Object(map) => {
                        let serie = series.gateway_serie();
                        let fields = FieldMap::from_json(map);
                        match extract_location(&fields, &serie, GATEWAY_PREFIX) {
                            Some((location, reduced)) => {
                                records.push(location);
                                records.extend(flatten(&reduced, &serie, GATEWAY_PREFIX, ignore));
                            }
                            None => {
                                records.extend(flatten(&fields, &serie, GATEWAY_PREFIX, ignore));
                            }
                        }
                    }
                    other => {
                        warn!(index = index, value = %other, "skipping non-object gateway entry");
                    }
                }
            }
        }
        other => {
            warn!(value = %other, "gateways value is not an array");
        }
    }

    let rest = FieldMap::from_json(metadata);
    records.extend(flatten(&rest, default_serie, "", ignore));

    records
}
