pub mod field;
pub mod record;
pub mod serie;

pub use field::{FieldMap, FieldValue, OverrideField};
pub use record::{Location, Record, ScalarValue};
pub use serie::{SerieProvider, SystemSerieProvider};

#[cfg(any(test, feature = "testing"))]
pub use serie::MockSerieProvider;
