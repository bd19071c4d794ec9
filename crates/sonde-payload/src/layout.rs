use serde::{Deserialize, Serialize};

/// Numeric interpretation of a fixed-width payload field
///
/// The kind fixes the byte width, so a layout cannot declare a width that
/// disagrees with its signedness. Multi-byte kinds are big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Int8,
    Uint8,
    Int16Be,
    Uint16Be,
    Int24Be,
    Uint24Be,
    Int32Be,
    Uint32Be,
}

impl NumericKind {
    /// Byte width of the encoded field
    pub fn width(&self) -> usize {
        match self {
            NumericKind::Int8 | NumericKind::Uint8 => 1,
            NumericKind::Int16Be | NumericKind::Uint16Be => 2,
            NumericKind::Int24Be | NumericKind::Uint24Be => 3,
            NumericKind::Int32Be | NumericKind::Uint32Be => 4,
        }
    }

    /// Extract the field value from `data`, which must hold at least
    /// `width()` bytes
    pub(crate) fn extract(&self, data: &[u8]) -> i64 {
        match self {
            NumericKind::Int8 => i64::from(data[0] as i8),
            NumericKind::Uint8 => i64::from(data[0]),
            NumericKind::Int16Be => i64::from(read_i16_be(data)),
            NumericKind::Uint16Be => i64::from(read_u16_be(data)),
            NumericKind::Int24Be => i64::from(read_i24_be(data)),
            NumericKind::Uint24Be => i64::from(read_u24_be(data)),
            NumericKind::Int32Be => i64::from(read_i32_be(data)),
            NumericKind::Uint32Be => i64::from(read_u32_be(data)),
        }
    }
}

/// One field of a payload layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output variable name
    pub name: String,
    /// Byte offset from the start of the payload
    pub offset: usize,
    /// Numeric interpretation, which also fixes the byte width
    pub kind: NumericKind,
    /// Divisor applied to the raw integer (1 = unscaled)
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Unit attached to the decoded record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

fn default_scale() -> f64 {
    1.0
}

impl FieldSpec {
    /// Unscaled field without a unit
    pub fn new(name: impl Into<String>, offset: usize, kind: NumericKind) -> Self {
        Self {
            name: name.into(),
            offset,
            kind,
            scale: 1.0,
            unit: None,
        }
    }

    /// Field whose raw integer is divided by `scale` and reported in `unit`
    pub fn scaled(
        name: impl Into<String>,
        offset: usize,
        kind: NumericKind,
        scale: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            offset,
            kind,
            scale,
            unit: Some(unit.into()),
        }
    }
}

/// Declared fixed-width binary schema of a device payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadLayout {
    pub fields: Vec<FieldSpec>,
}

impl PayloadLayout {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Minimum payload length in bytes that satisfies every field
    pub fn min_len(&self) -> usize {
        self.fields
            .iter()
            .map(|field| field.offset + field.kind.width())
            .max()
            .unwrap_or(0)
    }
}

fn read_i16_be(data: &[u8]) -> i16 {
    i16::from_be_bytes([data[0], data[1]])
}

fn read_u16_be(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

/// Sign-extends the 24-bit value through a shifted 32-bit read
fn read_i24_be(data: &[u8]) -> i32 {
    (i32::from(data[0]) << 24 | i32::from(data[1]) << 16 | i32::from(data[2]) << 8) >> 8
}

fn read_u24_be(data: &[u8]) -> u32 {
    u32::from(data[0]) << 16 | u32::from(data[1]) << 8 | u32::from(data[2])
}

fn read_i32_be(data: &[u8]) -> i32 {
    i32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn read_u32_be(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}
