//! Frame kinds and typed telemetry values

/// Size of the value field in bytes (widest variant)
pub const VALUE_SIZE: usize = 8;

/// Frame kind tag
///
/// Discriminates the value field and marks bare requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Kind {
    /// Unrecognised tag; never surfaced to consumers
    Unknown = 0,
    /// `f32` value
    Float = 1,
    /// `f64` value
    Double = 2,
    /// `i64` value
    Int64 = 3,
    /// `u64` value
    Uint64 = 4,
    /// Bare request asking the addressed device to transmit its data
    RequestOnly = 0xFF,
}

impl Kind {
    /// Decode a kind tag; unrecognised bytes map to [`Kind::Unknown`]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Kind::Float,
            2 => Kind::Double,
            3 => Kind::Int64,
            4 => Kind::Uint64,
            0xFF => Kind::RequestOnly,
            _ => Kind::Unknown,
        }
    }

    /// Wire representation
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether this kind carries a typed value
    pub const fn is_value(self) -> bool {
        matches!(self, Kind::Float | Kind::Double | Kind::Int64 | Kind::Uint64)
    }
}

/// A typed telemetry value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    Float(f32),
    Double(f64),
    Int64(i64),
    Uint64(u64),
}

impl Value {
    /// Kind tag for this value
    pub const fn kind(&self) -> Kind {
        match self {
            Value::Float(_) => Kind::Float,
            Value::Double(_) => Kind::Double,
            Value::Int64(_) => Kind::Int64,
            Value::Uint64(_) => Kind::Uint64,
        }
    }

    /// Encode into the little-endian value field
    ///
    /// A `Float` occupies the first four bytes; the rest stay zero.
    pub fn to_bytes(&self) -> [u8; VALUE_SIZE] {
        let mut out = [0u8; VALUE_SIZE];
        match self {
            Value::Float(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            Value::Double(v) => out.copy_from_slice(&v.to_le_bytes()),
            Value::Int64(v) => out.copy_from_slice(&v.to_le_bytes()),
            Value::Uint64(v) => out.copy_from_slice(&v.to_le_bytes()),
        }
        out
    }

    /// Decode the value field according to `kind`
    ///
    /// Returns `None` for kinds that carry no value.
    pub fn from_bytes(kind: Kind, bytes: &[u8; VALUE_SIZE]) -> Option<Self> {
        match kind {
            Kind::Float => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&bytes[..4]);
                Some(Value::Float(f32::from_le_bytes(raw)))
            }
            Kind::Double => Some(Value::Double(f64::from_le_bytes(*bytes))),
            Kind::Int64 => Some(Value::Int64(i64::from_le_bytes(*bytes))),
            Kind::Uint64 => Some(Value::Uint64(u64::from_le_bytes(*bytes))),
            Kind::RequestOnly | Kind::Unknown => None,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint64(v as u64)
    }
}
