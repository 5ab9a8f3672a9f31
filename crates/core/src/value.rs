//! Values stored in the name-value section
//!
//! The name-value section maps names to a closed set of value kinds. Each
//! kind has a fixed tag written before its payload.
//!
//! | Tag | Kind   | Payload                  |
//! |-----|--------|--------------------------|
//! | 1   | Int32  | 4 bytes                  |
//! | 2   | Double | 8 bytes                  |
//! | 3   | Text   | i32 length + UTF-8 bytes |
//! | 4   | Uuid   | 16 bytes                 |
//! | 5   | Uint64 | 8 bytes                  |

use uuid::Uuid;

/// A tagged name-value entry
#[derive(Debug, Clone, PartialEq)]
pub enum NameValue {
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit float
    Double(f64),
    /// UTF-8 text
    Text(String),
    /// 16-byte UUID
    Uuid(Uuid),
    /// 64-bit unsigned integer
    Uint64(u64),
}

impl NameValue {
    /// Tag for Int32 values
    pub const TAG_INT32: i32 = 1;
    /// Tag for Double values
    pub const TAG_DOUBLE: i32 = 2;
    /// Tag for Text values
    pub const TAG_TEXT: i32 = 3;
    /// Tag for Uuid values
    pub const TAG_UUID: i32 = 4;
    /// Tag for Uint64 values
    pub const TAG_UINT64: i32 = 5;

    /// On-disk tag of this value
    pub fn tag(&self) -> i32 {
        match self {
            NameValue::Int32(_) => Self::TAG_INT32,
            NameValue::Double(_) => Self::TAG_DOUBLE,
            NameValue::Text(_) => Self::TAG_TEXT,
            NameValue::Uuid(_) => Self::TAG_UUID,
            NameValue::Uint64(_) => Self::TAG_UINT64,
        }
    }

    /// Get as i32, if this is an Int32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            NameValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as f64, if this is a Double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NameValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as &str, if this is Text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NameValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get as Uuid, if this is a Uuid
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            NameValue::Uuid(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as u64, if this is a Uint64
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            NameValue::Uint64(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i32> for NameValue {
    fn from(v: i32) -> Self {
        NameValue::Int32(v)
    }
}

impl From<f64> for NameValue {
    fn from(v: f64) -> Self {
        NameValue::Double(v)
    }
}

impl From<String> for NameValue {
    fn from(v: String) -> Self {
        NameValue::Text(v)
    }
}

impl From<&str> for NameValue {
    fn from(v: &str) -> Self {
        NameValue::Text(v.to_string())
    }
}

impl From<Uuid> for NameValue {
    fn from(v: Uuid) -> Self {
        NameValue::Uuid(v)
    }
}

impl From<u64> for NameValue {
    fn from(v: u64) -> Self {
        NameValue::Uint64(v)
    }
}
