//! Field and record layout types
//!
//! A record stored in a TeaFile is a fixed-size, native-layout struct made
//! of primitive fields. Its layout is described by an ordered list of
//! [`Field`]s, each naming a [`FieldType`] and the byte offset of that field
//! inside the record.
//!
//! ## Type Codes
//!
//! | Code | Type |    | Code | Type |
//! |------|------|----|------|------|
//! | 1 | int8  |    | 6  | uint16  |
//! | 2 | int16 |    | 7  | uint32  |
//! | 3 | int32 |    | 8  | uint64  |
//! | 4 | int64 |    | 9  | float32 |
//! | 5 | uint8 |    | 10 | float64 |

use std::fmt;

/// Primitive kinds a record field can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FieldType {
    /// Signed 8-bit integer
    Int8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Signed 32-bit integer
    Int32 = 3,
    /// Signed 64-bit integer
    Int64 = 4,
    /// Unsigned 8-bit integer
    UInt8 = 5,
    /// Unsigned 16-bit integer
    UInt16 = 6,
    /// Unsigned 32-bit integer
    UInt32 = 7,
    /// Unsigned 64-bit integer
    UInt64 = 8,
    /// IEEE 754 single precision
    Float32 = 9,
    /// IEEE 754 double precision
    Float64 = 10,
}

impl FieldType {
    /// All field types in type-code order
    pub const ALL: [FieldType; 10] = [
        FieldType::Int8,
        FieldType::Int16,
        FieldType::Int32,
        FieldType::Int64,
        FieldType::UInt8,
        FieldType::UInt16,
        FieldType::UInt32,
        FieldType::UInt64,
        FieldType::Float32,
        FieldType::Float64,
    ];

    /// On-disk type code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parse an on-disk type code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(FieldType::Int8),
            2 => Some(FieldType::Int16),
            3 => Some(FieldType::Int32),
            4 => Some(FieldType::Int64),
            5 => Some(FieldType::UInt8),
            6 => Some(FieldType::UInt16),
            7 => Some(FieldType::UInt32),
            8 => Some(FieldType::UInt64),
            9 => Some(FieldType::Float32),
            10 => Some(FieldType::Float64),
            _ => None,
        }
    }

    /// Width of a value of this type in bytes
    pub fn size(self) -> usize {
        match self {
            FieldType::Int8 | FieldType::UInt8 => 1,
            FieldType::Int16 | FieldType::UInt16 => 2,
            FieldType::Int32 | FieldType::UInt32 | FieldType::Float32 => 4,
            FieldType::Int64 | FieldType::UInt64 | FieldType::Float64 => 8,
        }
    }

    /// True for the 64-bit integer types that can hold time ticks
    pub fn is_tick_type(self) -> bool {
        matches!(self, FieldType::Int64 | FieldType::UInt64)
    }

    /// Lowercase type name
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Int8 => "int8",
            FieldType::Int16 => "int16",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::UInt8 => "uint8",
            FieldType::UInt16 => "uint16",
            FieldType::UInt32 => "uint32",
            FieldType::UInt64 => "uint64",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust primitives that map onto a [`FieldType`]
pub trait Primitive: Copy + 'static {
    /// Field type of this primitive
    const FIELD_TYPE: FieldType;
}

macro_rules! impl_primitive {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Primitive for $ty {
                const FIELD_TYPE: FieldType = FieldType::$kind;
            }
        )+
    };
}

impl_primitive! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

/// One field of a record layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Position in the field table, starting at 0
    pub index: i32,
    /// Primitive type of the field
    pub field_type: FieldType,
    /// Byte offset of the field inside the record
    pub offset: i32,
    /// Field name
    pub name: String,
}

impl Field {
    /// Create a field descriptor
    pub fn new(index: i32, field_type: FieldType, offset: i32, name: impl Into<String>) -> Self {
        Field {
            index,
            field_type,
            offset,
            name: name.into(),
        }
    }

    /// Byte range `[offset, offset + size)` the field occupies
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.offset.max(0) as usize;
        start..start + self.field_type.size()
    }
}

/// Complete layout of a record type: name, size and ordered fields.
///
/// This is what a schema provider hands to the container. The fields must
/// already describe the packed native layout; nothing is reordered or
/// recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDescriptor {
    /// Record type name stored in the item section
    pub type_name: String,
    /// Size of one record in bytes, including padding
    pub item_size: usize,
    /// Ordered field table
    pub fields: Vec<Field>,
}

impl ItemDescriptor {
    /// Create a descriptor
    pub fn new(type_name: impl Into<String>, item_size: usize, fields: Vec<Field>) -> Self {
        ItemDescriptor {
            type_name: type_name.into(),
            item_size,
            fields,
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Access mode of an open container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Records may be read, sought and mapped
    Read,
    /// Records may be appended
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => f.write_str("read"),
            AccessMode::Write => f.write_str("write"),
        }
    }
}
