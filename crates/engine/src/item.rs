//! Typed records.
//!
//! An [`Item`] is a plain-old-data record type whose bytes are stored
//! verbatim in the item region. `zerocopy` guarantees every byte pattern is
//! a valid value (`FromBytes`) and that the type has no uninitialized
//! padding (`IntoBytes`), so padding must be spelled out as `[u8; N]` fields.
//! Those padding fields are left out of the descriptor.
//!
//! ```ignore
//! use teafile_engine::{item_descriptor, Item, ItemDescriptor};
//! use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
//! struct Tick {
//!     time: u64,
//!     price: f64,
//!     volume: u32,
//!     _pad: [u8; 4],
//! }
//!
//! impl Item for Tick {
//!     fn descriptor() -> ItemDescriptor {
//!         item_descriptor!(Tick { time, price, volume })
//!     }
//! }
//! ```

use teafile_core::{FieldType, ItemDescriptor, Primitive};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A fixed-size record stored byte-for-byte in a TeaFile
pub trait Item: FromBytes + IntoBytes + Immutable + KnownLayout + Sized + 'static {
    /// Layout of this record type
    fn descriptor() -> ItemDescriptor;
}

/// Field type of the field selected by `project`.
///
/// Used by [`item_descriptor!`](crate::item_descriptor) to infer type codes
/// from the struct definition.
pub fn field_type_of<S, T, F>(_project: F) -> FieldType
where
    T: Primitive,
    F: Fn(&S) -> &T,
{
    T::FIELD_TYPE
}

/// Build an [`ItemDescriptor`] for a `#[repr(C)]` struct.
///
/// Offsets come from `offset_of!`, the item size from `size_of`, and type
/// codes from the Rust type of each listed field. Fields are indexed in
/// the order given. The type name defaults to the struct name; pass
/// `Type as "Name" { .. }` to store a different one.
#[macro_export]
macro_rules! item_descriptor {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        $crate::item_descriptor!(@build $ty, stringify!($ty), [$($field),+])
    };
    ($ty:ident as $name:literal { $($field:ident),+ $(,)? }) => {
        $crate::item_descriptor!(@build $ty, $name, [$($field),+])
    };
    (@build $ty:ident, $name:expr, [$($field:ident),+]) => {{
        let mut fields = ::std::vec::Vec::new();
        $(
            fields.push($crate::Field::new(
                fields.len() as i32,
                $crate::item::field_type_of(|item: &$ty| &item.$field),
                ::std::mem::offset_of!($ty, $field) as i32,
                stringify!($field),
            ));
        )+
        $crate::ItemDescriptor::new($name, ::std::mem::size_of::<$ty>(), fields)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

    #[repr(C)]
    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
    struct Tick {
        time: u64,
        price: f64,
        volume: i32,
        flag: u8,
        _pad: [u8; 3],
    }

    impl Item for Tick {
        fn descriptor() -> ItemDescriptor {
            crate::item_descriptor!(Tick { time, price, volume, flag })
        }
    }

    #[test]
    fn test_descriptor_from_layout() {
        let descriptor = Tick::descriptor();
        assert_eq!(descriptor.type_name, "Tick");
        assert_eq!(descriptor.item_size, 24);

        let summary: Vec<(i32, FieldType, i32, &str)> = descriptor
            .fields
            .iter()
            .map(|f| (f.index, f.field_type, f.offset, f.name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, FieldType::UInt64, 0, "time"),
                (1, FieldType::Float64, 8, "price"),
                (2, FieldType::Int32, 16, "volume"),
                (3, FieldType::UInt8, 20, "flag"),
            ]
        );
    }

    #[test]
    fn test_renamed_type() {
        let descriptor = crate::item_descriptor!(Tick as "acme.Tick" { time, price });
        assert_eq!(descriptor.type_name, "acme.Tick");
        assert_eq!(descriptor.fields.len(), 2);
    }

    #[test]
    fn test_field_type_of() {
        assert_eq!(field_type_of(|t: &Tick| &t.volume), FieldType::Int32);
        assert_eq!(field_type_of(|t: &Tick| &t.price), FieldType::Float64);
    }
}
