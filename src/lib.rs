//! TeaFile - time-series container files
//!
//! A TeaFile is a fixed header, up to four self-describing metadata
//! sections, and a contiguous region of fixed-size binary records starting
//! at an 8-byte aligned offset.
//!
//! # Quick Start
//!
//! ```ignore
//! use teafile::{item_descriptor, Item, ItemDescriptor, TeaFile, TeaFileConfig};
//! use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
//! struct Tick {
//!     time: i64,
//!     price: f64,
//! }
//!
//! impl Item for Tick {
//!     fn descriptor() -> ItemDescriptor {
//!         item_descriptor!(Tick { time, price })
//!     }
//! }
//!
//! let config = TeaFileConfig::new()
//!     .with_item::<Tick>()
//!     .with_content_description("ticks")
//!     .with_time_fields(teafile::EPOCH_1970, teafile::MICROS_PER_DAY, [0]);
//! let mut tf = TeaFile::create("ticks.tea", &config)?;
//! tf.write(&Tick { time: 0, price: 1.5 })?;
//! tf.close()?;
//!
//! let tf = TeaFile::open_read("ticks.tea", &Tick::descriptor().fields)?;
//! let mapped = tf.map_items()?;
//! let ticks = mapped.typed::<Tick>()?;
//! ```
//!
//! # Architecture
//!
//! - `teafile-core`: field types, name values and the error taxonomy
//! - `teafile-format`: header and section encoding, preamble layout
//! - `teafile-engine`: the container, creation config and record access
//!
//! Everything public is re-exported from the engine crate.

pub use teafile_engine::*;

/// Lower-level encoding primitives
pub mod format {
    pub use teafile_format::*;
}
