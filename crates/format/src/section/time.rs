//! Time section: which record fields hold time values and how to read them.
//!
//! ```text
//! [Epoch: i64]          days from 0001-01-01 to the tick origin
//! [Ticks per day: i64]
//! [Offset count: i32]
//! [Offsets: count * i32]  byte offsets of time fields inside the record
//! ```
//!
//! Offsets are not checked against the item section when decoding.

use super::{ItemSection, Section, SectionId};
use crate::codec::{length_prefix, read_count, I32_SIZE};
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use std::io::{Read, Write};
use teafile_core::{Field, Result};

/// Days from 0001-01-01 to 1970-01-01
pub const EPOCH_1970: i64 = 719_162;

/// Ticks per day at microsecond resolution
pub const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Ticks per day at millisecond resolution
pub const MILLIS_PER_DAY: i64 = 86_400_000;

const NANOS_PER_DAY: i128 = 86_400_000_000_000;
const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Time scale and time field offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSection {
    /// Days from 0001-01-01 to tick zero
    pub epoch: i64,
    /// Tick resolution
    pub ticks_per_day: i64,
    /// Byte offsets of the time fields
    pub offsets: Vec<i32>,
}

impl TimeSection {
    /// Create a time section
    pub fn new(epoch: i64, ticks_per_day: i64, offsets: Vec<i32>) -> Self {
        TimeSection {
            epoch,
            ticks_per_day,
            offsets,
        }
    }

    /// Fields of `item` whose offsets are listed as time fields
    pub fn time_fields<'a>(&self, item: &'a ItemSection) -> Vec<&'a Field> {
        item.fields
            .iter()
            .filter(|f| self.offsets.contains(&f.offset))
            .collect()
    }

    /// Convert a raw tick value to a UTC timestamp.
    ///
    /// Returns `None` for a non-positive tick rate or an out-of-range result.
    pub fn to_datetime(&self, ticks: i64) -> Option<DateTime<Utc>> {
        if self.ticks_per_day <= 0 {
            return None;
        }
        let since_origin = (ticks as i128)
            .checked_mul(NANOS_PER_DAY)?
            .checked_div(self.ticks_per_day as i128)?;
        let nanos = self.origin_nanos()?.checked_add(since_origin)?;
        let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SEC)).ok()?;
        let subsec = nanos.rem_euclid(NANOS_PER_SEC) as u32;
        DateTime::from_timestamp(secs, subsec)
    }

    /// Convert a UTC timestamp to ticks, truncating below the tick resolution.
    ///
    /// Returns `None` for a non-positive tick rate or an out-of-range result.
    pub fn from_datetime(&self, time: DateTime<Utc>) -> Option<i64> {
        if self.ticks_per_day <= 0 {
            return None;
        }
        let nanos = (time.timestamp() as i128 * NANOS_PER_SEC
            + time.timestamp_subsec_nanos() as i128)
            .checked_sub(self.origin_nanos()?)?;
        let ticks = nanos
            .checked_mul(self.ticks_per_day as i128)?
            .div_euclid(NANOS_PER_DAY);
        i64::try_from(ticks).ok()
    }

    /// Nanoseconds from 1970-01-01 to tick zero
    fn origin_nanos(&self) -> Option<i128> {
        (self.epoch as i128 - EPOCH_1970 as i128).checked_mul(NANOS_PER_DAY)
    }
}

impl Default for TimeSection {
    /// Microseconds since 1970-01-01, no time fields
    fn default() -> Self {
        TimeSection::new(EPOCH_1970, MICROS_PER_DAY, Vec::new())
    }
}

impl Section for TimeSection {
    const ID: SectionId = SectionId::Time;

    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let epoch = reader.read_i64::<NativeEndian>()?;
        let ticks_per_day = reader.read_i64::<NativeEndian>()?;
        let count = read_count(reader, "time field count")?;
        let mut offsets = Vec::new();
        for _ in 0..count {
            offsets.push(reader.read_i32::<NativeEndian>()?);
        }
        Ok(TimeSection {
            epoch,
            ticks_per_day,
            offsets,
        })
    }

    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i64::<NativeEndian>(self.epoch)?;
        writer.write_i64::<NativeEndian>(self.ticks_per_day)?;
        writer.write_i32::<NativeEndian>(length_prefix(self.offsets.len())?)?;
        for offset in &self.offsets {
            writer.write_i32::<NativeEndian>(*offset)?;
        }
        Ok(())
    }

    fn size_in_bytes(&self) -> usize {
        8 + 8 + I32_SIZE + I32_SIZE * self.offsets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;
    use teafile_core::{FieldType, ItemDescriptor};

    #[test]
    fn test_encode_decode() {
        let section = TimeSection::new(EPOCH_1970, MILLIS_PER_DAY, vec![0, 16]);
        let bytes = section.to_bytes().unwrap();
        assert_eq!(bytes.len(), section.size_in_bytes());
        assert_eq!(bytes.len(), 8 + 8 + 4 + 8);
        assert_eq!(TimeSection::decode(&mut Cursor::new(&bytes)).unwrap(), section);
    }

    #[test]
    fn test_default_is_microseconds() {
        let section = TimeSection::default();
        assert_eq!(section.epoch, 719_162);
        assert_eq!(section.ticks_per_day, 86_400_000_000);
        assert!(section.offsets.is_empty());
        assert_eq!(section.size_in_bytes(), 20);
    }

    #[test]
    fn test_to_datetime_millis() {
        let section = TimeSection::new(EPOCH_1970, MILLIS_PER_DAY, vec![0]);
        let time = section.to_datetime(1_299_229_200_000).unwrap();
        assert_eq!(time, Utc.with_ymd_and_hms(2011, 3, 4, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_to_datetime_origin() {
        let section = TimeSection::default();
        assert_eq!(
            section.to_datetime(0).unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()
        );

        // epoch 0 puts tick zero at 0001-01-01
        let section = TimeSection::new(0, MICROS_PER_DAY, vec![]);
        assert_eq!(
            section.to_datetime(0).unwrap(),
            Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_from_datetime_inverts() {
        let section = TimeSection::default();
        let time = Utc.with_ymd_and_hms(2011, 3, 4, 9, 0, 0).unwrap();
        let ticks = section.from_datetime(time).unwrap();
        assert_eq!(ticks, 1_299_229_200_000_000);
        assert_eq!(section.to_datetime(ticks).unwrap(), time);
    }

    #[test]
    fn test_invalid_tick_rate() {
        let section = TimeSection::new(EPOCH_1970, 0, vec![]);
        assert!(section.to_datetime(1).is_none());
        assert!(section.from_datetime(Utc::now()).is_none());
    }

    #[test]
    fn test_extreme_scale_from_file() {
        // epoch and tick rate are taken from the file unchecked
        let mut bytes = Vec::new();
        TimeSection::new(i64::MIN, i64::MAX, vec![])
            .encode(&mut bytes)
            .unwrap();
        let section = TimeSection::decode(&mut Cursor::new(&bytes)).unwrap();
        assert!(section.to_datetime(0).is_none());
        assert!(section.to_datetime(i64::MAX).is_none());
        assert!(section.from_datetime(Utc::now()).is_none());

        let section = TimeSection::new(EPOCH_1970 + 1_000_000_000_000, i64::MAX, vec![]);
        let time = Utc.with_ymd_and_hms(2011, 3, 4, 9, 0, 0).unwrap();
        assert!(section.from_datetime(time).is_none());
        assert!(section.to_datetime(i64::MIN).is_none());

        let section = TimeSection::new(EPOCH_1970, i64::MAX, vec![]);
        assert!(section.from_datetime(time).is_none());
    }

    #[test]
    fn test_time_fields_resolve_offsets() {
        let item = ItemSection::derive(&ItemDescriptor::new(
            "Quote",
            24,
            vec![
                Field::new(0, FieldType::Int64, 0, "Time"),
                Field::new(1, FieldType::Float64, 8, "Price"),
                Field::new(2, FieldType::Int64, 16, "Settle"),
            ],
        ))
        .unwrap();
        let section = TimeSection::new(EPOCH_1970, MICROS_PER_DAY, vec![0, 16]);
        let names: Vec<&str> = section
            .time_fields(&item)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["Time", "Settle"]);
    }
}
