//! Value codec: length-prefixed text and tagged name-value payloads.
//!
//! All integers are native byte order.
//!
//! ```text
//! Text:       [length: i32] [UTF-8 bytes: length]
//! NameValue:  [tag: i32] [payload: see teafile_core::value]
//! ```

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use teafile_core::{Error, NameValue, Result};
use uuid::Uuid;

/// Bytes taken by an i32 length, count or tag
pub const I32_SIZE: usize = 4;

/// Read a length-prefixed UTF-8 string.
///
/// A short read is an I/O error; a negative length or invalid UTF-8 is a
/// format error.
pub fn read_text<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_i32::<NativeEndian>()?;
    let len = usize::try_from(len)
        .map_err(|_| Error::format(format!("negative text length {}", len)))?;
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("text truncated: expected {} bytes, got {}", len, bytes.len()),
        )
        .into());
    }
    String::from_utf8(bytes).map_err(|e| Error::format(format!("text is not UTF-8: {}", e)))
}

/// Write a length-prefixed string
pub fn write_text<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    writer.write_i32::<NativeEndian>(length_prefix(text.len())?)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Encoded size of a length-prefixed string
pub fn text_size(text: &str) -> usize {
    I32_SIZE + text.len()
}

/// Convert a length or count to its i32 on-disk form
pub fn length_prefix(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::format(format!("length {} exceeds i32", len)))
}

/// Read an i32 count, rejecting negative values
pub fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let count = reader.read_i32::<NativeEndian>()?;
    usize::try_from(count).map_err(|_| Error::format(format!("negative {} {}", what, count)))
}

/// Read a tag and its payload
pub fn read_value<R: Read>(reader: &mut R) -> Result<NameValue> {
    let tag = reader.read_i32::<NativeEndian>()?;
    let value = match tag {
        NameValue::TAG_INT32 => NameValue::Int32(reader.read_i32::<NativeEndian>()?),
        NameValue::TAG_DOUBLE => NameValue::Double(reader.read_f64::<NativeEndian>()?),
        NameValue::TAG_TEXT => NameValue::Text(read_text(reader)?),
        NameValue::TAG_UUID => {
            let mut bytes = [0u8; 16];
            reader.read_exact(&mut bytes)?;
            NameValue::Uuid(Uuid::from_bytes(bytes))
        }
        NameValue::TAG_UINT64 => NameValue::Uint64(reader.read_u64::<NativeEndian>()?),
        other => return Err(Error::format(format!("unknown name value tag {}", other))),
    };
    Ok(value)
}

/// Write a tag and its payload
pub fn write_value<W: Write>(writer: &mut W, value: &NameValue) -> Result<()> {
    writer.write_i32::<NativeEndian>(value.tag())?;
    match value {
        NameValue::Int32(v) => writer.write_i32::<NativeEndian>(*v)?,
        NameValue::Double(v) => writer.write_f64::<NativeEndian>(*v)?,
        NameValue::Text(v) => write_text(writer, v)?,
        NameValue::Uuid(v) => writer.write_all(v.as_bytes())?,
        NameValue::Uint64(v) => writer.write_u64::<NativeEndian>(*v)?,
    }
    Ok(())
}

/// Encoded size of a tag and its payload
pub fn value_size(value: &NameValue) -> usize {
    I32_SIZE
        + match value {
            NameValue::Int32(_) => 4,
            NameValue::Double(_) => 8,
            NameValue::Text(v) => text_size(v),
            NameValue::Uuid(_) => 16,
            NameValue::Uint64(_) => 8,
        }
}
