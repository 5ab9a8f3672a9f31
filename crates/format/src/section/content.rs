//! Content description section: one free-form text.

use super::{Section, SectionId};
use crate::codec::{read_text, text_size, write_text};
use std::io::{Read, Write};
use teafile_core::Result;

/// Free-form description of the file's contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDescriptionSection {
    /// Description text
    pub text: String,
}

impl ContentDescriptionSection {
    /// Create a description section
    pub fn new(text: impl Into<String>) -> Self {
        ContentDescriptionSection { text: text.into() }
    }
}

impl Section for ContentDescriptionSection {
    const ID: SectionId = SectionId::ContentDescription;

    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(ContentDescriptionSection {
            text: read_text(reader)?,
        })
    }

    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_text(writer, &self.text)
    }

    fn size_in_bytes(&self) -> usize {
        text_size(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_content_description() {
        let section = ContentDescriptionSection::new("prices of acme at NYSE");
        let bytes = section.to_bytes().unwrap();
        assert_eq!(bytes.len(), section.size_in_bytes());
        assert_eq!(bytes.len(), 4 + 22);
        assert_eq!(
            ContentDescriptionSection::decode(&mut Cursor::new(&bytes)).unwrap(),
            section
        );
    }

    #[test]
    fn test_multibyte_text_size_counts_bytes() {
        let section = ContentDescriptionSection::new("Börse");
        assert_eq!(section.size_in_bytes(), 4 + "Börse".len());
        assert_eq!(section.to_bytes().unwrap().len(), 10);
    }
}
