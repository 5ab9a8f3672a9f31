//! Creation options for a new container
//!
//! A [`TeaFileConfig`] decides which sections a new file carries. Every
//! section is optional; without an item descriptor the file holds metadata
//! only and cannot accept records.

use crate::item::Item;
use std::collections::BTreeMap;
use teafile_core::{FieldType, ItemDescriptor, NameValue};
use teafile_format::{
    ContentDescriptionSection, ItemSection, NameValueSection, Sections, TimeSection,
};

/// Time field options, resolved to offsets when sections are built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFieldConfig {
    /// Days from 0001-01-01 to tick zero
    pub epoch: i64,
    /// Tick resolution
    pub ticks_per_day: i64,
    /// Indexes of the time fields in the item descriptor
    pub field_indexes: Vec<usize>,
}

/// Sections to write when creating a container
#[derive(Debug, Clone, Default)]
pub struct TeaFileConfig {
    /// Record layout
    pub item: Option<ItemDescriptor>,
    /// Free-text description
    pub content_description: Option<String>,
    /// Named metadata values; an empty map still produces a section
    pub name_values: Option<BTreeMap<String, NameValue>>,
    /// Time scale and time fields
    pub time: Option<TimeFieldConfig>,
}

impl TeaFileConfig {
    /// Empty configuration: header only
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the layout of `T`
    pub fn with_item<T: Item>(self) -> Self {
        self.with_item_descriptor(T::descriptor())
    }

    /// Use an explicit layout
    pub fn with_item_descriptor(mut self, descriptor: ItemDescriptor) -> Self {
        self.item = Some(descriptor);
        self
    }

    /// Set content description
    pub fn with_content_description(mut self, text: impl Into<String>) -> Self {
        self.content_description = Some(text.into());
        self
    }

    /// Replace all name values
    pub fn with_name_values(mut self, values: BTreeMap<String, NameValue>) -> Self {
        self.name_values = Some(values);
        self
    }

    /// Add one name value
    pub fn with_name_value(mut self, name: impl Into<String>, value: impl Into<NameValue>) -> Self {
        self.name_values
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Mark the fields at `field_indexes` as time values
    pub fn with_time_fields(
        mut self,
        epoch: i64,
        ticks_per_day: i64,
        field_indexes: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.time = Some(TimeFieldConfig {
            epoch,
            ticks_per_day,
            field_indexes: field_indexes.into_iter().collect(),
        });
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(item) = &self.item {
            ItemSection::derive(item).map_err(|e| ConfigError::InvalidItem(e.to_string()))?;
        }
        let Some(time) = &self.time else {
            return Ok(());
        };
        if time.ticks_per_day <= 0 {
            return Err(ConfigError::InvalidTickRate(time.ticks_per_day));
        }
        let item = self.item.as_ref().ok_or(ConfigError::TimeWithoutItem)?;
        for &index in &time.field_indexes {
            let field = item
                .fields
                .get(index)
                .ok_or(ConfigError::TimeFieldOutOfRange {
                    index,
                    field_count: item.fields.len(),
                })?;
            if !field.field_type.is_tick_type() {
                return Err(ConfigError::NotATimeField {
                    index,
                    field_type: field.field_type,
                });
            }
        }
        Ok(())
    }

    /// Validate and turn the options into sections
    pub fn build_sections(&self) -> Result<Sections, ConfigError> {
        self.validate()?;

        let item = match &self.item {
            Some(descriptor) => Some(
                ItemSection::derive(descriptor)
                    .map_err(|e| ConfigError::InvalidItem(e.to_string()))?,
            ),
            None => None,
        };
        let time = match (&self.time, &item) {
            (Some(time), Some(item)) => Some(TimeSection::new(
                time.epoch,
                time.ticks_per_day,
                time.field_indexes
                    .iter()
                    .map(|&i| item.fields[i].offset)
                    .collect(),
            )),
            _ => None,
        };

        Ok(Sections {
            item,
            content_description: self
                .content_description
                .as_ref()
                .map(ContentDescriptionSection::new),
            name_value: self.name_values.clone().map(NameValueSection::from),
            time,
        })
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Item descriptor rejected
    #[error("Invalid item descriptor: {0}")]
    InvalidItem(String),

    /// Time fields given without a record layout
    #[error("Time fields require an item descriptor")]
    TimeWithoutItem,

    /// Time field index past the last field
    #[error("Time field index {index} out of range for {field_count} fields")]
    TimeFieldOutOfRange {
        /// Offending index
        index: usize,
        /// Fields in the descriptor
        field_count: usize,
    },

    /// Time field is not a 64-bit integer
    #[error("Field {index} has type {field_type}; time fields must be 64-bit integers")]
    NotATimeField {
        /// Offending index
        index: usize,
        /// Its type
        field_type: FieldType,
    },

    /// Ticks per day must be positive
    #[error("Invalid ticks per day: {0}")]
    InvalidTickRate(i64),
}

impl From<ConfigError> for teafile_core::Error {
    fn from(e: ConfigError) -> Self {
        teafile_core::Error::Config(e.to_string())
    }
}
