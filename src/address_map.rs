/// PLC memory type table
///
/// This module holds the offset/prefix table that drives every conversion.
/// A table is immutable once built; loading a new document produces a new
/// table that replaces the old one as a whole.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::error::{AddressError, AddressResult};

/// Built-in table used when no configuration is given or it cannot be loaded.
///
/// Order matters: it is the order in which memory types are listed.
pub const DEFAULT_TABLE: [(&str, u32, &str); 6] = [
    ("M", 3072, "0x"),
    ("V", 512, "4x"),
    ("X", 0, "1x"),
    ("Y", 1536, "0x"),
    ("T", 15360, "4x"),
    ("C", 16384, "4x"),
];

/// One PLC memory type and where it lives in Modbus address space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTypeRecord {
    /// Memory type tag, e.g. `"V"`
    pub tag: String,
    /// Modbus address of PLC offset 0
    pub base_offset: u32,
    /// Register class prefix, e.g. `"4x"`
    pub modbus_prefix: String,
}

impl MemoryTypeRecord {
    /// Create a new record
    pub fn new<T: Into<String>, P: Into<String>>(tag: T, base_offset: u32, modbus_prefix: P) -> Self {
        Self {
            tag: tag.into(),
            base_offset,
            modbus_prefix: modbus_prefix.into(),
        }
    }
}

/// Ordered table of memory type records keyed by tag
///
/// Records keep their insertion order. Tags are unique and non-empty; a
/// prefix may be shared by any number of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressMap {
    records: Vec<MemoryTypeRecord>,
}

impl AddressMap {
    /// Build a table from records, checking the table invariants
    ///
    /// # Errors
    ///
    /// `InvalidTable` if the list is empty, a tag or prefix is blank, or a
    /// tag appears twice.
    pub fn from_records(records: Vec<MemoryTypeRecord>) -> AddressResult<Self> {
        if records.is_empty() {
            return Err(AddressError::invalid_table("table has no memory types"));
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.tag.trim().is_empty() {
                return Err(AddressError::invalid_table("memory type tag is empty"));
            }
            if record.modbus_prefix.trim().is_empty() {
                return Err(AddressError::invalid_table(
                    format!("memory type '{}' has an empty Modbus prefix", record.tag)
                ));
            }
            if !seen.insert(record.tag.as_str()) {
                return Err(AddressError::invalid_table(
                    format!("duplicate memory type '{}'", record.tag)
                ));
            }
        }

        Ok(Self { records })
    }

    /// Look up a memory type by tag
    pub fn get(&self, tag: &str) -> Option<&MemoryTypeRecord> {
        self.records.iter().find(|record| record.tag == tag)
    }

    /// Tags in table order
    pub fn tags(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.tag.as_str()).collect()
    }

    /// All records in table order
    pub fn records(&self) -> &[MemoryTypeRecord] {
        &self.records
    }

    /// Iterate over records in table order
    pub fn iter(&self) -> std::slice::Iter<'_, MemoryTypeRecord> {
        self.records.iter()
    }

    /// Number of memory types
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if the table has no memory types (never the case for a built table)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for AddressMap {
    fn default() -> Self {
        let records = DEFAULT_TABLE
            .iter()
            .map(|&(tag, base_offset, prefix)| MemoryTypeRecord::new(tag, base_offset, prefix))
            .collect();
        Self { records }
    }
}

impl<'a> IntoIterator for &'a AddressMap {
    type Item = &'a MemoryTypeRecord;
    type IntoIter = std::slice::Iter<'a, MemoryTypeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
