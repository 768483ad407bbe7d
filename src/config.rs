//! # Address Table Configuration
//!
//! Loads the memory type table from a JSON document with two sibling maps:
//!
//! ```json
//! {
//!   "memoryOffsets":  { "M": 3072, "V": 512, "X": 0, "Y": 1536, "T": 15360, "C": 16384 },
//!   "memoryPrefixes": { "M": "0x", "V": "4x", "X": "1x", "Y": "0x", "T": "4x", "C": "4x" }
//! }
//! ```
//!
//! Loading never fails. A missing, unreadable or malformed document yields the
//! built-in table together with a warning the caller can show to the user.
//!
//! ```rust
//! use plc_modbus_addr::config::load_address_map_from_str;
//!
//! let outcome = load_address_map_from_str("inline", "{ not json");
//! assert!(outcome.is_fallback());
//! assert_eq!(outcome.map.tags(), vec!["M", "V", "X", "Y", "T", "C"]);
//! ```

use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use log::{info, warn};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::address_map::{AddressMap, MemoryTypeRecord};
use crate::error::{AddressError, AddressResult};

/// JSON object whose entries keep document order
///
/// Duplicate keys are rejected instead of silently keeping the last one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderedEntries<V>(pub Vec<(String, V)>);

impl<V> OrderedEntries<V> {
    fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by memory type tag")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(de::Error::custom(format!("duplicate memory type '{}'", key)));
                    }
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<V: Serialize> Serialize for OrderedEntries<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// On-disk shape of the address table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressMapConfig {
    /// Tag to base offset
    pub memory_offsets: OrderedEntries<u32>,
    /// Tag to Modbus prefix
    pub memory_prefixes: OrderedEntries<String>,
}

impl AddressMapConfig {
    /// Read and parse a configuration file
    pub fn load_from_file(path: &Path) -> AddressResult<Self> {
        let source_name = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| AddressError::config_load_failed(&source_name, format!("cannot read file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AddressError::config_load_failed(&source_name, format!("JSON error: {}", e)))
    }

    /// Describe an existing table in document form
    pub fn from_map(map: &AddressMap) -> Self {
        Self {
            memory_offsets: OrderedEntries(
                map.iter().map(|r| (r.tag.clone(), r.base_offset)).collect()
            ),
            memory_prefixes: OrderedEntries(
                map.iter().map(|r| (r.tag.clone(), r.modbus_prefix.clone())).collect()
            ),
        }
    }

    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> AddressResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Join the two maps into a table
    ///
    /// Both maps must name the same tags. Table order follows `memoryOffsets`.
    pub fn into_address_map(self) -> AddressResult<AddressMap> {
        if let Some((tag, _)) = self.memory_prefixes.0.iter()
            .find(|(tag, _)| self.memory_offsets.get(tag).is_none())
        {
            return Err(AddressError::invalid_table(
                format!("memory type '{}' has a prefix but no offset", tag)
            ));
        }

        let mut records = Vec::with_capacity(self.memory_offsets.0.len());
        for (tag, base_offset) in &self.memory_offsets.0 {
            let prefix = self.memory_prefixes.get(tag).ok_or_else(|| {
                AddressError::invalid_table(format!("memory type '{}' has an offset but no prefix", tag))
            })?;
            records.push(MemoryTypeRecord::new(tag.clone(), *base_offset, prefix.clone()));
        }

        AddressMap::from_records(records)
    }
}

/// Table produced by a load, plus the reason it fell back to defaults
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Table to use from now on
    pub map: AddressMap,
    /// Set when the source was rejected and `map` is the built-in table
    pub warning: Option<AddressError>,
}

impl LoadOutcome {
    /// Built-in table without a warning
    pub fn defaults() -> Self {
        Self {
            map: AddressMap::default(),
            warning: None,
        }
    }

    fn from_result(source_name: &str, result: AddressResult<AddressMap>) -> Self {
        match result {
            Ok(map) => {
                info!("Loaded {} memory types from {}", map.len(), source_name);
                Self { map, warning: None }
            }
            Err(error) => {
                let warning = if matches!(error, AddressError::ConfigLoadFailed { .. }) {
                    error
                } else {
                    AddressError::config_load_failed(source_name, error.to_string())
                };
                warn!("{}; using built-in address table", warning);
                Self {
                    map: AddressMap::default(),
                    warning: Some(warning),
                }
            }
        }
    }

    /// `true` if the source was rejected
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }

    /// Split into the table and the optional warning
    pub fn into_parts(self) -> (AddressMap, Option<AddressError>) {
        (self.map, self.warning)
    }
}

/// Load the table from an optional file path
///
/// `None` means no configuration was asked for and gives the built-in table
/// silently. A path that cannot be used gives the built-in table and a warning.
pub fn load_address_map(path: Option<&Path>) -> LoadOutcome {
    match path {
        None => LoadOutcome::defaults(),
        Some(path) => {
            let source_name = path.display().to_string();
            let result = AddressMapConfig::load_from_file(path)
                .and_then(AddressMapConfig::into_address_map);
            LoadOutcome::from_result(&source_name, result)
        }
    }
}

/// Load the table from document text
pub fn load_address_map_from_str(source_name: &str, content: &str) -> LoadOutcome {
    let result = serde_json::from_str::<AddressMapConfig>(content)
        .map_err(|e| AddressError::config_load_failed(source_name, format!("JSON error: {}", e)))
        .and_then(AddressMapConfig::into_address_map);
    LoadOutcome::from_result(source_name, result)
}
