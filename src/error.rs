//! # Address Translation Error Handling
//!
//! This module provides the error type shared by the address table loader and
//! the translator. Every error is recoverable: the loader degrades to the
//! built-in table instead of failing, and conversion errors are returned to the
//! caller with a human-readable message.
//!
//! ## Error Categories
//!
//! ### Configuration Errors
//! - **Config Load Failed**: the table document is missing, unreadable or malformed
//! - **Invalid Table**: a programmatically built table breaks a table invariant
//!
//! ### Lookup Errors
//! - **Unknown Memory Type**: the PLC tag is not present in the active table
//! - **No Matching Memory Type**: no candidate of the register class accepts the value
//!
//! ### Input Errors
//! - **Invalid Address**: a PLC offset that is not an integer
//! - **Malformed Input**: a Modbus address that is not `"<prefix> <value>"`
//!
//! ### Output Errors
//! - **Serialization**: a table or result could not be rendered as JSON
//!
//! ## Usage Example
//!
//! ```rust
//! use plc_modbus_addr::{AddressError, AddressMap, Translator};
//!
//! let map = AddressMap::default();
//! let translator = Translator::new(&map);
//!
//! match translator.modbus_to_plc_str("9x 10") {
//!     Ok(address) => println!("PLC address: {}", address),
//!     Err(AddressError::NoMatchingMemoryType { prefix, value }) => {
//!         println!("Nothing maps {} {}", prefix, value);
//!     }
//!     Err(error) => println!("Other error: {}", error),
//! }
//! ```

use thiserror::Error;

/// Result type alias for address table and translation operations
pub type AddressResult<T> = Result<T, AddressError>;

/// Address translation error types
///
/// Each variant carries the offending input so the caller can report it
/// without keeping its own copy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The address table document could not be loaded
    ///
    /// Never fatal: the loader falls back to the built-in table and hands
    /// this error back as a warning.
    ///
    /// # Examples
    /// - File does not exist
    /// - JSON syntax error
    /// - `memoryOffsets` and `memoryPrefixes` list different tags
    #[error("Failed to load address table from {source_name}: {message}")]
    ConfigLoadFailed { source_name: String, message: String },

    /// A table built from records violates a table invariant
    #[error("Invalid address table: {message}")]
    InvalidTable { message: String },

    /// PLC memory type is not present in the active table
    #[error("Unknown memory type: '{tag}'")]
    UnknownMemoryType { tag: String },

    /// PLC offset could not be turned into an address
    ///
    /// # Examples
    /// - `"12a"` is not an integer
    /// - offset plus base offset overflows
    #[error("Invalid address '{input}': {message}")]
    InvalidAddress { input: String, message: String },

    /// Modbus address text is not of the form `"<prefix> <value>"`
    #[error("Malformed Modbus address '{input}': {message}")]
    MalformedInput { input: String, message: String },

    /// No memory type of the register class accepts the value
    ///
    /// Also returned for register classes the translator does not know.
    #[error("Cannot convert Modbus address {prefix} {value} to a known PLC memory type with prefix {prefix}")]
    NoMatchingMemoryType { prefix: String, value: i64 },

    /// A table or conversion result could not be rendered as JSON
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl AddressError {
    /// Create a configuration load error
    ///
    /// # Arguments
    ///
    /// * `source_name` - Path or name of the configuration source
    /// * `message` - Descriptive error message
    pub fn config_load_failed<S: Into<String>, M: Into<String>>(source_name: S, message: M) -> Self {
        Self::ConfigLoadFailed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid table error
    pub fn invalid_table<S: Into<String>>(message: S) -> Self {
        Self::InvalidTable { message: message.into() }
    }

    /// Create an unknown memory type error
    pub fn unknown_memory_type<S: Into<String>>(tag: S) -> Self {
        Self::UnknownMemoryType { tag: tag.into() }
    }

    /// Create an invalid address error
    ///
    /// # Arguments
    ///
    /// * `input` - The text or value that was rejected
    /// * `message` - Why it was rejected
    pub fn invalid_address<S: Into<String>, M: Into<String>>(input: S, message: M) -> Self {
        Self::InvalidAddress {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a malformed input error
    pub fn malformed_input<S: Into<String>, M: Into<String>>(input: S, message: M) -> Self {
        Self::MalformedInput {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a no matching memory type error
    pub fn no_matching_memory_type<S: Into<String>>(prefix: S, value: i64) -> Self {
        Self::NoMatchingMemoryType {
            prefix: prefix.into(),
            value,
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into() }
    }

    /// Check if the error was caused by unparsable user input
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plc_modbus_addr::AddressError;
    ///
    /// let err = AddressError::malformed_input("4x", "expected 2 tokens, found 1");
    /// assert!(err.is_input_error());
    ///
    /// let err = AddressError::unknown_memory_type("Z");
    /// assert!(!err.is_input_error());
    /// ```
    pub fn is_input_error(&self) -> bool {
        matches!(self,
            Self::InvalidAddress { .. } |
            Self::MalformedInput { .. }
        )
    }

    /// Check if the input parsed but the table has no answer for it
    pub fn is_lookup_error(&self) -> bool {
        matches!(self,
            Self::UnknownMemoryType { .. } |
            Self::NoMatchingMemoryType { .. }
        )
    }

    /// Check if the error concerns the address table itself
    pub fn is_config_error(&self) -> bool {
        matches!(self,
            Self::ConfigLoadFailed { .. } |
            Self::InvalidTable { .. }
        )
    }
}

/// Convert from serde JSON errors
///
/// Only output goes through this conversion; configuration parse failures are
/// reported as `ConfigLoadFailed` by the loader, which knows the source name.
impl From<serde_json::Error> for AddressError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = AddressError::invalid_address("12a", "not an integer");
        assert!(err.is_input_error());
        assert!(!err.is_lookup_error());

        let err = AddressError::no_matching_memory_type("9x", 10);
        assert!(err.is_lookup_error());
        assert!(!err.is_config_error());

        let err = AddressError::invalid_table("duplicate tag 'M'");
        assert!(err.is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = AddressError::no_matching_memory_type("9x", 10);
        let msg = format!("{}", err);
        assert!(msg.contains("9x 10"));

        let err = AddressError::unknown_memory_type("Z");
        assert_eq!(err.to_string(), "Unknown memory type: 'Z'");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AddressError = json_err.into();
        assert!(matches!(err, AddressError::Serialization { .. }));
        assert!(!err.is_config_error());
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
