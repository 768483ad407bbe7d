//! # PLC Modbus Addr - PLC ⇄ Modbus Address Translator
//!
//! Converts between PLC memory addresses (`M`, `V`, `X`, `Y`, `T`, `C` plus an
//! offset) and Modbus register addresses (`0x`, `1x`, `4x` plus an offset),
//! driven by a small editable table of base offsets and prefixes.
//!
//! ## Default Table
//!
//! | Type | Base offset | Prefix |
//! |------|-------------|--------|
//! | M | 3072 | 0x |
//! | V | 512 | 4x |
//! | X | 0 | 1x |
//! | Y | 1536 | 0x |
//! | T | 15360 | 4x |
//! | C | 16384 | 4x |
//!
//! ## Modbus → PLC Priority
//!
//! Several memory types share a register class, so a Modbus value is matched
//! against a fixed priority list and the first memory type whose base offset
//! is not above the value wins:
//!
//! | Prefix | Tried in order |
//! |--------|----------------|
//! | 0x | M, Y |
//! | 1x | X |
//! | 4x | V, T, C, M (M only when configured as 4x) |
//!
//! ## Quick Start
//!
//! ```rust
//! use plc_modbus_addr::{load_address_map, Translator, AddressResult};
//!
//! fn main() -> AddressResult<()> {
//!     // No path: built-in table
//!     let outcome = load_address_map(None);
//!     if let Some(warning) = &outcome.warning {
//!         eprintln!("{}", warning);
//!     }
//!
//!     let translator = Translator::new(&outcome.map);
//!     assert_eq!(translator.plc_to_modbus("V", 400)?.to_string(), "4x 912");
//!     assert_eq!(translator.modbus_to_plc_str("0x 3500")?.to_string(), "M428");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / UI layer │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐    ┌─────────────────┐
//! │   Translator    │───►│ CallbackLogger  │
//! └─────────────────┘    └─────────────────┘
//!          │ borrows
//! ┌─────────────────┐    ┌─────────────────┐
//! │   AddressMap    │◄───│ Config loader   │
//! └─────────────────┘    └─────────────────┘
//! ```

/// Core error types and result handling
pub mod error;

/// Memory type table
pub mod address_map;

/// Table loading from JSON with fallback to the built-in table
pub mod config;

/// PLC ⇄ Modbus conversions
pub mod translator;

/// Input parsing, formatting and logger setup
pub mod utils;

/// Callback logging for conversion traces
pub mod logging;

// Re-export main types for convenience
pub use error::{AddressError, AddressResult};
pub use address_map::{AddressMap, MemoryTypeRecord, DEFAULT_TABLE};
pub use config::{load_address_map, load_address_map_from_str, AddressMapConfig, LoadOutcome};
pub use translator::{
    Conversion, ConversionRequest, ModbusAddress, PlcAddress, RegisterClass, Translator,
};
pub use logging::{LogLevel, LogCallback, CallbackLogger};

/// Conventional file name of the table document
pub const DEFAULT_CONFIG_FILE: &str = "address_map.json";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!("PLC Modbus Addr v{} - PLC memory to Modbus register address translator", VERSION)
}
