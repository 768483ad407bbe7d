/// Utility functions and helpers for address conversion
///
/// This module contains input parsing, table formatting and logger setup.

use log::debug;
use crate::address_map::AddressMap;
use crate::error::{AddressError, AddressResult};

/// Input parsing utilities
pub mod validation {
    use super::*;

    /// Parse a PLC offset typed by a user
    ///
    /// Surrounding whitespace and a leading sign are accepted; negative
    /// offsets are not rejected. Input must fit a 32-bit signed integer, the
    /// result is widened so base offset arithmetic cannot overflow.
    pub fn parse_plc_offset(text: &str) -> AddressResult<i64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AddressError::invalid_address(text, "address is empty"));
        }
        trimmed.parse::<i32>()
            .map(i64::from)
            .map_err(|e| AddressError::invalid_address(text, format!("not a 32-bit integer ({})", e)))
    }

    /// Split Modbus address text into prefix and value
    ///
    /// The text must hold exactly two whitespace-separated tokens, the second
    /// a 32-bit signed integer, e.g. `"4x 912"`.
    pub fn parse_modbus_address(input: &str) -> AddressResult<(String, i64)> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::malformed_input(input, "address is empty"));
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(AddressError::malformed_input(
                input,
                format!("expected '<prefix> <value>' (e.g. 4x 912), found {} token(s)", tokens.len()),
            ));
        }

        let value = tokens[1].parse::<i32>().map(i64::from).map_err(|e| {
            AddressError::malformed_input(input, format!("'{}' is not a 32-bit integer ({})", tokens[1], e))
        })?;

        debug!("Parsed Modbus address '{}' as prefix={} value={}", input, tokens[0], value);
        Ok((tokens[0].to_string(), value))
    }
}

/// Formatting and display utilities
pub mod format {
    use super::*;

    /// Format the table with one memory type per line
    pub fn format_table(map: &AddressMap) -> String {
        let tag_width = map.iter().map(|r| r.tag.len()).max().unwrap_or(0).max("Type".len());
        let mut lines = Vec::with_capacity(map.len() + 2);
        lines.push(format!("{:<tag_width$}  {:>11}  {}", "Type", "Base offset", "Prefix"));
        lines.push(format!("{}  {}  {}", "-".repeat(tag_width), "-".repeat(11), "-".repeat(6)));
        for record in map {
            lines.push(format!(
                "{:<tag_width$}  {:>11}  {}",
                record.tag, record.base_offset, record.modbus_prefix
            ));
        }
        lines.join("\n")
    }
}

/// Logging utilities
pub mod logging {
    /// Initialize simple logger for testing
    pub fn init_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    /// Initialize the command-line logger
    ///
    /// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
    pub fn init_cli_logger(verbose: bool) {
        let default_level = if verbose { "debug" } else { "info" };
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plc_offset() {
        assert_eq!(validation::parse_plc_offset("400").unwrap(), 400);
        assert_eq!(validation::parse_plc_offset("  -3 ").unwrap(), -3);
        assert_eq!(validation::parse_plc_offset("+7").unwrap(), 7);
        assert!(validation::parse_plc_offset("").is_err());
        assert!(validation::parse_plc_offset("1.5").is_err());
        assert!(validation::parse_plc_offset("V400").is_err());

        assert_eq!(validation::parse_plc_offset("2147483647").unwrap(), i64::from(i32::MAX));
        assert!(validation::parse_plc_offset("2147483648").is_err());
        assert!(validation::parse_plc_offset("9999999999").is_err());
    }

    #[test]
    fn test_parse_modbus_address() {
        logging::init_test_logger();

        assert_eq!(validation::parse_modbus_address("4x 912").unwrap(), ("4x".to_string(), 912));
        assert_eq!(validation::parse_modbus_address(" 0x\t-5 ").unwrap(), ("0x".to_string(), -5));

        for bad in ["", "   ", "4x", "4x 912 1", "4x nine", "4x912", "4x 9999999999"] {
            let err = validation::parse_modbus_address(bad).unwrap_err();
            assert!(matches!(err, AddressError::MalformedInput { .. }), "input {:?}", bad);
        }
    }

    #[test]
    fn test_format_table() {
        let table = format::format_table(&AddressMap::default());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("Type"));
        assert!(lines[2].starts_with("M"));
        assert!(lines[2].contains("3072"));
        assert!(lines[2].ends_with("0x"));
    }
}
