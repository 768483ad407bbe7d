/// PLC ⇄ Modbus address conversion
///
/// This module contains the two conversion algorithms and the value types
/// they produce. Conversions are pure: they read the table and never change it.
///
/// PLC → Modbus is a plain offset addition. Modbus → PLC has to pick one of the
/// memory types sharing a register class. The table stores base offsets only,
/// so the pick is made from a fixed priority list per register class where
/// the first memory type whose base offset does not exceed the value wins.

use std::fmt;
use std::str::FromStr;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::address_map::AddressMap;
use crate::error::{AddressError, AddressResult};
use crate::logging::CallbackLogger;
use crate::utils::validation;

/// Modbus register classes the translator can resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterClass {
    /// Coils (`0x`)
    Coil,
    /// Discrete inputs (`1x`)
    DiscreteInput,
    /// Holding registers (`4x`)
    HoldingRegister,
}

const COIL_CANDIDATES: &[&str] = &["M", "Y"];

const DISCRETE_INPUT_CANDIDATES: &[&str] = &["X"];

// M normally lives in 0x; it is listed here last so a table that moves it to
// 4x still resolves V, T and C first.
const HOLDING_REGISTER_CANDIDATES: &[&str] = &["V", "T", "C", "M"];

impl RegisterClass {
    /// Parse a Modbus prefix such as `"4x"`
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "0x" => Some(RegisterClass::Coil),
            "1x" => Some(RegisterClass::DiscreteInput),
            "4x" => Some(RegisterClass::HoldingRegister),
            _ => None,
        }
    }

    /// Modbus prefix of this class
    pub fn prefix(self) -> &'static str {
        match self {
            RegisterClass::Coil => "0x",
            RegisterClass::DiscreteInput => "1x",
            RegisterClass::HoldingRegister => "4x",
        }
    }

    /// Memory types tried for this class, highest priority first
    ///
    /// A listed memory type only takes part when the table assigns it this
    /// class's prefix.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            RegisterClass::Coil => COIL_CANDIDATES,
            RegisterClass::DiscreteInput => DISCRETE_INPUT_CANDIDATES,
            RegisterClass::HoldingRegister => HOLDING_REGISTER_CANDIDATES,
        }
    }
}

impl fmt::Display for RegisterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Address in Modbus notation, displayed as `"4x 912"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModbusAddress {
    pub prefix: String,
    pub address: i64,
}

impl ModbusAddress {
    pub fn new<S: Into<String>>(prefix: S, address: i64) -> Self {
        Self { prefix: prefix.into(), address }
    }
}

impl fmt::Display for ModbusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.prefix, self.address)
    }
}

impl FromStr for ModbusAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, address) = validation::parse_modbus_address(s)?;
        Ok(Self::new(prefix, address))
    }
}

/// Address in PLC notation, displayed as `"V400"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlcAddress {
    pub tag: String,
    pub offset: i64,
}

impl PlcAddress {
    pub fn new<S: Into<String>>(tag: S, offset: i64) -> Self {
        Self { tag: tag.into(), offset }
    }
}

impl fmt::Display for PlcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tag, self.offset)
    }
}

/// A single conversion to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionRequest {
    PlcToModbus { tag: String, offset: i64 },
    ModbusToPlc { prefix: String, value: i64 },
}

impl fmt::Display for ConversionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionRequest::PlcToModbus { tag, offset } => write!(f, "PLC {}{}", tag, offset),
            ConversionRequest::ModbusToPlc { prefix, value } => write!(f, "Modbus {} {}", prefix, value),
        }
    }
}

/// Successful conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conversion {
    Modbus(ModbusAddress),
    Plc(PlcAddress),
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Modbus(address) => write!(f, "Modbus {}", address),
            Conversion::Plc(address) => write!(f, "PLC {}", address),
        }
    }
}

/// Converts addresses against a borrowed table
#[derive(Clone)]
pub struct Translator<'a> {
    map: &'a AddressMap,
    logger: Option<CallbackLogger>,
}

impl<'a> Translator<'a> {
    /// Create a translator over a table
    pub fn new(map: &'a AddressMap) -> Self {
        Self { map, logger: None }
    }

    /// Create a translator that reports every conversion to a logger
    pub fn with_logger(map: &'a AddressMap, logger: CallbackLogger) -> Self {
        Self { map, logger: Some(logger) }
    }

    /// Table in use
    pub fn address_map(&self) -> &'a AddressMap {
        self.map
    }

    /// Memory type tags in table order
    pub fn list_memory_types(&self) -> Vec<&'a str> {
        self.map.tags()
    }

    /// Memory type selected when the user has not chosen one
    pub fn default_memory_type(&self) -> Option<&'a str> {
        self.map.records().first().map(|record| record.tag.as_str())
    }

    /// Convert a PLC address to Modbus notation
    ///
    /// ```rust
    /// use plc_modbus_addr::{AddressMap, Translator};
    ///
    /// let map = AddressMap::default();
    /// let address = Translator::new(&map).plc_to_modbus("V", 400).unwrap();
    /// assert_eq!(address.to_string(), "4x 912");
    /// ```
    pub fn plc_to_modbus(&self, tag: &str, offset: i64) -> AddressResult<ModbusAddress> {
        let result = self.resolve_plc(tag, offset);
        self.trace(
            || ConversionRequest::PlcToModbus { tag: tag.to_string(), offset },
            &result,
            Conversion::Modbus,
        );
        result
    }

    /// Convert a PLC tag and offset text, as typed by a user
    pub fn plc_to_modbus_str(&self, tag: &str, offset: &str) -> AddressResult<ModbusAddress> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(AddressError::unknown_memory_type(tag));
        }
        let offset = validation::parse_plc_offset(offset)?;
        self.plc_to_modbus(tag, offset)
    }

    /// Convert a Modbus address to PLC notation
    ///
    /// ```rust
    /// use plc_modbus_addr::{AddressMap, Translator};
    ///
    /// let map = AddressMap::default();
    /// let address = Translator::new(&map).modbus_to_plc("0x", 3500).unwrap();
    /// assert_eq!(address.to_string(), "M428");
    /// ```
    pub fn modbus_to_plc(&self, prefix: &str, value: i64) -> AddressResult<PlcAddress> {
        let result = self.resolve_modbus(prefix, value);
        self.trace(
            || ConversionRequest::ModbusToPlc { prefix: prefix.to_string(), value },
            &result,
            Conversion::Plc,
        );
        result
    }

    /// Convert Modbus address text of the form `"<prefix> <value>"`
    pub fn modbus_to_plc_str(&self, input: &str) -> AddressResult<PlcAddress> {
        let (prefix, value) = validation::parse_modbus_address(input)?;
        self.modbus_to_plc(&prefix, value)
    }

    /// Perform a conversion request
    pub fn convert(&self, request: &ConversionRequest) -> AddressResult<Conversion> {
        match request {
            ConversionRequest::PlcToModbus { tag, offset } => {
                self.plc_to_modbus(tag, *offset).map(Conversion::Modbus)
            }
            ConversionRequest::ModbusToPlc { prefix, value } => {
                self.modbus_to_plc(prefix, *value).map(Conversion::Plc)
            }
        }
    }

    fn resolve_plc(&self, tag: &str, offset: i64) -> AddressResult<ModbusAddress> {
        let record = self.map.get(tag)
            .ok_or_else(|| AddressError::unknown_memory_type(tag))?;

        let address = offset.checked_add(i64::from(record.base_offset)).ok_or_else(|| {
            AddressError::invalid_address(
                offset.to_string(),
                format!("offset overflows when added to base offset {}", record.base_offset),
            )
        })?;

        Ok(ModbusAddress::new(record.modbus_prefix.clone(), address))
    }

    fn resolve_modbus(&self, prefix: &str, value: i64) -> AddressResult<PlcAddress> {
        let class = RegisterClass::from_prefix(prefix)
            .ok_or_else(|| AddressError::no_matching_memory_type(prefix, value))?;

        for tag in class.candidates() {
            // Tags missing from a custom table simply drop out of the search.
            let Some(record) = self.map.get(tag) else {
                continue;
            };
            if record.modbus_prefix != class.prefix() {
                continue;
            }

            let base = i64::from(record.base_offset);
            if value >= base {
                debug!("{} {} matched {} (base offset {})", prefix, value, record.tag, base);
                return Ok(PlcAddress::new(record.tag.clone(), value - base));
            }
        }

        Err(AddressError::no_matching_memory_type(prefix, value))
    }

    // Request and result copies are only built when a logger is attached.
    fn trace<T: Clone>(
        &self,
        request: impl FnOnce() -> ConversionRequest,
        result: &AddressResult<T>,
        wrap: fn(T) -> Conversion,
    ) {
        if let Some(ref logger) = self.logger {
            logger.log_conversion(&request(), &result.clone().map(wrap));
        }
    }
}

impl fmt::Debug for Translator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("map", self.map)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_map::MemoryTypeRecord;

    #[test]
    fn test_plc_to_modbus() {
        let map = AddressMap::default();
        let translator = Translator::new(&map);

        assert_eq!(translator.plc_to_modbus("V", 400).unwrap(), ModbusAddress::new("4x", 912));
        assert_eq!(translator.plc_to_modbus("X", 7).unwrap(), ModbusAddress::new("1x", 7));
        assert_eq!(translator.plc_to_modbus("C", 0).unwrap(), ModbusAddress::new("4x", 16384));
    }

    #[test]
    fn test_plc_to_modbus_unknown_tag() {
        let map = AddressMap::default();
        let err = Translator::new(&map).plc_to_modbus("Z", 5).unwrap_err();
        assert_eq!(err, AddressError::unknown_memory_type("Z"));
    }

    #[test]
    fn test_plc_to_modbus_accepts_negative_offset() {
        let map = AddressMap::default();
        let address = Translator::new(&map).plc_to_modbus("V", -12).unwrap();
        assert_eq!(address, ModbusAddress::new("4x", 500));
    }

    #[test]
    fn test_plc_to_modbus_overflow() {
        let map = AddressMap::default();
        let err = Translator::new(&map).plc_to_modbus("C", i64::MAX).unwrap_err();
        assert!(matches!(err, AddressError::InvalidAddress { .. }));
    }

    #[test]
    fn test_plc_to_modbus_str() {
        let map = AddressMap::default();
        let translator = Translator::new(&map);

        assert_eq!(translator.plc_to_modbus_str("V", " 400 ").unwrap().to_string(), "4x 912");
        assert!(matches!(
            translator.plc_to_modbus_str("V", "4OO").unwrap_err(),
            AddressError::InvalidAddress { .. }
        ));
        assert!(matches!(
            translator.plc_to_modbus_str("", "1").unwrap_err(),
            AddressError::UnknownMemoryType { .. }
        ));
    }

    #[test]
    fn test_coil_priority() {
        let map = AddressMap::default();
        let translator = Translator::new(&map);

        assert_eq!(translator.modbus_to_plc("0x", 3500).unwrap(), PlcAddress::new("M", 428));
        assert_eq!(translator.modbus_to_plc("0x", 3072).unwrap(), PlcAddress::new("M", 0));
        assert_eq!(translator.modbus_to_plc("0x", 3071).unwrap(), PlcAddress::new("Y", 1535));
        assert_eq!(translator.modbus_to_plc("0x", 1536).unwrap(), PlcAddress::new("Y", 0));
        assert!(translator.modbus_to_plc("0x", 1535).is_err());
    }

    #[test]
    fn test_holding_register_priority() {
        let map = AddressMap::default();
        let translator = Translator::new(&map);

        assert_eq!(translator.modbus_to_plc("4x", 912).unwrap(), PlcAddress::new("V", 400));
        // V wins for every value from 512 up, including the T and C ranges.
        assert_eq!(translator.modbus_to_plc("4x", 15500).unwrap(), PlcAddress::new("V", 14988));
        assert_eq!(translator.modbus_to_plc("4x", 16384).unwrap(), PlcAddress::new("V", 15872));
        assert!(translator.modbus_to_plc("4x", 511).is_err());
    }

    #[test]
    fn test_discrete_inputs() {
        let map = AddressMap::default();
        let translator = Translator::new(&map);

        assert_eq!(translator.modbus_to_plc("1x", 0).unwrap(), PlcAddress::new("X", 0));
        assert_eq!(translator.modbus_to_plc("1x", 42).unwrap(), PlcAddress::new("X", 42));
        assert!(translator.modbus_to_plc("1x", -1).is_err());
    }

    #[test]
    fn test_unknown_register_class() {
        let map = AddressMap::default();
        let err = Translator::new(&map).modbus_to_plc("9x", 10).unwrap_err();
        assert_eq!(err, AddressError::no_matching_memory_type("9x", 10));

        // 3x is a real Modbus class but no memory type maps there.
        assert!(Translator::new(&map).modbus_to_plc("3x", 10).is_err());
    }

    #[test]
    fn test_m_joins_holding_registers_when_configured() {
        let records = vec![
            MemoryTypeRecord::new("M", 100, "4x"),
            MemoryTypeRecord::new("V", 512, "4x"),
            MemoryTypeRecord::new("T", 15360, "4x"),
            MemoryTypeRecord::new("C", 16384, "4x"),
        ];
        let map = AddressMap::from_records(records).unwrap();
        let translator = Translator::new(&map);

        assert_eq!(translator.modbus_to_plc("4x", 300).unwrap(), PlcAddress::new("M", 200));
        assert_eq!(translator.modbus_to_plc("4x", 600).unwrap(), PlcAddress::new("V", 88));
    }

    #[test]
    fn test_m_stays_out_of_holding_registers_by_default() {
        let records = vec![
            MemoryTypeRecord::new("M", 100, "0x"),
            MemoryTypeRecord::new("V", 512, "4x"),
        ];
        let map = AddressMap::from_records(records).unwrap();
        assert!(Translator::new(&map).modbus_to_plc("4x", 300).is_err());
    }

    #[test]
    fn test_missing_candidates_are_skipped() {
        let map = AddressMap::from_records(vec![MemoryTypeRecord::new("Y", 10, "0x")]).unwrap();
        let translator = Translator::new(&map);

        assert_eq!(translator.modbus_to_plc("0x", 15).unwrap(), PlcAddress::new("Y", 5));
        assert!(translator.modbus_to_plc("4x", 15).is_err());
    }

    #[test]
    fn test_convert_request() {
        let map = AddressMap::default();
        let translator = Translator::new(&map);

        let request = ConversionRequest::PlcToModbus { tag: "Y".to_string(), offset: 4 };
        assert_eq!(
            translator.convert(&request).unwrap(),
            Conversion::Modbus(ModbusAddress::new("0x", 1540))
        );

        let request = ConversionRequest::ModbusToPlc { prefix: "1x".to_string(), value: 9 };
        assert_eq!(translator.convert(&request).unwrap().to_string(), "PLC X9");
    }

    #[test]
    fn test_listing() {
        let map = AddressMap::default();
        let translator = Translator::new(&map);
        assert_eq!(translator.list_memory_types(), vec!["M", "V", "X", "Y", "T", "C"]);
        assert_eq!(translator.default_memory_type(), Some("M"));
    }

    #[test]
    fn test_candidates_follow_configured_prefix() {
        let records = vec![
            MemoryTypeRecord::new("M", 100, "4x"),
            MemoryTypeRecord::new("Y", 1536, "0x"),
            MemoryTypeRecord::new("V", 512, "1x"),
        ];
        let map = AddressMap::from_records(records).unwrap();
        let translator = Translator::new(&map);

        // M moved to 4x no longer shadows Y in 0x.
        assert_eq!(translator.modbus_to_plc("0x", 3500).unwrap(), PlcAddress::new("Y", 1964));
        // V moved to 1x is not a 4x candidate, so only M is left there.
        assert_eq!(translator.modbus_to_plc("4x", 912).unwrap(), PlcAddress::new("M", 812));
    }

    #[test]
    fn test_register_class_prefixes() {
        for class in [RegisterClass::Coil, RegisterClass::DiscreteInput, RegisterClass::HoldingRegister] {
            assert_eq!(RegisterClass::from_prefix(class.prefix()), Some(class));
        }
        assert_eq!(RegisterClass::from_prefix("0X"), None);
    }

    #[test]
    fn test_logger_sees_each_conversion() {
        use std::sync::{Arc, Mutex};
        use crate::logging::LogLevel;

        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = CallbackLogger::new(
            Some(Box::new(move |level: LogLevel, message: &str| {
                sink.lock().unwrap().push(format!("{:?} {}", level, message));
            })),
            LogLevel::Info,
        );

        let map = AddressMap::default();
        let quiet = Translator::new(&map);
        let traced = Translator::with_logger(&map, logger);

        assert_eq!(quiet.modbus_to_plc("4x", 912), traced.modbus_to_plc("4x", 912));
        assert_eq!(quiet.plc_to_modbus("Z", 1), traced.plc_to_modbus("Z", 1));
        assert!(quiet.modbus_to_plc_str("4x nine").is_err());

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Info Modbus 4x 912 -> PLC V400");
        assert!(lines[1].starts_with("Warn PLC Z1 failed: Unknown memory type"));
    }
}
