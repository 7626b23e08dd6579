//! Capabilities a definition advertises to the automation layer
//!
//! An expose is a static description: the automation layer reads the list
//! once when a definition is loaded and builds its attribute schema from it.
//! Values for an expose only ever arrive through a decoder that lists the
//! expose's property among its outputs.
//!
//! ```plain
//! {"type":"numeric","name":"temperature","property":"temperature","access":1,"unit":"°C","precision":1}
//! {"type":"enum","name":"identify","property":"identify","access":2,"values":["identify"]}
//! ```

use alloc::{vec, vec::Vec};
use core::ops::BitOr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Access flags, serialized as the raw bit set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Access(u8);

impl Access {
    /// Value is published whenever the device reports it
    pub const STATE: Access = Access(0b001);
    /// Value can be written by the automation layer
    pub const SET: Access = Access(0b010);
    /// Value can be requested from the device
    pub const GET: Access = Access(0b100);

    pub const fn contains(self, other: Access) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Access {
    type Output = Access;

    fn bitor(self, rhs: Self) -> Self::Output {
        Access(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposeKind {
    Temperature,
    Humidity,
    Co2,
    Identify,
}

impl ExposeKind {
    pub const fn property(self) -> &'static str {
        match self {
            ExposeKind::Temperature => "temperature",
            ExposeKind::Humidity => "humidity",
            ExposeKind::Co2 => "co2",
            ExposeKind::Identify => "identify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Numeric,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expose {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(rename = "name")]
    pub kind: ExposeKind,
    /// Key readings for this expose are published under
    pub property: CompactString,
    pub access: Access,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<CompactString>,
    /// Number of decimal places a value is rounded to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<CompactString>,
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub description: CompactString,
}

impl Expose {
    fn numeric(kind: ExposeKind, unit: &'static str, precision: u8, description: &'static str) -> Self {
        Self {
            value_type: ValueType::Numeric,
            kind,
            property: CompactString::const_new(kind.property()),
            access: Access::STATE,
            unit: Some(CompactString::const_new(unit)),
            precision: Some(precision),
            values: vec![],
            description: CompactString::const_new(description),
        }
    }

    /// Temperature in °C, in tenths of a degree
    pub fn temperature() -> Self {
        Self::numeric(ExposeKind::Temperature, "°C", 1, "Measured temperature value")
    }

    /// Relative humidity in %, in tenths of a percent
    pub fn humidity() -> Self {
        Self::numeric(ExposeKind::Humidity, "%", 1, "Measured relative humidity")
    }

    /// CO₂ concentration in ppm
    pub fn co2() -> Self {
        Self::numeric(ExposeKind::Co2, "ppm", 0, "The measured CO2 (carbon dioxide) value")
    }

    pub fn identify() -> Self {
        Self {
            value_type: ValueType::Enum,
            kind: ExposeKind::Identify,
            property: CompactString::const_new("identify"),
            access: Access::SET,
            unit: None,
            precision: None,
            values: vec![CompactString::const_new("identify")],
            description: CompactString::const_new("Initiate device identification"),
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn is_settable(&self) -> bool {
        self.access.contains(Access::SET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_flags() {
        let access = Access::STATE | Access::GET;
        assert!(access.contains(Access::STATE));
        assert!(access.contains(Access::GET));
        assert!(!access.contains(Access::SET));
        assert_eq!(access.bits(), 0b101);
    }

    #[test]
    fn temperature_format() {
        assert_eq!(
            serde_json::to_value(Expose::temperature()).unwrap(),
            serde_json::json!({
                "type": "numeric",
                "name": "temperature",
                "property": "temperature",
                "access": 1,
                "unit": "°C",
                "precision": 1,
                "description": "Measured temperature value",
            })
        );
    }

    #[test]
    fn identify_format() {
        assert_eq!(
            serde_json::to_value(Expose::identify()).unwrap(),
            serde_json::json!({
                "type": "enum",
                "name": "identify",
                "property": "identify",
                "access": 2,
                "values": ["identify"],
                "description": "Initiate device identification",
            })
        );
    }

    #[test]
    fn sensors_are_read_only() {
        for expose in [Expose::temperature(), Expose::humidity(), Expose::co2()] {
            assert!(!expose.is_settable(), "{:?} should be read-only", expose.kind);
        }
        assert!(Expose::identify().is_settable());
        assert!(Expose::co2().with_access(Access::STATE | Access::SET).is_settable());
    }
}
