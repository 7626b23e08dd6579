//! ZCL clusters used by the bundled definitions
//!
//! Names follow the identifiers bridges commonly use for these clusters
//! (`msTemperatureMeasurement`, `genBasic`, ...), so they can be matched
//! against reports coming from existing coordinator software.

use core::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cluster {
    #[serde(rename = "genBasic")]
    Basic,
    #[serde(rename = "genIdentify")]
    Identify,
    #[serde(rename = "msTemperatureMeasurement")]
    TemperatureMeasurement,
    #[serde(rename = "msRelativeHumidity")]
    RelativeHumidity,
    #[serde(rename = "msCO2")]
    CarbonDioxide,
}

impl Cluster {
    pub const ALL: [Cluster; 5] = [
        Cluster::Basic,
        Cluster::Identify,
        Cluster::TemperatureMeasurement,
        Cluster::RelativeHumidity,
        Cluster::CarbonDioxide,
    ];

    pub const fn id(self) -> u16 {
        match self {
            Cluster::Basic => 0x0000,
            Cluster::Identify => 0x0003,
            Cluster::TemperatureMeasurement => 0x0402,
            Cluster::RelativeHumidity => 0x0405,
            Cluster::CarbonDioxide => 0x040d,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Cluster::Basic => "genBasic",
            Cluster::Identify => "genIdentify",
            Cluster::TemperatureMeasurement => "msTemperatureMeasurement",
            Cluster::RelativeHumidity => "msRelativeHumidity",
            Cluster::CarbonDioxide => "msCO2",
        }
    }

    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl Display for Cluster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({:#06x})", self.name(), self.id())
    }
}

impl FromStr for Cluster {
    type Err = &'static str;

    /// Accepts a cluster name, a hex id (`0x0402`) or a decimal id (`1026`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(cluster) = Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(s)) {
            return Ok(cluster);
        }

        let id = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => s.parse(),
        }
        .map_err(|_| "not a cluster name or id")?;

        Self::from_id(id).ok_or("unsupported cluster id")
    }
}

/// Attribute ids within the measurement clusters
pub mod attr {
    /// `MeasuredValue`, shared by every measurement cluster
    pub const MEASURED_VALUE: u16 = 0x0000;
    pub const MIN_MEASURED_VALUE: u16 = 0x0001;
    pub const MAX_MEASURED_VALUE: u16 = 0x0002;
    pub const TOLERANCE: u16 = 0x0003;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cluster() {
        assert_eq!("msCO2".parse::<Cluster>(), Ok(Cluster::CarbonDioxide));
        assert_eq!("mstemperaturemeasurement".parse::<Cluster>(), Ok(Cluster::TemperatureMeasurement));
        assert_eq!("0x0405".parse::<Cluster>(), Ok(Cluster::RelativeHumidity));
        assert_eq!("1026".parse::<Cluster>(), Ok(Cluster::TemperatureMeasurement));
        assert_eq!("0x0006".parse::<Cluster>(), Err("unsupported cluster id"));
        assert_eq!("onOff".parse::<Cluster>(), Err("not a cluster name or id"));
    }

    #[test]
    fn cluster_serde() {
        assert_eq!(
            serde_json::to_value(Cluster::CarbonDioxide).unwrap(),
            serde_json::json!("msCO2")
        );
        assert_eq!(
            serde_json::from_value::<Cluster>(serde_json::json!("genIdentify")).unwrap(),
            Cluster::Identify
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            Cluster::TemperatureMeasurement.to_string(),
            "msTemperatureMeasurement (0x0402)"
        );
    }
}
