use zigdef_common::{Cluster, ExposeKind, Reading, cluster::attr};

use super::{Message, MessageKind};
use crate::zcl::{Attribute, AttributeValue, DecodeError};

const REPORT_AND_READ: &[MessageKind] = &[MessageKind::Report, MessageKind::ReadResponse];

/// A decoder turning measurement frames into readings
pub struct FromZigbee {
    pub name: &'static str,
    pub cluster: Cluster,
    pub kinds: &'static [MessageKind],
    /// Exposes this decoder can populate
    pub outputs: &'static [ExposeKind],
    convert: fn(&[Attribute]) -> Vec<Reading>,
}

impl core::fmt::Debug for FromZigbee {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FromZigbee")
            .field("name", &self.name)
            .field("cluster", &self.cluster)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl FromZigbee {
    pub fn accepts(&self, msg: &Message) -> bool {
        msg.cluster == self.cluster && self.kinds.contains(&msg.kind)
    }

    pub fn provides(&self, kind: ExposeKind) -> bool {
        self.outputs.contains(&kind)
    }

    /// Messages this decoder does not accept yield no readings
    pub fn decode(&self, msg: &Message) -> Result<Vec<Reading>, DecodeError> {
        if !self.accepts(msg) {
            return Ok(vec![]);
        }

        Ok((self.convert)(&msg.attributes()?))
    }
}

pub static TEMPERATURE: FromZigbee = FromZigbee {
    name: "temperature",
    cluster: Cluster::TemperatureMeasurement,
    kinds: REPORT_AND_READ,
    outputs: &[ExposeKind::Temperature],
    convert: convert_temperature,
};

pub static HUMIDITY: FromZigbee = FromZigbee {
    name: "humidity",
    cluster: Cluster::RelativeHumidity,
    kinds: REPORT_AND_READ,
    outputs: &[ExposeKind::Humidity],
    convert: convert_humidity,
};

pub static CO2: FromZigbee = FromZigbee {
    name: "co2",
    cluster: Cluster::CarbonDioxide,
    kinds: REPORT_AND_READ,
    outputs: &[ExposeKind::Co2],
    convert: convert_co2,
};

pub static ALL: &[&FromZigbee] = &[&TEMPERATURE, &HUMIDITY, &CO2];

pub fn lookup(name: &str) -> Option<&'static FromZigbee> {
    ALL.iter().copied().find(|c| c.name == name)
}

fn precision_round(value: f32, precision: u8) -> f32 {
    let factor = 10f32.powi(precision as i32);
    (value * factor).round() / factor
}

fn measured_value(attrs: &[Attribute]) -> Option<AttributeValue> {
    attrs
        .iter()
        .find(|a| a.id == attr::MEASURED_VALUE)
        .map(|a| a.value)
}

/// Raw bits of a 16-bit integer value, whether sent signed or unsigned
fn raw_bits16(value: AttributeValue) -> Option<u16> {
    match value {
        AttributeValue::Uint16(v) => Some(v),
        AttributeValue::Int16(v) => Some(v as u16),
        _ => None,
    }
}

fn convert_temperature(attrs: &[Attribute]) -> Vec<Reading> {
    match measured_value(attrs) {
        // 0x8000 means the sensor could not take a measurement
        Some(value) if raw_bits16(value) == Some(0x8000) => {
            tracing::debug!("ignoring invalid temperature measurement");
            vec![]
        }
        Some(value) => vec![Reading::number(
            "temperature",
            precision_round(value.as_f32() / 100., 1),
        )],
        None => vec![],
    }
}

fn convert_humidity(attrs: &[Attribute]) -> Vec<Reading> {
    match measured_value(attrs) {
        // 0xffff means the sensor could not take a measurement
        Some(value) if raw_bits16(value) == Some(0xffff) => {
            tracing::debug!("ignoring invalid humidity measurement");
            vec![]
        }
        Some(value) => {
            vec![Reading::number("humidity", precision_round(value.as_f32() / 100., 1))]
        }
        None => vec![],
    }
}

fn convert_co2(attrs: &[Attribute]) -> Vec<Reading> {
    match measured_value(attrs) {
        // NaN is the single precision "no value"
        Some(value) if !value.as_f32().is_finite() || value.as_f32() < 0. => {
            tracing::debug!("ignoring invalid co2 measurement {value:?}");
            vec![]
        }
        Some(value) => vec![Reading::number("co2", (value.as_f32() * 1_000_000.).round())],
        None => vec![],
    }
}
