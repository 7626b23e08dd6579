use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One capability-tagged value produced by a decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Property of the expose this value populates, e.g. "temperature"
    pub property: CompactString,
    pub value: SensorValue,
}

impl Reading {
    pub fn number(property: &'static str, value: f32) -> Self {
        Self {
            property: CompactString::const_new(property),
            value: SensorValue::Number(value),
        }
    }

    pub fn into_payload(self, unit: impl Into<CompactString>, timestamp: i64) -> SensorPayload {
        SensorPayload { value: self.value, unit: unit.into(), timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPayload {
    /// Value of the sensor
    pub value: SensorValue,
    /// Unit of the sensor value, e.g., "°C", "%", "ppm"
    pub unit: CompactString,
    /// Unix timestamp in seconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f32),
    Boolean(bool),
}

impl SensorValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            SensorValue::Number(n) => Some(*n),
            SensorValue::Boolean(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_payload_format() {
        assert_eq!(
            serde_json::to_value(Reading::number("co2", 850.).into_payload("ppm", 1712345678))
                .unwrap(),
            serde_json::json!({
                "value": 850.0,
                "unit": "ppm",
                "timestamp": 1712345678
            })
        );
    }

    #[test]
    fn payload_from_json() {
        let payload: SensorPayload = serde_json::from_value(serde_json::json!({
            "value": 1500.0,
            "unit": "ppm",
            "timestamp": 1712345678
        }))
        .unwrap();

        assert_eq!(payload.value.as_number(), Some(1500.));
        assert_eq!(payload.unit, "ppm");
    }

    #[test]
    fn reading_from_json() {
        let reading: Reading =
            serde_json::from_value(serde_json::json!({ "property": "humidity", "value": 41.5 })).unwrap();
        assert_eq!(reading, Reading::number("humidity", 41.5));

        let reading: Reading =
            serde_json::from_value(serde_json::json!({ "property": "identify", "value": false })).unwrap();
        assert_eq!(reading.value, SensorValue::Boolean(false));
        assert_eq!(reading.value.as_number(), None);
    }
}
