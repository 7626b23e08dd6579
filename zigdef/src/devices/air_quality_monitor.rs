//! DIY air quality monitor (nRF52840 with a temperature, humidity and CO₂ sensor)
//!
//! <https://github.com/nobodyguy/zigbee_air_quality_monitor_firmware>
//!
//! Two definitions exist for the same model string. [`definition`] is the
//! bundled one; [`definition_without_co2`] describes early firmware that only
//! carried the temperature and humidity clusters and can be swapped in with
//! [`Registry::replace`](crate::Registry::replace).

use std::sync::Arc;

use futures::future::BoxFuture;
use zigdef_common::{Cluster, Expose, ModelId};

use crate::{
    Configure, Definition, Device, Endpoint, Result,
    reporting::{self, Overrides, ReportableChange, rep_interval},
};

pub const MODEL_ID: &str = "AirQualityMonitor_v1.0";

const ENDPOINT: u8 = 1;

const CLUSTERS: &[Cluster] = &[
    Cluster::TemperatureMeasurement,
    Cluster::RelativeHumidity,
    Cluster::CarbonDioxide,
];

fn base() -> Definition {
    Definition {
        zigbee_model: vec![ModelId::const_new(MODEL_ID)],
        model: MODEL_ID.into(),
        vendor: "Custom devices (DiY)".into(),
        description:
            "Air quality monitor (https://github.com/nobodyguy/zigbee_air_quality_monitor_firmware)"
                .into(),
        from_zigbee: vec!["temperature".into(), "humidity".into()],
        to_zigbee: vec![],
        exposes: vec![Expose::temperature(), Expose::humidity()],
        configure: None,
    }
}

pub fn definition() -> Definition {
    let mut definition = base();
    definition.from_zigbee.push("co2".into());
    definition.exposes.push(Expose::co2());
    let routine: Arc<dyn Configure> = Arc::new(configure);
    definition.configure = Some(routine);
    definition
}

pub fn definition_without_co2() -> Definition {
    base()
}

fn configure<'a>(device: &'a dyn Device, coordinator: &'a dyn Endpoint) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let endpoint = device.get_endpoint(ENDPOINT)?;

        reporting::bind(endpoint, coordinator, CLUSTERS).await?;

        // 0.1 °C
        reporting::temperature(
            endpoint,
            Overrides::new(1, rep_interval::MINUTES_5, ReportableChange::Integer(10)),
        )
        .await?;
        // 0.1 %
        reporting::humidity(
            endpoint,
            Overrides::new(1, rep_interval::MINUTES_5, ReportableChange::Integer(10)),
        )
        .await?;
        // 50 ppm
        reporting::co2(
            endpoint,
            Overrides::new(5, rep_interval::MINUTES_5, ReportableChange::Float(0.00005)),
        )
        .await?;

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::json;
    use zigdef_common::{ExposeKind, Reading};

    use super::*;
    use crate::{
        Configured, DeviceError, Error, LoadError, Registry,
        converters::Message,
        sim::{Phase, Request, SimDevice, SimEndpoint},
        zcl::DataType,
    };

    fn kinds(definition: &Definition) -> Vec<ExposeKind> {
        definition.exposes.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn builtin_exposes_co2() {
        let registry = Registry::with_builtin().unwrap();
        let loaded = registry.find(MODEL_ID).unwrap();

        assert_eq!(kinds(loaded.definition()), vec![
            ExposeKind::Temperature,
            ExposeKind::Humidity,
            ExposeKind::Co2,
        ]);
        assert!(loaded.handlers().is_empty());
        assert!(loaded.definition().configure.is_some());
    }

    #[test]
    fn variant_without_co2() {
        let mut registry = Registry::new();
        registry.load(definition_without_co2()).unwrap();
        let loaded = registry.find(MODEL_ID).unwrap();

        assert_eq!(kinds(loaded.definition()), vec![ExposeKind::Temperature, ExposeKind::Humidity]);
        assert!(loaded.definition().configure.is_none());
    }

    #[test]
    fn variants_collide() {
        let mut registry = Registry::new();
        registry.load(definition()).unwrap();

        assert_eq!(
            registry.load(definition_without_co2()).unwrap_err(),
            LoadError::IdentifierCollision {
                model_id: MODEL_ID.into(),
                existing: MODEL_ID.into(),
            }
        );
    }

    #[test]
    fn exposes_format() {
        assert_eq!(
            serde_json::to_value(&definition().exposes).unwrap(),
            json!([
                {
                    "type": "numeric",
                    "name": "temperature",
                    "property": "temperature",
                    "access": 1,
                    "unit": "°C",
                    "precision": 1,
                    "description": "Measured temperature value",
                },
                {
                    "type": "numeric",
                    "name": "humidity",
                    "property": "humidity",
                    "access": 1,
                    "unit": "%",
                    "precision": 1,
                    "description": "Measured relative humidity",
                },
                {
                    "type": "numeric",
                    "name": "co2",
                    "property": "co2",
                    "access": 1,
                    "unit": "ppm",
                    "precision": 0,
                    "description": "The measured CO2 (carbon dioxide) value",
                },
            ])
        );
    }

    #[test]
    fn decodes_reports() {
        let registry = Registry::with_builtin().unwrap();
        let loaded = registry.find(MODEL_ID).unwrap();

        let temperature = Message::report(
            Cluster::TemperatureMeasurement,
            Bytes::from_static(&[0x00, 0x00, 0x29, 0x70, 0x08]),
        );
        assert_eq!(loaded.decode(&temperature), vec![Reading::number("temperature", 21.6)]);

        let mut frame = vec![0x00, 0x00, 0x39];
        frame.extend_from_slice(&0.00085f32.to_le_bytes());
        let co2 = Message::report(Cluster::CarbonDioxide, frame.clone());
        assert_eq!(loaded.decode(&co2), vec![Reading::number("co2", 850.)]);

        let mut registry = Registry::new();
        registry.load(definition_without_co2()).unwrap();
        let co2 = Message::report(Cluster::CarbonDioxide, frame);
        assert_eq!(registry.find(MODEL_ID).unwrap().decode(&co2), vec![]);
    }

    #[tokio::test]
    async fn configure_binds_then_reports() {
        let registry = Registry::with_builtin().unwrap();
        let device = SimDevice::new("0x00124b0029a1b2c3", Some(MODEL_ID));
        let coordinator = SimEndpoint::new(1);

        assert_eq!(registry.configure(&device, &coordinator).await.unwrap(), Configured::Done);

        let bind = |cluster| Request::Bind { endpoint: 1, cluster, target: 1 };
        let report = |cluster, data_type, min, change| Request::ConfigureReporting {
            endpoint: 1,
            cluster,
            items: vec![reporting::ReportingItem {
                attribute: 0x0000,
                data_type,
                min,
                max: 300,
                change,
            }],
        };

        assert_eq!(device.requests().await, vec![
            bind(Cluster::TemperatureMeasurement),
            bind(Cluster::RelativeHumidity),
            bind(Cluster::CarbonDioxide),
            report(
                Cluster::TemperatureMeasurement,
                DataType::Int16,
                1,
                ReportableChange::Integer(10)
            ),
            report(Cluster::RelativeHumidity, DataType::Uint16, 1, ReportableChange::Integer(10)),
            report(Cluster::CarbonDioxide, DataType::Single, 5, ReportableChange::Float(0.00005)),
        ]);
    }

    #[tokio::test]
    async fn failed_bind_skips_reporting() {
        let registry = Registry::with_builtin().unwrap();
        let device = SimDevice::new("0x00124b0029a1b2c3", Some(MODEL_ID));
        let coordinator = SimEndpoint::new(1);
        device
            .fail(Phase::Bind, Cluster::CarbonDioxide, DeviceError::UnsupportedCluster(Cluster::CarbonDioxide))
            .await;

        let err = registry.configure(&device, &coordinator).await.unwrap_err();
        assert!(matches!(err, Error::Bind { cluster: Cluster::CarbonDioxide, .. }));

        let requests = device.requests().await;
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| matches!(r, Request::Bind { .. })));
    }

    #[tokio::test]
    async fn failed_reporting_stops_routine() {
        let registry = Registry::with_builtin().unwrap();
        let device = SimDevice::new("0x00124b0029a1b2c3", Some(MODEL_ID));
        let coordinator = SimEndpoint::new(1);
        device
            .fail(Phase::ConfigureReporting, Cluster::RelativeHumidity, DeviceError::Timeout)
            .await;

        let err = registry.configure(&device, &coordinator).await.unwrap_err();
        assert!(matches!(err, Error::ConfigureReporting {
            cluster: Cluster::RelativeHumidity,
            source: DeviceError::Timeout,
        }));

        let requests = device.requests().await;
        assert_eq!(requests.len(), 5);
        assert!(!requests.iter().any(|r| r.cluster() == Cluster::CarbonDioxide
            && matches!(r, Request::ConfigureReporting { .. })));
    }

    #[tokio::test]
    async fn missing_endpoint() {
        let registry = Registry::with_builtin().unwrap();
        let device = SimDevice::new("0x00124b0029a1b2c3", Some(MODEL_ID)).with_endpoints(&[2]);
        let coordinator = SimEndpoint::new(1);

        let err = registry.configure(&device, &coordinator).await.unwrap_err();
        assert!(matches!(err, Error::EndpointNotFound(1)));
        assert!(device.requests().await.is_empty());
    }

    #[tokio::test]
    async fn variant_without_co2_keeps_default_reporting() {
        let mut registry = Registry::new();
        registry.load(definition_without_co2()).unwrap();
        let device = SimDevice::new("0x00124b0029a1b2c3", Some(MODEL_ID));
        let coordinator = SimEndpoint::new(1);

        assert_eq!(registry.configure(&device, &coordinator).await.unwrap(), Configured::Skipped);
        assert!(device.requests().await.is_empty());
    }
}
