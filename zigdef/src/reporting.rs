//! Binding and attribute reporting helpers for configure routines

use serde::Serialize;
use zigdef_common::{Cluster, cluster::attr};

use crate::{Endpoint, Error, Result, zcl::DataType};

/// Reporting intervals in seconds
pub mod rep_interval {
    pub const SECONDS_5: u16 = 5;
    pub const SECONDS_10: u16 = 10;
    pub const MINUTE: u16 = 60;
    pub const MINUTES_5: u16 = 300;
    pub const MINUTES_10: u16 = 600;
    pub const MINUTES_15: u16 = 900;
    pub const MINUTES_30: u16 = 1800;
    pub const HOUR: u16 = 3600;
    pub const MAX: u16 = 62000;
}

/// Minimum change in the attribute's own units before a report is sent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportableChange {
    Integer(u32),
    Float(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportingItem {
    pub attribute: u16,
    pub data_type: DataType,
    pub min: u16,
    pub max: u16,
    pub change: ReportableChange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub min: Option<u16>,
    pub max: Option<u16>,
    pub change: Option<ReportableChange>,
}

impl Overrides {
    pub fn new(min: u16, max: u16, change: ReportableChange) -> Self {
        Self { min: Some(min), max: Some(max), change: Some(change) }
    }
}

/// Binds each cluster in order, stopping at the first failure
pub async fn bind(
    endpoint: &dyn Endpoint,
    coordinator: &dyn Endpoint,
    clusters: &[Cluster],
) -> Result<()> {
    for &cluster in clusters {
        tracing::debug!(endpoint = endpoint.id(), %cluster, "Binding cluster");

        endpoint
            .bind(cluster, coordinator)
            .await
            .map_err(|source| Error::Bind { cluster, source })?;
    }

    Ok(())
}

fn measured_value(
    data_type: DataType,
    min: u16,
    max: u16,
    change: ReportableChange,
    overrides: Overrides,
) -> ReportingItem {
    ReportingItem {
        attribute: attr::MEASURED_VALUE,
        data_type,
        min: overrides.min.unwrap_or(min),
        max: overrides.max.unwrap_or(max),
        change: overrides.change.unwrap_or(change),
    }
}

async fn configure(endpoint: &dyn Endpoint, cluster: Cluster, item: ReportingItem) -> Result<()> {
    tracing::debug!(
        endpoint = endpoint.id(),
        %cluster,
        min = item.min,
        max = item.max,
        change = ?item.change,
        "Configuring reporting",
    );

    endpoint
        .configure_reporting(cluster, &[item])
        .await
        .map_err(|source| Error::ConfigureReporting { cluster, source })
}

/// `MeasuredValue` is 100 × °C, so a change of 10 is 0.1 °C
pub async fn temperature(endpoint: &dyn Endpoint, overrides: Overrides) -> Result<()> {
    let item = measured_value(
        DataType::Int16,
        10,
        rep_interval::HOUR,
        ReportableChange::Integer(100),
        overrides,
    );
    configure(endpoint, Cluster::TemperatureMeasurement, item).await
}

/// `MeasuredValue` is 100 × %RH, so a change of 10 is 0.1 %
pub async fn humidity(endpoint: &dyn Endpoint, overrides: Overrides) -> Result<()> {
    let item = measured_value(
        DataType::Uint16,
        10,
        rep_interval::HOUR,
        ReportableChange::Integer(100),
        overrides,
    );
    configure(endpoint, Cluster::RelativeHumidity, item).await
}

/// `MeasuredValue` is a fraction of one, so a change of 0.00005 is 50 ppm
pub async fn co2(endpoint: &dyn Endpoint, overrides: Overrides) -> Result<()> {
    let item = measured_value(
        DataType::Single,
        10,
        rep_interval::HOUR,
        ReportableChange::Float(0.00005),
        overrides,
    );
    configure(endpoint, Cluster::CarbonDioxide, item).await
}
