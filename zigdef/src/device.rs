//! The slice of the radio stack a definition talks to
//!
//! Implementations live in the bridge; every request is a round trip over
//! the network and may fail independently.

use bytes::Bytes;
use futures::future::BoxFuture;
use zigdef_common::Cluster;

use crate::{Error, Result, reporting::ReportingItem};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("request timed out")]
    Timeout,
    #[error("device is offline")]
    Offline,
    #[error("cluster {0} is not supported by the device")]
    UnsupportedCluster(Cluster),
    #[error("device responded with ZCL status {0:#04x}")]
    Status(u8),
    #[error("{0}")]
    Other(String),
}

pub trait Endpoint: Send + Sync {
    fn id(&self) -> u8;

    /// Creates a binding so reports for `cluster` are sent to `target`
    fn bind<'a>(
        &'a self,
        cluster: Cluster,
        target: &'a dyn Endpoint,
    ) -> BoxFuture<'a, Result<(), DeviceError>>;

    fn configure_reporting<'a>(
        &'a self,
        cluster: Cluster,
        items: &'a [ReportingItem],
    ) -> BoxFuture<'a, Result<(), DeviceError>>;

    fn command<'a>(
        &'a self,
        cluster: Cluster,
        command: u8,
        payload: Bytes,
    ) -> BoxFuture<'a, Result<(), DeviceError>>;
}

pub trait Device: Send + Sync {
    fn ieee_address(&self) -> &str;

    /// Model string read from the Basic cluster during interview, if any
    fn model_id(&self) -> Option<&str>;

    fn endpoint(&self, id: u8) -> Option<&dyn Endpoint>;

    fn get_endpoint(&self, id: u8) -> Result<&dyn Endpoint> {
        self.endpoint(id).ok_or(Error::EndpointNotFound(id))
    }
}
