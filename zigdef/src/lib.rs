use compact_str::CompactString;
use zigdef_common::{Cluster, ModelId};

pub mod converters;
pub mod definition;
pub mod device;
pub mod devices;
pub mod log;
pub mod registry;
pub mod reporting;
pub mod sim;
pub mod zcl;

pub use zigdef_common as common;

pub use self::{
    definition::{Configure, Definition},
    device::{Device, DeviceError, Endpoint},
    registry::{Configured, LoadError, LoadedDefinition, Registry},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("endpoint {0} not found on device")]
    EndpointNotFound(u8),
    #[error("failed to bind {cluster}: {source}")]
    Bind { cluster: Cluster, source: DeviceError },
    #[error("failed to configure reporting for {cluster}: {source}")]
    ConfigureReporting { cluster: Cluster, source: DeviceError },
    #[error("command {command:#04x} on {cluster} failed: {source}")]
    Command { cluster: Cluster, command: u8, source: DeviceError },
    #[error("device {0} did not report a model id")]
    MissingModelId(String),
    #[error("no definition matches model '{0}'")]
    UnknownModel(ModelId),
    #[error("no handler for property '{0}'")]
    NoHandler(CompactString),
    #[error("invalid value for '{property}': {reason}")]
    InvalidValue { property: CompactString, reason: &'static str },
    #[error("definition error: {0}")]
    Load(#[from] LoadError),
}
