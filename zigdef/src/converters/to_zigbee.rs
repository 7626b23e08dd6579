use bytes::Bytes;
use futures::future::BoxFuture;
use serde_json::Value;
use zigdef_common::Cluster;

use crate::{Endpoint, Error, Result};

type SetFn = for<'a> fn(&'a dyn Endpoint, &'a str, &'a Value) -> BoxFuture<'a, Result<()>>;

/// A handler translating a write from the automation layer into a device request
pub struct ToZigbee {
    pub name: &'static str,
    /// Expose properties this handler accepts writes for
    pub keys: &'static [&'static str],
    convert_set: SetFn,
}

impl core::fmt::Debug for ToZigbee {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToZigbee")
            .field("name", &self.name)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl ToZigbee {
    pub fn handles(&self, key: &str) -> bool {
        self.keys.contains(&key)
    }

    pub async fn set(&self, endpoint: &dyn Endpoint, key: &str, value: &Value) -> Result<()> {
        (self.convert_set)(endpoint, key, value).await
    }
}

pub const IDENTIFY_DEFAULT_SECONDS: u16 = 3;

pub static IDENTIFY: ToZigbee = ToZigbee {
    name: "identify",
    keys: &["identify"],
    convert_set: identify,
};

pub static ALL: &[&ToZigbee] = &[&IDENTIFY];

pub fn lookup(name: &str) -> Option<&'static ToZigbee> {
    ALL.iter().copied().find(|c| c.name == name)
}

/// Accepts `"identify"` for the default duration or a number of seconds
fn identify<'a>(endpoint: &'a dyn Endpoint, key: &'a str, value: &'a Value) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let seconds = match value {
            Value::String(s) if s == "identify" => IDENTIFY_DEFAULT_SECONDS,
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(|| Error::InvalidValue {
                    property: key.into(),
                    reason: "duration must fit in 0..=65535 seconds",
                })?,
            _ => {
                return Err(Error::InvalidValue {
                    property: key.into(),
                    reason: "expected \"identify\" or a duration in seconds",
                });
            }
        };

        tracing::debug!(endpoint = endpoint.id(), seconds, "Sending identify");

        let cluster = Cluster::Identify;
        let command = 0x00;
        endpoint
            .command(cluster, command, Bytes::copy_from_slice(&seconds.to_le_bytes()))
            .await
            .map_err(|source| Error::Command { cluster, command, source })
    })
}
