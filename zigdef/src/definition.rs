use core::fmt::Debug;
use std::sync::Arc;

use compact_str::CompactString;
use futures::future::BoxFuture;
use zigdef_common::{Expose, ModelId};

use crate::{Device, Endpoint, Result};

/// One-time setup run after a device pairs
///
/// Logging goes through `tracing`; the registry runs each routine inside a
/// span identifying the device.
pub trait Configure: Send + Sync {
    fn configure<'a>(
        &'a self,
        device: &'a dyn Device,
        coordinator: &'a dyn Endpoint,
    ) -> BoxFuture<'a, Result<()>>;
}

impl<F> Configure for F
where
    F: for<'a> Fn(&'a dyn Device, &'a dyn Endpoint) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    fn configure<'a>(
        &'a self,
        device: &'a dyn Device,
        coordinator: &'a dyn Endpoint,
    ) -> BoxFuture<'a, Result<()>> {
        self(device, coordinator)
    }
}

/// Static description of a device model
///
/// Converters are referenced by name and resolved when the definition is
/// loaded into a [`Registry`](crate::Registry).
#[derive(Clone)]
pub struct Definition {
    /// Model strings a device may report; matched exactly
    pub zigbee_model: Vec<ModelId>,
    pub model: CompactString,
    pub vendor: CompactString,
    pub description: CompactString,
    /// Decoder names; earlier decoders take precedence
    pub from_zigbee: Vec<CompactString>,
    /// Handler names; empty for read-only devices
    pub to_zigbee: Vec<CompactString>,
    pub exposes: Vec<Expose>,
    /// Absent means the device keeps its factory reporting behavior
    pub configure: Option<Arc<dyn Configure>>,
}

impl Definition {
    pub fn matches(&self, model_id: &str) -> bool {
        self.zigbee_model.iter().any(|m| m == model_id)
    }

    pub fn expose(&self, property: &str) -> Option<&Expose> {
        self.exposes.iter().find(|e| e.property == property)
    }
}

impl Debug for Definition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Definition")
            .field("zigbee_model", &self.zigbee_model)
            .field("model", &self.model)
            .field("vendor", &self.vendor)
            .field("description", &self.description)
            .field("from_zigbee", &self.from_zigbee)
            .field("to_zigbee", &self.to_zigbee)
            .field("exposes", &self.exposes)
            .field("configure", &self.configure.is_some())
            .finish()
    }
}
