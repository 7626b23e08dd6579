use std::collections::{HashMap, HashSet};

use compact_str::CompactString;
use serde_json::Value;
use tracing::Instrument as _;
use zigdef_common::{ModelId, Reading};

use crate::{
    Definition, Device, Endpoint, Error, Result,
    converters::{FromZigbee, Message, ToZigbee, from_zigbee, to_zigbee},
    devices,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("definition has no zigbee model identifiers")]
    EmptyIdentifiers,
    #[error("definition field '{0}' is empty")]
    EmptyField(&'static str),
    #[error("model identifier '{model_id}' is already claimed by '{existing}'")]
    IdentifierCollision { model_id: ModelId, existing: CompactString },
    #[error("unknown decoder '{0}'")]
    UnknownDecoder(CompactString),
    #[error("unknown handler '{0}'")]
    UnknownHandler(CompactString),
    #[error("expose '{0}' is not populated by any decoder")]
    UncoveredExpose(CompactString),
    #[error("handler '{0}' listed on a device without settable exposes")]
    HandlerOnReadOnlyDevice(CompactString),
}

/// Outcome of [`Registry::configure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configured {
    Done,
    /// The definition has no configure routine
    Skipped,
}

/// A definition whose converter names have been resolved
#[derive(Debug)]
pub struct LoadedDefinition {
    definition: Definition,
    from_zigbee: Vec<&'static FromZigbee>,
    to_zigbee: Vec<&'static ToZigbee>,
}

impl LoadedDefinition {
    fn resolve(definition: Definition) -> Result<Self, LoadError> {
        if definition.zigbee_model.is_empty() {
            return Err(LoadError::EmptyIdentifiers);
        }
        if definition.zigbee_model.iter().any(|m| m.is_empty()) {
            return Err(LoadError::EmptyField("zigbee_model"));
        }
        if definition.model.is_empty() {
            return Err(LoadError::EmptyField("model"));
        }
        if definition.vendor.is_empty() {
            return Err(LoadError::EmptyField("vendor"));
        }

        let from_zigbee = definition
            .from_zigbee
            .iter()
            .map(|name| from_zigbee::lookup(name).ok_or_else(|| LoadError::UnknownDecoder(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let to_zigbee = definition
            .to_zigbee
            .iter()
            .map(|name| to_zigbee::lookup(name).ok_or_else(|| LoadError::UnknownHandler(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(handler) = to_zigbee.first()
            && !definition.exposes.iter().any(|e| e.is_settable())
        {
            return Err(LoadError::HandlerOnReadOnlyDevice(handler.name.into()));
        }

        for expose in &definition.exposes {
            let decoded = from_zigbee.iter().any(|c| c.provides(expose.kind));
            let handled = expose.is_settable() && to_zigbee.iter().any(|c| c.handles(&expose.property));

            if !decoded && !handled {
                return Err(LoadError::UncoveredExpose(expose.property.clone()));
            }
        }

        Ok(Self { definition, from_zigbee, to_zigbee })
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn decoders(&self) -> &[&'static FromZigbee] {
        &self.from_zigbee
    }

    pub fn handlers(&self) -> &[&'static ToZigbee] {
        &self.to_zigbee
    }

    /// Runs every decoder in declared order
    ///
    /// When two decoders produce the same property, the earlier one wins.
    /// Frames a decoder cannot parse are logged and skipped. The frame's
    /// link quality, when known, rides along with any produced readings.
    pub fn decode(&self, msg: &Message) -> Vec<Reading> {
        let mut out = Vec::<Reading>::new();

        for decoder in &self.from_zigbee {
            let readings = match decoder.decode(msg) {
                Ok(readings) => readings,
                Err(e) => {
                    tracing::warn!(
                        decoder = decoder.name,
                        cluster = %msg.cluster,
                        "Failed to decode message: {e}",
                    );
                    continue;
                }
            };

            for reading in readings {
                if out.iter().any(|r| r.property == reading.property) {
                    tracing::debug!(
                        decoder = decoder.name,
                        property = %reading.property,
                        "Dropping reading already produced by an earlier decoder",
                    );
                    continue;
                }
                out.push(reading);
            }
        }

        match msg.linkquality {
            Some(lq) if !out.is_empty() && !out.iter().any(|r| r.property == "linkquality") => {
                out.push(Reading::number("linkquality", lq as f32));
            }
            _ => {}
        }

        out
    }

    /// Writes `value` to the device through the first handler claiming `property`
    pub async fn set(&self, endpoint: &dyn Endpoint, property: &str, value: &Value) -> Result<()> {
        let handler = self
            .to_zigbee
            .iter()
            .find(|h| h.handles(property))
            .ok_or_else(|| Error::NoHandler(property.into()))?;

        handler.set(endpoint, property, value).await
    }

    pub async fn configure(&self, device: &dyn Device, coordinator: &dyn Endpoint) -> Result<Configured> {
        let Some(routine) = &self.definition.configure else {
            tracing::debug!(
                device = device.ieee_address(),
                model = %self.definition.model,
                "No configure routine, keeping default reporting",
            );
            return Ok(Configured::Skipped);
        };

        let span = tracing::info_span!(
            "configure",
            device = device.ieee_address(),
            model = %self.definition.model,
        );

        async {
            tracing::info!("Configuring device");

            match routine.configure(device, coordinator).await {
                Ok(()) => {
                    tracing::info!("Device configured");
                    Ok(Configured::Done)
                }
                Err(e) => {
                    tracing::warn!("Configuration failed: {e}");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Loaded definitions, indexed by model identifier
///
/// Identifiers are unique across the registry: loading a definition that
/// claims an already-registered identifier fails unless done through
/// [`Registry::replace`].
#[derive(Debug, Default)]
pub struct Registry {
    definitions: Vec<LoadedDefinition>,
    by_model: HashMap<ModelId, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every bundled definition
    pub fn with_builtin() -> Result<Self, LoadError> {
        let mut registry = Self::new();
        for definition in devices::definitions() {
            registry.load(definition)?;
        }
        Ok(registry)
    }

    pub fn load(&mut self, definition: Definition) -> Result<(), LoadError> {
        let loaded = LoadedDefinition::resolve(definition)?;

        for model_id in &loaded.definition.zigbee_model {
            if let Some(&idx) = self.by_model.get(model_id) {
                return Err(LoadError::IdentifierCollision {
                    model_id: model_id.clone(),
                    existing: self.definitions[idx].definition.model.clone(),
                });
            }
        }

        tracing::debug!(
            model = %loaded.definition.model,
            vendor = %loaded.definition.vendor,
            "Loaded definition",
        );

        self.insert(loaded);
        Ok(())
    }

    /// Loads `definition`, dropping every definition that shares an identifier with it
    pub fn replace(&mut self, definition: Definition) -> Result<(), LoadError> {
        let loaded = LoadedDefinition::resolve(definition)?;

        let claimed = loaded.definition.zigbee_model.iter().collect::<HashSet<_>>();
        let before = self.definitions.len();

        self.definitions.retain(|existing| {
            let overlaps = existing.definition.zigbee_model.iter().any(|m| claimed.contains(m));
            if overlaps {
                tracing::warn!(
                    replaced = %existing.definition.model,
                    by = %loaded.definition.model,
                    "Replacing definition",
                );
            }
            !overlaps
        });

        if self.definitions.len() != before {
            self.reindex();
        }

        self.insert(loaded);
        Ok(())
    }

    fn insert(&mut self, loaded: LoadedDefinition) {
        let idx = self.definitions.len();
        for model_id in &loaded.definition.zigbee_model {
            self.by_model.insert(model_id.clone(), idx);
        }
        self.definitions.push(loaded);
    }

    fn reindex(&mut self) {
        self.by_model = self
            .definitions
            .iter()
            .enumerate()
            .flat_map(|(idx, d)| d.definition.zigbee_model.iter().map(move |m| (m.clone(), idx)))
            .collect();
    }

    pub fn find(&self, model_id: &str) -> Option<&LoadedDefinition> {
        self.by_model
            .get(&ModelId::from(model_id))
            .map(|&idx| &self.definitions[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Runs the configure routine of the definition matching `device`
    ///
    /// Called once per pairing. Failures are returned as-is; retrying is up to
    /// the caller.
    pub async fn configure(&self, device: &dyn Device, coordinator: &dyn Endpoint) -> Result<Configured> {
        let model_id = device
            .model_id()
            .ok_or_else(|| Error::MissingModelId(device.ieee_address().to_owned()))?;

        let loaded = self
            .find(model_id)
            .ok_or_else(|| Error::UnknownModel(model_id.into()))?;

        loaded.configure(device, coordinator).await
    }
}
