//! Named converter tables
//!
//! Definitions refer to converters by name; the registry resolves the names
//! against these tables when a definition is loaded.

use bytes::Bytes;
use zigdef_common::Cluster;

use crate::zcl::{self, Attribute, DecodeError};

pub mod from_zigbee;
pub mod to_zigbee;

pub use self::{from_zigbee::FromZigbee, to_zigbee::ToZigbee};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Unsolicited "report attributes"
    Report,
    /// Response to a "read attributes" request
    ReadResponse,
}

/// An inbound frame as handed over by the radio stack
#[derive(Debug, Clone)]
pub struct Message {
    pub cluster: Cluster,
    pub kind: MessageKind,
    /// Link quality of the frame as measured by the coordinator
    pub linkquality: Option<u8>,
    pub data: Bytes,
}

impl Message {
    pub fn report(cluster: Cluster, data: impl Into<Bytes>) -> Self {
        Self { cluster, kind: MessageKind::Report, linkquality: None, data: data.into() }
    }

    pub fn read_response(cluster: Cluster, data: impl Into<Bytes>) -> Self {
        Self {
            cluster,
            kind: MessageKind::ReadResponse,
            linkquality: None,
            data: data.into(),
        }
    }

    pub fn with_linkquality(mut self, linkquality: u8) -> Self {
        self.linkquality = Some(linkquality);
        self
    }

    pub fn attributes(&self) -> Result<Vec<Attribute>, DecodeError> {
        match self.kind {
            MessageKind::Report => zcl::decode_report(self.data.clone()),
            MessageKind::ReadResponse => zcl::decode_read_response(self.data.clone()),
        }
    }
}
