#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod cluster;
pub mod expose;
pub mod reading;

mod model;
pub use cluster::Cluster;
pub use expose::{Access, Expose, ExposeKind};
pub use model::*;
pub use reading::{Reading, SensorPayload, SensorValue};
