//! In-memory devices that record the requests made against them
//!
//! Nothing is sent anywhere; requests succeed unless a failure has been
//! registered for that phase and cluster.

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::Mutex;
use zigdef_common::Cluster;

use crate::{Device, DeviceError, Endpoint, reporting::ReportingItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    Bind { endpoint: u8, cluster: Cluster, target: u8 },
    ConfigureReporting { endpoint: u8, cluster: Cluster, items: Vec<ReportingItem> },
    Command { endpoint: u8, cluster: Cluster, command: u8, payload: Vec<u8> },
}

impl Request {
    pub fn cluster(&self) -> Cluster {
        match self {
            Request::Bind { cluster, .. }
            | Request::ConfigureReporting { cluster, .. }
            | Request::Command { cluster, .. } => *cluster,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Bind,
    ConfigureReporting,
    Command,
}

#[derive(Default)]
struct Journal {
    requests: Mutex<Vec<Request>>,
    failures: Mutex<HashMap<(Phase, Cluster), DeviceError>>,
}

impl Journal {
    async fn record(&self, phase: Phase, request: Request) -> Result<(), DeviceError> {
        let cluster = request.cluster();
        self.requests.lock().await.push(request);

        match self.failures.lock().await.get(&(phase, cluster)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct SimEndpoint {
    id: u8,
    journal: Arc<Journal>,
}

impl SimEndpoint {
    pub fn new(id: u8) -> Self {
        Self { id, journal: Arc::default() }
    }

    pub async fn fail(&self, phase: Phase, cluster: Cluster, error: DeviceError) {
        self.journal.failures.lock().await.insert((phase, cluster), error);
    }

    /// Requests made so far, in the order they were issued
    pub async fn requests(&self) -> Vec<Request> {
        self.journal.requests.lock().await.clone()
    }
}

impl Endpoint for SimEndpoint {
    fn id(&self) -> u8 {
        self.id
    }

    fn bind<'a>(
        &'a self,
        cluster: Cluster,
        target: &'a dyn Endpoint,
    ) -> BoxFuture<'a, Result<(), DeviceError>> {
        Box::pin(async move {
            let request = Request::Bind { endpoint: self.id, cluster, target: target.id() };
            self.journal.record(Phase::Bind, request).await
        })
    }

    fn configure_reporting<'a>(
        &'a self,
        cluster: Cluster,
        items: &'a [ReportingItem],
    ) -> BoxFuture<'a, Result<(), DeviceError>> {
        Box::pin(async move {
            let request =
                Request::ConfigureReporting { endpoint: self.id, cluster, items: items.to_vec() };
            self.journal.record(Phase::ConfigureReporting, request).await
        })
    }

    fn command<'a>(
        &'a self,
        cluster: Cluster,
        command: u8,
        payload: Bytes,
    ) -> BoxFuture<'a, Result<(), DeviceError>> {
        Box::pin(async move {
            let request =
                Request::Command { endpoint: self.id, cluster, command, payload: payload.to_vec() };
            self.journal.record(Phase::Command, request).await
        })
    }
}

/// A device whose endpoints all share one journal
pub struct SimDevice {
    ieee_address: String,
    model_id: Option<String>,
    endpoints: Vec<SimEndpoint>,
    journal: Arc<Journal>,
}

impl SimDevice {
    /// A device exposing endpoint 1
    pub fn new(ieee_address: impl Into<String>, model_id: Option<&str>) -> Self {
        let journal = Arc::<Journal>::default();

        Self {
            ieee_address: ieee_address.into(),
            model_id: model_id.map(str::to_owned),
            endpoints: vec![SimEndpoint { id: 1, journal: journal.clone() }],
            journal,
        }
    }

    pub fn with_endpoints(mut self, ids: &[u8]) -> Self {
        self.endpoints = ids
            .iter()
            .map(|&id| SimEndpoint { id, journal: self.journal.clone() })
            .collect();
        self
    }

    pub async fn fail(&self, phase: Phase, cluster: Cluster, error: DeviceError) {
        self.journal.failures.lock().await.insert((phase, cluster), error);
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.journal.requests.lock().await.clone()
    }
}

impl Device for SimDevice {
    fn ieee_address(&self) -> &str {
        &self.ieee_address
    }

    fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    fn endpoint(&self, id: u8) -> Option<&dyn Endpoint> {
        self.endpoints
            .iter()
            .find(|e| e.id == id)
            .map(|e| e as &dyn Endpoint)
    }
}
