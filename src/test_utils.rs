// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes API and an in-memory resource store.

use crate::error::{ManagerError, Result};
use crate::store::ResourceStore;
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::client::Body;
use kube::error::ErrorResponse;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Method and path of every request received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future =
        Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a Kubernetes Status (error) response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a mock ConfigMap JSON response
pub fn config_map_json(namespace: &str, name: &str, data: &[(&str, &str)]) -> String {
    let data: BTreeMap<&str, &str> = data.iter().copied().collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1"
        },
        "data": data
    })
    .to_string()
}

/// A write recorded by [`InMemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    CreateConfigMap(String),
    UpdateConfigMap(String),
    UpdateDeployment(String),
}

#[derive(Default)]
struct State {
    config_maps: BTreeMap<(String, String), ConfigMap>,
    deployments: Vec<Deployment>,
    writes: Vec<Write>,
    next_version: u64,
    conflict_on_create: HashSet<String>,
    fail_get: HashSet<String>,
    stale_update: HashSet<String>,
    fail_list: HashSet<String>,
    fail_deployment_update: HashSet<String>,
}

impl State {
    fn bump_version(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }
}

fn server_error(message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: "InternalError".to_string(),
        code: 500,
    })
}

fn conflict_error(message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: "Conflict".to_string(),
        code: 409,
    })
}

/// In-memory [`ResourceStore`] with resourceVersion checks and write recording.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_map(self, mut config_map: ConfigMap) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            config_map.metadata.resource_version = Some(state.bump_version());
            let key = (config_map.namespace().unwrap_or_default(), config_map.name_any());
            state.config_maps.insert(key, config_map);
        }
        self
    }

    pub fn with_deployment(self, mut deployment: Deployment) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            deployment.metadata.resource_version = Some(state.bump_version());
            state.deployments.push(deployment);
        }
        self
    }

    /// Make the next reads of this ConfigMap fail with a server error
    pub fn failing_get(self, name: &str) -> Self {
        self.state.lock().unwrap().fail_get.insert(name.to_string());
        self
    }

    /// Pretend another creator wins the race for this ConfigMap
    pub fn conflicting_create(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .conflict_on_create
            .insert(name.to_string());
        self
    }

    /// Pretend another writer bumps this ConfigMap between our read and write
    pub fn stale_update(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .stale_update
            .insert(name.to_string());
        self
    }

    /// Make listing deployments in this namespace fail with a server error
    pub fn failing_list(self, namespace: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_list
            .insert(namespace.to_string());
        self
    }

    pub fn failing_deployment_update(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_deployment_update
            .insert(name.to_string());
        self
    }

    /// Simulate an external editor changing a ConfigMap behind our back
    pub fn edit_config_map(&self, namespace: &str, name: &str, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        let version = state.bump_version();
        if let Some(cm) = state
            .config_maps
            .get_mut(&(namespace.to_string(), name.to_string()))
        {
            cm.data
                .get_or_insert_with(BTreeMap::new)
                .insert(key.to_string(), value.to_string());
            cm.metadata.resource_version = Some(version);
        }
    }

    pub fn config_map(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        self.state
            .lock()
            .unwrap()
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        self.state
            .lock()
            .unwrap()
            .deployments
            .iter()
            .find(|d| d.namespace().as_deref() == Some(namespace) && d.name_any() == name)
            .cloned()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        let state = self.state.lock().unwrap();
        if state.fail_get.contains(name) {
            return Err(ManagerError::from_store(
                "ConfigMap",
                namespace,
                name,
                server_error("store unavailable"),
            ));
        }
        Ok(state
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let mut state = self.state.lock().unwrap();
        let key = (config_map.namespace().unwrap_or_default(), config_map.name_any());
        if state.conflict_on_create.contains(&key.1) || state.config_maps.contains_key(&key) {
            return Err(ManagerError::from_store(
                "ConfigMap",
                &key.0,
                &key.1,
                conflict_error("already exists"),
            ));
        }

        let mut created = config_map.clone();
        created.metadata.resource_version = Some(state.bump_version());
        state.writes.push(Write::CreateConfigMap(key.1.clone()));
        state.config_maps.insert(key, created.clone());
        Ok(created)
    }

    async fn update_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let mut state = self.state.lock().unwrap();
        let key = (config_map.namespace().unwrap_or_default(), config_map.name_any());
        let current = state
            .config_maps
            .get(&key)
            .and_then(|cm| cm.metadata.resource_version.clone());
        if state.stale_update.contains(&key.1)
            || current.is_none()
            || current != config_map.metadata.resource_version
        {
            return Err(ManagerError::from_store(
                "ConfigMap",
                &key.0,
                &key.1,
                conflict_error("the object has been modified"),
            ));
        }

        let mut updated = config_map.clone();
        updated.metadata.resource_version = Some(state.bump_version());
        state.writes.push(Write::UpdateConfigMap(key.1.clone()));
        state.config_maps.insert(key, updated.clone());
        Ok(updated)
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>> {
        let state = self.state.lock().unwrap();
        if state.fail_list.contains(namespace) {
            return Err(ManagerError::from_store(
                "Deployment",
                namespace,
                "*",
                server_error("list timed out"),
            ));
        }
        Ok(state
            .deployments
            .iter()
            .filter(|d| d.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<Deployment> {
        let mut state = self.state.lock().unwrap();
        let namespace = deployment.namespace().unwrap_or_default();
        let name = deployment.name_any();
        if state.fail_deployment_update.contains(&name) {
            return Err(ManagerError::from_store(
                "Deployment",
                &namespace,
                &name,
                server_error("admission webhook unavailable"),
            ));
        }

        let version = state.bump_version();
        let Some(stored) = state
            .deployments
            .iter_mut()
            .find(|d| d.namespace().as_deref() == Some(namespace.as_str()) && d.name_any() == name)
        else {
            return Err(ManagerError::from_store(
                "Deployment",
                &namespace,
                &name,
                server_error("deployment vanished"),
            ));
        };

        let mut updated = deployment.clone();
        updated.metadata.resource_version = Some(version);
        *stored = updated.clone();
        state.writes.push(Write::UpdateDeployment(name));
        Ok(updated)
    }
}
