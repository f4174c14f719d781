// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Optimistic-concurrency collision or a create racing another creator.
    /// Recoverable by running the pass again.
    #[error("Conflict writing {kind} {namespace}/{name}: {message}")]
    Conflict {
        kind: &'static str,
        namespace: String,
        name: String,
        message: String,
    },

    #[error("Store error on {kind} {namespace}/{name}: {source}")]
    Store {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Invalid resource: {0}")]
    InvalidResource(String),
}

impl ManagerError {
    /// Classify a kube error raised while touching one named object.
    pub fn from_store(
        kind: &'static str,
        namespace: &str,
        name: &str,
        error: kube::Error,
    ) -> Self {
        match error {
            kube::Error::Api(resp) if resp.code == 409 => ManagerError::Conflict {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
                message: resp.message,
            },
            source => ManagerError::Store {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ManagerError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, ManagerError>;
