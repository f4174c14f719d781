// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys written by the manager
pub mod annotations {
    /// Pod template annotation bumped to force a rollout of dependent workloads
    pub const RESTARTED_AT: &str = "configmapmanager/restartedAt";
}

/// The operator name, used as controller identity in logs
pub const OPERATOR_NAME: &str = "configmap-manager";

/// API group of the ConfigMapManager custom resource
pub const API_GROUP: &str = "blacksyrius.ci.com";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Requeue defaults, overridable through the environment
pub mod requeue {
    pub const ERROR_SECS: u64 = 60;
    pub const CONFLICT_SECS: u64 = 5;
}
