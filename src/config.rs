// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::requeue;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Only watch ConfigMapManagers in this namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Delay before a failed pass is retried
    pub error_requeue: Duration,
    /// Delay before a pass that hit a write conflict is retried
    pub conflict_requeue: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            error_requeue: Duration::from_secs(requeue::ERROR_SECS),
            conflict_requeue: Duration::from_secs(requeue::CONFLICT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());
        let error_requeue = secs(&lookup, "ERROR_REQUEUE_SECS", requeue::ERROR_SECS)?;
        let conflict_requeue = secs(&lookup, "CONFLICT_REQUEUE_SECS", requeue::CONFLICT_SECS)?;

        Ok(Config {
            watch_namespace,
            error_requeue,
            conflict_requeue,
        })
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    match lookup(key) {
        Some(raw) => {
            let value: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got '{}'", key, raw))?;
            Ok(Duration::from_secs(value))
        }
        None => Ok(Duration::from_secs(default)),
    }
}
