// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Key/value differencing between desired updates and observed ConfigMap data

use crate::types::ConfigMapUpdate;
use std::collections::BTreeMap;

/// Result of merging updates into observed data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diff {
    /// Observed data with every update applied
    pub data: BTreeMap<String, String>,
    /// Whether any assignment actually changed a value
    pub changed: bool,
    /// Keys that were assigned, in first-assignment order
    pub changed_keys: Vec<String>,
}

/// Merge `updates` into `observed`, in order.
///
/// Keys not mentioned in `updates` are kept. An absent map is treated as empty.
/// Duplicate keys are applied as successive assignments, so the last one wins.
pub fn diff(observed: Option<&BTreeMap<String, String>>, updates: &[ConfigMapUpdate]) -> Diff {
    let mut result = Diff {
        data: observed.cloned().unwrap_or_default(),
        ..Default::default()
    };

    for update in updates {
        if result.data.get(&update.key) == Some(&update.new_value) {
            continue;
        }
        result
            .data
            .insert(update.key.clone(), update.new_value.clone());
        result.changed = true;
        if !result.changed_keys.contains(&update.key) {
            result.changed_keys.push(update.key.clone());
        }
    }

    result
}
