// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ConfigMap convergence and dependent workload restarts.

pub mod converge;
pub mod diff;
pub mod workloads;

pub use converge::{converge, ConvergeReport, TargetOutcome, TargetReport};
pub use diff::{diff, Diff};
pub use workloads::{restart_dependents, uses_config_map};
