// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for each resource type.
//!
//! Each reconciler is a single idempotent pass: observe the CR, converge
//! the external Alertmanager state through the sync service, and maintain
//! the finalizer protocol. Errors surface to the controller event loop in
//! `main.rs`, which requeues the key.

pub mod desired;
pub mod finalizers;
pub mod recurring_silence;
pub mod silence;
pub mod silence_v2;
pub mod status;

pub use recurring_silence::reconcile_recurring_silence;
pub use silence::reconcile_silence;
pub use silence_v2::reconcile_silence_v2;

use kube::Client;
use std::sync::Arc;

use crate::config::OperatorConfig;
use crate::service::{Clock, SilenceService};

/// Shared context passed to all reconcilers.
pub struct Context {
    /// Kubernetes client for CR store access.
    pub client: Client,

    /// Silence synchronization service over the Alertmanager client.
    pub service: SilenceService,

    /// Clock shared with the sync service, injected for deterministic
    /// tests.
    pub clock: Arc<dyn Clock>,

    /// Operator configuration captured at startup.
    pub config: OperatorConfig,
}
