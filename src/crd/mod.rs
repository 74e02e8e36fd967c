// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for silence management.
//!
//! Two API groups coexist:
//!
//! - [`v1alpha1`] - the legacy, cluster-scoped `Silence` with boolean-pair
//!   matchers (`monitoring.giantswarm.io`)
//! - [`v1alpha2`] - the namespaced `Silence` with typed match operators and
//!   the `RecurringSilence` scheduler resource
//!   (`observability.giantswarm.io`)
//!
//! Both shapes are translated to the same Alertmanager wire representation
//! by [`crate::reconcilers::desired`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod v1alpha1;
pub mod v1alpha2;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. `Scheduled`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}
