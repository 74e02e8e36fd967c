// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Namespaced `Silence` and `RecurringSilence` CRDs
//! (`observability.giantswarm.io/v1alpha2`).
//!
//! The v1alpha2 silence replaces the boolean matcher pair with a single
//! match operator (`=`, `!=`, `=~`, `!~`) and adds explicit time-window
//! fields. `RecurringSilence` materializes child silences on a cron
//! schedule.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Condition;

/// Exact-match operator (`=`)
pub const MATCH_EQUAL: &str = "=";

/// Negated exact-match operator (`!=`)
pub const MATCH_NOT_EQUAL: &str = "!=";

/// Regex-match operator (`=~`)
pub const MATCH_REGEX: &str = "=~";

/// Negated regex-match operator (`!~`)
pub const MATCH_NOT_REGEX: &str = "!~";

/// Alert label predicate with a typed match operator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SilenceMatcher {
    /// Name of the label to match.
    #[schemars(length(min = 1, max = 256))]
    pub name: String,

    /// Value to match for the given label name.
    #[schemars(length(max = 1024))]
    pub value: String,

    /// Match operator: `=`, `!=`, `=~` or `!~`. Defaults to `=`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
}

/// `Silence` suppresses alert notifications whose labels satisfy the
/// configured matchers for a bounded time window.
///
/// The time window is resolved in priority order: `endsAt`, `duration`
/// (relative to `startsAt`), the `valid-until` annotation, and finally a
/// 100-year default.
///
/// # Example
///
/// ```yaml
/// apiVersion: observability.giantswarm.io/v1alpha2
/// kind: Silence
/// metadata:
///   name: maintenance-window
///   namespace: org-acme
/// spec:
///   matchers:
///     - name: alertname
///       value: NodeDown
///   duration: "2h"
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "observability.giantswarm.io",
    version = "v1alpha2",
    kind = "Silence",
    plural = "silences",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct SilenceSpec {
    /// Alert matchers this silence applies to.
    #[schemars(length(min = 1))]
    pub matchers: Vec<SilenceMatcher>,

    /// When the silence becomes active. Defaults to the CR's creation
    /// timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,

    /// When the silence expires. Takes precedence over `duration` and the
    /// `valid-until` annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,

    /// How long the silence should be active from `startsAt`, e.g. `"30m"`,
    /// `"2h"`. Ignored when `endsAt` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// `RecurringSilence` materializes a child [`Silence`] whenever its cron
/// schedule fires, silencing the configured matchers for `duration`.
///
/// # Example
///
/// ```yaml
/// apiVersion: observability.giantswarm.io/v1alpha2
/// kind: RecurringSilence
/// metadata:
///   name: nightly-batch
///   namespace: org-acme
/// spec:
///   schedule: "0 2 * * *"
///   duration: "1h"
///   matchers:
///     - name: alertname
///       value: HighLoad
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "observability.giantswarm.io",
    version = "v1alpha2",
    kind = "RecurringSilence",
    plural = "recurringsilences",
    namespaced,
    status = "RecurringSilenceStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSilenceSpec {
    /// Cron expression in 5-field format
    /// (minute hour day-of-month month day-of-week).
    ///
    /// Examples:
    ///   - `"0 0 * * *"` - daily at midnight
    ///   - `"0 2 * * 1"` - weekly on Monday at 2 AM
    ///   - `"30 14 1 * *"` - monthly on the 1st at 2:30 PM
    #[schemars(regex(pattern = r"^(\S+\s+\S+\s+\S+\s+\S+\s+\S+)$"))]
    pub schedule: String,

    /// How long each materialized silence should last, e.g. `"30m"`, `"2h"`.
    pub duration: String,

    /// Alert matchers copied onto the generated silences.
    #[schemars(length(min = 1))]
    pub matchers: Vec<SilenceMatcher>,
}

/// Observed state of a `RecurringSilence`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSilenceStatus {
    /// Last time a silence was materialized from this schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scheduled_time: Option<DateTime<Utc>>,

    /// Next time a silence will be materialized from this schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_scheduled_time: Option<DateTime<Utc>>,

    /// Name of the child Silence currently managed by this schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_silence: Option<String>,

    /// Latest available observations of the schedule's state.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

#[cfg(test)]
#[path = "v1alpha2_tests.rs"]
mod v1alpha2_tests;
