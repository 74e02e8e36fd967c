// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Legacy cluster-scoped `Silence` CRD (`monitoring.giantswarm.io/v1alpha1`).
//!
//! This is the original silence shape: matchers carry an explicit
//! `isRegex`/`isEqual` boolean pair, and the expiry is driven solely by the
//! `valid-until` annotation. The resource is cluster-scoped and managed in
//! bulk by the file-sync utility, which uses `targetTags` to decide which
//! silences apply to the current environment.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `Silence` suppresses alert notifications whose labels satisfy the
/// configured matchers for a bounded time window.
///
/// # Example
///
/// ```yaml
/// apiVersion: monitoring.giantswarm.io/v1alpha1
/// kind: Silence
/// metadata:
///   name: noisy-test-cluster
///   annotations:
///     valid-until: "2026-12-31"
/// spec:
///   matchers:
///     - name: cluster_id
///       value: test-.*
///       isRegex: true
///   owner: alice
///   issue_url: https://github.com/giantswarm/giantswarm/issues/12345
/// ```
#[derive(CustomResource, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "monitoring.giantswarm.io",
    version = "v1alpha1",
    kind = "Silence",
    plural = "silences",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct SilenceSpec {
    /// Environment tags consumed by the file-sync utility. Each `value` is a
    /// regular expression matched against the environment tag map; silences
    /// whose tags do not match are skipped. Ignored by the controller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_tags: Vec<TargetTag>,

    /// Alert matchers this silence applies to.
    pub matchers: Vec<Matcher>,

    /// GitHub username of the person who created and/or owns the silence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Link to a document describing the problem.
    /// Deprecated: use `issue_url` instead.
    #[serde(
        default,
        rename = "postmortem_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub postmortem_url: Option<String>,

    /// Link to a GitHub issue describing the problem.
    #[serde(default, rename = "issue_url", skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
}

/// Environment tag predicate used by the file-sync utility.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetTag {
    /// Name of the environment tag.
    pub name: String,

    /// Regular expression matched against the tag's value. An absent tag
    /// matches against the empty string.
    pub value: String,
}

/// Alert label predicate in the legacy boolean-pair shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    /// Name of the label to match.
    pub name: String,

    /// Value to match for the given label name.
    pub value: String,

    /// Whether `value` is a regular expression.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_regex: bool,

    /// Whether the predicate is positive. Unset defaults to true; an
    /// explicit false inverts the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_equal: Option<bool>,
}

#[cfg(test)]
#[path = "v1alpha1_tests.rs"]
mod v1alpha1_tests;
