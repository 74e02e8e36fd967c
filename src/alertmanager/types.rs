// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Alertmanager v2 wire types.
//!
//! These mirror the JSON payloads of the Alertmanager silences API. Matchers
//! are always carried in the boolean-pair representation on the wire; the
//! CRD match operators are translated by [`crate::reconcilers::desired`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A silence as stored by Alertmanager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Silence {
    /// Alertmanager-assigned identifier. Empty for silences that have not
    /// been created yet.
    #[serde(default)]
    pub id: String,

    /// Correlation key owned by this operator, see
    /// [`crate::reconcilers::desired::silence_comment`].
    pub comment: String,

    /// Author attribution. Always `silence-operator` for silences written
    /// by this operator.
    pub created_by: String,

    /// Beginning of the suppression window.
    pub starts_at: DateTime<Utc>,

    /// End of the suppression window.
    pub ends_at: DateTime<Utc>,

    /// Label predicates selecting the alerts to suppress.
    pub matchers: Vec<Matcher>,

    /// Server-side state, absent on silences we are about to create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SilenceStatus>,
}

/// Label predicate in the Alertmanager wire representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    /// Label name.
    pub name: String,

    /// Label value or regular expression.
    pub value: String,

    /// Whether `value` is a regular expression.
    pub is_regex: bool,

    /// Whether the predicate is positive; false inverts the match.
    pub is_equal: bool,
}

/// Server-side silence state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceStatus {
    /// One of `active`, `pending` or `expired`.
    pub state: String,
}
