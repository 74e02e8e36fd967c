// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for Alertmanager operations.
//!
//! `NotFound` is a sentinel: the sync state machine treats it as a normal
//! branch and never propagates it to the controller event loop. All other
//! variants surface as reconcile errors and are retried via requeue.

use thiserror::Error;

/// Errors produced by the Alertmanager client and the sync service.
#[derive(Debug, Error)]
pub enum AlertmanagerError {
    /// No silence with the given comment exists in Alertmanager.
    #[error("silence with comment {comment:?} not found")]
    NotFound {
        /// The correlation comment that was looked up
        comment: String,
    },

    /// The client configuration is unusable (e.g. empty address).
    #[error("invalid Alertmanager configuration: {0}")]
    InvalidConfig(String),

    /// An update was attempted on a silence without an id.
    #[error("cannot update silence {comment:?}: missing id")]
    MissingSilenceId {
        /// The correlation comment of the silence
        comment: String,
    },

    /// A desired silence failed validation before any HTTP call was made.
    #[error("silence {comment:?} is invalid: {reason}")]
    InvalidSilence {
        /// The correlation comment of the silence
        comment: String,
        /// What failed validation
        reason: String,
    },

    /// Alertmanager answered with a status code other than 200.
    #[error("unexpected HTTP status {status} from Alertmanager while {context}")]
    UnexpectedStatus {
        /// The HTTP status code received
        status: u16,
        /// The operation that was being performed
        context: String,
    },

    /// The HTTP request could not be completed.
    #[error("Alertmanager request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AlertmanagerError {
    /// Whether this error is the not-found sentinel.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
