// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Business logic for silence synchronization.
//!
//! [`SilenceService`] compares a desired silence against the state held by
//! Alertmanager and issues the minimal create/update/delete call to
//! converge. It is pure decision logic over the [`AlertmanagerApi`] trait;
//! the wall clock is injected through [`Clock`] so the state machine is
//! deterministic under test.
//!
//! The decision table, given desired silence `D` and clock reading `now`:
//!
//! | Alertmanager state | condition | action |
//! |---|---|---|
//! | absent | `D.ends_at > now` | create |
//! | absent | otherwise | skip (already expired) |
//! | present `E` | `D.ends_at < now` | delete `E` |
//! | present `E` | matchers or `ends_at` differ | update with `E.id` |
//! | present `E` | otherwise | no-op |

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::alertmanager::{AlertmanagerApi, AlertmanagerError, Silence};

/// Injectable wall clock.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock reading the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Silence synchronization service.
pub struct SilenceService {
    alertmanager: Arc<dyn AlertmanagerApi>,
    clock: Arc<dyn Clock>,
}

impl SilenceService {
    /// Create a new service over an Alertmanager client and a clock.
    #[must_use]
    pub fn new(alertmanager: Arc<dyn AlertmanagerApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            alertmanager,
            clock,
        }
    }

    /// Converge Alertmanager towards the desired silence.
    ///
    /// Returns `true` when an Alertmanager write was issued, `false` when
    /// the pass was a no-op. The operation is idempotent: running it twice
    /// with an unchanged desired state performs at most one write.
    ///
    /// # Errors
    ///
    /// Returns [`AlertmanagerError::InvalidSilence`] when the desired
    /// silence has no comment, or any client error other than the
    /// not-found sentinel, which is handled as a normal branch.
    pub async fn sync_silence(
        &self,
        mut desired: Silence,
        tenant: Option<&str>,
    ) -> Result<bool, AlertmanagerError> {
        if desired.comment.is_empty() {
            return Err(AlertmanagerError::InvalidSilence {
                comment: String::new(),
                reason: "comment must not be empty".to_string(),
            });
        }

        let now = self.clock.now();
        debug!(
            comment = %desired.comment,
            starts_at = %desired.starts_at,
            ends_at = %desired.ends_at,
            matchers = desired.matchers.len(),
            "Synchronizing silence"
        );

        let existing = match self
            .alertmanager
            .get_silence_by_comment(&desired.comment, tenant)
            .await
        {
            Ok(existing) => existing,
            Err(e) if e.is_not_found() => {
                if desired.ends_at > now {
                    info!(comment = %desired.comment, ends_at = %desired.ends_at, "Creating silence");
                    self.alertmanager.create_silence(&desired, tenant).await?;
                    return Ok(true);
                }

                info!(comment = %desired.comment, "Skipped creation: silence is already expired");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if desired.ends_at < now {
            info!(comment = %desired.comment, id = %existing.id, "Deleting expired silence");
            self.alertmanager
                .delete_silence_by_id(&existing.id, tenant)
                .await?;
            return Ok(true);
        }

        if Self::update_needed(&existing, &desired) {
            desired.id = existing.id.clone();
            info!(comment = %desired.comment, id = %desired.id, "Updating silence");
            self.alertmanager.update_silence(&desired, tenant).await?;
            return Ok(true);
        }

        debug!(comment = %desired.comment, id = %existing.id, "Silence unchanged");
        Ok(false)
    }

    /// Delete the silence correlated to `comment`, treating an already
    /// absent silence as success.
    ///
    /// # Errors
    ///
    /// Propagates any client error other than the not-found sentinel.
    pub async fn delete_silence(
        &self,
        comment: &str,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError> {
        match self
            .alertmanager
            .delete_silence_by_comment(comment, tenant)
            .await
        {
            Ok(()) => {
                info!(comment = %comment, "Deleted silence");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!(comment = %comment, "Silence already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the existing silence needs an update. Matchers are compared
    /// with order-sensitive equality. `starts_at` is deliberately not part
    /// of the criterion: a change in `starts_at` alone does not trigger a
    /// write.
    fn update_needed(existing: &Silence, desired: &Silence) -> bool {
        existing.matchers != desired.matchers || existing.ends_at != desired.ends_at
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
