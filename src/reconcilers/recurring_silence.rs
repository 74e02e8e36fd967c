// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of RecurringSilence resources.
//!
//! Each pass parses the cron schedule and duration, decides whether a
//! child Silence is due, upserts it with an owner reference back to the
//! parent, and maintains the status subresource. Parse failures are
//! recorded as a `Scheduled=False` condition and retried slowly rather
//! than erroring the event loop: the CR will not become valid without an
//! edit.
//!
//! The materialization decision:
//! - without a `lastScheduledTime`, a trigger inside the lookback window
//!   `[now - duration, now)` means a silence is due (catches triggers
//!   missed while the controller was down, bounded by the silence length);
//! - otherwise, a silence is due once the first trigger after
//!   `lastScheduledTime` has been reached.

use anyhow::{Context as AnyhowContext, Result};
use chrono::{DateTime, Utc};
use cron::Schedule;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{DeleteParams, ListParams, ObjectMeta, Patch, PatchParams, PostParams};
use kube::runtime::controller::Action;
use kube::{Api, Resource, ResourceExt};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use super::status::{create_condition, set_condition};
use super::Context;
use crate::constants::{
    API_GROUP_OBSERVABILITY, API_VERSION_V1ALPHA2, CHILD_SILENCE_SUFFIX, CONDITION_TYPE_SCHEDULED,
    FINALIZER_RECURRING_SILENCE, KIND_RECURRING_SILENCE, MATERIALIZE_FAILURE_REQUEUE_SECS,
    PARSE_FAILURE_REQUEUE_SECS, REASON_CRON_PARSE_ERROR, REASON_DURATION_PARSE_ERROR,
    REASON_SCHEDULED, REASON_SILENCE_CREATE_ERROR, RECURRING_MAX_REQUEUE_SECS,
    RECURRING_MIN_REQUEUE_SECS,
};
use crate::crd::v1alpha2::{RecurringSilence, RecurringSilenceStatus, Silence, SilenceSpec};
use crate::metrics;

/// Reconcile a single RecurringSilence resource.
///
/// Returns the requeue action: the next trigger horizon on success,
/// a slow requeue on parse failures.
///
/// # Errors
///
/// Finalizer, child deletion and status persistence failures abort the
/// pass; the controller requeues the key.
pub async fn reconcile_recurring_silence(
    ctx: &Context,
    recurring: &RecurringSilence,
) -> Result<Action> {
    let namespace = recurring.namespace().unwrap_or_default();
    let name = recurring.name_any();
    let api: Api<RecurringSilence> = Api::namespaced(ctx.client.clone(), &namespace);

    debug!(namespace = %namespace, name = %name, "Reconciling RecurringSilence");

    if recurring.meta().deletion_timestamp.is_some() {
        if has_finalizer(recurring, FINALIZER_RECURRING_SILENCE) {
            delete_child_silences(ctx, recurring).await?;
            remove_finalizer(&ctx.client, recurring, FINALIZER_RECURRING_SILENCE).await?;
        }
        return Ok(Action::await_change());
    }

    ensure_finalizer(&ctx.client, recurring, FINALIZER_RECURRING_SILENCE).await?;

    let mut status = recurring.status.clone().unwrap_or_default();

    let schedule = match parse_schedule(&recurring.spec.schedule) {
        Ok(schedule) => schedule,
        Err(e) => {
            warn!(
                namespace = %namespace,
                name = %name,
                schedule = %recurring.spec.schedule,
                error = %e,
                "Failed to parse cron schedule"
            );
            set_condition(
                &mut status.conditions,
                create_condition(
                    CONDITION_TYPE_SCHEDULED,
                    "False",
                    REASON_CRON_PARSE_ERROR,
                    &e.to_string(),
                ),
            );
            patch_status(&api, &name, &status).await?;
            return Ok(Action::requeue(Duration::from_secs(
                PARSE_FAILURE_REQUEUE_SECS,
            )));
        }
    };

    let duration = match parse_silence_duration(&recurring.spec.duration) {
        Ok(duration) => duration,
        Err(e) => {
            warn!(
                namespace = %namespace,
                name = %name,
                duration = %recurring.spec.duration,
                error = %e,
                "Failed to parse duration"
            );
            set_condition(
                &mut status.conditions,
                create_condition(
                    CONDITION_TYPE_SCHEDULED,
                    "False",
                    REASON_DURATION_PARSE_ERROR,
                    &e.to_string(),
                ),
            );
            patch_status(&api, &name, &status).await?;
            return Ok(Action::requeue(Duration::from_secs(
                PARSE_FAILURE_REQUEUE_SECS,
            )));
        }
    };

    let now = ctx.clock.now();
    let last_scheduled = status.last_scheduled_time;

    if should_materialize(&schedule, last_scheduled, now, duration) {
        let child_name = format!("{name}{CHILD_SILENCE_SUFFIX}");

        if let Err(e) = upsert_child_silence(ctx, recurring, &child_name).await {
            warn!(
                namespace = %namespace,
                name = %name,
                child = %child_name,
                error = %e,
                "Failed to materialize child silence"
            );
            set_condition(
                &mut status.conditions,
                create_condition(
                    CONDITION_TYPE_SCHEDULED,
                    "False",
                    REASON_SILENCE_CREATE_ERROR,
                    &e.to_string(),
                ),
            );
            patch_status(&api, &name, &status).await?;
            return Ok(Action::requeue(Duration::from_secs(
                MATERIALIZE_FAILURE_REQUEUE_SECS,
            )));
        }

        info!(namespace = %namespace, name = %name, child = %child_name, "Materialized child silence");
        metrics::record_silence_materialized(&namespace);

        status.last_scheduled_time = Some(now);
        status.active_silence = Some(child_name);
    }

    let next = next_trigger_after(&schedule, now);
    status.next_scheduled_time = next;
    set_condition(
        &mut status.conditions,
        create_condition(
            CONDITION_TYPE_SCHEDULED,
            "True",
            REASON_SCHEDULED,
            "RecurringSilence is properly scheduled",
        ),
    );
    patch_status(&api, &name, &status).await?;

    let requeue = requeue_horizon(next, now);
    debug!(
        namespace = %namespace,
        name = %name,
        requeue_secs = requeue.as_secs(),
        next_scheduled_time = ?next,
        "Requeueing RecurringSilence"
    );
    Ok(Action::requeue(requeue))
}

/// Parse a 5-field cron expression. The underlying schedule type expects a
/// seconds field, which is pinned to zero.
fn parse_schedule(expression: &str) -> Result<Schedule> {
    let fields = expression.split_whitespace().count();
    if fields != 5 {
        anyhow::bail!("expected 5 cron fields (minute hour day-of-month month day-of-week), got {fields}");
    }

    format!("0 {expression}")
        .parse::<Schedule>()
        .with_context(|| format!("invalid cron expression {expression:?}"))
}

/// Parse the silence duration (`"30m"`, `"2h"`).
fn parse_silence_duration(value: &str) -> Result<chrono::Duration> {
    let std_duration = humantime::parse_duration(value)
        .with_context(|| format!("invalid duration {value:?}"))?;
    chrono::Duration::from_std(std_duration)
        .with_context(|| format!("duration {value:?} out of range"))
}

/// Whether a child silence is due at `now`.
fn should_materialize(
    schedule: &Schedule,
    last_scheduled: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    duration: chrono::Duration,
) -> bool {
    match last_scheduled {
        None => {
            let lookback = now - duration;
            schedule.after(&lookback).next().is_some_and(|t| t < now)
        }
        Some(last) => schedule.after(&last).next().is_some_and(|t| t <= now),
    }
}

/// First trigger strictly after `now`.
fn next_trigger_after(schedule: &Schedule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&now).next()
}

/// Time until the next trigger, clamped to `[1m, 1h]`.
fn requeue_horizon(next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    let seconds = next.map_or(RECURRING_MAX_REQUEUE_SECS as i64, |next| {
        (next - now).num_seconds()
    });

    let clamped = seconds.clamp(
        RECURRING_MIN_REQUEUE_SECS as i64,
        RECURRING_MAX_REQUEUE_SECS as i64,
    );

    Duration::from_secs(clamped.unsigned_abs())
}

/// Create the child silence, or patch the parent's matchers onto an
/// existing one.
async fn upsert_child_silence(
    ctx: &Context,
    parent: &RecurringSilence,
    child_name: &str,
) -> Result<()> {
    let namespace = parent.namespace().unwrap_or_default();
    let api: Api<Silence> = Api::namespaced(ctx.client.clone(), &namespace);

    match api.get(child_name).await {
        Ok(_) => {
            let patch = json!({ "spec": { "matchers": &parent.spec.matchers } });
            api.patch(child_name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
                .context("failed to update child silence")?;
            debug!(child = %child_name, "Updated existing child silence");
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            let child = Silence {
                metadata: ObjectMeta {
                    name: Some(child_name.to_string()),
                    namespace: Some(namespace),
                    owner_references: Some(vec![owner_reference(parent)?]),
                    ..ObjectMeta::default()
                },
                spec: SilenceSpec {
                    matchers: parent.spec.matchers.clone(),
                    starts_at: None,
                    ends_at: None,
                    duration: None,
                },
            };

            api.create(&PostParams::default(), &child)
                .await
                .context("failed to create child silence")?;
            debug!(child = %child_name, "Created child silence");
        }
        Err(e) => return Err(e).context("failed to get existing child silence"),
    }

    Ok(())
}

/// Controller owner reference pointing back at the parent.
fn owner_reference(parent: &RecurringSilence) -> Result<OwnerReference> {
    let uid = parent
        .meta()
        .uid
        .clone()
        .context("RecurringSilence has no uid")?;

    Ok(OwnerReference {
        api_version: format!("{API_GROUP_OBSERVABILITY}/{API_VERSION_V1ALPHA2}"),
        kind: KIND_RECURRING_SILENCE.to_string(),
        name: parent.name_any(),
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

/// Delete every child Silence owned by this parent. Children already gone
/// are skipped.
async fn delete_child_silences(ctx: &Context, parent: &RecurringSilence) -> Result<()> {
    let namespace = parent.namespace().unwrap_or_default();
    let api: Api<Silence> = Api::namespaced(ctx.client.clone(), &namespace);

    let Some(parent_uid) = parent.meta().uid.as_deref() else {
        return Ok(());
    };

    let silences = api
        .list(&ListParams::default())
        .await
        .context("failed to list child silences")?;

    for child in silences
        .items
        .iter()
        .filter(|child| child.owner_references().iter().any(|o| o.uid == parent_uid))
    {
        let child_name = child.name_any();
        match api.delete(&child_name, &DeleteParams::default()).await {
            Ok(_) => info!(child = %child_name, "Deleted child silence"),
            Err(kube::Error::Api(ae)) if ae.code == 404 => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to delete child silence {child_name:?}"))
            }
        }
    }

    Ok(())
}

/// Persist the status subresource.
async fn patch_status(
    api: &Api<RecurringSilence>,
    name: &str,
    status: &RecurringSilenceStatus,
) -> Result<()> {
    let patch = json!({ "status": status });
    api.patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .context("failed to update RecurringSilence status")?;
    Ok(())
}

#[cfg(test)]
#[path = "recurring_silence_tests.rs"]
mod recurring_silence_tests;
