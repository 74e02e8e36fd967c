// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of legacy cluster-scoped Silence resources
//! (`monitoring.giantswarm.io/v1alpha1`).
//!
//! The pass follows the silence state machine: on deletion, the
//! Alertmanager silence is removed before the finalizer is released; on
//! apply, the finalizer is established first, then the desired silence is
//! built from the CR and handed to the sync service. The deprecated
//! operatorkit finalizer is removed once the current one is in place, or
//! after it has been released on the delete path.

use anyhow::Result;
use kube::{Resource, ResourceExt};
use tracing::{debug, info};

use super::desired;
use super::finalizers::{ensure_cluster_finalizer, has_finalizer, remove_cluster_finalizer};
use super::Context;
use crate::constants::{FINALIZER_DEPRECATED, FINALIZER_SILENCE};
use crate::crd::v1alpha1::Silence;
use crate::tenancy::extract_tenant;

/// Reconcile a single legacy Silence resource.
///
/// # Errors
///
/// Any finalizer persistence failure, desired-state build failure, or
/// Alertmanager error aborts the pass; the controller requeues the key.
pub async fn reconcile_silence(ctx: &Context, silence: &Silence) -> Result<()> {
    let name = silence.name_any();
    let tenant = extract_tenant(&ctx.config.tenancy, silence.labels());

    debug!(name = %name, tenant = ?tenant, "Reconciling Silence");

    if silence.meta().deletion_timestamp.is_some() {
        if has_finalizer(silence, FINALIZER_SILENCE) {
            let comment = desired::silence_comment(None, &name);
            ctx.service
                .delete_silence(&comment, tenant.as_deref())
                .await?;
            remove_cluster_finalizer(&ctx.client, silence, FINALIZER_SILENCE).await?;
        }

        // The legacy finalizer goes last so the CR stays guarded until the
        // external state is confirmed gone.
        remove_cluster_finalizer(&ctx.client, silence, FINALIZER_DEPRECATED).await?;
        return Ok(());
    }

    ensure_cluster_finalizer(&ctx.client, silence, FINALIZER_SILENCE).await?;
    remove_cluster_finalizer(&ctx.client, silence, FINALIZER_DEPRECATED).await?;

    let desired_silence = desired::desired_from_v1alpha1(silence, ctx.clock.now())?;
    let changed = ctx
        .service
        .sync_silence(desired_silence, tenant.as_deref())
        .await?;

    if changed {
        info!(name = %name, "Silence converged with Alertmanager");
    }

    Ok(())
}
