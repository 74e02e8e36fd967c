// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of namespaced Silence resources
//! (`observability.giantswarm.io/v1alpha2`).
//!
//! Same state machine as the legacy reconciler, plus namespace-selector
//! filtering: when a namespace selector is configured, the CR's namespace
//! object is looked up and the pass becomes a no-op unless its labels
//! match.

use anyhow::Result;
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Resource, ResourceExt};
use tracing::{debug, info};

use super::desired;
use super::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use super::Context;
use crate::constants::{FINALIZER_DEPRECATED, FINALIZER_SILENCE_V2};
use crate::crd::v1alpha2::Silence;
use crate::tenancy::extract_tenant;

/// Reconcile a single namespaced Silence resource.
///
/// # Errors
///
/// Any finalizer persistence failure, namespace lookup failure,
/// desired-state build failure, or Alertmanager error aborts the pass;
/// the controller requeues the key.
pub async fn reconcile_silence_v2(ctx: &Context, silence: &Silence) -> Result<()> {
    let name = silence.name_any();
    let namespace = silence.namespace().unwrap_or_default();

    if !namespace_matches(ctx, &namespace).await? {
        debug!(
            namespace = %namespace,
            name = %name,
            "Namespace does not match the configured selector, skipping"
        );
        return Ok(());
    }

    let tenant = extract_tenant(&ctx.config.tenancy, silence.labels());
    debug!(namespace = %namespace, name = %name, tenant = ?tenant, "Reconciling Silence");

    if silence.meta().deletion_timestamp.is_some() {
        if has_finalizer(silence, FINALIZER_SILENCE_V2) {
            let comment = desired::silence_comment(Some(&namespace), &name);
            ctx.service
                .delete_silence(&comment, tenant.as_deref())
                .await?;
            remove_finalizer(&ctx.client, silence, FINALIZER_SILENCE_V2).await?;
        }

        remove_finalizer(&ctx.client, silence, FINALIZER_DEPRECATED).await?;
        return Ok(());
    }

    ensure_finalizer(&ctx.client, silence, FINALIZER_SILENCE_V2).await?;
    remove_finalizer(&ctx.client, silence, FINALIZER_DEPRECATED).await?;

    let desired_silence = desired::desired_from_v1alpha2(silence, ctx.clock.now())?;
    let changed = ctx
        .service
        .sync_silence(desired_silence, tenant.as_deref())
        .await?;

    if changed {
        info!(namespace = %namespace, name = %name, "Silence converged with Alertmanager");
    }

    Ok(())
}

/// Whether events from this namespace should be reconciled. Without a
/// configured selector every namespace matches; with one, the namespace
/// object's labels decide. A CR without a namespace is skipped when a
/// selector is configured.
async fn namespace_matches(ctx: &Context, namespace: &str) -> Result<bool> {
    if ctx.config.namespace_selector.is_empty() {
        return Ok(true);
    }

    if namespace.is_empty() {
        return Ok(false);
    }

    let namespaces: Api<Namespace> = Api::all(ctx.client.clone());
    let ns = namespaces.get(namespace).await?;
    let labels = ns.metadata.labels.unwrap_or_default();

    Ok(ctx.config.namespace_selector.matches(&labels))
}
