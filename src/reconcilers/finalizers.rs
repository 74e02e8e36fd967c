// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for silence resources.
//!
//! Finalizers block CR deletion until the correlated Alertmanager silence
//! is confirmed absent. These helpers are idempotent: adding a finalizer
//! that is already present, or removing one that is already gone, is a
//! no-op without an API call.
//!
//! Both namespaced (`v1alpha2`) and cluster-scoped (`v1alpha1`) resources
//! are supported. The deprecated operatorkit finalizer is removed with the
//! same primitives after the current finalizer has been established (on
//! the apply path) or removed (on the delete path).

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::core::{ClusterResourceScope, NamespaceResourceScope};
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::info;

/// Whether a resource currently carries the given finalizer.
pub fn has_finalizer<K: Resource>(resource: &K, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|finalizers| finalizers.iter().any(|f| f == finalizer))
}

/// Add a finalizer to a namespaced resource if not already present.
///
/// # Errors
///
/// Returns an error when the patch fails; the caller must abort the
/// reconcile pass so no external state is touched without the guard.
pub async fn ensure_finalizer<K>(client: &Client, resource: &K, finalizer: &str) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();
    info!(
        finalizer = %finalizer,
        resource = %format!("{namespace}/{name}"),
        "Adding finalizer"
    );

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.push(finalizer.to_string());

    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Remove a finalizer from a namespaced resource if present.
///
/// # Errors
///
/// Returns an error when the patch fails.
pub async fn remove_finalizer<K>(client: &Client, resource: &K, finalizer: &str) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();
    info!(
        finalizer = %finalizer,
        resource = %format!("{namespace}/{name}"),
        "Removing finalizer"
    );

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.retain(|f| f != finalizer);

    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Add a finalizer to a cluster-scoped resource if not already present.
///
/// # Errors
///
/// Returns an error when the patch fails.
pub async fn ensure_cluster_finalizer<K>(
    client: &Client,
    resource: &K,
    finalizer: &str,
) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = ClusterResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let name = resource.name_any();
    info!(finalizer = %finalizer, resource = %name, "Adding finalizer");

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.push(finalizer.to_string());

    let api: Api<K> = Api::all(client.clone());
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Remove a finalizer from a cluster-scoped resource if present.
///
/// # Errors
///
/// Returns an error when the patch fails.
pub async fn remove_cluster_finalizer<K>(
    client: &Client,
    resource: &K,
    finalizer: &str,
) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = ClusterResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let name = resource.name_any();
    info!(finalizer = %finalizer, resource = %name, "Removing finalizer");

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.retain(|f| f != finalizer);

    let api: Api<K> = Api::all(client.clone());
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
