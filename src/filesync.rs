// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Synchronization of Silence CRs from YAML files into the cluster.
//!
//! This is the library half of the `sync` binary: it reads silence
//! manifests from directories, filters them by environment tags, and
//! converges the cluster's legacy Silence CRs onto the file set.
//!
//! Filtering: each `targetTags` entry on a silence is a regex matched
//! against the environment tag map built from `--tag key=value` flags. A
//! tag key absent from the environment matches against the empty string;
//! this mirrors the behavior operators have relied on.
//!
//! Silences annotated `monitoring.giantswarm.io/keep: "true"` are never
//! deleted, even when absent from the file set.

use anyhow::{Context, Result};
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Client, ResourceExt};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::ANNOTATION_KEEP;
use crate::crd::v1alpha1::Silence;

/// The create/update/delete sets computed against the cluster state.
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Silences present in files but absent from the cluster.
    pub create: Vec<Silence>,
    /// Silences present in both whose spec differs; the file version wins.
    pub update: Vec<Silence>,
    /// Names of cluster silences absent from the file set.
    pub delete: Vec<String>,
}

/// Parse `key=value` tag flags into the environment tag map. A flag
/// without `=` yields an empty value.
#[must_use]
pub fn parse_tags(tags: &[String]) -> HashMap<String, String> {
    tags.iter()
        .map(|tag| match tag.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (tag.clone(), String::new()),
        })
        .collect()
}

/// List `.yaml` files directly inside a directory, sorted by name.
///
/// # Errors
///
/// Returns an error when the directory cannot be read.
pub fn find_silence_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "yaml")
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Whether a silence applies to this environment. Every `targetTags`
/// entry must match; the value is a regex matched against the tag map,
/// and an absent tag key matches the empty string.
///
/// # Errors
///
/// Returns an error when a tag value is not a valid regex.
pub fn matches_target_tags(silence: &Silence, tags: &HashMap<String, String>) -> Result<bool> {
    for target_tag in &silence.spec.target_tags {
        let matcher = Regex::new(&target_tag.value).with_context(|| {
            format!(
                "silence {:?} has an invalid targetTags regex {:?}",
                silence.name_any(),
                target_tag.value
            )
        })?;

        let current = tags.get(&target_tag.name).map_or("", String::as_str);
        if !matcher.is_match(current) {
            debug!(
                silence = %silence.name_any(),
                tag = %target_tag.name,
                regex = %target_tag.value,
                value = %current,
                "Silence does not match environment tag"
            );
            return Ok(false);
        }
    }

    Ok(true)
}

/// Load the desired silence set: parse every manifest, drop silences
/// whose target tags do not match the environment, and skip names already
/// accepted (first accepted occurrence wins). A silence rejected by its
/// target tags does not consume its name, so a later same-named manifest
/// that does match the environment still applies.
///
/// # Errors
///
/// Returns an error for unreadable directories or files, unparseable
/// manifests, or invalid target-tag regexes.
pub fn load_desired_silences(
    dirs: &[PathBuf],
    tags: &HashMap<String, String>,
) -> Result<Vec<Silence>> {
    let mut desired = Vec::new();
    let mut seen = HashSet::new();

    for dir in dirs {
        for file in find_silence_files(dir)? {
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;

            let silence: Silence = serde_yaml::from_str(&data)
                .with_context(|| format!("failed to parse {}", file.display()))?;

            let name = silence.name_any();
            if seen.contains(&name) {
                debug!(silence = %name, file = %file.display(), "Skipping duplicated silence");
                continue;
            }

            if matches_target_tags(&silence, tags)? {
                seen.insert(name);
                desired.push(silence);
            }
        }
    }

    Ok(desired)
}

/// Compute the create/update/delete sets between the cluster state and
/// the desired file set.
#[must_use]
pub fn plan_sync(current: &[Silence], desired: &[Silence]) -> SyncPlan {
    let current_by_name: HashMap<String, &Silence> =
        current.iter().map(|s| (s.name_any(), s)).collect();
    let desired_names: HashSet<String> = desired.iter().map(ResourceExt::name_any).collect();

    let mut plan = SyncPlan::default();

    for silence in desired {
        match current_by_name.get(&silence.name_any()) {
            None => plan.create.push(silence.clone()),
            Some(existing) if existing.spec != silence.spec => plan.update.push(silence.clone()),
            Some(_) => {}
        }
    }

    for silence in current {
        let name = silence.name_any();
        if desired_names.contains(&name) {
            continue;
        }

        let kept = silence
            .annotations()
            .get(ANNOTATION_KEEP)
            .is_some_and(|value| value == "true");
        if kept {
            debug!(silence = %name, "Keep annotation present, skipping deletion");
            continue;
        }

        plan.delete.push(name);
    }

    plan
}

/// Apply a sync plan against the cluster.
///
/// # Errors
///
/// Returns an error on the first failed API call.
pub async fn apply_plan(client: &Client, plan: SyncPlan) -> Result<()> {
    let api: Api<Silence> = Api::all(client.clone());

    for name in &plan.delete {
        info!(silence = %name, "Deleting silence absent from the file set");
        api.delete(name, &DeleteParams::default())
            .await
            .with_context(|| format!("failed to delete silence {name:?}"))?;
    }

    for silence in &plan.create {
        let name = silence.name_any();
        info!(silence = %name, "Creating silence from file set");
        api.create(&PostParams::default(), silence)
            .await
            .with_context(|| format!("failed to create silence {name:?}"))?;
    }

    for silence in &plan.update {
        let name = silence.name_any();
        info!(silence = %name, "Updating silence from file set");
        let patch = serde_json::json!({ "spec": &silence.spec });
        api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("failed to update silence {name:?}"))?;
    }

    Ok(())
}

/// Full synchronization pass: load files, compare against the cluster,
/// apply the plan.
///
/// # Errors
///
/// Returns an error on unreadable input, unparseable manifests, or any
/// failed API call.
pub async fn run(client: &Client, dirs: &[PathBuf], tags: &[String]) -> Result<()> {
    let tags = parse_tags(tags);
    let desired = load_desired_silences(dirs, &tags)?;

    let api: Api<Silence> = Api::all(client.clone());
    let current = api
        .list(&ListParams::default())
        .await
        .context("failed to list current silences")?;

    let plan = plan_sync(&current.items, &desired);
    info!(
        create = plan.create.len(),
        update = plan.update.len(),
        delete = plan.delete.len(),
        "Computed silence sync plan"
    );

    apply_plan(client, plan).await
}

#[cfg(test)]
#[path = "filesync_tests.rs"]
mod filesync_tests;
