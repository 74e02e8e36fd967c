// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tenant extraction for multi-tenant Alertmanager routing.
//!
//! When tenancy is enabled, the tenant for a CR is read from a configured
//! label key; CRs without the label fall back to the configured default
//! tenant. The resolved tenant rides on every Alertmanager call as the
//! `X-Scope-OrgID` header.

use std::collections::BTreeMap;

/// Tenancy configuration captured at startup.
#[derive(Clone, Debug, Default)]
pub struct TenancyConfig {
    /// Whether tenants are extracted from CR labels at all.
    pub enabled: bool,
    /// Label key holding the tenant on a CR.
    pub label_key: String,
    /// Tenant used when the label is absent or empty.
    pub default_tenant: String,
}

/// Resolve the tenant for a CR from its labels.
///
/// Returns `None` when tenancy is disabled or nothing is configured, in
/// which case the Alertmanager client applies its own configured default.
#[must_use]
pub fn extract_tenant(config: &TenancyConfig, labels: &BTreeMap<String, String>) -> Option<String> {
    if !config.enabled {
        return None;
    }

    if !config.label_key.is_empty() {
        if let Some(tenant) = labels.get(&config.label_key) {
            if !tenant.is_empty() {
                return Some(tenant.clone());
            }
        }
    }

    if config.default_tenant.is_empty() {
        None
    } else {
        Some(config.default_tenant.clone())
    }
}
