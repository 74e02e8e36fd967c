// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration, loaded from environment variables at startup.
//!
//! All state beyond this configuration lives in the CR store or in
//! Alertmanager. Variables:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `SILENCE_OPERATOR_ALERTMANAGER_ADDRESS` | Alertmanager base URL (required) | - |
//! | `SILENCE_OPERATOR_ALERTMANAGER_AUTHENTICATION` | send a bearer token | `false` |
//! | `SILENCE_OPERATOR_ALERTMANAGER_BEARER_TOKEN` | token for the above | empty |
//! | `SILENCE_OPERATOR_ALERTMANAGER_DEFAULT_TENANT` | default `X-Scope-OrgID` | empty |
//! | `SILENCE_OPERATOR_TENANCY_ENABLED` | extract tenants from CR labels | `false` |
//! | `SILENCE_OPERATOR_TENANCY_LABEL_KEY` | label key holding the tenant | empty |
//! | `SILENCE_OPERATOR_SILENCE_SELECTOR` | label query filtering Silence events | empty |
//! | `SILENCE_OPERATOR_NAMESPACE_SELECTOR` | label query restricting namespaces (v1alpha2) | empty |

use anyhow::{Context, Result};

use crate::alertmanager::AlertmanagerConfig;
use crate::selector::LabelSelector;
use crate::tenancy::TenancyConfig;

/// Full operator configuration captured at startup.
#[derive(Clone, Debug, Default)]
pub struct OperatorConfig {
    /// Alertmanager client configuration.
    pub alertmanager: AlertmanagerConfig,

    /// Tenant extraction configuration.
    pub tenancy: TenancyConfig,

    /// Raw silence selector string, applied server-side on the watchers.
    /// Empty means no filtering.
    pub silence_selector: String,

    /// Parsed namespace selector restricting which namespaces the
    /// v1alpha2 controller acts on. Empty means all namespaces.
    pub namespace_selector: LabelSelector,
}

impl OperatorConfig {
    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the Alertmanager address is missing or empty,
    /// or when a selector string does not parse. Either case fails process
    /// start.
    pub fn load() -> Result<Self> {
        let address = env_string("SILENCE_OPERATOR_ALERTMANAGER_ADDRESS");
        if address.is_empty() {
            anyhow::bail!("SILENCE_OPERATOR_ALERTMANAGER_ADDRESS must not be empty");
        }

        let silence_selector = env_string("SILENCE_OPERATOR_SILENCE_SELECTOR");
        // Validate at startup so a malformed selector does not surface as
        // a watch error later.
        LabelSelector::parse(&silence_selector)
            .context("invalid SILENCE_OPERATOR_SILENCE_SELECTOR")?;

        let namespace_selector =
            LabelSelector::parse(&env_string("SILENCE_OPERATOR_NAMESPACE_SELECTOR"))
                .context("invalid SILENCE_OPERATOR_NAMESPACE_SELECTOR")?;

        Ok(Self {
            alertmanager: AlertmanagerConfig {
                address,
                authentication: env_bool("SILENCE_OPERATOR_ALERTMANAGER_AUTHENTICATION"),
                bearer_token: env_string("SILENCE_OPERATOR_ALERTMANAGER_BEARER_TOKEN"),
                tenant_id: env_string("SILENCE_OPERATOR_ALERTMANAGER_DEFAULT_TENANT"),
            },
            tenancy: TenancyConfig {
                enabled: env_bool("SILENCE_OPERATOR_TENANCY_ENABLED"),
                label_key: env_string("SILENCE_OPERATOR_TENANCY_LABEL_KEY"),
                default_tenant: env_string("SILENCE_OPERATOR_ALERTMANAGER_DEFAULT_TENANT"),
            },
            silence_selector,
            namespace_selector,
        })
    }
}

fn env_string(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn env_bool(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<bool>().ok())
        .unwrap_or(false)
}
