// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed HTTP client for the Alertmanager v2 silences API.
//!
//! The client owns a [`reqwest::Client`] handle and no other mutable state,
//! so it is cheap to clone and safe for concurrent use. Every operation
//! takes an optional tenant which is routed to Alertmanager through the
//! `X-Scope-OrgID` header; an empty per-call tenant falls back to the
//! configured default tenant.
//!
//! Operations are exposed through the [`AlertmanagerApi`] trait so the sync
//! service can be exercised against a mock in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use silence_operator::alertmanager::{Alertmanager, AlertmanagerApi, AlertmanagerConfig};
//!
//! # async fn example() -> Result<(), silence_operator::alertmanager::AlertmanagerError> {
//! let client = Alertmanager::new(AlertmanagerConfig {
//!     address: "http://mimir.monitoring.svc:8080/alertmanager".to_string(),
//!     authentication: false,
//!     bearer_token: String::new(),
//!     tenant_id: "anonymous".to_string(),
//! })?;
//!
//! let silences = client.list_silences(Some("org-acme")).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;

pub use error::AlertmanagerError;
pub use types::{Matcher, Silence, SilenceStatus};

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode, Url};
use tracing::debug;

use crate::constants::{CREATED_BY, SILENCE_STATE_EXPIRED, TENANT_HEADER};
use crate::metrics;

/// Configuration for the Alertmanager client.
#[derive(Clone, Debug, Default)]
pub struct AlertmanagerConfig {
    /// Base URL of the Alertmanager-compatible service. Required.
    pub address: String,
    /// Whether to send a bearer token on every request.
    pub authentication: bool,
    /// Bearer token used when `authentication` is enabled.
    pub bearer_token: String,
    /// Default tenant applied when a call does not carry one.
    pub tenant_id: String,
}

/// Contract for Alertmanager silence operations.
///
/// Implemented by [`Alertmanager`] for production and by mock clients in
/// tests.
#[async_trait]
pub trait AlertmanagerApi: Send + Sync {
    /// List all non-expired silences.
    async fn list_silences(&self, tenant: Option<&str>)
        -> Result<Vec<Silence>, AlertmanagerError>;

    /// Find the first silence carrying the given comment.
    async fn get_silence_by_comment(
        &self,
        comment: &str,
        tenant: Option<&str>,
    ) -> Result<Silence, AlertmanagerError>;

    /// Create a new silence.
    async fn create_silence(
        &self,
        silence: &Silence,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError>;

    /// Update an existing silence. The silence must carry its Alertmanager id.
    async fn update_silence(
        &self,
        silence: &Silence,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError>;

    /// Delete a silence by its Alertmanager id.
    async fn delete_silence_by_id(
        &self,
        id: &str,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError>;

    /// Delete the silence carrying the given comment, provided it was
    /// created by this operator. Silences written by anyone else are never
    /// touched.
    async fn delete_silence_by_comment(
        &self,
        comment: &str,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError>;
}

/// HTTP client for the Alertmanager v2 silences API.
#[derive(Clone, Debug)]
pub struct Alertmanager {
    base: Url,
    authentication: bool,
    token: String,
    tenant_id: String,
    http: HttpClient,
}

impl Alertmanager {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AlertmanagerError::InvalidConfig`] when the address is
    /// empty or not a valid base URL.
    pub fn new(config: AlertmanagerConfig) -> Result<Self, AlertmanagerError> {
        if config.address.trim().is_empty() {
            return Err(AlertmanagerError::InvalidConfig(
                "address must not be empty".to_string(),
            ));
        }

        let base = Url::parse(config.address.trim_end_matches('/'))
            .map_err(|e| AlertmanagerError::InvalidConfig(format!("address: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AlertmanagerError::InvalidConfig(format!(
                "address {:?} cannot be used as a base URL",
                config.address
            )));
        }

        Ok(Self {
            base,
            authentication: config.authentication,
            token: config.bearer_token,
            tenant_id: config.tenant_id,
            http: HttpClient::new(),
        })
    }

    /// Build an endpoint URL below the configured base. Path segments are
    /// percent-encoded, so silence ids are safe to pass through.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Infallible: cannot_be_a_base is rejected in the constructor.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Resolve the tenant for a call: the per-call value wins when
    /// non-empty, then the configured default, then none.
    fn effective_tenant<'a>(&'a self, tenant: Option<&'a str>) -> Option<&'a str> {
        match tenant {
            Some(t) if !t.is_empty() => Some(t),
            _ if !self.tenant_id.is_empty() => Some(self.tenant_id.as_str()),
            _ => None,
        }
    }

    /// Apply authentication and tenant headers to a request.
    fn apply_headers(
        &self,
        mut request: reqwest::RequestBuilder,
        tenant: Option<&str>,
    ) -> reqwest::RequestBuilder {
        if self.authentication {
            request = request.bearer_auth(&self.token);
        }
        if let Some(tenant) = self.effective_tenant(tenant) {
            request = request.header(TENANT_HEADER, tenant);
        }
        request
    }

    /// POST a silence to the upsert endpoint. A populated id turns the
    /// POST into an update; `operation` distinguishes the two in logs and
    /// metrics.
    async fn post_silence(
        &self,
        silence: &Silence,
        tenant: Option<&str>,
        operation: &'static str,
    ) -> Result<(), AlertmanagerError> {
        let url = self.endpoint(&["api", "v2", "silences"]);
        debug!(url = %url, comment = %silence.comment, operation = operation, "Posting silence");

        let result = async {
            let response = self
                .apply_headers(self.http.post(url).json(silence), tenant)
                .send()
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                let doing = if operation == "update" {
                    "updating"
                } else {
                    "creating"
                };
                return Err(AlertmanagerError::UnexpectedStatus {
                    status: status.as_u16(),
                    context: format!("{doing} silence {:?}", silence.comment),
                });
            }

            Ok(())
        }
        .await;

        metrics::record_alertmanager_request(operation, result.is_ok());
        result
    }
}

/// Drop silences that Alertmanager reports as expired. Entries without a
/// status are dropped as well; Alertmanager always reports one for stored
/// silences.
fn drop_expired(silences: Vec<Silence>) -> Vec<Silence> {
    silences
        .into_iter()
        .filter(|s| {
            s.status
                .as_ref()
                .is_some_and(|status| status.state != SILENCE_STATE_EXPIRED)
        })
        .collect()
}

/// Find the silence carrying `comment` that was written by this operator.
/// Silences with a matching comment but foreign attribution are ignored.
fn find_owned<'a>(silences: &'a [Silence], comment: &str) -> Option<&'a Silence> {
    silences
        .iter()
        .find(|s| s.comment == comment && s.created_by == CREATED_BY)
}

#[async_trait]
impl AlertmanagerApi for Alertmanager {
    async fn list_silences(
        &self,
        tenant: Option<&str>,
    ) -> Result<Vec<Silence>, AlertmanagerError> {
        let url = self.endpoint(&["api", "v2", "silences"]);
        debug!(url = %url, "Listing silences");

        let result = async {
            let response = self
                .apply_headers(self.http.get(url), tenant)
                .send()
                .await?
                .error_for_status()?;

            let silences: Vec<Silence> = response.json().await?;
            Ok(drop_expired(silences))
        }
        .await;

        metrics::record_alertmanager_request("list", result.is_ok());
        result
    }

    async fn get_silence_by_comment(
        &self,
        comment: &str,
        tenant: Option<&str>,
    ) -> Result<Silence, AlertmanagerError> {
        let silences = self.list_silences(tenant).await?;

        silences
            .into_iter()
            .find(|s| s.comment == comment)
            .ok_or_else(|| AlertmanagerError::NotFound {
                comment: comment.to_string(),
            })
    }

    async fn create_silence(
        &self,
        silence: &Silence,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError> {
        self.post_silence(silence, tenant, "create").await
    }

    async fn update_silence(
        &self,
        silence: &Silence,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError> {
        if silence.id.is_empty() {
            return Err(AlertmanagerError::MissingSilenceId {
                comment: silence.comment.clone(),
            });
        }

        self.post_silence(silence, tenant, "update").await
    }

    async fn delete_silence_by_id(
        &self,
        id: &str,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError> {
        let url = self.endpoint(&["api", "v2", "silence", id]);
        debug!(url = %url, id = %id, "Deleting silence");

        let result = async {
            let response = self
                .apply_headers(self.http.delete(url), tenant)
                .send()
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(AlertmanagerError::UnexpectedStatus {
                    status: status.as_u16(),
                    context: format!("deleting silence {id:?}"),
                });
            }

            Ok(())
        }
        .await;

        metrics::record_alertmanager_request("delete", result.is_ok());
        result
    }

    async fn delete_silence_by_comment(
        &self,
        comment: &str,
        tenant: Option<&str>,
    ) -> Result<(), AlertmanagerError> {
        let silences = self.list_silences(tenant).await?;

        match find_owned(&silences, comment) {
            Some(silence) => {
                let id = silence.id.clone();
                self.delete_silence_by_id(&id, tenant).await
            }
            None => Err(AlertmanagerError::NotFound {
                comment: comment.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
