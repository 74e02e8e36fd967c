// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Silence Operator - Alertmanager Silence Controller for Kubernetes
//!
//! The silence operator keeps an Alertmanager-compatible service in sync
//! with declarative `Silence` custom resources: for every silence CR there
//! is exactly one matching Alertmanager silence, and deleting the CR
//! removes it.
//!
//! ## Overview
//!
//! This library provides the core functionality of the operator:
//!
//! - Custom Resource Definitions for silences and recurring silences
//! - Reconciliation logic converging Alertmanager onto the CR state
//! - A typed Alertmanager v2 HTTP client with multi-tenant routing
//! - A cron-driven scheduler materializing recurring silences
//! - A file-sync utility managing silence CRs from YAML manifests
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types (two coexisting API groups)
//! - [`alertmanager`] - Alertmanager v2 silences API client
//! - [`service`] - the CR-to-Alertmanager sync state machine
//! - [`reconcilers`] - per-resource reconciliation passes
//! - [`filesync`] - file-to-cluster silence synchronization
//!
//! ## Example
//!
//! ```rust,no_run
//! use silence_operator::crd::v1alpha2::{SilenceMatcher, SilenceSpec};
//!
//! let spec = SilenceSpec {
//!     matchers: vec![SilenceMatcher {
//!         name: "alertname".to_string(),
//!         value: "NodeDown".to_string(),
//!         match_type: None,
//!     }],
//!     starts_at: None,
//!     ends_at: None,
//!     duration: Some("2h".to_string()),
//! };
//! ```
//!
//! ## Guarantees
//!
//! - **Convergence** - repeated reconciles reach exactly one Alertmanager
//!   silence per CR, correlated by comment
//! - **Idempotence** - an unchanged CR produces zero writes after the first
//!   converging pass
//! - **No foreign writes** - silences not attributed to the operator are
//!   never deleted
//! - **Tenancy isolation** - CRs resolving to different tenants are routed
//!   with distinct `X-Scope-OrgID` headers

pub mod alertmanager;
pub mod config;
pub mod constants;
pub mod crd;
pub mod filesync;
pub mod metrics;
pub mod reconcilers;
pub mod selector;
pub mod service;
pub mod tenancy;
