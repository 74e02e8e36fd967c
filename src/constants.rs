// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the silence operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the legacy cluster-scoped Silence CRD
pub const API_GROUP_MONITORING: &str = "monitoring.giantswarm.io";

/// API version for the legacy cluster-scoped Silence CRD
pub const API_VERSION_V1ALPHA1: &str = "v1alpha1";

/// API group for the namespaced Silence and RecurringSilence CRDs
pub const API_GROUP_OBSERVABILITY: &str = "observability.giantswarm.io";

/// API version for the namespaced Silence and RecurringSilence CRDs
pub const API_VERSION_V1ALPHA2: &str = "v1alpha2";

/// Kind name for the `Silence` resource (both API groups)
pub const KIND_SILENCE: &str = "Silence";

/// Kind name for the `RecurringSilence` resource
pub const KIND_RECURRING_SILENCE: &str = "RecurringSilence";

// ============================================================================
// Alertmanager Constants
// ============================================================================

/// Value of `createdBy` on every Alertmanager silence this operator writes.
/// Also the prefix of the correlation comment.
pub const CREATED_BY: &str = "silence-operator";

/// Silence state reported by Alertmanager once a silence has expired
pub const SILENCE_STATE_EXPIRED: &str = "expired";

/// Header carrying the tenant for multi-tenant Alertmanager deployments
pub const TENANT_HEADER: &str = "X-Scope-OrgID";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer on legacy (monitoring.giantswarm.io) Silence resources
pub const FINALIZER_SILENCE: &str = "monitoring.giantswarm.io/silence-protection";

/// Finalizer on namespaced (observability.giantswarm.io) Silence resources
pub const FINALIZER_SILENCE_V2: &str = "observability.giantswarm.io/silence-protection";

/// Finalizer on RecurringSilence resources
pub const FINALIZER_RECURRING_SILENCE: &str =
    "observability.giantswarm.io/recurring-silence-protection";

/// Deprecated operatorkit finalizer, removed on sight
pub const FINALIZER_DEPRECATED: &str =
    "operatorkit.giantswarm.io/silence-operator-silence-controller";

// ============================================================================
// Annotations
// ============================================================================

/// Annotation holding a silence expiry date (RFC 3339 or `YYYY-MM-DD`)
pub const ANNOTATION_VALID_UNTIL: &str = "valid-until";

/// Annotation protecting a Silence CR from deletion by the file-sync utility
pub const ANNOTATION_KEEP: &str = "monitoring.giantswarm.io/keep";

// ============================================================================
// Time Constants
// ============================================================================

/// Format accepted for date-only `valid-until` values
pub const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

/// Hour (UTC) to which date-only expiry values are lifted, so silences do
/// not expire in the middle of the night
pub const DATE_ONLY_EXPIRY_HOUR: u32 = 8;

/// Months in the default silence lifetime (100 years), applied when no
/// expiry source is present on the CR
pub const DEFAULT_EXPIRY_MONTHS: u32 = 1200;

// ============================================================================
// Controller Requeue Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue interval after a successful Silence reconcile, so expired
/// windows are torn down without an external event (5 minutes)
pub const SILENCE_REQUEUE_DURATION_SECS: u64 = 300;

/// Slow requeue after a cron or duration parse failure (1 hour)
pub const PARSE_FAILURE_REQUEUE_SECS: u64 = 3600;

/// Requeue after a child silence create/update failure (5 minutes)
pub const MATERIALIZE_FAILURE_REQUEUE_SECS: u64 = 300;

/// Upper bound on the recurring scheduler requeue horizon (1 hour)
pub const RECURRING_MAX_REQUEUE_SECS: u64 = 3600;

/// Lower bound on the recurring scheduler requeue horizon (1 minute)
pub const RECURRING_MIN_REQUEUE_SECS: u64 = 60;

// ============================================================================
// RecurringSilence Status Constants
// ============================================================================

/// Condition type describing whether a RecurringSilence is properly scheduled
pub const CONDITION_TYPE_SCHEDULED: &str = "Scheduled";

/// Reason: the cron expression could not be parsed
pub const REASON_CRON_PARSE_ERROR: &str = "CronParseError";

/// Reason: the duration could not be parsed
pub const REASON_DURATION_PARSE_ERROR: &str = "DurationParseError";

/// Reason: the child silence could not be created or updated
pub const REASON_SILENCE_CREATE_ERROR: &str = "SilenceCreateError";

/// Reason: the RecurringSilence is properly scheduled
pub const REASON_SCHEDULED: &str = "Scheduled";

/// Suffix appended to the parent name to form the child Silence name
pub const CHILD_SILENCE_SUFFIX: &str = "-silence";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for the Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
