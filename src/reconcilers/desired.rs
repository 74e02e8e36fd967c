// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired-state construction shared by the silence reconcilers.
//!
//! This module turns a Silence CR (either API version) into the
//! Alertmanager wire representation: the correlation comment, the resolved
//! time window and the translated matcher list.
//!
//! # Time window resolution
//!
//! `endsAt` is resolved in priority order, first match wins:
//!
//! 1. explicit `spec.endsAt` (v1alpha2 only)
//! 2. `spec.duration` relative to `startsAt` (v1alpha2 only)
//! 3. the `valid-until` annotation, parsed as RFC 3339 and then as a
//!    date-only value lifted to 08:00 UTC
//! 4. creation timestamp + 100 years
//!
//! `startsAt` is `spec.startsAt` when present, else the creation timestamp,
//! else the injected wall clock (a CR without a creation timestamp is not
//! expected in practice).

use chrono::{DateTime, Months, NaiveDate, Utc};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::alertmanager;
use crate::constants::{
    ANNOTATION_VALID_UNTIL, CREATED_BY, DATE_ONLY_EXPIRY_HOUR, DATE_ONLY_FORMAT,
    DEFAULT_EXPIRY_MONTHS,
};
use crate::crd::{v1alpha1, v1alpha2};

/// Errors building a desired silence from a CR.
#[derive(Debug, Error)]
pub enum DesiredError {
    /// The `valid-until` annotation matches neither accepted format.
    #[error(
        "annotation \"valid-until\" value {value:?} matches neither RFC 3339 \
         ({rfc3339_error}) nor \"%Y-%m-%d\" ({date_error})"
    )]
    InvalidExpirationDate {
        /// The annotation value that failed to parse
        value: String,
        /// Error from the RFC 3339 parse attempt
        rfc3339_error: chrono::ParseError,
        /// Error from the date-only parse attempt
        date_error: chrono::ParseError,
    },

    /// The `duration` field could not be parsed.
    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration {
        /// The duration string that failed to parse
        value: String,
        /// Why parsing failed
        reason: String,
    },

    /// A typed matcher carries an unknown match operator.
    #[error("unsupported match type {match_type:?}, expected one of =, !=, =~, !~")]
    UnsupportedMatchType {
        /// The offending operator
        match_type: String,
    },

    /// The matcher list is empty.
    #[error("silence must have at least one matcher")]
    EmptyMatchers,
}

/// Correlation comment tying a CR to its Alertmanager silence.
///
/// Namespaced CRs yield `silence-operator-<namespace>-<name>`, cluster
/// scoped CRs `silence-operator-<name>`.
#[must_use]
pub fn silence_comment(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{CREATED_BY}-{ns}-{name}"),
        _ => format!("{CREATED_BY}-{name}"),
    }
}

/// Build the desired Alertmanager silence for a legacy v1alpha1 CR.
///
/// The legacy shape has no time-window fields; the expiry comes from the
/// `valid-until` annotation or the 100-year default.
///
/// # Errors
///
/// Returns [`DesiredError`] when the matcher list is empty or the
/// `valid-until` annotation is malformed.
pub fn desired_from_v1alpha1(
    silence: &v1alpha1::Silence,
    now: DateTime<Utc>,
) -> Result<alertmanager::Silence, DesiredError> {
    let matchers = translate_legacy_matchers(&silence.spec.matchers)?;

    let created = creation_timestamp(silence);
    let starts_at = created.unwrap_or(now);
    let ends_at = resolve_annotation_expiry(silence.annotations(), created.unwrap_or(now))?;

    Ok(alertmanager::Silence {
        id: String::new(),
        comment: silence_comment(silence.meta().namespace.as_deref(), &silence.name_any()),
        created_by: CREATED_BY.to_string(),
        starts_at,
        ends_at,
        matchers,
        status: None,
    })
}

/// Build the desired Alertmanager silence for a v1alpha2 CR.
///
/// # Errors
///
/// Returns [`DesiredError`] when the matcher list is empty, a match
/// operator is unknown, or neither time-window source parses.
pub fn desired_from_v1alpha2(
    silence: &v1alpha2::Silence,
    now: DateTime<Utc>,
) -> Result<alertmanager::Silence, DesiredError> {
    let matchers = translate_matchers(&silence.spec.matchers)?;

    let created = creation_timestamp(silence);
    let starts_at = silence.spec.starts_at.or(created).unwrap_or(now);

    let ends_at = if let Some(ends_at) = silence.spec.ends_at {
        ends_at
    } else if let Some(duration) = silence.spec.duration.as_deref() {
        starts_at + parse_duration(duration)?
    } else {
        resolve_annotation_expiry(silence.annotations(), created.unwrap_or(now))?
    };

    Ok(alertmanager::Silence {
        id: String::new(),
        comment: silence_comment(silence.meta().namespace.as_deref(), &silence.name_any()),
        created_by: CREATED_BY.to_string(),
        starts_at,
        ends_at,
        matchers,
        status: None,
    })
}

/// Translate legacy boolean-pair matchers. `isEqual` unset means a positive
/// match; an explicit false inverts the predicate. Output order equals
/// input order.
///
/// # Errors
///
/// Returns [`DesiredError::EmptyMatchers`] for an empty list.
pub fn translate_legacy_matchers(
    matchers: &[v1alpha1::Matcher],
) -> Result<Vec<alertmanager::Matcher>, DesiredError> {
    if matchers.is_empty() {
        return Err(DesiredError::EmptyMatchers);
    }

    Ok(matchers
        .iter()
        .map(|m| alertmanager::Matcher {
            name: m.name.clone(),
            value: m.value.clone(),
            is_regex: m.is_regex,
            is_equal: m.is_equal.unwrap_or(true),
        })
        .collect())
}

/// Translate typed matchers to the boolean-pair wire shape. Output order
/// equals input order.
///
/// # Errors
///
/// Returns [`DesiredError`] for an empty list or an unknown operator.
pub fn translate_matchers(
    matchers: &[v1alpha2::SilenceMatcher],
) -> Result<Vec<alertmanager::Matcher>, DesiredError> {
    if matchers.is_empty() {
        return Err(DesiredError::EmptyMatchers);
    }

    matchers
        .iter()
        .map(|m| {
            let (is_regex, is_equal) = match_type_flags(m.match_type.as_deref())?;
            Ok(alertmanager::Matcher {
                name: m.name.clone(),
                value: m.value.clone(),
                is_regex,
                is_equal,
            })
        })
        .collect()
}

/// Map a match operator to the `(isRegex, isEqual)` wire pair. An unset or
/// empty operator defaults to exact match.
fn match_type_flags(match_type: Option<&str>) -> Result<(bool, bool), DesiredError> {
    match match_type {
        None | Some("") | Some(v1alpha2::MATCH_EQUAL) => Ok((false, true)),
        Some(v1alpha2::MATCH_NOT_EQUAL) => Ok((false, false)),
        Some(v1alpha2::MATCH_REGEX) => Ok((true, true)),
        Some(v1alpha2::MATCH_NOT_REGEX) => Ok((true, false)),
        Some(other) => Err(DesiredError::UnsupportedMatchType {
            match_type: other.to_string(),
        }),
    }
}

/// Resolve the expiry from the `valid-until` annotation, falling back to
/// the 100-year default when the annotation is absent.
fn resolve_annotation_expiry(
    annotations: &BTreeMap<String, String>,
    created: DateTime<Utc>,
) -> Result<DateTime<Utc>, DesiredError> {
    match annotations.get(ANNOTATION_VALID_UNTIL) {
        Some(value) => parse_valid_until(value),
        None => Ok(default_expiry(created)),
    }
}

/// Parse a `valid-until` value: RFC 3339 first, then a date-only value
/// lifted to 08:00 UTC so silences do not expire in the middle of the
/// night.
fn parse_valid_until(value: &str) -> Result<DateTime<Utc>, DesiredError> {
    let rfc3339_error = match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => return Ok(ts.with_timezone(&Utc)),
        Err(e) => e,
    };

    match NaiveDate::parse_from_str(value, DATE_ONLY_FORMAT) {
        Ok(date) => Ok(date
            .and_hms_opt(DATE_ONLY_EXPIRY_HOUR, 0, 0)
            .expect("constant expiry hour is a valid time of day")
            .and_utc()),
        Err(date_error) => Err(DesiredError::InvalidExpirationDate {
            value: value.to_string(),
            rfc3339_error,
            date_error,
        }),
    }
}

/// Default expiry: 100 years after the given timestamp.
fn default_expiry(created: DateTime<Utc>) -> DateTime<Utc> {
    created
        .checked_add_months(Months::new(DEFAULT_EXPIRY_MONTHS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Parse a humantime span (`"30m"`, `"2h"`) into a chrono duration.
fn parse_duration(value: &str) -> Result<chrono::Duration, DesiredError> {
    let std_duration =
        humantime::parse_duration(value).map_err(|e| DesiredError::InvalidDuration {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

    chrono::Duration::from_std(std_duration).map_err(|e| DesiredError::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Creation timestamp of a resource, if the API server has stamped one.
fn creation_timestamp<K: kube::Resource>(resource: &K) -> Option<DateTime<Utc>> {
    resource
        .meta()
        .creation_timestamp
        .as_ref()
        .map(|time| time.0)
}

#[cfg(test)]
#[path = "desired_tests.rs"]
mod desired_tests;
