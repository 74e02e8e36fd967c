// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the v1alpha2 CRD types.

use super::*;

#[test]
fn matcher_match_type_defaults_to_unset() {
    let matcher: SilenceMatcher = serde_yaml::from_str(
        r"
        name: alertname
        value: NodeDown
        ",
    )
    .unwrap();

    assert_eq!(matcher.match_type, None);
}

#[test]
fn silence_parses_with_duration() {
    let silence: Silence = serde_yaml::from_str(
        r#"
        apiVersion: observability.giantswarm.io/v1alpha2
        kind: Silence
        metadata:
          name: maintenance-window
          namespace: org-acme
        spec:
          matchers:
            - name: alertname
              value: NodeDown
              matchType: "!="
          duration: "2h"
        "#,
    )
    .unwrap();

    assert_eq!(silence.metadata.namespace.as_deref(), Some("org-acme"));
    assert_eq!(silence.spec.duration.as_deref(), Some("2h"));
    assert_eq!(silence.spec.matchers[0].match_type.as_deref(), Some("!="));
    assert_eq!(silence.spec.ends_at, None);
}

#[test]
fn silence_parses_with_explicit_window() {
    let silence: Silence = serde_yaml::from_str(
        r#"
        apiVersion: observability.giantswarm.io/v1alpha2
        kind: Silence
        metadata:
          name: window
          namespace: default
        spec:
          matchers:
            - name: alertname
              value: X
          startsAt: "2026-01-01T00:00:00Z"
          endsAt: "2026-01-02T00:00:00Z"
        "#,
    )
    .unwrap();

    let starts_at = silence.spec.starts_at.unwrap();
    let ends_at = silence.spec.ends_at.unwrap();
    assert!(starts_at < ends_at);
}

#[test]
fn recurring_silence_parses_with_status() {
    let recurring: RecurringSilence = serde_yaml::from_str(
        r#"
        apiVersion: observability.giantswarm.io/v1alpha2
        kind: RecurringSilence
        metadata:
          name: nightly-batch
          namespace: org-acme
        spec:
          schedule: "0 2 * * *"
          duration: "1h"
          matchers:
            - name: alertname
              value: HighLoad
        status:
          lastScheduledTime: "2026-01-01T02:00:00Z"
          activeSilence: nightly-batch-silence
          conditions:
            - type: Scheduled
              status: "True"
              reason: Scheduled
        "#,
    )
    .unwrap();

    assert_eq!(recurring.spec.schedule, "0 2 * * *");
    let status = recurring.status.unwrap();
    assert_eq!(status.active_silence.as_deref(), Some("nightly-batch-silence"));
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].r#type, "Scheduled");
}
