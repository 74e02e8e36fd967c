// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the v1alpha1 CRD types.

use super::*;

#[test]
fn matcher_is_equal_defaults_to_unset() {
    let matcher: Matcher = serde_yaml::from_str(
        r"
        name: cluster_id
        value: test-cluster
        ",
    )
    .unwrap();

    assert_eq!(matcher.name, "cluster_id");
    assert_eq!(matcher.value, "test-cluster");
    assert!(!matcher.is_regex);
    assert_eq!(matcher.is_equal, None);
}

#[test]
fn matcher_explicit_negation_round_trips() {
    let matcher = Matcher {
        name: "severity".to_string(),
        value: "page".to_string(),
        is_regex: false,
        is_equal: Some(false),
    };

    let yaml = serde_yaml::to_string(&matcher).unwrap();
    let parsed: Matcher = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, matcher);
}

#[test]
fn silence_parses_from_manifest() {
    let silence: Silence = serde_yaml::from_str(
        r#"
        apiVersion: monitoring.giantswarm.io/v1alpha1
        kind: Silence
        metadata:
          name: noisy-test-cluster
          annotations:
            valid-until: "2026-12-31"
        spec:
          targetTags:
            - name: installation
              value: ginger.*
          matchers:
            - name: cluster_id
              value: test-.*
              isRegex: true
          owner: alice
          issue_url: https://github.com/giantswarm/giantswarm/issues/12345
        "#,
    )
    .unwrap();

    assert_eq!(silence.metadata.name.as_deref(), Some("noisy-test-cluster"));
    assert_eq!(silence.spec.matchers.len(), 1);
    assert!(silence.spec.matchers[0].is_regex);
    assert_eq!(silence.spec.target_tags.len(), 1);
    assert_eq!(silence.spec.owner.as_deref(), Some("alice"));
    assert_eq!(
        silence
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get("valid-until"))
            .map(String::as_str),
        Some("2026-12-31")
    );
}

#[test]
fn specs_with_equal_fields_compare_equal() {
    let spec = SilenceSpec {
        target_tags: vec![],
        matchers: vec![Matcher {
            name: "alertname".to_string(),
            value: "X".to_string(),
            is_regex: false,
            is_equal: None,
        }],
        owner: None,
        postmortem_url: None,
        issue_url: None,
    };

    assert_eq!(spec, spec.clone());
}
