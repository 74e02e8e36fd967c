// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the Alertmanager client's pure parts.

use super::*;
use chrono::{TimeZone, Utc};

fn client(address: &str, tenant: &str) -> Alertmanager {
    Alertmanager::new(AlertmanagerConfig {
        address: address.to_string(),
        authentication: false,
        bearer_token: String::new(),
        tenant_id: tenant.to_string(),
    })
    .unwrap()
}

fn silence(comment: &str, created_by: &str, state: Option<&str>) -> Silence {
    Silence {
        id: format!("id-{comment}"),
        comment: comment.to_string(),
        created_by: created_by.to_string(),
        starts_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ends_at: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
        matchers: vec![],
        status: state.map(|s| SilenceStatus {
            state: s.to_string(),
        }),
    }
}

#[test]
fn new_rejects_empty_address() {
    let result = Alertmanager::new(AlertmanagerConfig::default());
    assert!(matches!(result, Err(AlertmanagerError::InvalidConfig(_))));
}

#[test]
fn new_rejects_unparseable_address() {
    let result = Alertmanager::new(AlertmanagerConfig {
        address: "not a url".to_string(),
        ..AlertmanagerConfig::default()
    });
    assert!(matches!(result, Err(AlertmanagerError::InvalidConfig(_))));
}

#[test]
fn endpoint_joins_segments_below_base() {
    let am = client("http://alertmanager:9093", "");
    let url = am.endpoint(&["api", "v2", "silences"]);
    assert_eq!(url.as_str(), "http://alertmanager:9093/api/v2/silences");
}

#[test]
fn endpoint_preserves_base_path_prefix() {
    let am = client("http://mimir:8080/alertmanager/", "");
    let url = am.endpoint(&["api", "v2", "silences"]);
    assert_eq!(
        url.as_str(),
        "http://mimir:8080/alertmanager/api/v2/silences"
    );
}

#[test]
fn endpoint_percent_encodes_silence_ids() {
    let am = client("http://alertmanager:9093", "");
    let url = am.endpoint(&["api", "v2", "silence", "id with/slash"]);
    assert_eq!(
        url.as_str(),
        "http://alertmanager:9093/api/v2/silence/id%20with%2Fslash"
    );
}

#[test]
fn effective_tenant_prefers_per_call_value() {
    let am = client("http://alertmanager:9093", "default-tenant");
    assert_eq!(am.effective_tenant(Some("org-acme")), Some("org-acme"));
}

#[test]
fn effective_tenant_falls_back_to_configured_default() {
    let am = client("http://alertmanager:9093", "default-tenant");
    assert_eq!(am.effective_tenant(None), Some("default-tenant"));
    assert_eq!(am.effective_tenant(Some("")), Some("default-tenant"));
}

#[test]
fn effective_tenant_absent_when_nothing_configured() {
    let am = client("http://alertmanager:9093", "");
    assert_eq!(am.effective_tenant(None), None);
    assert_eq!(am.effective_tenant(Some("")), None);
}

#[test]
fn drop_expired_removes_expired_and_statusless_entries() {
    let silences = vec![
        silence("a", CREATED_BY, Some("active")),
        silence("b", CREATED_BY, Some("expired")),
        silence("c", CREATED_BY, Some("pending")),
        silence("d", CREATED_BY, None),
    ];

    let filtered = drop_expired(silences);
    let comments: Vec<&str> = filtered.iter().map(|s| s.comment.as_str()).collect();
    assert_eq!(comments, vec!["a", "c"]);
}

#[test]
fn find_owned_skips_foreign_silences() {
    let silences = vec![
        silence("silence-operator-foo", "somebody-else", Some("active")),
        silence("silence-operator-foo", CREATED_BY, Some("active")),
    ];

    let found = find_owned(&silences, "silence-operator-foo").unwrap();
    assert_eq!(found.created_by, CREATED_BY);
    assert_eq!(found.id, "id-silence-operator-foo");
}

#[test]
fn find_owned_returns_none_without_attribution() {
    let silences = vec![silence("silence-operator-foo", "somebody-else", None)];
    assert!(find_owned(&silences, "silence-operator-foo").is_none());
}

#[test]
fn silence_serializes_camel_case() {
    let s = silence("silence-operator-bar-foo", CREATED_BY, None);
    let json = serde_json::to_value(&s).unwrap();
    assert!(json.get("createdBy").is_some());
    assert!(json.get("startsAt").is_some());
    assert!(json.get("endsAt").is_some());
    assert!(json.get("status").is_none());
}
