// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for label selector parsing and matching.

use super::*;

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn empty_selector_matches_everything() {
    let selector = LabelSelector::parse("").unwrap();
    assert!(selector.is_empty());
    assert!(selector.matches(&labels(&[])));
    assert!(selector.matches(&labels(&[("any", "label")])));
}

#[test]
fn equality_requirement_matches_exact_value() {
    let selector = LabelSelector::parse("env=prod").unwrap();
    assert!(selector.matches(&labels(&[("env", "prod")])));
    assert!(!selector.matches(&labels(&[("env", "staging")])));
    assert!(!selector.matches(&labels(&[])));
}

#[test]
fn double_equals_is_equivalent_to_single() {
    let selector = LabelSelector::parse("env==prod").unwrap();
    assert!(selector.matches(&labels(&[("env", "prod")])));
    assert!(!selector.matches(&labels(&[("env", "dev")])));
}

#[test]
fn inequality_requirement_accepts_absent_keys() {
    let selector = LabelSelector::parse("env!=prod").unwrap();
    assert!(selector.matches(&labels(&[("env", "staging")])));
    assert!(selector.matches(&labels(&[])));
    assert!(!selector.matches(&labels(&[("env", "prod")])));
}

#[test]
fn bare_key_requires_existence() {
    let selector = LabelSelector::parse("silenced").unwrap();
    assert!(selector.matches(&labels(&[("silenced", "")])));
    assert!(selector.matches(&labels(&[("silenced", "anything")])));
    assert!(!selector.matches(&labels(&[("other", "x")])));
}

#[test]
fn requirements_are_anded() {
    let selector = LabelSelector::parse("env=prod,team!=platform").unwrap();
    assert!(selector.matches(&labels(&[("env", "prod"), ("team", "obs")])));
    assert!(!selector.matches(&labels(&[("env", "prod"), ("team", "platform")])));
    assert!(!selector.matches(&labels(&[("team", "obs")])));
}

#[test]
fn whitespace_around_parts_is_tolerated() {
    let selector = LabelSelector::parse(" env = prod , team ").unwrap();
    assert!(selector.matches(&labels(&[("env", "prod"), ("team", "x")])));
}

#[test]
fn empty_key_is_rejected() {
    assert!(LabelSelector::parse("=prod").is_err());
    assert!(LabelSelector::parse("!=prod").is_err());
}
