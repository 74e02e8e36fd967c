// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the file-sync planning logic.

use super::*;
use crate::crd::v1alpha1::{Matcher, SilenceSpec, TargetTag};
use kube::api::ObjectMeta;

fn silence(name: &str, matcher_value: &str, target_tags: Vec<TargetTag>) -> Silence {
    Silence {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        spec: SilenceSpec {
            target_tags,
            matchers: vec![Matcher {
                name: "alertname".to_string(),
                value: matcher_value.to_string(),
                is_regex: false,
                is_equal: None,
            }],
            owner: None,
            postmortem_url: None,
            issue_url: None,
        },
    }
}

fn kept_silence(name: &str) -> Silence {
    let mut s = silence(name, "X", vec![]);
    s.metadata.annotations = Some(
        [(
            "monitoring.giantswarm.io/keep".to_string(),
            "true".to_string(),
        )]
        .into_iter()
        .collect(),
    );
    s
}

fn tag(name: &str, value: &str) -> TargetTag {
    TargetTag {
        name: name.to_string(),
        value: value.to_string(),
    }
}

mod tags {
    use super::*;

    #[test]
    fn tag_flags_split_on_first_equals() {
        let tags = parse_tags(&[
            "installation=ginger".to_string(),
            "pipeline=stable=yes".to_string(),
            "flagonly".to_string(),
        ]);

        assert_eq!(tags.get("installation").map(String::as_str), Some("ginger"));
        assert_eq!(tags.get("pipeline").map(String::as_str), Some("stable=yes"));
        assert_eq!(tags.get("flagonly").map(String::as_str), Some(""));
    }

    #[test]
    fn matching_tags_accept_the_silence() {
        let tags = parse_tags(&["installation=ginger".to_string()]);
        let s = silence("s", "X", vec![tag("installation", "gin.*")]);
        assert!(matches_target_tags(&s, &tags).unwrap());
    }

    #[test]
    fn non_matching_tags_reject_the_silence() {
        let tags = parse_tags(&["installation=other".to_string()]);
        let s = silence("s", "X", vec![tag("installation", "gin.*")]);
        assert!(!matches_target_tags(&s, &tags).unwrap());
    }

    #[test]
    fn absent_tag_key_matches_against_the_empty_string() {
        let tags = parse_tags(&[]);

        // An empty-matching regex accepts a missing tag.
        let s = silence("s", "X", vec![tag("installation", ".*")]);
        assert!(matches_target_tags(&s, &tags).unwrap());

        // A regex requiring content rejects a missing tag.
        let s = silence("s", "X", vec![tag("installation", ".+")]);
        assert!(!matches_target_tags(&s, &tags).unwrap());
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let tags = parse_tags(&[]);
        let s = silence("s", "X", vec![tag("installation", "([")]);
        assert!(matches_target_tags(&s, &tags).is_err());
    }

    #[test]
    fn silences_without_target_tags_always_match() {
        let tags = parse_tags(&["installation=ginger".to_string()]);
        let s = silence("s", "X", vec![]);
        assert!(matches_target_tags(&s, &tags).unwrap());
    }
}

mod files {
    use super::*;

    fn write_manifest(dir: &Path, file: &str, name: &str, matcher_value: &str) {
        let manifest = format!(
            "apiVersion: monitoring.giantswarm.io/v1alpha1\n\
             kind: Silence\n\
             metadata:\n\
             \x20 name: {name}\n\
             spec:\n\
             \x20 matchers:\n\
             \x20   - name: alertname\n\
             \x20     value: {matcher_value}\n"
        );
        std::fs::write(dir.join(file), manifest).unwrap();
    }

    #[test]
    fn only_yaml_files_are_discovered() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "a.yaml", "a", "X");
        write_manifest(dir.path(), "b.yaml", "b", "X");
        std::fs::write(dir.path().join("readme.md"), "not a silence").unwrap();

        let files = find_silence_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "yaml"));
    }

    fn write_manifest_with_tag(
        dir: &Path,
        file: &str,
        name: &str,
        tag_name: &str,
        tag_regex: &str,
    ) {
        let manifest = format!(
            "apiVersion: monitoring.giantswarm.io/v1alpha1\n\
             kind: Silence\n\
             metadata:\n\
             \x20 name: {name}\n\
             spec:\n\
             \x20 targetTags:\n\
             \x20   - name: {tag_name}\n\
             \x20     value: {tag_regex}\n\
             \x20 matchers:\n\
             \x20   - name: alertname\n\
             \x20     value: X\n"
        );
        std::fs::write(dir.join(file), manifest).unwrap();
    }

    #[test]
    fn duplicate_names_keep_the_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "1-first.yaml", "dup", "first");
        write_manifest(dir.path(), "2-second.yaml", "dup", "second");

        let desired =
            load_desired_silences(&[dir.path().to_path_buf()], &HashMap::new()).unwrap();
        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].spec.matchers[0].value, "first");
    }

    #[test]
    fn tag_rejected_manifest_does_not_consume_its_name() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest_with_tag(dir.path(), "1-first.yaml", "dup", "installation", "other");
        write_manifest(dir.path(), "2-second.yaml", "dup", "second");

        let tags = parse_tags(&["installation=ginger".to_string()]);
        let desired = load_desired_silences(&[dir.path().to_path_buf()], &tags).unwrap();

        // The first manifest is rejected by its target tags, so the second
        // same-named manifest still applies.
        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].spec.matchers[0].value, "second");
    }

    #[test]
    fn multiple_directories_are_combined() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        write_manifest(dir_a.path(), "a.yaml", "a", "X");
        write_manifest(dir_b.path(), "b.yaml", "b", "X");

        let desired = load_desired_silences(
            &[dir_a.path().to_path_buf(), dir_b.path().to_path_buf()],
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(desired.len(), 2);
    }
}

mod planning {
    use super::*;

    #[test]
    fn new_silences_are_created() {
        let plan = plan_sync(&[], &[silence("a", "X", vec![])]);
        assert_eq!(plan.create.len(), 1);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn unchanged_silences_are_left_alone() {
        let existing = silence("a", "X", vec![]);
        let plan = plan_sync(&[existing.clone()], &[existing]);
        assert!(plan.create.is_empty());
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn changed_specs_are_updated() {
        let plan = plan_sync(&[silence("a", "X", vec![])], &[silence("a", "Y", vec![])]);
        assert!(plan.create.is_empty());
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].spec.matchers[0].value, "Y");
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn silences_absent_from_files_are_deleted() {
        let plan = plan_sync(&[silence("orphan", "X", vec![])], &[]);
        assert_eq!(plan.delete, vec!["orphan".to_string()]);
    }

    #[test]
    fn keep_annotated_silences_survive_deletion() {
        let plan = plan_sync(&[kept_silence("precious")], &[]);
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn keep_annotation_requires_the_literal_true() {
        let mut s = silence("almost", "X", vec![]);
        s.metadata.annotations = Some(
            [(
                "monitoring.giantswarm.io/keep".to_string(),
                "yes".to_string(),
            )]
            .into_iter()
            .collect(),
        );

        let plan = plan_sync(&[s], &[]);
        assert_eq!(plan.delete, vec!["almost".to_string()]);
    }
}
