// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label selector parsing and matching.
//!
//! Selectors restrict which CR events reach the reconcilers. The string
//! grammar is the usual Kubernetes label query: comma-separated
//! requirements of the form `key=value`, `key==value`, `key!=value`, or a
//! bare `key` (existence). An empty selector matches everything.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use silence_operator::selector::LabelSelector;
//!
//! let selector = LabelSelector::parse("env=prod,team!=platform").unwrap();
//!
//! let mut labels = BTreeMap::new();
//! labels.insert("env".to_string(), "prod".to_string());
//! assert!(selector.matches(&labels));
//! ```

use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// A single parsed selector requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
enum LabelRequirement {
    /// Label must be present with exactly this value.
    Equals { key: String, value: String },
    /// Label must be absent or carry a different value.
    NotEquals { key: String, value: String },
    /// Label key must be present, any value.
    Exists { key: String },
}

impl LabelRequirement {
    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Equals { key, value } => labels.get(key) == Some(value),
            Self::NotEquals { key, value } => labels.get(key) != Some(value),
            Self::Exists { key } => labels.contains_key(key),
        }
    }
}

/// A conjunction of label requirements. All requirements must be satisfied;
/// an empty selector matches all label sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<LabelRequirement>,
}

impl LabelSelector {
    /// Parse a label query string.
    ///
    /// # Errors
    ///
    /// Returns an error for empty keys or values, or malformed
    /// requirements.
    pub fn parse(input: &str) -> Result<Self> {
        let mut requirements = Vec::new();

        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let requirement = if let Some((key, value)) = part.split_once("!=") {
                LabelRequirement::NotEquals {
                    key: validated_key(key, part)?,
                    value: value.trim().to_string(),
                }
            } else if let Some((key, value)) = part.split_once("==") {
                LabelRequirement::Equals {
                    key: validated_key(key, part)?,
                    value: value.trim().to_string(),
                }
            } else if let Some((key, value)) = part.split_once('=') {
                LabelRequirement::Equals {
                    key: validated_key(key, part)?,
                    value: value.trim().to_string(),
                }
            } else {
                LabelRequirement::Exists {
                    key: validated_key(part, part)?,
                }
            };

            requirements.push(requirement);
        }

        Ok(Self { requirements })
    }

    /// Check whether a label set satisfies every requirement.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }

    /// Whether this selector has no requirements (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

fn validated_key(key: &str, requirement: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        bail!("selector requirement {requirement:?} has an empty key");
    }
    Ok(key.to_string())
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
