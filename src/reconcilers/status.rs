// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for the RecurringSilence subresource.

use chrono::Utc;

use crate::crd::Condition;

/// Create a new condition stamped with the current time.
///
/// # Example
///
/// ```rust
/// use silence_operator::reconcilers::status::create_condition;
///
/// let condition = create_condition("Scheduled", "True", "Scheduled", "schedule is active");
/// assert_eq!(condition.r#type, "Scheduled");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Upsert a condition by type, replacing any previous condition of the
/// same type.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions
        .iter_mut()
        .find(|c| c.r#type == condition.r#type)
    {
        Some(existing) => *existing = condition,
        None => conditions.push(condition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_condition_fills_all_fields() {
        let condition = create_condition("Scheduled", "False", "CronParseError", "bad expression");
        assert_eq!(condition.r#type, "Scheduled");
        assert_eq!(condition.status, "False");
        assert_eq!(condition.reason.as_deref(), Some("CronParseError"));
        assert_eq!(condition.message.as_deref(), Some("bad expression"));
        assert!(condition.last_transition_time.is_some());
    }

    #[test]
    fn set_condition_replaces_same_type() {
        let mut conditions = vec![create_condition("Scheduled", "False", "CronParseError", "x")];
        set_condition(
            &mut conditions,
            create_condition("Scheduled", "True", "Scheduled", "ok"),
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].status, "True");
    }

    #[test]
    fn set_condition_appends_new_type() {
        let mut conditions = vec![];
        set_condition(
            &mut conditions,
            create_condition("Scheduled", "True", "Scheduled", "ok"),
        );
        assert_eq!(conditions.len(), 1);
    }
}
