//! Request and result types for milestone generation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service_core::error::AppError;
use thiserror::Error;
use validator::Validate;

/// Message returned when either input field is missing or empty.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Skill name and goal are required.";

/// Number of milestones the prompt asks for.
pub const EXPECTED_MILESTONES: usize = 10;

/// Inbound body of `POST /api/generate`.
///
/// Missing fields deserialize to empty strings so that validation alone
/// decides whether the request is usable.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub skill_name: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub goal: String,
}

impl GenerationRequest {
    pub fn new(skill_name: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            skill_name: skill_name.into(),
            goal: goal.into(),
        }
    }

    /// Parse a raw JSON body. Anything that is not an object with string
    /// fields is rejected the same way as a missing field.
    pub fn from_json(body: &[u8]) -> Result<Self, AppError> {
        let rejected = |e: serde_json::Error| {
            tracing::debug!(error = %e, "Rejected unparseable generation request");
            AppError::BadRequest(REQUIRED_FIELDS_MESSAGE.to_string())
        };

        // Derived struct deserialization also accepts sequences, so only
        // objects are let through.
        let fields: Map<String, Value> = serde_json::from_slice(body).map_err(rejected)?;
        Self::deserialize(Value::Object(fields)).map_err(rejected)
    }

    /// Check both fields are present and non-empty.
    pub fn ensure_complete(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|_| AppError::BadRequest(REQUIRED_FIELDS_MESSAGE.to_string()))
    }
}

/// A single leveled milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub level: f64,
    pub milestone: String,
}

/// Typed view over the generated payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSet {
    pub milestones: Vec<Milestone>,
}

/// A deviation from the expected ten ascending levels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MilestoneIssue {
    #[error("expected {expected} milestones, got {actual}")]
    Count { expected: usize, actual: usize },

    #[error("milestone at position {position} has level {level}, expected {expected}")]
    UnexpectedLevel {
        position: usize,
        level: f64,
        expected: usize,
    },

    #[error("milestone at level {level} has empty text")]
    EmptyText { level: f64 },
}

impl MilestoneIssue {
    pub fn kind(&self) -> &'static str {
        match self {
            MilestoneIssue::Count { .. } => "count",
            MilestoneIssue::UnexpectedLevel { .. } => "level",
            MilestoneIssue::EmptyText { .. } => "empty_text",
        }
    }
}

impl MilestoneSet {
    /// Advisory check. Levels must read 1, 2, ... in order.
    pub fn issues(&self) -> Vec<MilestoneIssue> {
        let mut issues = Vec::new();

        if self.milestones.len() != EXPECTED_MILESTONES {
            issues.push(MilestoneIssue::Count {
                expected: EXPECTED_MILESTONES,
                actual: self.milestones.len(),
            });
        }

        for (position, entry) in self.milestones.iter().enumerate() {
            let expected = position + 1;
            if entry.level != expected as f64 {
                issues.push(MilestoneIssue::UnexpectedLevel {
                    position,
                    level: entry.level,
                    expected,
                });
            }
            if entry.milestone.trim().is_empty() {
                issues.push(MilestoneIssue::EmptyText { level: entry.level });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_set() -> MilestoneSet {
        MilestoneSet {
            milestones: (1..=10)
                .map(|level| Milestone {
                    level: level as f64,
                    milestone: format!("step {}", level),
                })
                .collect(),
        }
    }

    #[test]
    fn accepts_camel_case_body() {
        let request =
            GenerationRequest::from_json(br#"{"skillName":"Music Production","goal":"Earn"}"#)
                .unwrap();
        assert_eq!(request.skill_name, "Music Production");
        assert_eq!(request.goal, "Earn");
        assert!(request.ensure_complete().is_ok());
    }

    #[test]
    fn missing_field_fails_validation() {
        let request = GenerationRequest::from_json(br#"{"skillName":"Drawing"}"#).unwrap();
        let err = request.ensure_complete().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == REQUIRED_FIELDS_MESSAGE));
    }

    #[test]
    fn empty_field_fails_validation() {
        let request = GenerationRequest::new("", "Earn income");
        assert!(request.ensure_complete().is_err());
    }

    #[test]
    fn whitespace_fields_are_accepted() {
        assert!(GenerationRequest::new(" ", " ").ensure_complete().is_ok());
    }

    #[test]
    fn non_object_and_non_string_bodies_are_rejected() {
        let bodies: [&[u8]; 8] = [
            b"",
            b"[]",
            br#"["Drawing","Sell prints"]"#,
            b"\"Drawing\"",
            b"null",
            b"not json",
            br#"{"skillName":5,"goal":"x"}"#,
            br#"{"skillName":null,"goal":"x"}"#,
        ];
        for body in bodies {
            assert!(
                matches!(GenerationRequest::from_json(body), Err(AppError::BadRequest(_))),
                "body {:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn well_formed_set_has_no_issues() {
        assert!(full_set().issues().is_empty());
    }

    #[test]
    fn short_set_reports_count() {
        let mut set = full_set();
        set.milestones.truncate(9);
        assert_eq!(
            set.issues(),
            vec![MilestoneIssue::Count {
                expected: 10,
                actual: 9
            }]
        );
    }

    #[test]
    fn out_of_order_levels_are_reported() {
        let mut set = full_set();
        set.milestones.swap(0, 1);
        let kinds: Vec<_> = set.issues().iter().map(MilestoneIssue::kind).collect();
        assert_eq!(kinds, vec!["level", "level"]);
    }

    #[test]
    fn blank_text_is_reported() {
        let mut set = full_set();
        set.milestones[4].milestone = "  ".to_string();
        assert_eq!(set.issues(), vec![MilestoneIssue::EmptyText { level: 5.0 }]);
    }
}
