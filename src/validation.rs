//! Field level checks run by the store before anything is written.

use std::fmt::Display;

use thiserror::Error;

use crate::types::uuid::Uuid;

/// Longest accepted author name part, counted in characters.
pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Required,
    MaxLength { max: usize, actual: usize },
    InvalidEnum { value: String, allowed: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub kind:  ViolationKind,
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ViolationKind::Required => write!(f, "`{}` is required", self.field),
            ViolationKind::MaxLength { max, actual } => write!(
                f,
                "`{}` is {} characters long, at most {} are allowed",
                self.field, actual, max
            ),
            ViolationKind::InvalidEnum { value, allowed } => write!(
                f,
                "`{}` can't be {:?}, expected one of {}",
                self.field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Validation failed: {}", join(.0))]
pub struct ValidationErrors(pub Vec<Violation>);

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, kind: ViolationKind) {
        self.0.push(Violation { field, kind });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    /// Whether `field` has at least one violation.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|x| x.field == field)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(field, ViolationKind::Required);
        }
        self
    }

    /// A nil id is never generated, only left behind by `Default`.
    pub fn required_id(&mut self, field: &'static str, value: &Uuid) -> &mut Self {
        if value.is_nil() {
            self.push(field, ViolationKind::Required);
        }
        self
    }

    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        let actual = value.chars().count();
        if actual > max {
            self.push(field, ViolationKind::MaxLength { max, actual });
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        let mut errors = ValidationErrors::new();
        errors
            .required("first_name", "")
            .max_length("first_name", "", MAX_NAME_LENGTH)
            .required("family_name", &long)
            .max_length("family_name", &long, MAX_NAME_LENGTH);
        assert_eq!(
            errors.violations(),
            &[
                Violation {
                    field: "first_name",
                    kind:  ViolationKind::Required,
                },
                Violation {
                    field: "family_name",
                    kind:  ViolationKind::MaxLength {
                        max:    100,
                        actual: 101,
                    },
                },
            ]
        );
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn length_counts_characters() {
        let mut errors = ValidationErrors::new();
        errors.max_length("family_name", &"ø".repeat(MAX_NAME_LENGTH), MAX_NAME_LENGTH);
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn nil_id_is_missing() {
        let mut errors = ValidationErrors::new();
        errors.required_id("id", &Uuid::new()).required_id("book", &Uuid::default());
        assert_eq!(
            errors.violations(),
            &[Violation {
                field: "book",
                kind:  ViolationKind::Required,
            }]
        );
    }

    #[test]
    fn message_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.required("imprint", "");
        assert_eq!(
            errors.to_string(),
            "Validation failed: `imprint` is required"
        );
    }
}
