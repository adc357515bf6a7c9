//! Input validation for roster runs.
//!
//! Two levels of checking:
//! - **Structural errors** make the id-keyed tables unusable and reject the
//!   input: duplicate student or session ids, weekdays outside `0..=7`.
//! - **Data-quality warnings** are accepted as-is but worth surfacing:
//!   sessions without week data (they never conflict, which can hide a real
//!   clash), zero-capacity sessions (never selectable), sessions that
//!   credit zero hours, and sessions with a blank project name (all of them
//!   share the blank name as one project).

use crate::models::{LabSession, Student};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A weekday is outside 1..=7 (0 is accepted as "unknown").
    InvalidWeekday,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A non-fatal data-quality finding.
#[derive(Debug, Clone, PartialEq)]
pub struct DataWarning {
    /// Warning category.
    pub kind: DataWarningKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of data-quality warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataWarningKind {
    /// Session slot has no weeks and will never conflict.
    UnconstrainedSlot,
    /// Session has zero capacity and will never be selected.
    ZeroCapacity,
    /// Session credits zero hours.
    ZeroHours,
    /// Session has a blank project name.
    BlankProject,
}

/// Validates the input tables.
///
/// Checks:
/// 1. No duplicate student IDs
/// 2. No duplicate session IDs
/// 3. Every weekday (sessions and busy slots) is in `0..=7`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(students: &[Student], sessions: &[LabSession]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut student_ids = HashSet::new();
    for s in students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
        for busy in &s.busy_slots {
            if busy.weekday > 7 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWeekday,
                    format!("Student '{}' has a busy slot on weekday {}", s.id, busy.weekday),
                ));
            }
        }
    }

    let mut session_ids = HashSet::new();
    for session in sessions {
        if !session_ids.insert(session.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate session ID: {}", session.id),
            ));
        }
        if session.slot.weekday > 7 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeekday,
                format!("Session {} is on weekday {}", session.id, session.slot.weekday),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Lists data-quality issues in the session table.
pub fn data_quality_warnings(sessions: &[LabSession]) -> Vec<DataWarning> {
    let mut warnings = Vec::new();
    for session in sessions {
        if !session.slot.has_weeks() {
            warnings.push(DataWarning {
                kind: DataWarningKind::UnconstrainedSlot,
                message: format!(
                    "Session {} ('{}') has no week data and will never conflict",
                    session.id, session.project_name
                ),
            });
        }
        if session.capacity == 0 {
            warnings.push(DataWarning {
                kind: DataWarningKind::ZeroCapacity,
                message: format!("Session {} has zero capacity", session.id),
            });
        }
        if session.hours == 0 {
            warnings.push(DataWarning {
                kind: DataWarningKind::ZeroHours,
                message: format!("Session {} credits zero hours", session.id),
            });
        }
        if session.project_name.trim().is_empty() {
            warnings.push(DataWarning {
                kind: DataWarningKind::BlankProject,
                message: format!(
                    "Session {} has no project name and shares the blank project key",
                    session.id
                ),
            });
        }
    }
    warnings
}
