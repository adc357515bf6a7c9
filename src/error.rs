//! Error types.
//!
//! Ordinary infeasibility (a student with no remaining candidate) is not an
//! error: it surfaces as a non-zero shortfall. Errors here cover broken
//! input tables, bad configuration, and lookups of ids that do not exist.

use thiserror::Error;

use crate::models::SessionId;
use crate::validation::ValidationError;

/// Errors raised while setting up or querying a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// Input tables failed structural validation.
    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
    /// Configuration rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// No student with this id.
    #[error("unknown student '{0}'")]
    UnknownStudent(String),
    /// No session with this id.
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A weight is NaN or infinite.
    #[error("weight '{name}' must be finite, got {value}")]
    NonFiniteWeight { name: &'static str, value: f64 },
    /// A weight is below zero.
    #[error("weight '{name}' must not be negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}
