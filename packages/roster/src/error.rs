//! Error types for the registration workflow.
//!
//! [`StoreError`] is what a [`crate::RegistrationStore`] reports. It is tagged and
//! serializable so it can travel inside a server function reply. The submitter
//! translates it into a [`SubmitError`], whose `Display` text is shown to the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Field;

/// Local draft validation failure. Never reaches the store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingFields(Vec<Field>),
    #[error("Please enter a valid email address")]
    BadEmail,
    /// Leading or trailing whitespace in a value that should have been trimmed.
    #[error("Please remove spaces around: {}", field_labels(.0))]
    Untrimmed(Vec<Field>),
    #[error("Please select a valid year of study")]
    UnknownYear(String),
}

fn field_labels(fields: &[Field]) -> String {
    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
}

/// Failure reported by a store backend.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StoreError {
    /// A uniqueness constraint rejected the row (the email column).
    #[error("unique constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },
    /// The store re-validated the row and rejected it.
    #[error("check violated: {0}")]
    CheckViolation(String),
    /// The store could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("store error{}: {message}", .code.as_deref().map(|c| format!(" {c}")).unwrap_or_default())]
    Other {
        code: Option<String>,
        message: String,
    },
}

impl StoreError {
    pub fn other(message: impl Into<String>) -> Self {
        StoreError::Other {
            code: None,
            message: message.into(),
        }
    }
}

/// Outcome of a failed submission, as presented to the user.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("This email is already registered. Please use a different email address.")]
    DuplicateEmail,
    #[error("Network error. Please check your internet connection and try again.")]
    Network(String),
    #[error("Registration failed. Please try again or contact support if the problem persists.")]
    Submission(String),
    #[error("A registration is already being submitted")]
    Busy,
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { .. } => SubmitError::DuplicateEmail,
            StoreError::Transport(detail) => SubmitError::Network(detail),
            other => SubmitError::Submission(other.to_string()),
        }
    }
}

/// Failure while loading or following the roster.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Failed to load student registrations")]
    Fetch(#[source] StoreError),
    #[error("Live updates are unavailable")]
    Subscribe(#[source] StoreError),
}

/// Failure while materializing a CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output was not valid UTF-8")]
    Encoding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_classification() {
        let dup: SubmitError = StoreError::UniqueViolation {
            constraint: Some("student_registrations_email_key".into()),
        }
        .into();
        assert_eq!(dup, SubmitError::DuplicateEmail);

        let net: SubmitError = StoreError::Transport("connection refused".into()).into();
        assert!(matches!(net, SubmitError::Network(_)));

        let check: SubmitError = StoreError::CheckViolation("email".into()).into();
        assert!(matches!(check, SubmitError::Submission(_)));

        let other: SubmitError = StoreError::other("boom").into();
        assert!(matches!(other, SubmitError::Submission(_)));
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let dup = SubmitError::DuplicateEmail.to_string();
        let net = SubmitError::Network(String::new()).to_string();
        let generic = SubmitError::Submission(String::new()).to_string();
        assert!(dup.contains("already registered"));
        assert!(net.starts_with("Network error"));
        assert_ne!(dup, generic);
        assert_ne!(net, generic);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Other {
            code: Some("42P01".into()),
            message: "relation does not exist".into(),
        };
        assert_eq!(err.to_string(), "store error 42P01: relation does not exist");
        assert_eq!(
            StoreError::UniqueViolation { constraint: None }.to_string(),
            "unique constraint violated: unknown"
        );
    }
}
