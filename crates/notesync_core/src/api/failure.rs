//! Failure classification shared by every client operation.
//!
//! # Responsibility
//! - Decide once per failed request whether the user sees per-field errors or
//!   a single top-level message.
//!
//! # Invariants
//! - Exactly one of `FieldErrors` / `Message` describes a failure.
//! - Server errors without a field land in the `server` bucket.
//! - Transport and undecodable responses collapse into the caller's fallback.

use crate::api::{ApiError, ErrorBody};
use crate::model::validation::{FieldErrors, FIELD_SERVER};
use std::fmt::{Display, Formatter};

/// User-facing outcome of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Messages attributed to named input fields.
    FieldErrors(FieldErrors),
    /// One unscoped message.
    Message(String),
}

impl Failure {
    /// Maps an API error using `fallback` when the server gave no usable text.
    pub fn from_api_error(err: &ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Rejected {
                body: Some(body), ..
            } => Self::from_error_body(body, fallback),
            ApiError::Rejected { body: None, .. }
            | ApiError::Transport(_)
            | ApiError::Decode(_) => Self::Message(fallback.to_string()),
        }
    }

    /// Maps a decoded error body.
    pub fn from_error_body(body: &ErrorBody, fallback: &str) -> Self {
        let entries = body.errors.as_deref().unwrap_or_default();
        if !entries.is_empty() {
            let errors = entries
                .iter()
                .map(|entry| {
                    let field = entry
                        .path
                        .as_deref()
                        .map(str::trim)
                        .filter(|path| !path.is_empty())
                        .unwrap_or(FIELD_SERVER);
                    let message = entry.msg.clone().unwrap_or_else(|| fallback.to_string());
                    (field.to_string(), message)
                })
                .collect();
            return Self::FieldErrors(errors);
        }

        let message = [body.message.as_deref(), body.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
            .unwrap_or(fallback);
        Self::Message(message.to_string())
    }

    /// Returns the top-level message, if this is a message failure.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message),
            Self::FieldErrors(_) => None,
        }
    }

    /// Returns the field mapping, if this is a field failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::FieldErrors(errors) => Some(errors),
            Self::Message(_) => None,
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::FieldErrors(errors) => {
                let mut first = true;
                for (field, messages) in errors.iter() {
                    for message in messages {
                        if !first {
                            f.write_str("; ")?;
                        }
                        write!(f, "{field}: {message}")?;
                        first = false;
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<FieldErrors> for Failure {
    fn from(value: FieldErrors) -> Self {
        Self::FieldErrors(value)
    }
}
