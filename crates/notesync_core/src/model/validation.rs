//! Field-scoped validation results and account form rules.
//!
//! # Responsibility
//! - Hold per-field error messages in a stable, ordered mapping.
//! - Validate login/signup forms before any request is sent.
//!
//! # Invariants
//! - Field names use the server's wire naming (`title`, `dueDate`, ...).
//! - Messages for one field keep their insertion order.
//! - Errors without a field are grouped under `server`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_DUE_DATE: &str = "dueDate";
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
/// Bucket for server errors that do not name a field.
pub const FIELD_SERVER: &str = "server";

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Mapping from field name to its error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message to `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates `(field, messages)` pairs sorted by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl<F, M> FromIterator<(F, M)> for FieldErrors
where
    F: Into<String>,
    M: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, M)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.push(field, message);
        }
        errors
    }
}

/// Credentials submitted by the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks required fields and email shape.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.email.trim().is_empty() {
            errors.push(FIELD_EMAIL, "Email is required.");
        } else if !EMAIL_RE.is_match(&self.email) {
            errors.push(FIELD_EMAIL, "Invalid email address.");
        }

        if self.password.is_empty() {
            errors.push(FIELD_PASSWORD, "Password is required.");
        }

        finish(errors)
    }
}

/// Account details submitted by the signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks name length, email shape and password length.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let name_chars = self.name.chars().count();
        if self.name.trim().is_empty() {
            errors.push(FIELD_NAME, "Name is required");
        } else if name_chars < NAME_MIN_CHARS {
            errors.push(FIELD_NAME, "Name must be at least 2 characters");
        } else if name_chars > NAME_MAX_CHARS {
            errors.push(FIELD_NAME, "Name cannot exceed 50 characters");
        }

        if self.email.trim().is_empty() {
            errors.push(FIELD_EMAIL, "Email is required");
        } else if !EMAIL_RE.is_match(self.email.trim()) {
            errors.push(FIELD_EMAIL, "Please provide a valid email address");
        }

        if self.password.is_empty() {
            errors.push(FIELD_PASSWORD, "Password is required");
        } else if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.push(FIELD_PASSWORD, "Password must be at least 8 characters");
        }

        finish(errors)
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
