//! Notes/auth API contracts and transport errors.
//!
//! # Responsibility
//! - Define use-case oriented access contracts for the remote notes API.
//! - Keep HTTP details inside the `http` implementation.
//!
//! # Invariants
//! - Notes calls take the caller's `Session` explicitly; no ambient token.
//! - A non-success response is reported as `ApiError::Rejected` with its
//!   decoded error body when the body is JSON.

use crate::model::note::{Note, NoteId, NotePayload};
use crate::model::validation::{LoginForm, SignupForm};
use crate::session::Session;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod failure;
pub mod http;

pub use failure::Failure;
pub use http::HttpApi;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by the API on failed requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<FieldErrorEntry>>,
}

/// One field-level entry of `ErrorBody::errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldErrorEntry {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

/// Transport-level error for API calls.
#[derive(Debug)]
pub enum ApiError {
    /// Server answered with a non-success status.
    ///
    /// `body` is `None` when the response body was not a JSON error object.
    Rejected { status: u16, body: Option<ErrorBody> },
    /// Request never completed.
    Transport(String),
    /// Success response whose body could not be decoded.
    Decode(String),
}

impl ApiError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { status, .. } => write!(f, "request rejected with status {status}"),
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Decode(message) => write!(f, "invalid response body: {message}"),
        }
    }
}

impl Error for ApiError {}

/// Successful login/signup response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Session token; may be absent on malformed success responses.
    #[serde(default)]
    pub token: Option<String>,
}

/// Account endpoints.
pub trait AuthApi {
    fn login(&self, form: &LoginForm) -> ApiResult<AuthResponse>;
    fn signup(&self, form: &SignupForm) -> ApiResult<AuthResponse>;
}

/// Notes CRUD endpoints.
pub trait NotesApi {
    /// Lists every note visible to the session, in server order.
    fn list_notes(&self, session: &Session) -> ApiResult<Vec<Note>>;
    /// Persists a new note and returns the server's record.
    fn create_note(&self, session: &Session, payload: &NotePayload) -> ApiResult<Note>;
    /// Replaces the editable fields of note `id`.
    fn update_note(&self, session: &Session, id: &NoteId, payload: &NotePayload)
        -> ApiResult<()>;
    /// Deletes note `id`.
    fn delete_note(&self, session: &Session, id: &NoteId) -> ApiResult<()>;
}
