//! Blocking HTTP implementation of the notes/auth API.
//!
//! # Responsibility
//! - Build requests against the configured base URL.
//! - Attach the bearer credential when the session carries one.
//! - Decode success bodies and error bodies into API types.
//!
//! # Invariants
//! - Requests without a token carry no `Authorization` header.
//! - Note ids are opaque and always sent as one percent-encoded path segment.
//! - No client-side timeout or retry is applied.
//! - Tokens and request bodies are never written to logs.

use crate::api::{ApiError, ApiResult, AuthApi, AuthResponse, ErrorBody, NotesApi};
use crate::model::note::{Note, NoteId, NotePayload};
use crate::model::validation::{LoginForm, SignupForm};
use crate::session::Session;
use log::{error, info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Instant;
use uuid::Uuid;

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";
const NOTES_PATH: &str = "/notes/task";

#[derive(Debug, Deserialize)]
struct NotesEnvelope {
    #[serde(default)]
    notes: Option<Vec<Note>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedNote {
    Wrapped { note: Note },
    Bare(Note),
}

impl From<CreatedNote> for Note {
    fn from(value: CreatedNote) -> Self {
        match value {
            CreatedNote::Wrapped { note } => note,
            CreatedNote::Bare(note) => note,
        }
    }
}

/// `reqwest`-backed API client.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Creates a client for `base_url` (scheme + host, optional path prefix).
    ///
    /// # Errors
    /// - Returns `ApiError::Transport` when the HTTP backend cannot start.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client reusing an existing `reqwest` client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn note_url(&self, id: &str) -> ApiResult<Url> {
        let mut url = Url::parse(&self.url(NOTES_PATH))
            .map_err(|err| ApiError::Transport(format!("invalid notes url: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport("base url cannot hold a path".to_string()))?
            .push(id);
        Ok(url)
    }

    fn authorized(request: RequestBuilder, session: &Session) -> RequestBuilder {
        match session.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let bytes = self.execute(operation, request)?;
        serde_json::from_slice(&bytes).map_err(|err| {
            error!(
                "event=http_decode module=api status=error op={} error={}",
                operation, err
            );
            ApiError::Decode(err.to_string())
        })
    }

    fn send_unit(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<()> {
        self.execute(operation, request).map(|_| ())
    }

    fn execute(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!(
            "event=http_request module=api status=start op={} request_id={}",
            operation, request_id
        );

        let response = request.send().map_err(|err| {
            error!(
                "event=http_request module=api status=error op={} request_id={} duration_ms={} error_code=transport error={}",
                operation,
                request_id,
                started_at.elapsed().as_millis(),
                err
            );
            ApiError::Transport(err.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        if status.is_success() {
            info!(
                "event=http_request module=api status=ok op={} request_id={} http_status={} duration_ms={}",
                operation,
                request_id,
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Ok(bytes.to_vec());
        }

        let body = serde_json::from_slice::<ErrorBody>(&bytes).ok();
        warn!(
            "event=http_request module=api status=rejected op={} request_id={} http_status={} duration_ms={} json_body={}",
            operation,
            request_id,
            status.as_u16(),
            started_at.elapsed().as_millis(),
            body.is_some()
        );
        Err(ApiError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl AuthApi for HttpApi {
    fn login(&self, form: &LoginForm) -> ApiResult<AuthResponse> {
        let request = self.client.post(self.url(LOGIN_PATH)).json(form);
        self.send_json("login", request)
    }

    fn signup(&self, form: &SignupForm) -> ApiResult<AuthResponse> {
        let request = self.client.post(self.url(SIGNUP_PATH)).json(form);
        self.send_json("signup", request)
    }
}

impl NotesApi for HttpApi {
    fn list_notes(&self, session: &Session) -> ApiResult<Vec<Note>> {
        let request = Self::authorized(self.client.get(self.url(NOTES_PATH)), session);
        let envelope: NotesEnvelope = self.send_json("notes_list", request)?;
        Ok(envelope.notes.unwrap_or_default())
    }

    fn create_note(&self, session: &Session, payload: &NotePayload) -> ApiResult<Note> {
        let request = Self::authorized(self.client.post(self.url(NOTES_PATH)), session).json(payload);
        let created: CreatedNote = self.send_json("notes_create", request)?;
        Ok(created.into())
    }

    fn update_note(
        &self,
        session: &Session,
        id: &NoteId,
        payload: &NotePayload,
    ) -> ApiResult<()> {
        let request =
            Self::authorized(self.client.patch(self.note_url(id)?), session).json(payload);
        self.send_unit("notes_update", request)
    }

    fn delete_note(&self, session: &Session, id: &NoteId) -> ApiResult<()> {
        let request = Self::authorized(self.client.delete(self.note_url(id)?), session);
        self.send_unit("notes_delete", request)
    }
}
