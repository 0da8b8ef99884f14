//! Client core for the notes service.
//! This crate owns the local note mirror, its confirmation protocol and the
//! shared failure model; presentation layers only render its state.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;

pub use api::{
    ApiError, ApiResult, AuthApi, AuthResponse, ErrorBody, Failure, FieldErrorEntry, HttpApi,
    NotesApi,
};
pub use config::{load_config, ClientConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::note::{Note, NoteDraft, NoteId, NotePayload, NoteStatus};
pub use model::validation::{FieldErrors, LoginForm, SignupForm};
pub use service::auth_service::{AuthError, AuthService};
pub use service::notes_client::{
    ClientError, ClientResult, ConfirmAction, EditForm, LoadingFlag, NotesClient,
    PendingConfirmation, Resolution,
};
pub use session::{MemorySessionStore, Session, SessionStore, SqliteSessionStore, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
