//! Session credential and its local persistence.
//!
//! # Responsibility
//! - Carry the bearer token explicitly to every authenticated call.
//! - Persist the token between runs through a `SessionStore`.
//!
//! # Invariants
//! - An anonymous session sends no `Authorization` header.
//! - The token is never printed through `Debug`.

use std::fmt::{Debug, Formatter};

pub mod store;

pub use store::{MemorySessionStore, SessionStore, SqliteSessionStore, StoreError, StoreResult};

/// Credential held by a notes client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Session without a credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session carrying `token`. Blank tokens yield an anonymous session.
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            return Self::anonymous();
        }
        Self { token: Some(token) }
    }

    /// Token to send as a bearer credential.
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
