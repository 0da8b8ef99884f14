//! Session token store contracts and implementations.
//!
//! # Responsibility
//! - Save, read and clear the single active session token.
//! - Keep SQL details inside the local persistence boundary.
//!
//! # Invariants
//! - At most one token is stored per slot.
//! - `SqliteSessionStore` only runs against a migrated connection.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot name used for the login token.
const AUTH_TOKEN_SLOT: &str = "auth_token";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for session token persistence.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Token value rejected before persistence.
    InvalidToken,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidToken => write!(f, "session token must not be blank"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidToken => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence interface for the session token.
pub trait SessionStore {
    fn load_token(&self) -> StoreResult<Option<String>>;
    fn save_token(&self, token: &str) -> StoreResult<()>;
    fn clear_token(&self) -> StoreResult<()>;

    fn has_token(&self) -> StoreResult<bool> {
        Ok(self.load_token()?.is_some())
    }
}

/// SQLite-backed token store.
pub struct SqliteSessionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    ///
    /// # Errors
    /// - Returns `DbError::SchemaNotMigrated` when migrations are missing.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        if version < latest_version() {
            return Err(DbError::SchemaNotMigrated {
                db_version: version,
                required: latest_version(),
            }
            .into());
        }
        Ok(Self { conn })
    }
}

impl SessionStore for SqliteSessionStore<'_> {
    fn load_token(&self) -> StoreResult<Option<String>> {
        let token = self
            .conn
            .query_row(
                "SELECT token FROM session_tokens WHERE slot = ?1;",
                params![AUTH_TOKEN_SLOT],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(token)
    }

    fn save_token(&self, token: &str) -> StoreResult<()> {
        if token.trim().is_empty() {
            return Err(StoreError::InvalidToken);
        }

        let result = self.conn.execute(
            "INSERT INTO session_tokens (slot, token) VALUES (?1, ?2)
             ON CONFLICT(slot) DO UPDATE SET
                token = excluded.token,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
            params![AUTH_TOKEN_SLOT, token],
        );
        match result {
            Ok(_) => {
                info!("event=session_save module=session status=ok");
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=session_save module=session status=error error={}",
                    err
                );
                Err(err.into())
            }
        }
    }

    fn clear_token(&self) -> StoreResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM session_tokens WHERE slot = ?1;",
            params![AUTH_TOKEN_SLOT],
        )?;
        info!(
            "event=session_clear module=session status=ok removed={}",
            removed
        );
        Ok(())
    }
}

/// In-process token store, mainly for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RefCell<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load_token(&self) -> StoreResult<Option<String>> {
        Ok(self.token.borrow().clone())
    }

    fn save_token(&self, token: &str) -> StoreResult<()> {
        if token.trim().is_empty() {
            return Err(StoreError::InvalidToken);
        }
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> StoreResult<()> {
        self.token.borrow_mut().take();
        Ok(())
    }
}
