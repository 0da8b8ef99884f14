//! Account use-case service.
//!
//! # Responsibility
//! - Validate login/signup forms locally before sending them.
//! - Persist the returned token and hand out an explicit `Session`.
//! - Clear the stored token on logout.
//!
//! # Invariants
//! - Invalid forms never reach the API.
//! - Only a non-blank token is persisted.
//! - A broken token store never blocks startup; it yields an anonymous session.

use crate::api::{ApiError, AuthApi, AuthResponse, Failure};
use crate::model::validation::{LoginForm, SignupForm};
use crate::session::{Session, SessionStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const SIGNUP_FALLBACK: &str = "Signup failed. Please try again.";
pub const LOGIN_NO_TOKEN: &str = "Login succeeded, but no token returned.";
pub const SIGNUP_NO_TOKEN: &str = "Signup succeeded, but no token returned.";

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AuthError {
    /// Validation or server failure to show on the form.
    Failed(Failure),
    /// Token could not be persisted.
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(failure) => write!(f, "{failure}"),
            Self::Store(err) => write!(f, "session storage failed: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Failed(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Account service over an API and a token store.
pub struct AuthService<A: AuthApi, S: SessionStore> {
    api: A,
    store: S,
}

impl<A: AuthApi, S: SessionStore> AuthService<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self { api, store }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Logs in and persists the returned token.
    pub fn login(&self, form: &LoginForm) -> Result<Session, AuthError> {
        form.validate()
            .map_err(|errors| AuthError::Failed(errors.into()))?;

        info!("event=auth_login module=auth status=start");
        let response = self.api.login(form);
        self.finish("auth_login", response, LOGIN_FALLBACK, LOGIN_NO_TOKEN)
    }

    /// Registers an account and persists the returned token.
    pub fn signup(&self, form: &SignupForm) -> Result<Session, AuthError> {
        form.validate()
            .map_err(|errors| AuthError::Failed(errors.into()))?;

        info!("event=auth_signup module=auth status=start");
        let response = self.api.signup(form);
        self.finish("auth_signup", response, SIGNUP_FALLBACK, SIGNUP_NO_TOKEN)
    }

    /// Forgets the stored token.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear_token()?;
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }

    /// Rebuilds the session from the stored token.
    ///
    /// Store failures are logged and produce an anonymous session.
    pub fn restore_session(&self) -> Session {
        match self.store.load_token() {
            Ok(Some(token)) => Session::with_token(token),
            Ok(None) => Session::anonymous(),
            Err(err) => {
                error!(
                    "event=session_restore module=auth status=error error={}",
                    err
                );
                Session::anonymous()
            }
        }
    }

    fn finish(
        &self,
        event: &'static str,
        response: Result<AuthResponse, ApiError>,
        fallback: &str,
        no_token: &str,
    ) -> Result<Session, AuthError> {
        let response = response.map_err(|err| {
            warn!(
                "event={} module=auth status=error error_code={} error={}",
                event,
                err.code(),
                err
            );
            AuthError::Failed(Failure::from_api_error(&err, fallback))
        })?;

        let token = match response.token.filter(|token| !token.trim().is_empty()) {
            Some(token) => token,
            None => {
                warn!("event={} module=auth status=error error_code=missing_token", event);
                return Err(AuthError::Failed(Failure::Message(no_token.to_string())));
            }
        };

        self.store.save_token(&token)?;
        info!("event={} module=auth status=ok", event);
        Ok(Session::with_token(token))
    }
}
