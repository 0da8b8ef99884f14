//! Notes synchronization client.
//!
//! # Responsibility
//! - Mirror the server's note list in memory.
//! - Gate edits and deletes behind an explicit two-step confirmation.
//! - Patch the local list after successful mutations instead of re-fetching.
//! - Record the last failure for the presentation layer.
//!
//! # Invariants
//! - `notes` is replaced wholesale only by a successful `load()`.
//! - No request is sent for a mutation until its confirmation is accepted.
//! - A declined confirmation never sends a request.
//! - `last_failure` holds either field errors or one message, never both.
//! - `create()` does not insert into `notes`; the next `load()` shows it.
//! - A staged edit always targets the currently open edit form.
//! - The loading flag is shared through `LoadingFlag`, so other threads can
//!   watch a blocking `load()` in progress.

use crate::api::{ApiError, Failure, NotesApi};
use crate::model::note::{Note, NoteDraft, NoteId, NotePayload};
use crate::model::validation::FieldErrors;
use crate::session::Session;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const LOAD_FALLBACK: &str = "Failed to fetch notes.";
pub const DELETE_FALLBACK: &str = "Failed to delete note.";
pub const UPDATE_FALLBACK: &str = "Failed to update note.";
pub const CREATE_FALLBACK: &str = "Something went wrong.";

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this note?";
pub const EDIT_PROMPT: &str = "Are you sure you want to update this note?";

/// Mutating action awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete,
    Edit,
}

/// Staged user intent awaiting accept/decline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: ConfirmAction,
    pub note_id: NoteId,
    /// Human-readable question for the confirmation dialog.
    pub prompt: String,
}

/// Open edit form: target note and its editable draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub note_id: NoteId,
    pub draft: NoteDraft,
}

/// Outcome of `NotesClient::resolve_confirmation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Declined,
    Deleted(NoteId),
    Edited(NoteId),
}

/// Error returned by client operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Local validation or server failure; also kept as `last_failure`.
    Failed(Failure),
    /// `confirm_edit_submission` without an open edit form.
    NoEditOpen,
    /// Accepting a confirmation while nothing is staged.
    NothingPending,
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(failure) => write!(f, "{failure}"),
            Self::NoEditOpen => write!(f, "no note is being edited"),
            Self::NothingPending => write!(f, "no action is awaiting confirmation"),
        }
    }
}

impl Error for ClientError {}

pub type ClientResult<T> = Result<T, ClientError>;

/// Shared view of whether a `load()` is in flight.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, value: bool) {
        self.0.store(value, Ordering::Release);
    }
}

/// In-memory mirror of the user's notes plus the confirmation protocol.
pub struct NotesClient<A: NotesApi> {
    api: A,
    session: Session,
    notes: Vec<Note>,
    loading: LoadingFlag,
    last_failure: Option<Failure>,
    pending: Option<PendingConfirmation>,
    edit: Option<EditForm>,
    staged_edit: Option<NotePayload>,
}

impl<A: NotesApi> NotesClient<A> {
    /// Creates a client bound to `session`. The list starts empty.
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            notes: Vec::new(),
            loading: LoadingFlag::default(),
            last_failure: None,
            pending: None,
            edit: None,
            staged_edit: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replaces the credential used for subsequent requests.
    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Notes in server order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// True only while `load()` is in flight.
    ///
    /// A caller blocked in `load()` cannot ask; use `loading_flag()` to watch
    /// from another thread.
    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// Handle that observes the loading state while `load()` blocks.
    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    pub fn last_failure(&self) -> Option<&Failure> {
        self.last_failure.as_ref()
    }

    /// Top-level error message of the last failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_failure.as_ref().and_then(Failure::message)
    }

    /// Field errors of the last failure, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.last_failure.as_ref().and_then(Failure::field_errors)
    }

    /// Dismisses the last failure (e.g. when the user edits a field).
    pub fn clear_failure(&mut self) {
        self.last_failure = None;
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit.as_ref()
    }

    /// Mutable access to the open draft for field changes.
    pub fn edit_draft_mut(&mut self) -> Option<&mut NoteDraft> {
        self.edit.as_mut().map(|form| &mut form.draft)
    }

    /// Fetches all notes and replaces the local list.
    ///
    /// On failure the previous list is kept.
    pub fn load(&mut self) -> ClientResult<usize> {
        let started_at = Instant::now();
        info!("event=notes_load module=client status=start");

        self.loading.set(true);
        let result = self.api.list_notes(&self.session);
        self.loading.set(false);

        match result {
            Ok(notes) => {
                self.notes = notes;
                self.last_failure = None;
                info!(
                    "event=notes_load module=client status=ok count={} duration_ms={}",
                    self.notes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(self.notes.len())
            }
            Err(err) => Err(self.fail("notes_load", &err, LOAD_FALLBACK)),
        }
    }

    /// Stages a delete of `id`. Sends nothing.
    pub fn request_delete(&mut self, id: impl Into<NoteId>) {
        let note_id = id.into();
        info!("event=notes_delete module=client status=staged");
        self.staged_edit = None;
        self.pending = Some(PendingConfirmation {
            action: ConfirmAction::Delete,
            note_id,
            prompt: DELETE_PROMPT.to_string(),
        });
    }

    /// Opens the edit form with a draft copy of `note`. Sends nothing.
    ///
    /// An edit staged for a previously open form is dropped.
    pub fn request_edit(&mut self, note: &Note) {
        self.drop_staged_edit();
        self.edit = Some(EditForm {
            note_id: note.id.clone(),
            draft: note.to_draft(),
        });
    }

    /// Closes the edit form and drops a staged edit confirmation.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
        self.drop_staged_edit();
    }

    /// Validates the open draft and stages an edit confirmation for it.
    ///
    /// # Errors
    /// - `NoEditOpen` when no edit form is open.
    /// - `Failed(FieldErrors)` when required fields are blank.
    pub fn confirm_edit_submission(&mut self) -> ClientResult<&PendingConfirmation> {
        let (note_id, validated) = match &self.edit {
            Some(form) => (form.note_id.clone(), form.draft.validate()),
            None => return Err(ClientError::NoEditOpen),
        };

        let payload = match validated {
            Ok(payload) => payload,
            Err(errors) => {
                warn!("event=notes_update module=client status=invalid fields={}", errors.len());
                return Err(self.record(Failure::FieldErrors(errors)));
            }
        };

        info!("event=notes_update module=client status=staged");
        self.staged_edit = Some(payload);
        let pending = self.pending.insert(PendingConfirmation {
            action: ConfirmAction::Edit,
            note_id,
            prompt: EDIT_PROMPT.to_string(),
        });
        Ok(&*pending)
    }

    /// Accepts or declines the staged action.
    ///
    /// Declining always clears the staged action and never sends a request.
    pub fn resolve_confirmation(&mut self, accept: bool) -> ClientResult<Resolution> {
        let pending = self.pending.take();
        if !accept {
            self.staged_edit = None;
            info!("event=confirmation module=client status=declined");
            return Ok(Resolution::Declined);
        }

        let pending = pending.ok_or(ClientError::NothingPending)?;
        match pending.action {
            ConfirmAction::Delete => self.commit_delete(pending),
            ConfirmAction::Edit => self.commit_edit(pending),
        }
    }

    /// Validates `draft` and creates it on the server.
    ///
    /// The created note is returned but not inserted into the local list.
    pub fn create(&mut self, draft: &NoteDraft) -> ClientResult<Note> {
        let payload = match draft.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                warn!("event=notes_create module=client status=invalid fields={}", errors.len());
                return Err(self.record(Failure::FieldErrors(errors)));
            }
        };

        let started_at = Instant::now();
        info!("event=notes_create module=client status=start");
        self.last_failure = None;

        match self.api.create_note(&self.session, &payload) {
            Ok(note) => {
                info!(
                    "event=notes_create module=client status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(note)
            }
            Err(err) => Err(self.fail("notes_create", &err, CREATE_FALLBACK)),
        }
    }

    fn commit_delete(&mut self, pending: PendingConfirmation) -> ClientResult<Resolution> {
        self.last_failure = None;

        match self.api.delete_note(&self.session, &pending.note_id) {
            Ok(()) => {
                if let Some(index) = self.notes.iter().position(|note| note.id == pending.note_id) {
                    self.notes.remove(index);
                }
                info!(
                    "event=notes_delete module=client status=ok remaining={}",
                    self.notes.len()
                );
                Ok(Resolution::Deleted(pending.note_id))
            }
            Err(err) => {
                // The dialog stays up so the user can retry or cancel.
                self.pending = Some(pending);
                Err(self.fail("notes_delete", &err, DELETE_FALLBACK))
            }
        }
    }

    fn commit_edit(&mut self, pending: PendingConfirmation) -> ClientResult<Resolution> {
        let Some(payload) = self.staged_edit.take() else {
            return Err(ClientError::NoEditOpen);
        };
        self.last_failure = None;

        let result = self
            .api
            .update_note(&self.session, &pending.note_id, &payload);
        // Success or failure, the form is closed.
        self.edit = None;

        match result {
            Ok(()) => {
                if let Some(note) = self.notes.iter_mut().find(|note| note.id == pending.note_id) {
                    note.apply(&payload);
                }
                info!("event=notes_update module=client status=ok");
                Ok(Resolution::Edited(pending.note_id))
            }
            Err(err) => Err(self.fail("notes_update", &err, UPDATE_FALLBACK)),
        }
    }

    fn drop_staged_edit(&mut self) {
        self.staged_edit = None;
        if matches!(&self.pending, Some(pending) if pending.action == ConfirmAction::Edit) {
            self.pending = None;
        }
    }

    fn fail(&mut self, event: &'static str, err: &ApiError, fallback: &str) -> ClientError {
        warn!(
            "event={} module=client status=error error_code={} error={}",
            event,
            err.code(),
            err
        );
        self.record(Failure::from_api_error(err, fallback))
    }

    fn record(&mut self, failure: Failure) -> ClientError {
        self.last_failure = Some(failure.clone());
        ClientError::Failed(failure)
    }
}
