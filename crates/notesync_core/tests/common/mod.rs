#![allow(dead_code)]

use notesync_core::{
    ApiError, ApiResult, AuthApi, AuthResponse, ErrorBody, LoginForm, Note, NoteId, NotePayload,
    NoteStatus, NotesApi, Session, SignupForm,
};
use std::cell::RefCell;
use std::collections::VecDeque;

/// One request observed by `FakeApi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { token: Option<String> },
    Create { token: Option<String>, payload: NotePayload },
    Update { id: NoteId, payload: NotePayload },
    Delete { id: NoteId },
    Login { email: String },
    Signup { email: String },
}

/// Scripted API double. Unscripted calls fail with a transport error.
#[derive(Default)]
pub struct FakeApi {
    calls: RefCell<Vec<Call>>,
    list: RefCell<VecDeque<ApiResult<Vec<Note>>>>,
    create: RefCell<VecDeque<ApiResult<Note>>>,
    update: RefCell<VecDeque<ApiResult<()>>>,
    delete: RefCell<VecDeque<ApiResult<()>>>,
    auth: RefCell<VecDeque<ApiResult<AuthResponse>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_list(self, result: ApiResult<Vec<Note>>) -> Self {
        self.list.borrow_mut().push_back(result);
        self
    }

    pub fn on_create(self, result: ApiResult<Note>) -> Self {
        self.create.borrow_mut().push_back(result);
        self
    }

    pub fn on_update(self, result: ApiResult<()>) -> Self {
        self.update.borrow_mut().push_back(result);
        self
    }

    pub fn on_delete(self, result: ApiResult<()>) -> Self {
        self.delete.borrow_mut().push_back(result);
        self
    }

    pub fn on_auth(self, result: ApiResult<AuthResponse>) -> Self {
        self.auth.borrow_mut().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn next<T>(queue: &RefCell<VecDeque<ApiResult<T>>>) -> ApiResult<T> {
        queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("unscripted call".to_string())))
    }

    fn token(session: &Session) -> Option<String> {
        session.bearer().map(str::to_string)
    }
}

impl NotesApi for FakeApi {
    fn list_notes(&self, session: &Session) -> ApiResult<Vec<Note>> {
        self.calls.borrow_mut().push(Call::List {
            token: Self::token(session),
        });
        Self::next(&self.list)
    }

    fn create_note(&self, session: &Session, payload: &NotePayload) -> ApiResult<Note> {
        self.calls.borrow_mut().push(Call::Create {
            token: Self::token(session),
            payload: payload.clone(),
        });
        Self::next(&self.create)
    }

    fn update_note(&self, _session: &Session, id: &NoteId, payload: &NotePayload) -> ApiResult<()> {
        self.calls.borrow_mut().push(Call::Update {
            id: id.clone(),
            payload: payload.clone(),
        });
        Self::next(&self.update)
    }

    fn delete_note(&self, _session: &Session, id: &NoteId) -> ApiResult<()> {
        self.calls.borrow_mut().push(Call::Delete { id: id.clone() });
        Self::next(&self.delete)
    }
}

impl AuthApi for FakeApi {
    fn login(&self, form: &LoginForm) -> ApiResult<AuthResponse> {
        self.calls.borrow_mut().push(Call::Login {
            email: form.email.clone(),
        });
        Self::next(&self.auth)
    }

    fn signup(&self, form: &SignupForm) -> ApiResult<AuthResponse> {
        self.calls.borrow_mut().push(Call::Signup {
            email: form.email.clone(),
        });
        Self::next(&self.auth)
    }
}

pub fn note(id: &str, title: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        tags: "work, urgent".to_string(),
        due_date: None,
        status: NoteStatus::Pending,
    }
}

/// Non-success response with a JSON error body.
pub fn rejected(status: u16, body: &str) -> ApiError {
    ApiError::Rejected {
        status,
        body: Some(serde_json::from_str::<ErrorBody>(body).expect("valid error body")),
    }
}

pub fn token_response(token: Option<&str>) -> AuthResponse {
    AuthResponse {
        token: token.map(str::to_string),
    }
}
