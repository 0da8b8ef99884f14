//! Client-side domain model for notes and account forms.
//!
//! # Responsibility
//! - Define the note shapes exchanged with the notes API.
//! - Keep local validation rules next to the data they guard.
//!
//! # Invariants
//! - Every note is identified by a server-assigned `NoteId`.
//! - Validation never performs I/O.

pub mod note;
pub mod validation;
