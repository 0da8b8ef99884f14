//! Client use-case services.
//!
//! # Responsibility
//! - Orchestrate API calls into use-case level operations.
//! - Keep presentation layers decoupled from HTTP and storage details.

pub mod auth_service;
pub mod notes_client;
