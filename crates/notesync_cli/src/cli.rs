//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use notesync_core::NoteStatus;
use std::path::PathBuf;

#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version, about = "Terminal client for the notes service")]
pub struct Cli {
    /// TOML config file; `NOTESYNC_*` env vars override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
pub enum Command {
    /// Log in and remember the session token.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and remember the session token.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session token.
    Logout,
    /// Print all notes.
    List,
    /// Create a note.
    Add(AddArgs),
    /// Change fields of an existing note.
    Edit(EditArgs),
    /// Delete a note.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
}

impl Command {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Signup { .. } => "signup",
            Self::Logout => "logout",
            Self::List => "list",
            Self::Add(_) => "add",
            Self::Edit(_) => "edit",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Args, Clone, Debug, Eq, PartialEq)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    /// Comma-separated tags.
    #[arg(long, default_value = "")]
    pub tags: String,
    /// `YYYY-MM-DDTHH:MM` (UTC) or RFC 3339.
    #[arg(long, default_value = "")]
    pub due: String,
    #[arg(long, default_value_t = NoteStatus::Pending)]
    pub status: NoteStatus,
}

#[derive(Args, Clone, Debug, Eq, PartialEq)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    /// Remove the due date.
    #[arg(long, default_value_t = false)]
    pub clear_due: bool,
    #[arg(long)]
    pub status: Option<NoteStatus>,
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,
}
