//! Command execution over the core services.

use crate::cli::{AddArgs, Cli, Command, EditArgs};
use log::info;
use notesync_core::db::open_db;
use notesync_core::model::note::format_editable_due_date;
use notesync_core::{
    init_logging, load_config, AuthService, HttpApi, LoginForm, Note, NoteDraft, NotesClient,
    Resolution, SignupForm, SqliteSessionStore,
};
use std::error::Error;
use std::io::{self, BufRead, Write};

pub type CliResult<T> = Result<T, Box<dyn Error>>;

/// Runs one parsed command end to end.
pub fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    let conn = open_db(&config.db_path)?;
    let api = HttpApi::new(config.api_base_url.clone())?;
    let auth = AuthService::new(api.clone(), SqliteSessionStore::try_new(&conn)?);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    match cli.command {
        Command::Login { email, password } => {
            let password = password_or_prompt(password, &mut input, &mut output)?;
            auth.login(&LoginForm::new(email, password))?;
            writeln!(output, "Logged in.")?;
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let password = password_or_prompt(password, &mut input, &mut output)?;
            auth.signup(&SignupForm::new(name, email, password))?;
            writeln!(output, "Account created.")?;
        }
        Command::Logout => {
            auth.logout()?;
            writeln!(output, "Logged out.")?;
        }
        command => {
            let mut client = NotesClient::new(api, auth.restore_session());
            run_notes(command, &mut client, &mut input, &mut output)?;
        }
    }
    Ok(())
}

fn run_notes<R: BufRead, W: Write>(
    command: Command,
    client: &mut NotesClient<HttpApi>,
    input: &mut R,
    output: &mut W,
) -> CliResult<()> {
    match command {
        Command::List => {
            client.load()?;
            if client.notes().is_empty() {
                writeln!(output, "No notes.")?;
            }
            for note in client.notes() {
                write_note(output, note)?;
            }
        }
        Command::Add(args) => {
            let created = client.create(&draft_from_add(args))?;
            writeln!(output, "Created note {}.", created.id)?;
        }
        Command::Edit(args) => {
            client.load()?;
            let note = client
                .find(&args.id)
                .cloned()
                .ok_or_else(|| format!("note `{}` not found", args.id))?;
            client.request_edit(&note);
            if let Some(draft) = client.edit_draft_mut() {
                apply_edit_args(draft, &args);
            }

            let prompt = client.confirm_edit_submission()?.prompt.clone();
            let accept = args.yes || confirm(&prompt, input, output)?;
            report(output, client.resolve_confirmation(accept)?)?;
        }
        Command::Delete { id, yes } => {
            client.request_delete(id);
            let prompt = client
                .pending_confirmation()
                .map(|pending| pending.prompt.clone())
                .unwrap_or_default();
            let accept = yes || confirm(&prompt, input, output)?;
            report(output, client.resolve_confirmation(accept)?)?;
        }
        Command::Login { .. } | Command::Signup { .. } | Command::Logout => {}
    }
    Ok(())
}

fn draft_from_add(args: AddArgs) -> NoteDraft {
    NoteDraft {
        title: args.title,
        description: args.description,
        tags: args.tags,
        due_date: args.due,
        status: args.status,
    }
}

fn apply_edit_args(draft: &mut NoteDraft, args: &EditArgs) {
    if let Some(title) = &args.title {
        draft.title = title.clone();
    }
    if let Some(description) = &args.description {
        draft.description = description.clone();
    }
    if let Some(tags) = &args.tags {
        draft.tags = tags.clone();
    }
    if let Some(due) = &args.due {
        draft.due_date = due.clone();
    }
    if args.clear_due {
        draft.due_date.clear();
    }
    if let Some(status) = args.status {
        draft.status = status;
    }
}

fn report<W: Write>(output: &mut W, resolution: Resolution) -> io::Result<()> {
    match resolution {
        Resolution::Declined => writeln!(output, "Cancelled."),
        Resolution::Deleted(id) => writeln!(output, "Deleted note {id}."),
        Resolution::Edited(id) => writeln!(output, "Updated note {id}."),
    }
}

fn write_note<W: Write>(output: &mut W, note: &Note) -> io::Result<()> {
    writeln!(output, "{}  [{}]  {}", note.id, note.status, note.title)?;
    writeln!(output, "    {}", note.description)?;
    let tags = note.tag_list();
    if !tags.is_empty() {
        writeln!(output, "    tags: {}", tags.join(", "))?;
    }
    if let Some(due) = note.due_date {
        writeln!(output, "    due:  {}", format_editable_due_date(due))?;
    }
    Ok(())
}

/// Asks a yes/no question. Anything but `y`/`yes` declines.
fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn password_or_prompt<R: BufRead, W: Write>(
    password: Option<String>,
    input: &mut R,
    output: &mut W,
) -> io::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    write!(output, "Password: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
