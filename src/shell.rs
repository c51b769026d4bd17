//! Interactive line-oriented front end.
//!
//! SYSTEM CONTEXT
//! ==============
//! One line in, one controller event, one re-render. The delete prompt reads
//! from the same input stream as the commands so scripted sessions stay in
//! order.

use std::io::{self, BufRead, Write};

use crate::catalog::Catalog;
use crate::confirm::PromptConfirm;
use crate::render::render_view;
use crate::types::{BookId, DraftField};
use crate::view::{Target, View};

pub const HELP: &str = "\
commands:
  list                      show the book table
  reload                    fetch the list from the server
  add                       open the new-book form
  edit <id>                 open the edit form for a book
  set <field> <value>       fill title, author, year or genre
  save                      submit the open form
  cancel                    close the open form
  delete <id>               delete a book (asks first)
  login <email> <password>  start a session
  logout                    end the session
  help                      show this text
  quit                      leave";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Help,
    Quit,
    List,
    Reload,
    Add,
    Edit(BookId),
    Set(DraftField, String),
    Save,
    Cancel,
    Delete(BookId),
    Login { email: String, password: String },
    Logout,
}

/// Parse one input line.
///
/// # Errors
///
/// Returns a short usage message for unknown commands or bad arguments.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "list" | "home" => ShellCommand::List,
        "reload" => ShellCommand::Reload,
        "add" => ShellCommand::Add,
        "edit" => ShellCommand::Edit(parse_id(rest, "edit <id>")?),
        "delete" | "rm" => ShellCommand::Delete(parse_id(rest, "delete <id>")?),
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_owned());
            }
            ShellCommand::Set(field.parse()?, value.trim().to_owned())
        }
        "save" => ShellCommand::Save,
        "cancel" => ShellCommand::Cancel,
        "login" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(email), Some(password), None) => {
                    ShellCommand::Login { email: email.to_owned(), password: password.to_owned() }
                }
                _ => return Err("usage: login <email> <password>".to_owned()),
            }
        }
        "logout" => ShellCommand::Logout,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(command)
}

fn parse_id(raw: &str, usage: &str) -> Result<BookId, String> {
    raw.parse::<BookId>().map_err(|_| format!("usage: {usage}"))
}

/// Run the read-dispatch-render loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only when reading input or writing output fails.
pub async fn run_shell<R, W>(catalog: &mut Catalog, mut input: R, mut output: W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", render_view(catalog))?;
    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "{message}")?;
                continue;
            }
        };
        tracing::debug!(?command, "shell command");

        match command {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                writeln!(output, "{HELP}")?;
                continue;
            }
            ShellCommand::Delete(id) => {
                let mut confirm = PromptConfirm::new(&mut input, &mut output);
                let _ = catalog.delete_book(id, &mut confirm).await;
            }
            other => {
                if let Err(message) = dispatch(catalog, other).await {
                    writeln!(output, "{message}")?;
                }
            }
        }

        if let Some(notice) = catalog.take_notice() {
            writeln!(output, "{notice}")?;
        }
        write!(output, "{}", render_view(catalog))?;
    }
    Ok(())
}

/// Apply a non-interactive command. Controller failures are already kept in
/// the notice; the `Err` here carries shell-level usage problems.
async fn dispatch(catalog: &mut Catalog, command: ShellCommand) -> Result<(), String> {
    match command {
        ShellCommand::List => {
            catalog.navigate(Target::Home, None);
        }
        ShellCommand::Reload => {
            let _ = catalog.load_books().await;
        }
        ShellCommand::Add => {
            catalog.navigate(Target::Add, None);
        }
        ShellCommand::Edit(id) => {
            catalog.navigate(Target::Edit, Some(id));
        }
        ShellCommand::Set(field, value) => {
            catalog.set_field(field, value).map_err(|_| "open `add` or `edit <id>` first".to_owned())?;
        }
        ShellCommand::Save => match catalog.view() {
            View::Add => {
                let _ = catalog.submit_new_book().await;
            }
            View::Edit(_) => {
                let _ = catalog.submit_edited_book().await;
            }
            View::List | View::LoggedOut => return Err("nothing to save".to_owned()),
        },
        ShellCommand::Cancel => {
            if !catalog.cancel() {
                return Err("nothing to cancel".to_owned());
            }
        }
        ShellCommand::Login { email, password } => {
            let _ = catalog.login(&email, &password).await;
        }
        ShellCommand::Logout => catalog.logout(),
        ShellCommand::Empty | ShellCommand::Help | ShellCommand::Quit | ShellCommand::Delete(_) => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
