//! View-state machine for the catalog screens.
//!
//! DESIGN
//! ======
//! `View` is the single source of truth for which screen is active. The
//! transition check is a pure function so the controller can reject bad
//! navigation (unknown book, gated screen while logged out) and stay put.

use std::fmt;
use std::str::FromStr;

use crate::types::BookId;

/// Active screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    /// Login gate.
    #[default]
    LoggedOut,
    /// Book table ("home").
    List,
    /// New-book form.
    Add,
    /// Edit form for one book.
    Edit(BookId),
}

impl View {
    #[must_use]
    pub fn is_form(self) -> bool {
        matches!(self, Self::Add | Self::Edit(_))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedOut => f.write_str("login"),
            Self::List => f.write_str("home"),
            Self::Add => f.write_str("add"),
            Self::Edit(id) => write!(f, "edit #{id}"),
        }
    }
}

/// Navigation destination requested by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Login,
    Home,
    Add,
    Edit,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "home" | "list" => Ok(Self::Home),
            "add" => Ok(Self::Add),
            "edit" => Ok(Self::Edit),
            other => Err(format!("unknown page `{other}`")),
        }
    }
}

/// Why a navigation request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("log in first")]
    LoginRequired,
    #[error("already logged in; log out to switch accounts")]
    AlreadyLoggedIn,
    #[error("choose a book to edit")]
    MissingBook,
    #[error("book #{0} is not in the list")]
    UnknownBook(BookId),
}

/// Facts about the controller that gate navigation.
#[derive(Clone, Copy, Debug)]
pub struct NavContext<F> {
    pub authenticated: bool,
    pub require_auth: bool,
    pub book_exists: F,
}

/// Resolve `target` into the next view, or explain why it is not allowed.
///
/// # Errors
///
/// Returns a [`NavError`] when the destination is gated or the edit target
/// does not exist locally.
pub fn resolve<F>(target: Target, context_id: Option<BookId>, ctx: &NavContext<F>) -> Result<View, NavError>
where
    F: Fn(BookId) -> bool,
{
    let gated = ctx.require_auth && !ctx.authenticated;
    match target {
        Target::Login if ctx.authenticated => Err(NavError::AlreadyLoggedIn),
        Target::Login => Ok(View::LoggedOut),
        _ if gated => Err(NavError::LoginRequired),
        Target::Home => Ok(View::List),
        Target::Add => Ok(View::Add),
        Target::Edit => {
            let id = context_id.ok_or(NavError::MissingBook)?;
            if (ctx.book_exists)(id) { Ok(View::Edit(id)) } else { Err(NavError::UnknownBook(id)) }
        }
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
