//! Book catalog controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns the local book list, both form drafts, the active view and the
//! session. Every operation runs to completion on `&mut self`, so there is no
//! shared mutable state to coordinate; the remote service and the token store
//! are injected so the whole controller runs against in-memory doubles.
//!
//! ERROR HANDLING
//! ==============
//! Failures are logged where they happen, stored as the user-visible notice,
//! and returned. Local state is only touched after the remote call succeeds.

use std::sync::Arc;

use crate::api::BookApi;
use crate::confirm::Confirm;
use crate::error::{CatalogError, ValidationError};
use crate::session::{Session, SessionStore};
use crate::types::{Book, BookDraft, BookId, DraftField};
use crate::view::{NavContext, Target, View, resolve};

pub struct Catalog {
    api: Arc<dyn BookApi>,
    store: Box<dyn SessionStore>,
    require_auth: bool,
    session: Session,
    books: Vec<Book>,
    new_draft: BookDraft,
    edit_draft: Option<BookDraft>,
    view: View,
    notice: Option<String>,
}

impl Catalog {
    #[must_use]
    pub fn new(api: Arc<dyn BookApi>, store: Box<dyn SessionStore>, require_auth: bool) -> Self {
        Self {
            api,
            store,
            require_auth,
            session: Session::anonymous(),
            books: Vec::new(),
            new_draft: BookDraft::default(),
            edit_draft: None,
            view: View::LoggedOut,
            notice: None,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    #[must_use]
    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn require_auth(&self) -> bool {
        self.require_auth
    }

    #[must_use]
    pub fn new_draft(&self) -> &BookDraft {
        &self.new_draft
    }

    #[must_use]
    pub fn edit_draft(&self) -> Option<&BookDraft> {
        self.edit_draft.as_ref()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Return and clear the pending notice.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    // =========================================================================
    // STARTUP
    // =========================================================================

    /// Restore the persisted session and pick the initial view.
    ///
    /// A restored token (or an open catalog) lands on the list and triggers
    /// one load; otherwise the catalog waits at the login gate.
    ///
    /// # Errors
    ///
    /// Returns the initial load error. The view is already `List` by then.
    pub async fn start(&mut self) -> Result<View, CatalogError> {
        match self.store.load() {
            Ok(Some(token)) => {
                tracing::info!("restored saved session");
                self.session = Session::with_token(token);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved session");
            }
        }

        if self.session.is_authenticated() || !self.require_auth {
            self.view = View::List;
            self.load_books().await?;
        } else {
            self.view = View::LoggedOut;
        }
        Ok(self.view)
    }

    // =========================================================================
    // DRAFTS
    // =========================================================================

    /// Update one field of the new-book form.
    pub fn set_new_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.new_draft.set(field, value);
    }

    /// Update one field of the edit form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoEditDraft`] when no book is being edited.
    pub fn set_edit_field(&mut self, field: DraftField, value: impl Into<String>) -> Result<(), ValidationError> {
        let draft = self.edit_draft.as_mut().ok_or(ValidationError::NoEditDraft)?;
        draft.set(field, value);
        Ok(())
    }

    /// Update a field on whichever form is showing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoEditDraft`] outside the add and edit views.
    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) -> Result<(), ValidationError> {
        match self.view {
            View::Add => {
                self.set_new_field(field, value);
                Ok(())
            }
            View::Edit(_) => self.set_edit_field(field, value),
            View::List | View::LoggedOut => Err(ValidationError::NoEditDraft),
        }
    }

    // =========================================================================
    // REMOTE OPERATIONS
    // =========================================================================

    /// Replace the local list with the server collection.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error; the local list is unchanged.
    pub async fn load_books(&mut self) -> Result<usize, CatalogError> {
        match self.api.list_books(&self.session).await {
            Ok(books) => {
                tracing::info!(count = books.len(), "books loaded");
                self.books = books;
                Ok(self.books.len())
            }
            Err(e) => Err(self.fail("Could not load books", e)),
        }
    }

    /// Validate and create the new-book draft, then re-fetch the collection.
    ///
    /// # Errors
    ///
    /// Returns a validation error without contacting the service, or the
    /// create error with the draft left intact. A failed re-fetch after a
    /// successful create is only reported through the notice.
    pub async fn submit_new_book(&mut self) -> Result<Option<Book>, CatalogError> {
        let input = match self.new_draft.validate() {
            Ok(input) => input,
            Err(e) => return Err(self.fail("Could not add book", e.into())),
        };

        let created = match self.api.create_book(&self.session, &input).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail("Could not add book", e)),
        };
        tracing::info!(id = created.as_ref().map(|book| book.id), title = %input.title, "book created");

        self.new_draft = BookDraft::default();
        if self.view == View::Add {
            self.view = View::List;
        }
        if self.load_books().await.is_ok() {
            self.notice = Some(format!("Added \"{}\".", input.title));
        }
        Ok(created)
    }

    /// Commit the edit draft to the service and the local list.
    ///
    /// # Errors
    ///
    /// Returns a validation error when nothing is being edited or the draft is
    /// invalid, or the update error; the list and the edit view are unchanged.
    pub async fn submit_edited_book(&mut self) -> Result<(), CatalogError> {
        let Some(draft) = self.edit_draft.as_ref() else {
            return Err(self.fail("Could not update book", ValidationError::NoEditDraft.into()));
        };
        let Some(id) = draft.id else {
            return Err(self.fail("Could not update book", ValidationError::NoEditDraft.into()));
        };
        let input = match draft.validate() {
            Ok(input) => input,
            Err(e) => return Err(self.fail("Could not update book", e.into())),
        };

        if let Err(e) = self.api.update_book(&self.session, id, &input).await {
            return Err(self.fail("Could not update book", e));
        }

        let title = input.title.clone();
        match self.books.iter_mut().find(|book| book.id == id) {
            Some(slot) => *slot = input.into_book(id),
            None => tracing::warn!(id, "updated book is not in the local list"),
        }
        tracing::info!(id, "book updated");
        self.edit_draft = None;
        self.view = View::List;
        self.notice = Some(format!("Updated \"{title}\"."));
        Ok(())
    }

    /// Delete `id` after asking `confirm`.
    ///
    /// Returns `Ok(false)` when the user declines.
    ///
    /// # Errors
    ///
    /// Returns the delete error (including a missing id); the list is unchanged.
    pub async fn delete_book(&mut self, id: BookId, confirm: &mut dyn Confirm) -> Result<bool, CatalogError> {
        let prompt = match self.book(id) {
            Some(book) => format!("Delete \"{}\"?", book.title),
            None => format!("Delete book #{id}?"),
        };
        if !confirm.confirm(&prompt) {
            tracing::debug!(id, "delete declined");
            return Ok(false);
        }

        if let Err(e) = self.api.delete_book(&self.session, id).await {
            return Err(self.fail("Could not delete book", e));
        }

        self.books.retain(|book| book.id != id);
        if self.view == View::Edit(id) {
            self.edit_draft = None;
            self.view = View::List;
        }
        tracing::info!(id, "book deleted");
        self.notice = Some(format!("Deleted book #{id}."));
        Ok(true)
    }

    /// Exchange credentials for a session, then load the list once.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank credentials or
    /// [`CatalogError::Auth`]; no token is stored and the view is unchanged.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), CatalogError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(self.fail("Could not log in", ValidationError::MissingField("email").into()));
        }
        if password.is_empty() {
            return Err(self.fail("Could not log in", ValidationError::MissingField("password").into()));
        }

        let token = match self.api.login(email, password).await {
            Ok(token) => token,
            Err(e) => {
                let e = match e {
                    CatalogError::Auth(_) => e,
                    other => CatalogError::Auth(other.to_string()),
                };
                return Err(self.fail("Could not log in", e));
            }
        };

        if let Err(e) = self.store.save(&token) {
            tracing::warn!(error = %e, "session will not survive a restart");
        }
        self.session = Session::with_token(token);
        self.view = View::List;
        tracing::info!("logged in");
        self.notice = Some("Logged in.".to_owned());
        let _ = self.load_books().await;
        Ok(())
    }

    /// Drop the session locally. The service is not contacted.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "could not clear saved session");
        }
        self.session = Session::anonymous();
        self.view = View::LoggedOut;
        self.edit_draft = None;
        self.new_draft = BookDraft::default();
        self.books.clear();
        tracing::info!("logged out");
        self.notice = Some("Logged out.".to_owned());
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Switch views. Refused transitions leave the view unchanged, set the
    /// notice and return `false`.
    pub fn navigate(&mut self, target: Target, context_id: Option<BookId>) -> bool {
        let books = &self.books;
        let ctx = NavContext {
            authenticated: self.session.is_authenticated(),
            require_auth: self.require_auth,
            book_exists: |id: BookId| books.iter().any(|book| book.id == id),
        };
        let next = match resolve(target, context_id, &ctx) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(from = %self.view, ?target, error = %e, "navigation refused");
                self.notice = Some(format!("Cannot open that page: {e}."));
                return false;
            }
        };

        self.edit_draft = match next {
            View::Edit(id) => self.book(id).map(BookDraft::from_book),
            _ => None,
        };
        tracing::debug!(from = %self.view, to = %next, "navigate");
        self.view = next;
        true
    }

    /// Leave the add or edit form without saving.
    pub fn cancel(&mut self) -> bool {
        if !self.view.is_form() {
            return false;
        }
        self.edit_draft = None;
        self.view = View::List;
        true
    }

    fn fail(&mut self, action: &'static str, error: CatalogError) -> CatalogError {
        tracing::warn!(action, error = %error, view = %self.view, "catalog operation failed");
        self.notice = Some(format!("{action}: {error}"));
        error
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
