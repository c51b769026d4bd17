//! In-process book service.
//!
//! Backs `--offline` runs and doubles as the controller's test service. Ids
//! are assigned locally as one past the current maximum.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::BookApi;
use crate::error::CatalogError;
use crate::session::Session;
use crate::types::{Book, BookId, BookInput};

/// Token issued by [`MemoryBookApi::login`].
pub const MEMORY_TOKEN: &str = "memory-session-token";

/// Per-operation call counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub login: usize,
}

impl CallCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.list + self.create + self.update + self.delete + self.login
    }
}

#[derive(Default)]
struct Inner {
    books: Vec<Book>,
    calls: CallCounts,
    unavailable: bool,
}

/// `BookApi` over a local vector.
#[derive(Default)]
pub struct MemoryBookApi {
    inner: Mutex<Inner>,
    credentials: Option<(String, String)>,
}

impl MemoryBookApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection.
    #[must_use]
    pub fn with_books(self, books: Vec<Book>) -> Self {
        self.lock().books = books;
        self
    }

    /// Accept only this credential pair and require its token on every call.
    #[must_use]
    pub fn with_credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((email.into(), password.into()));
        self
    }

    /// Make every subsequent call fail with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    #[must_use]
    pub fn books(&self) -> Vec<Book> {
        self.lock().books.clone()
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, inner: &Inner, session: &Session) -> Result<(), CatalogError> {
        if inner.unavailable {
            return Err(CatalogError::Transport("service unavailable".to_owned()));
        }
        if self.credentials.is_some() && session.token() != Some(MEMORY_TOKEN) {
            return Err(CatalogError::Status { status: 401, body: "missing or invalid token".to_owned() });
        }
        Ok(())
    }
}

fn not_found(id: BookId) -> CatalogError {
    CatalogError::Status { status: 404, body: format!("book {id} not found") }
}

#[async_trait::async_trait]
impl BookApi for MemoryBookApi {
    async fn list_books(&self, session: &Session) -> Result<Vec<Book>, CatalogError> {
        let mut inner = self.lock();
        inner.calls.list += 1;
        self.check(&inner, session)?;
        Ok(inner.books.clone())
    }

    async fn create_book(&self, session: &Session, input: &BookInput) -> Result<Option<Book>, CatalogError> {
        let mut inner = self.lock();
        inner.calls.create += 1;
        self.check(&inner, session)?;
        let id = inner.books.iter().map(|book| book.id).max().unwrap_or(0) + 1;
        let book = input.clone().into_book(id);
        inner.books.push(book.clone());
        Ok(Some(book))
    }

    async fn update_book(&self, session: &Session, id: BookId, input: &BookInput) -> Result<(), CatalogError> {
        let mut inner = self.lock();
        inner.calls.update += 1;
        self.check(&inner, session)?;
        let slot = inner.books.iter_mut().find(|book| book.id == id).ok_or_else(|| not_found(id))?;
        *slot = input.clone().into_book(id);
        Ok(())
    }

    async fn delete_book(&self, session: &Session, id: BookId) -> Result<(), CatalogError> {
        let mut inner = self.lock();
        inner.calls.delete += 1;
        self.check(&inner, session)?;
        let position = inner.books.iter().position(|book| book.id == id).ok_or_else(|| not_found(id))?;
        inner.books.remove(position);
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, CatalogError> {
        let mut inner = self.lock();
        inner.calls.login += 1;
        if inner.unavailable {
            return Err(CatalogError::Auth("service unavailable".to_owned()));
        }
        match &self.credentials {
            Some((expected_email, expected_password)) if expected_email != email || expected_password != password => {
                Err(CatalogError::Auth("invalid credentials".to_owned()))
            }
            _ => Ok(MEMORY_TOKEN.to_owned()),
        }
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
