//! Remote book service seam and its HTTP implementation.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures map to `CatalogError::Transport`, non-2xx answers to
//! `CatalogError::Status` with the body kept for diagnostics. Login collapses
//! every failure into `CatalogError::Auth` so the caller shows one generic
//! message.

use std::time::Duration;

use crate::config::HttpTimeouts;
use crate::error::CatalogError;
use crate::session::Session;
use crate::types::{Book, BookId, BookInput, LoginRequest, LoginResponse};

pub const BOOKS_PATH: &str = "/api/books";
pub const LOGIN_PATH: &str = "/api/login";

/// Path of a single book. Always under the `/api` prefix.
#[must_use]
pub fn book_path(id: BookId) -> String {
    format!("{BOOKS_PATH}/{id}")
}

/// Operations the catalog needs from the remote service. Enables mocking in tests.
#[async_trait::async_trait]
pub trait BookApi: Send + Sync {
    /// Fetch the full collection in server order.
    async fn list_books(&self, session: &Session) -> Result<Vec<Book>, CatalogError>;

    /// Create a book. Returns the created record when the service echoes one
    /// with an id.
    async fn create_book(&self, session: &Session, input: &BookInput) -> Result<Option<Book>, CatalogError>;

    /// Replace the fields of book `id`.
    async fn update_book(&self, session: &Session, id: BookId, input: &BookInput) -> Result<(), CatalogError>;

    /// Delete book `id`. A missing id surfaces as a status error.
    async fn delete_book(&self, session: &Session, id: BookId) -> Result<(), CatalogError>;

    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String, CatalogError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed client for the book service.
pub struct HttpBookApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBookApi {
    /// Build a client for `base_url` (already normalized, no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()?;
        Ok(Self { http, base_url: base_url.into() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, path: &str, session: &Session) -> reqwest::RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, CatalogError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::Status { status: status.as_u16(), body })
    }
}

#[async_trait::async_trait]
impl BookApi for HttpBookApi {
    async fn list_books(&self, session: &Session) -> Result<Vec<Book>, CatalogError> {
        tracing::debug!(path = BOOKS_PATH, authenticated = session.is_authenticated(), "GET books");
        let response = self.send(self.request(reqwest::Method::GET, BOOKS_PATH, session)).await?;
        let text = response.text().await?;
        parse_books(&text)
    }

    async fn create_book(&self, session: &Session, input: &BookInput) -> Result<Option<Book>, CatalogError> {
        tracing::debug!(path = BOOKS_PATH, title = %input.title, "POST book");
        let request = self.request(reqwest::Method::POST, BOOKS_PATH, session).json(input);
        let response = self.send(request).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str::<Book>(&text).ok())
    }

    async fn update_book(&self, session: &Session, id: BookId, input: &BookInput) -> Result<(), CatalogError> {
        let path = book_path(id);
        tracing::debug!(%path, "PUT book");
        let request = self.request(reqwest::Method::PUT, &path, session).json(input);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_book(&self, session: &Session, id: BookId) -> Result<(), CatalogError> {
        let path = book_path(id);
        tracing::debug!(%path, "DELETE book");
        self.send(self.request(reqwest::Method::DELETE, &path, session)).await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, CatalogError> {
        tracing::debug!(path = LOGIN_PATH, "POST login");
        let request = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password });
        let response = self.send(request).await.map_err(|e| login_failed(&e))?;
        let body: LoginResponse = response.json().await.map_err(|e| login_failed(&e))?;
        if body.token.is_empty() {
            return Err(CatalogError::Auth("service returned an empty token".to_owned()));
        }
        Ok(body.token)
    }
}

fn parse_books(text: &str) -> Result<Vec<Book>, CatalogError> {
    serde_json::from_str(text).map_err(|e| CatalogError::Transport(format!("invalid books payload: {e}")))
}

fn login_failed(error: &dyn std::fmt::Display) -> CatalogError {
    CatalogError::Auth(error.to_string())
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
