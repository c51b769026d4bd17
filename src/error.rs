//! Error taxonomy for catalog operations.
//!
//! DESIGN
//! ======
//! Every remote-call failure is caught at the controller call site, logged,
//! and kept as the user-visible notice; the typed variants below let callers
//! and tests distinguish local validation from transport and auth failures
//! without string matching.

/// Local draft problems detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required text field was empty after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The year field held text that is not an integer.
    #[error("year must be a whole number, got `{0}`")]
    InvalidYear(String),

    /// Submit was requested with no book loaded into the edit form.
    #[error("no book is being edited")]
    NoEditDraft,
}

/// Errors produced by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The draft was rejected locally; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The request could not be delivered or the response was unusable.
    #[error("request failed: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16, body: String },

    /// Login was rejected or could not be completed.
    #[error("login failed: {0}")]
    Auth(String),

    /// The durable session store could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(String),
}

impl CatalogError {
    /// Whether the error came from talking to the remote service.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// Whether the remote service reported the target as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Whether the remote service rejected the credentials on the request.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
