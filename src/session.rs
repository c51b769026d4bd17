//! Session context and durable token storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! The bearer token is the only piece of state that outlives a run. The
//! controller owns a `Session` value and hands it to every remote call, while
//! a `SessionStore` persists the token under a fixed key so the next run can
//! restore it.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::error::CatalogError;

/// Storage key the token is saved under.
pub const TOKEN_KEY: &str = "token";

/// Authentication context passed into every remote call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_some() { "<redacted>" } else { "<none>" };
        f.debug_struct("Session").field("token", &token).finish()
    }
}

/// Durable token storage.
pub trait SessionStore: Send + Sync {
    /// Read the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the backing store is unreadable.
    fn load(&self) -> Result<Option<String>, CatalogError>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the write fails.
    fn save(&self, token: &str) -> Result<(), CatalogError>;

    /// Remove the persisted token. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the write fails.
    fn clear(&self) -> Result<(), CatalogError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, CatalogError> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<(), CatalogError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), CatalogError> {
        (**self).clear()
    }
}

/// JSON key/value file holding the token under [`TOKEN_KEY`].
///
/// Other keys in the file are preserved as-is. Writes go to a sibling temp
/// file that is renamed into place; on unix the file is owner-only.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

type Entries = Map<String, Value>;

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Option<String>, CatalogError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&self.path, &e)),
        }
    }

    fn read_entries(&self) -> Result<Entries, CatalogError> {
        match self.read_raw()? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| storage_error(&self.path, &e)),
            None => Ok(Entries::new()),
        }
    }

    /// Like `read_entries`, but unparseable contents are discarded so the next
    /// write repairs the file.
    fn read_entries_for_write(&self) -> Result<Entries, CatalogError> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Entries::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), CatalogError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| storage_error(parent, &e))?;

        let raw = serde_json::to_string_pretty(entries).map_err(|e| storage_error(&self.path, &e))?;
        let mut file = tempfile::NamedTempFile::new_in(parent).map_err(|e| storage_error(parent, &e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| storage_error(file.path(), &e))?;
        }
        file.write_all(raw.as_bytes()).map_err(|e| storage_error(file.path(), &e))?;
        file.as_file().sync_all().map_err(|e| storage_error(file.path(), &e))?;
        file.persist(&self.path).map_err(|e| storage_error(&self.path, &e.error))?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, CatalogError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned))
    }

    fn save(&self, token: &str) -> Result<(), CatalogError> {
        let mut entries = self.read_entries_for_write()?;
        entries.insert(TOKEN_KEY.to_owned(), Value::String(token.to_owned()));
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), CatalogError> {
        if self.read_raw()?.is_none() {
            return Ok(());
        }
        let mut entries = self.read_entries_for_write()?;
        entries.remove(TOKEN_KEY);
        self.write_entries(&entries)
    }
}

/// Process-local store for offline runs and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, CatalogError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<(), CatalogError> {
        *self.slot() = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), CatalogError> {
        *self.slot() = None;
        Ok(())
    }
}

fn storage_error(path: &Path, error: &dyn std::error::Error) -> CatalogError {
    CatalogError::Storage(format!("{}: {error}", path.display()))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
