//! Book catalog client: a view-state controller over a REST book service.
//!
//! ARCHITECTURE
//! ============
//! `catalog::Catalog` owns the list, drafts, view and session. It talks to the
//! service through the `api::BookApi` seam (`HttpBookApi` or the in-process
//! `MemoryBookApi`) and persists the bearer token through
//! `session::SessionStore`. `render` and `shell` are the text front end.

pub mod api;
pub mod catalog;
pub mod config;
pub mod confirm;
pub mod error;
pub mod memory;
pub mod render;
pub mod session;
pub mod shell;
pub mod types;
pub mod view;

pub use api::{BookApi, HttpBookApi};
pub use catalog::Catalog;
pub use config::ClientConfig;
pub use error::{CatalogError, ValidationError};
pub use types::{Book, BookDraft, BookId, DraftField};
pub use view::{Target, View};
