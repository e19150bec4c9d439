//! Embedded persistence for Chirpy.
//!
//! All state lives in one JSON document on disk, shaped like a miniature
//! two-table database (`chirps` and `users`). Concurrent request handlers
//! share it through a [`DocumentStore`], and the [`Repository`] layers
//! per-entity CRUD on top.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`JsonFileStore`] -- the production backend, one JSON file per database
//! - [`InMemoryDocumentStore`] -- for tests and embedding
//!
//! # Design Rules
//!
//! 1. The document is the only source of truth; nothing is cached between calls.
//! 2. Every mutation is compose-then-replace inside one exclusive section.
//! 3. Ids are `max + 1` over the current document, computed in that same section.
//! 4. Account emails are unique on create and on update.
//! 5. Readers proceed in parallel; writers exclude everyone.
//! 6. All I/O errors are propagated, never silently ignored or retried.

pub mod document;
pub mod error;
pub mod file;
pub mod memory;
pub mod repository;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use document::Document;
pub use error::{AccountKey, StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::InMemoryDocumentStore;
pub use repository::Repository;
pub use traits::DocumentStore;
