//! Foundation types for Chirpy.
//!
//! This crate provides the records persisted by the document store and the
//! identifiers that key them. Every other Chirpy crate depends on
//! `chirpy-types`.
//!
//! # Key Types
//!
//! - [`PostId`] / [`AccountId`]: sequential integer keys, never reused
//! - [`Post`]: an immutable short text entry ("chirp")
//! - [`Account`]: a user identity with a unique email
//! - [`PasswordHash`]: opaque password hash bytes, redacted in `Debug`

pub mod account;
pub mod error;
pub mod id;
pub mod post;

pub use account::{Account, PasswordHash};
pub use error::TypeError;
pub use id::{AccountId, PostId};
pub use post::Post;
