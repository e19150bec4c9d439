use std::fmt;
use std::path::PathBuf;

use chirpy_crypto::CredentialError;
use chirpy_types::{AccountId, PostId};

/// How an account lookup was keyed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountKey {
    Id(AccountId),
    Email(String),
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Email(email) => write!(f, "email {email:?}"),
        }
    }
}

/// Errors from document store and repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No post with the given id.
    #[error("post not found: {0}")]
    PostNotFound(PostId),

    /// No account matched the lookup.
    #[error("account not found: {0}")]
    AccountNotFound(AccountKey),

    /// The email is already used by another account.
    #[error("an account with email {0:?} already exists")]
    DuplicateEmail(String),

    /// The backing file is absent; `ensure_exists` was never called.
    #[error("document not initialised at {}", .0.display())]
    Missing(PathBuf),

    /// I/O error from the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid document.
    #[error("failed to decode document: {0}")]
    Decode(String),

    /// The document could not be serialized.
    #[error("failed to encode document: {0}")]
    Encode(String),

    /// The highest id in use is `u64::MAX`; no further id can be assigned.
    #[error("no {0} ids left to assign")]
    IdsExhausted(&'static str),

    /// Re-hashing a password during an account update failed.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl StoreError {
    /// `true` for lookup misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PostNotFound(_) | Self::AccountNotFound(_))
    }

    /// `true` for failures of the backing file itself (I/O or (de)serialization).
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Missing(_) | Self::Io(_) | Self::Decode(_) | Self::Encode(_)
        )
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
