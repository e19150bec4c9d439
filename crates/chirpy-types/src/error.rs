use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {kind} id: {input:?}")]
    InvalidId { kind: &'static str, input: String },

    #[error("invalid base64 in password hash: {0}")]
    InvalidBase64(String),
}
