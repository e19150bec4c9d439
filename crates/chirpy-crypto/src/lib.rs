//! Credential and session primitives for Chirpy.
//!
//! Provides salted Argon2id password hashing with constant-time
//! verification, and stateless HS256 bearer tokens that bind a session to
//! an account id for a limited time.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod password;
pub mod session;

pub use password::{check_password, hash_password, verify_password, CredentialError};
pub use session::{
    Claims, SessionConfig, SessionManager, SessionSecret, TokenError, BEARER_PREFIX,
    DEFAULT_ISSUER, DEFAULT_TOKEN_LIFETIME,
};
