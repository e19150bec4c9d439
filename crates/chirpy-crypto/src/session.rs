use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chirpy_types::AccountId;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Issuer written into every token unless configured otherwise.
pub const DEFAULT_ISSUER: &str = "chirpy";

/// Token lifetime used when the caller does not ask for one.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(90);

/// Scheme prefix stripped from `Authorization` header values.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Length of a randomly generated secret.
const GENERATED_SECRET_LENGTH: usize = 32;

const ALGORITHM: &str = "HS256";

/// Server-held MAC key for signing session tokens.
#[derive(Clone)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Generate a random secret.
    ///
    /// Tokens signed with it stop validating once the process exits.
    pub fn generate() -> Self {
        let mut key = vec![0u8; GENERATED_SECRET_LENGTH];
        rand::thread_rng().fill_bytes(&mut key);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionSecret(<redacted>)")
    }
}

/// Issuance settings for a [`SessionManager`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Value of the `iss` claim; tokens from other issuers are rejected.
    pub issuer: String,
    /// Lifetime applied when `issue` is called without one.
    pub default_lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            default_lifetime: DEFAULT_TOKEN_LIFETIME,
        }
    }
}

/// Registered claims carried by a session token. Times are Unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Issues and validates stateless HS256 bearer tokens.
///
/// Token layout is the compact JWS form:
/// ```text
/// base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256(header "." claims))
/// ```
/// Nothing is stored server side. A token stays valid until `exp`; rotating
/// the secret invalidates every outstanding token at once.
#[derive(Clone, Debug)]
pub struct SessionManager {
    secret: SessionSecret,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(secret: SessionSecret, config: SessionConfig) -> Self {
        Self { secret, config }
    }

    /// Issue a token for `account`, valid from now for `lifetime`
    /// (or the configured default).
    pub fn issue(&self, account: AccountId, lifetime: Option<Duration>) -> Result<String, TokenError> {
        self.issue_at(account, lifetime, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        account: AccountId,
        lifetime: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let lifetime = lifetime.unwrap_or(self.config.default_lifetime);
        let issued_at = now.timestamp();
        let lifetime_secs = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);

        let claims = Claims {
            iss: self.config.issuer.clone(),
            sub: account.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(lifetime_secs),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };

        let header_json =
            serde_json::to_vec(&header).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signature = self.mac(signing_input.as_bytes())?.finalize().into_bytes();

        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Validate a submitted credential and return the account it names.
    ///
    /// Accepts either the bare token or a full `Bearer <token>` header value.
    pub fn validate(&self, credential: &str) -> Result<AccountId, TokenError> {
        self.validate_at(credential, Utc::now())
    }

    /// Validate as if the current time were `now`.
    pub fn validate_at(&self, credential: &str, now: DateTime<Utc>) -> Result<AccountId, TokenError> {
        let credential = credential.trim();
        let token = credential
            .strip_prefix(BEARER_PREFIX)
            .unwrap_or(credential)
            .trim();
        if token.is_empty() {
            return Err(TokenError::Malformed("empty token".into()));
        }

        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed("expected three segments".into()));
        };

        let header: Header = decode_segment(header_b64, "header")?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed(format!(
                "unsupported algorithm {}",
                header.alg
            )));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed("signature is not base64url".into()))?;
        let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
        self.mac(signing_input.as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims = decode_segment(claims_b64, "claims")?;
        if claims.iss != self.config.issuer {
            return Err(TokenError::WrongIssuer(claims.iss));
        }

        let now = now.timestamp();
        if now < claims.iat {
            return Err(TokenError::NotYetValid {
                issued_at: claims.iat,
            });
        }
        if now > claims.exp {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
            });
        }

        claims
            .sub
            .parse()
            .map_err(|_| TokenError::Malformed(format!("subject {:?} is not an account id", claims.sub)))
    }

    fn mac(&self, data: &[u8]) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        mac.update(data);
        Ok(mac)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str, what: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed(format!("{what} is not base64url")))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(format!("{what}: {e}")))
}

/// Errors from session token operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },
    #[error("token not valid before {issued_at}")]
    NotYetValid { issued_at: i64 },
    #[error("unexpected token issuer: {0}")]
    WrongIssuer(String),
    #[error("token encoding failed: {0}")]
    Encoding(String),
}
