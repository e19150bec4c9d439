use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chirpy_crypto::{TokenError, BEARER_PREFIX};
use chirpy_types::AccountId;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Extract the raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> ServerResult<&str> {
    let value = headers.get(AUTHORIZATION).ok_or(ServerError::MissingToken)?;
    let value = value
        .to_str()
        .map_err(|_| TokenError::Malformed("authorization header is not ASCII".into()))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| TokenError::Malformed("authorization scheme is not Bearer".into()))?
        .trim();
    if token.is_empty() {
        return Err(ServerError::MissingToken);
    }
    Ok(token)
}

/// The account named by a valid bearer token.
///
/// Handlers that take this extractor reject unauthenticated requests with
/// 401 before running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Authenticated(pub AccountId);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let account = state.sessions.validate(token)?;
        Ok(Self(account))
    }
}
