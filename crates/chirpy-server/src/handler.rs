use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;
use chirpy_crypto::{check_password, hash_password};
use chirpy_types::{AccountId, Post, PostId};
use serde::{Deserialize, Serialize};

use crate::auth::Authenticated;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested token lifetime; absent or zero means the server default.
    #[serde(default)]
    pub expires_in_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct NewChirp {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: AccountId,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub id: AccountId,
    pub email: String,
    pub token: String,
}

fn require_credentials(credentials: &Credentials) -> ServerResult<()> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ServerError::BadRequest("email and password are required".into()));
    }
    Ok(())
}

/// Readiness check.
pub async fn healthz() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

/// Admin page showing how often `/app/` was visited.
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>",
        state.hits.get()
    ))
}

pub async fn reset_metrics(State(state): State<AppState>) -> &'static str {
    state.hits.reset();
    tracing::info!("hit counter reset");
    "Hits reset to 0"
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<UserResponse>)> {
    let Json(params) = payload?;
    require_credentials(&params)?;
    let account = state
        .blocking(move |repo| {
            let hash = hash_password(&params.password)?;
            Ok(repo.create_account(params.email, hash)?)
        })
        .await?;
    tracing::info!(id = %account.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: account.id,
            email: account.email,
        }),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Authenticated(account_id): Authenticated,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ServerResult<Json<UserResponse>> {
    let Json(params) = payload?;
    require_credentials(&params)?;
    let account = state
        .blocking(move |repo| Ok(repo.update_account(account_id, params.email, &params.password)?))
        .await?;
    tracing::info!(id = %account.id, "user updated");
    Ok(Json(UserResponse {
        id: account.id,
        email: account.email,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ServerResult<Json<LoginResponse>> {
    let Json(params) = payload?;
    let lifetime = params
        .expires_in_seconds
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let account = state
        .blocking(move |repo| {
            let account = repo.get_account_by_email(&params.email)?;
            check_password(&params.password, &account.password_hash)?;
            Ok(account)
        })
        .await?;

    let token = state.sessions.issue(account.id, lifetime)?;
    tracing::info!(id = %account.id, "login succeeded");
    Ok(Json(LoginResponse {
        id: account.id,
        email: account.email,
        token,
    }))
}

pub async fn create_chirp(
    State(state): State<AppState>,
    Authenticated(author): Authenticated,
    payload: Result<Json<NewChirp>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Post>)> {
    let Json(params) = payload?;
    let body = state.filter.check(&params.body)?;
    let post = state.blocking(move |repo| Ok(repo.create_post(body)?)).await?;
    tracing::info!(id = %post.id, %author, "chirp created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_chirps(State(state): State<AppState>) -> ServerResult<Json<Vec<Post>>> {
    let posts = state.blocking(|repo| Ok(repo.list_posts()?)).await?;
    Ok(Json(posts))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ServerResult<Json<Post>> {
    let id: PostId = raw_id
        .parse()
        .map_err(|e: chirpy_types::TypeError| ServerError::BadRequest(e.to_string()))?;
    let post = state.blocking(move |repo| Ok(repo.get_post(id)?)).await?;
    Ok(Json(post))
}
