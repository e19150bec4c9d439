//! HTTP API for Chirpy.
//!
//! Exposes account signup and update, password login issuing bearer
//! tokens, chirp creation and lookup, a static file tree under `/app/`,
//! and a small admin page counting visits to it.
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | GET | `/api/healthz` | none |
//! | GET | `/admin/metrics` | none |
//! | POST | `/api/reset` | none |
//! | POST | `/api/users` | none |
//! | PUT | `/api/users` | bearer |
//! | POST | `/api/login` | none |
//! | GET | `/api/chirps` | none |
//! | POST | `/api/chirps` | bearer |
//! | GET | `/api/chirps/{id}` | none |

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod moderation;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{bearer_token, Authenticated};
pub use config::{ServerConfig, DEFAULT_BANNED_WORDS};
pub use error::{ServerError, ServerResult};
pub use metrics::HitCounter;
pub use moderation::ContentFilter;
pub use router::build_router;
pub use server::ChirpyServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chirpy_crypto::SessionSecret;
    use tower::util::ServiceExt;

    fn server(dir: &tempfile::TempDir) -> ChirpyServer {
        let config = ServerConfig {
            database_path: dir.path().join("database.json"),
            static_root: dir.path().join("public"),
            ..ServerConfig::default()
        };
        ChirpyServer::new(config, SessionSecret::generate()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = server(&dir).router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = server(&dir).router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
