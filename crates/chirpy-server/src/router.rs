use std::path::Path;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::metrics::count_hits;
use crate::state::AppState;

/// Build the axum router with all Chirpy endpoints.
///
/// Files under `static_root` are served at `/app/`, and every such request
/// bumps the hit counter.
pub fn build_router(state: AppState, static_root: &Path) -> Router {
    let api = Router::new()
        .route("/api/healthz", get(handler::healthz))
        .route("/api/reset", post(handler::reset_metrics))
        .route("/admin/metrics", get(handler::metrics))
        .route(
            "/api/users",
            post(handler::create_user).put(handler::update_user),
        )
        .route("/api/login", post(handler::login))
        .route(
            "/api/chirps",
            get(handler::list_chirps).post(handler::create_chirp),
        )
        .route("/api/chirps/:chirp_id", get(handler::get_chirp))
        .with_state(state.clone());

    let files = Router::new()
        .nest_service("/app", ServeDir::new(static_root))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.hits),
            count_hits,
        ));

    api.merge(files).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use chirpy_crypto::SessionSecret;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use crate::config::ServerConfig;

    struct TestApp {
        _dir: tempfile::TempDir,
        router: Router,
        state: AppState,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let static_root = dir.path().join("public");
            std::fs::create_dir_all(&static_root).unwrap();
            std::fs::write(static_root.join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();

            let config = ServerConfig {
                database_path: dir.path().join("database.json"),
                static_root: static_root.clone(),
                ..ServerConfig::default()
            };
            let state = AppState::open(&config, SessionSecret::from_bytes(b"test-secret".to_vec())).unwrap();
            let router = build_router(state.clone(), &static_root);
            Self {
                _dir: dir,
                router,
                state,
            }
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }

        async fn json(
            &self,
            method: &str,
            uri: &str,
            body: Value,
            token: Option<&str>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let response = self
                .send(builder.body(Body::from(body.to_string())).unwrap())
                .await;
            read_json(response).await
        }

        async fn get(&self, uri: &str) -> Response {
            self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn signup_and_login(&self, email: &str, password: &str) -> String {
            let (status, _) = self
                .json("POST", "/api/users", json!({"email": email, "password": password}), None)
                .await;
            assert_eq!(status, StatusCode::CREATED);
            let (status, body) = self
                .json("POST", "/api/login", json!({"email": email, "password": password}), None)
                .await;
            assert_eq!(status, StatusCode::OK);
            body["token"].as_str().unwrap().to_string()
        }
    }

    async fn read_body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn read_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = read_body(response).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    // -----------------------------------------------------------------------
    // Health and metrics
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn healthz_endpoint() {
        let app = TestApp::new();
        let response = app.get("/api/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_body(response).await, b"OK");
    }

    #[tokio::test]
    async fn app_hits_are_counted_and_reset() {
        let app = TestApp::new();
        let response = app.get("/app/index.html").await;
        assert_eq!(response.status(), StatusCode::OK);
        app.get("/app/missing.html").await;
        assert_eq!(app.state.hits.get(), 2);

        let page = String::from_utf8(read_body(app.get("/admin/metrics").await).await).unwrap();
        assert!(page.contains("visited 2 times"));

        let response = app
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.state.hits.get(), 0);
    }

    #[tokio::test]
    async fn database_file_is_not_served() {
        let app = TestApp::new();
        app.signup_and_login("a@x.com", "pw").await;

        let response = app.get("/app/database.json").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = String::from_utf8(read_body(response).await).unwrap();
        assert!(!body.contains("hashedPassword"));
    }

    // -----------------------------------------------------------------------
    // Request bodies
    // -----------------------------------------------------------------------

    async fn send_raw(app: &TestApp, uri: &str, content_type: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        app.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    #[tokio::test]
    async fn malformed_json_gets_json_error() {
        let app = TestApp::new();
        let response = send_raw(&app, "/api/users", Some("application/json"), "{not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let (_, body) = read_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn wrongly_typed_or_untyped_bodies_get_json_errors() {
        let app = TestApp::new();
        let cases = [
            ("/api/login", Some("application/json"), r#"{"email": 1, "password": "pw"}"#),
            ("/api/users", Some("application/json"), r#"{"email": "a@x.com"}"#),
            ("/api/login", None, r#"{"email": "a@x.com", "password": "pw"}"#),
        ];
        for (uri, content_type, body) in cases {
            let response = send_raw(&app, uri, content_type, body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
            let (_, json) = read_json(response).await;
            assert!(json["error"].is_string(), "{uri} {body}");
        }
    }

    // -----------------------------------------------------------------------
    // Users and login
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_user_then_duplicate() {
        let app = TestApp::new();
        let creds = json!({"email": "a@x.com", "password": "pw"});

        let (status, body) = app.json("POST", "/api/users", creds.clone(), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"id": 1, "email": "a@x.com"}));

        let (status, body) = app.json("POST", "/api/users", creds, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn login_outcomes() {
        let app = TestApp::new();
        let token = app.signup_and_login("a@x.com", "right").await;
        assert_eq!(app.state.sessions.validate(&token).unwrap().get(), 1);

        let (status, _) = app
            .json("POST", "/api/login", json!({"email": "a@x.com", "password": "wrong"}), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .json("POST", "/api/login", json!({"email": "b@x.com", "password": "right"}), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_user_requires_token_and_changes_credentials() {
        let app = TestApp::new();
        let token = app.signup_and_login("a@x.com", "old").await;
        let update = json!({"email": "new@x.com", "password": "new"});

        let (status, _) = app.json("PUT", "/api/users", update.clone(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .json("PUT", "/api/users", update.clone(), Some("not.a.token"))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app.json("PUT", "/api/users", update, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": 1, "email": "new@x.com"}));

        let (status, _) = app
            .json("POST", "/api/login", json!({"email": "new@x.com", "password": "new"}), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn update_user_cannot_take_another_email() {
        let app = TestApp::new();
        app.signup_and_login("a@x.com", "pw").await;
        let token = app.signup_and_login("b@x.com", "pw").await;

        let (status, _) = app
            .json("PUT", "/api/users", json!({"email": "a@x.com", "password": "pw"}), Some(&token))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    // -----------------------------------------------------------------------
    // Chirps
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_chirp_requires_token() {
        let app = TestApp::new();
        let (status, _) = app
            .json("POST", "/api/chirps", json!({"body": "hello"}), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn chirps_are_cleaned_listed_and_fetched() {
        let app = TestApp::new();
        let token = app.signup_and_login("a@x.com", "pw").await;

        for body in ["c", "a kerfuffle", "b"] {
            let (status, _) = app
                .json("POST", "/api/chirps", json!({"body": body}), Some(&token))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, list) = read_json(app.get("/api/chirps").await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            list,
            json!([
                {"id": 1, "body": "c"},
                {"id": 2, "body": "a ****"},
                {"id": 3, "body": "b"}
            ])
        );

        let (status, one) = read_json(app.get("/api/chirps/2").await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(one, json!({"id": 2, "body": "a ****"}));
    }

    #[tokio::test]
    async fn chirp_validation_and_lookup_errors() {
        let app = TestApp::new();
        let token = app.signup_and_login("a@x.com", "pw").await;

        let (status, _) = app
            .json("POST", "/api/chirps", json!({"body": "x".repeat(141)}), Some(&token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(app.get("/api/chirps/99").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.get("/api/chirps/abc").await.status(), StatusCode::BAD_REQUEST);
    }
}
