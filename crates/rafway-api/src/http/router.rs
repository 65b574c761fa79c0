//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`; `/health` sits outside for probes.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Auth
        .route("/auth/sign-in", post(handlers::auth::sign_in))
        .route("/auth/sign-out", post(handlers::auth::sign_out))
        // Profile
        .route("/profile", get(handlers::profile::get_profile))
        .route("/profile/upgrade", post(handlers::profile::upgrade))
        // Interactive sessions
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route(
            "/sessions/{id}/messages",
            post(handlers::session::submit_message),
        )
        // Server-side exchange
        .route("/chat/exchange", post(handlers::exchange::exchange))
        .route("/chat/exchanges", get(handlers::exchange::list_exchanges))
        // Parent dashboard
        .route("/report", get(handlers::report::get_report));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    struct TestServer {
        base: String,
        client: reqwest::Client,
        _tmp: TempDir,
    }

    impl TestServer {
        async fn start() -> Self {
            let tmp = TempDir::new().unwrap();
            tokio::fs::write(
                tmp.path().join("config.toml"),
                "[generation]\nprovider = \"demo\"\ndemo_latency_ms = 0\n",
            )
            .await
            .unwrap();

            let state = AppState::from_data_dir(tmp.path()).await.unwrap();
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, build_router(state)).await.unwrap();
            });

            Self {
                base: format!("http://{addr}"),
                client: reqwest::Client::new(),
                _tmp: tmp,
            }
        }

        async fn sign_in(&self, email: &str) -> String {
            let body: Value = self
                .client
                .post(format!("{}/api/v1/auth/sign-in", self.base))
                .json(&json!({ "email": email, "display_name": "Léa Martin" }))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            body["data"]["token"].as_str().unwrap().to_string()
        }

        async fn call(&self, method: reqwest::Method, path: &str, token: &str, body: Option<Value>) -> (u16, Value) {
            let mut request = self
                .client
                .request(method, format!("{}/api/v1{path}", self.base))
                .bearer_auth(token);
            if let Some(body) = body {
                request = request.json(&body);
            }
            let response = request.send().await.unwrap();
            let status = response.status().as_u16();
            (status, response.json().await.unwrap())
        }
    }

    #[tokio::test]
    async fn test_health() {
        let server = TestServer::start().await;
        let body: Value = reqwest::get(format!("{}/health", server.base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_requests_without_token_are_rejected() {
        let server = TestServer::start().await;
        let response = server
            .client
            .get(format!("{}/api/v1/profile", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);

        let (status, body) = server.call(reqwest::Method::GET, "/profile", "rafw_bogus", None).await;
        assert_eq!(status, 401);
        assert_eq!(body["errors"][0]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_session_reaches_paywall_after_five_messages() {
        let server = TestServer::start().await;
        let token = server.sign_in("lea@example.com").await;

        let (status, body) = server.call(reqwest::Method::POST, "/sessions", &token, None).await;
        assert_eq!(status, 201);
        assert_eq!(body["data"]["state"], "idle");
        assert!(body["data"]["transcript"][0]["text"].as_str().unwrap().starts_with("Salut Léa !"));
        let id = body["data"]["id"].as_str().unwrap().to_string();
        let path = format!("/sessions/{id}/messages");

        for i in 1..=5 {
            let (_, body) = server
                .call(reqwest::Method::POST, &path, &token, Some(json!({ "text": format!("question {i}") })))
                .await;
            assert_eq!(body["data"]["status"], "replied");
            assert_eq!(body["data"]["session"]["remaining_free_messages"], 5 - i);
        }

        let (_, body) = server
            .call(reqwest::Method::GET, &format!("/sessions/{id}"), &token, None)
            .await;
        assert_eq!(body["data"]["state"], "paywall_blocked");
        // Greeting plus five question/answer pairs
        assert_eq!(body["data"]["transcript"].as_array().unwrap().len(), 11);

        let (_, body) = server
            .call(reqwest::Method::POST, &path, &token, Some(json!({ "text": "encore ?" })))
            .await;
        assert_eq!(body["data"]["status"], "blocked");
        assert!(body["data"]["paywall"].is_string());

        let (_, profile) = server.call(reqwest::Method::GET, "/profile", &token, None).await;
        assert_eq!(profile["data"]["profile"]["message_count"], 5);
        assert_eq!(profile["data"]["can_send"], false);
    }

    #[tokio::test]
    async fn test_upgrade_lifts_paywall_and_unlocks_report() {
        let server = TestServer::start().await;
        let token = server.sign_in("lea@example.com").await;

        let (status, body) = server.call(reqwest::Method::GET, "/report", &token, None).await;
        assert_eq!(status, 403);
        assert_eq!(body["errors"][0]["code"], "PREMIUM_REQUIRED");

        for i in 0..5 {
            server
                .call(reqwest::Method::POST, "/chat/exchange", &token, Some(json!({ "text": format!("q{i}") })))
                .await;
        }
        let (_, body) = server.call(reqwest::Method::POST, "/sessions", &token, None).await;
        assert_eq!(body["data"]["state"], "paywall_blocked");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = server.call(reqwest::Method::POST, "/profile/upgrade", &token, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["profile"]["is_premium"], true);
        assert_eq!(body["data"]["profile"]["message_count"], 5);

        let (_, body) = server
            .call(reqwest::Method::GET, &format!("/sessions/{id}"), &token, None)
            .await;
        assert_eq!(body["data"]["state"], "idle");

        let (status, body) = server.call(reqwest::Method::GET, "/report", &token, None).await;
        assert_eq!(status, 200);
        assert!(!body["data"]["career_paths"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_quota_and_history() {
        let server = TestServer::start().await;
        let token = server.sign_in("tom@example.com").await;

        for i in 0..5 {
            let (status, body) = server
                .call(reqwest::Method::POST, "/chat/exchange", &token, Some(json!({ "text": format!("q{i}") })))
                .await;
            assert_eq!(status, 200);
            assert_eq!(body["data"]["outcome"], "replied");
        }

        let (status, body) = server
            .call(reqwest::Method::POST, "/chat/exchange", &token, Some(json!({ "text": "q5" })))
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["outcome"], "quota_exceeded");

        let (status, _) = server
            .call(reqwest::Method::POST, "/chat/exchange", &token, Some(json!({ "text": "  " })))
            .await;
        assert_eq!(status, 400);

        let (_, body) = server.call(reqwest::Method::GET, "/chat/exchanges?limit=3", &token, None).await;
        let exchanges = body["data"].as_array().unwrap();
        assert_eq!(exchanges.len(), 3);
        assert_eq!(exchanges[0]["text"], "q4");
    }

    #[tokio::test]
    async fn test_sessions_are_private_and_closed_on_sign_out() {
        let server = TestServer::start().await;
        let lea = server.sign_in("lea@example.com").await;
        let tom = server.sign_in("tom@example.com").await;

        let (_, body) = server.call(reqwest::Method::POST, "/sessions", &lea, None).await;
        let path = format!("/sessions/{}", body["data"]["id"].as_str().unwrap());

        let (status, _) = server.call(reqwest::Method::GET, &path, &tom, None).await;
        assert_eq!(status, 404);

        let (_, body) = server.call(reqwest::Method::POST, "/auth/sign-out", &lea, None).await;
        assert_eq!(body["data"]["sessions_closed"], 1);

        let (status, _) = server.call(reqwest::Method::GET, "/profile", &lea, None).await;
        assert_eq!(status, 401);
    }
}
