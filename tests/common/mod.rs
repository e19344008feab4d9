//! Shared helpers for HTTP API tests.

#![allow(dead_code)]

use axum::http::header::AUTHORIZATION;
use axum_test::{TestRequest, TestServer};
use mailroom::config::ServerConfig;
use mailroom::mail::{MemoryTransport, Transport};
use mailroom::web::handlers::AppState;
use mailroom::web::middleware::{JwtState, RateLimitState};
use mailroom::web::router::create_router;
use mailroom::Database;
use serde_json::{json, Value};
use std::sync::Arc;

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const PASSWORD: &str = "password123";

/// A router under test with its database and transport.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub transport: Arc<MemoryTransport>,
}

/// Test app with a recording transport and a generous login limit.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(MemoryTransport::new(), 1000).await
}

/// Test app with the given transport and login limit.
pub async fn create_test_app_with(transport: MemoryTransport, login_rate_limit: u32) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let transport = Arc::new(transport);
    let dyn_transport: Arc<dyn Transport> = transport.clone();

    let app_state = Arc::new(AppState::new(db.clone(), dyn_transport, JWT_SECRET, 900));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));
    let rate_limit = Arc::new(RateLimitState::new(login_rate_limit));

    let router = create_router(app_state, jwt_state, rate_limit, &ServerConfig::default());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        transport,
    }
}

/// Register an account and return the response body.
pub async fn register(server: &TestServer, email: &str) -> Value {
    server
        .post("/api/account/register")
        .json(&json!({
            "email": email,
            "password": PASSWORD,
            "first_name": "Test",
            "last_name": "User"
        }))
        .await
        .json::<Value>()
}

/// Log in and return the access token.
pub async fn login(server: &TestServer, email: &str) -> String {
    let body = server
        .post("/api/account/login")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await
        .json::<Value>();
    body["data"]["access_token"]
        .as_str()
        .expect("login should return an access token")
        .to_string()
}

/// Register and log in, returning the access token.
pub async fn register_and_login(server: &TestServer, email: &str) -> String {
    register(server, email).await;
    login(server, email).await
}

/// Add a bearer token to a request.
pub fn authed(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(AUTHORIZATION, format!("Bearer {}", token))
}

/// Send a message and return the response body.
pub async fn send(server: &TestServer, token: &str, to: &str, subject: &str, body: &str) -> Value {
    authed(server.post("/api/messages"), token)
        .json(&json!({ "recipient": to, "subject": subject, "body": body }))
        .await
        .json::<Value>()
}

/// Fetch the mailbox of the token's account.
pub async fn mailbox(server: &TestServer, token: &str) -> Value {
    authed(server.get("/api/mailbox"), token)
        .await
        .json::<Value>()
}

/// IDs of the messages in one folder of a mailbox body.
pub fn folder_ids(mailbox: &Value, folder: &str) -> Vec<i64> {
    mailbox[folder]
        .as_array()
        .map(|messages| {
            messages
                .iter()
                .filter_map(|m| m["id"].as_i64())
                .collect()
        })
        .unwrap_or_default()
}
