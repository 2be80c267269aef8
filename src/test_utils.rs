use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use crate::{app::build_app, state::AppState};

pub(crate) const TEST_PASSWORD: &str = "hunter22";

/// Full router over the in-memory store.
pub(crate) fn test_server() -> TestServer {
    TestServer::new(build_app(AppState::fake())).expect("Could not create test server.")
}

/// Registers `email` and returns its access token.
pub(crate) async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["accessToken"]
        .as_str()
        .expect("access token in response")
        .to_owned()
}

/// Lists the caller's categories of `kind` (all when empty), seeding
/// defaults on first use.
pub(crate) async fn categories(server: &TestServer, token: &str, kind: &str) -> Vec<Value> {
    let mut request = server.get("/api/v1/categories").authorization_bearer(token);
    if !kind.is_empty() {
        request = request.add_query_param("type", kind);
    }
    let response = request.await;
    response.assert_status_ok();
    response.json::<Vec<Value>>()
}

/// ID of the first seeded category of `kind`.
pub(crate) async fn first_category_id(server: &TestServer, token: &str, kind: &str) -> i64 {
    categories(server, token, kind).await[0]["id"]
        .as_i64()
        .expect("category id")
}

/// Creates a transaction and returns its ID.
pub(crate) async fn create_transaction(server: &TestServer, token: &str, body: Value) -> i64 {
    let response = server
        .post("/api/v1/transactions")
        .authorization_bearer(token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().expect("transaction id")
}
