//! Test context for unified test setup
//!
//! Builds the full router on top of an in-memory store, with one staff account
//! per role and a signed token for each.

use std::sync::Once;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use church_admin::config::Settings;
use church_admin::database::{DatabaseService, MemoryStore};
use church_admin::models::{Role, User};
use church_admin::services::{AuthService, ServiceFactory};
use church_admin::{create_router, AppState};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "Passw0rd!";

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("church_admin=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Settings pointing at the in-memory store
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.database.url = "memory://".to_string();
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings.auth.seed_admin_email = Some("seed@church.test".to_string());
    settings.auth.seed_admin_password = Some(TEST_PASSWORD.to_string());
    settings
}

/// Captured response of a single request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not UTF-8")
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub router: Router,
    pub state: AppState,
    pub store: MemoryStore,
    pub auth: AuthService,
    pub admin: User,
    pub pastor: User,
    pub editor: User,
}

impl TestContext {
    /// Create a new test context with all components initialized
    pub async fn new() -> Self {
        init_test_logging();

        let settings = test_settings();
        let store = MemoryStore::new();
        let database = DatabaseService::from_memory(store.clone());
        let auth = AuthService::new(database.users.clone(), settings.auth.clone()).with_hash_cost(4);
        let services = ServiceFactory::new(&settings, database).with_auth_service(auth.clone());
        let state = AppState::from_services(settings, services);

        let admin = auth
            .create_user("Ada Admin", "admin@church.test", TEST_PASSWORD, Role::Admin)
            .await
            .expect("Failed to create admin");
        let pastor = auth
            .create_user("Paul Pastor", "pastor@church.test", TEST_PASSWORD, Role::Pastor)
            .await
            .expect("Failed to create pastor");
        let editor = auth
            .create_user("Eve Editor", "editor@church.test", TEST_PASSWORD, Role::Editor)
            .await
            .expect("Failed to create editor");

        Self {
            router: create_router(state.clone()),
            state,
            store,
            auth,
            admin,
            pastor,
            editor,
        }
    }

    pub fn token_for(&self, role: Role) -> String {
        let user = match role {
            Role::Admin => &self.admin,
            Role::Pastor => &self.pastor,
            Role::Editor => &self.editor,
        };
        self.auth.issue_token(user).expect("Failed to issue token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(Role::Admin)
    }

    /// Send one request through the router
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    /// Send a prebuilt request, e.g. one with a malformed body
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("Router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();

        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Create a member through the API and return its id
    pub async fn create_member(&self, body: Value) -> i64 {
        let response = self.post("/api/members", &self.admin_token(), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["id"].as_i64().expect("member id")
    }

    /// Create a group through the API and return its id
    pub async fn create_group(&self, name: &str) -> i64 {
        let response = self
            .post("/api/groups", &self.admin_token(), serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["id"].as_i64().expect("group id")
    }
}
