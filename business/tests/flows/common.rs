//! Shared helpers for driving business commands against a mock server.

use roster_business::{
    BusinessConfig, Credentials, LoginInput, Notification, Notifications, Session,
    build_state_ctx,
};
use roster_states::StateCtx;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// A mock server plus a context pointed at it.
pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let ctx = build_state_ctx(BusinessConfig::new(mock_server.uri()));
        Self { mock_server, ctx }
    }

    /// Seed the session with `token`, as a restored login would.
    pub fn set_authenticated(&mut self, token: &str) {
        self.ctx.add_state(Session::restore(token));
    }

    pub fn stage_login(&mut self, email: &str, password: &str) {
        self.ctx.add_state(LoginInput(Credentials::new(email, password)));
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.ctx.state_mut::<Notifications>().drain()
    }

    /// Number of requests the mock server has seen.
    pub async fn request_count(&self) -> usize {
        self.mock_server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    /// Authorization header of every received request, in order.
    pub async fn authorization_headers(&self) -> Vec<Option<String>> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                request
                    .headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
            })
            .collect()
    }

    // =========================================================================
    // Mock endpoint helpers
    // =========================================================================

    pub async fn mock_login(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_register(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_profile(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/auth/profile"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_get(&self, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_ack(&self, verb: &str, route: &str, status: u16) {
        let body = if status < 300 {
            json!({ "ok": true })
        } else {
            json!({ "error": "nope" })
        };
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }
}

pub fn sample_profile() -> Value {
    json!({ "_id": "u1", "email": "al@example.com", "name": "Al", "role": "admin" })
}

pub fn sample_users() -> Value {
    json!([
        { "_id": "1", "name": "Cy", "email": "cy@example.com", "role": "user", "active": true, "tech": ["Rust"] },
        { "_id": "2", "name": "Al", "email": "al@example.com", "role": "admin", "active": true, "tech": ["Go"] },
        { "_id": "3", "name": "Bo", "email": "bo@example.com", "role": "user", "active": true }
    ])
}
