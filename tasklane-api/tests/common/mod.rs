//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh `MemoryStore`, so no database
//! or Redis is needed. Outgoing email is captured by an in-process queue.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tasklane_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasklane_shared::{
    notify::{
        mail::{MailTransport, OutgoingMail},
        queue::{MessageQueue, QueuedEmail},
        templates::TemplateRenderer,
        NotifyError, Notifier,
    },
    store::memory::MemoryStore,
};
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";

/// Captures queued emails
#[derive(Default)]
pub struct Outbox {
    messages: Mutex<Vec<QueuedEmail>>,
}

impl Outbox {
    pub async fn messages(&self) -> Vec<QueuedEmail> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl MessageQueue for Outbox {
    async fn push(&self, body: String) -> Result<(), NotifyError> {
        let email: QueuedEmail =
            serde_json::from_str(&body).map_err(|e| NotifyError::Queue(e.to_string()))?;
        self.messages.lock().await.push(email);
        Ok(())
    }
}

/// SMTP stand-in that always fails
pub struct UnreachableSmtp;

#[async_trait]
impl MailTransport for UnreachableSmtp {
    async fn send(&self, _mail: &OutgoingMail) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

/// Queue whose backend is down
pub struct BrokenQueue;

#[async_trait]
impl MessageQueue for BrokenQueue {
    async fn push(&self, _body: String) -> Result<(), NotifyError> {
        Err(NotifyError::Queue("connection reset by peer".to_string()))
    }
}

/// A registered user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Test context: router, store handle and captured mail
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<Outbox>,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "memory://"),
        ("SECRET_KEY", "test-secret-key-that-is-long-enough-1234"),
        ("PUBLIC_URL", "https://tasklane.test"),
        ("NOTIFY_MODE", "direct"),
    ]);

    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

impl TestContext {
    /// Context whose emails land in `outbox`
    pub fn new() -> Self {
        let outbox = Arc::new(Outbox::default());
        let notifier = Notifier::queued(TemplateRenderer::new().unwrap(), outbox.clone());
        Self::with_notifier(notifier, outbox)
    }

    /// Context whose SMTP server is down
    pub fn with_failing_mail() -> Self {
        let notifier = Notifier::direct(TemplateRenderer::new().unwrap(), Arc::new(UnreachableSmtp));
        Self::with_notifier(notifier, Arc::new(Outbox::default()))
    }

    /// Context whose queue rejects every push
    pub fn with_failing_queue() -> Self {
        let notifier = Notifier::queued(TemplateRenderer::new().unwrap(), Arc::new(BrokenQueue));
        Self::with_notifier(notifier, Arc::new(Outbox::default()))
    }

    fn with_notifier(notifier: Notifier, outbox: Arc<Outbox>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), test_config(), notifier);

        Self {
            app: build_router(state),
            store,
            outbox,
        }
    }

    /// Sends a request and returns status and JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), body).await
    }

    /// Registers a user named `name` with email `<name>@example.com`
    pub async fn register(&self, name: &str) -> TestUser {
        let email = format!("{}@example.com", name.to_lowercase());

        let (status, body) = self
            .request(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(json!({"name": name, "email": email, "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);

        TestUser {
            id: body["user"]["id"].as_i64().unwrap(),
            email,
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a project as `owner` and returns its id
    pub async fn create_project(&self, owner: &TestUser, name: &str) -> i64 {
        let (status, body) = self
            .post("/v1/projects", &owner.token, json!({"name": name}))
            .await;
        assert_eq!(status, StatusCode::OK, "create project failed: {}", body);

        body["id"].as_i64().unwrap()
    }

    /// Makes `user` a collaborator of `project_id`
    pub async fn add_collaborator(&self, project_id: i64, user: &TestUser) {
        use tasklane_shared::store::Store;

        self.store
            .add_collaborator(project_id, user.id)
            .await
            .unwrap();
    }
}
