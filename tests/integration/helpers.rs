//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mediahub_api::{AppState, build_app};
use mediahub_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, RemoteConfig, RemoteTransport,
    ServerConfig,
};
use mediahub_core::types::{OwnerId, ServerId};
use mediahub_database::MemoryFolderCatalog;
use mediahub_remote::{LocalFolderExecutor, RetryPolicy};

const TEST_SECRET: &str = "integration-test-secret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Catalog for direct inspection
    pub catalog: Arc<MemoryFolderCatalog>,
    /// Server new folders land on
    pub server_id: ServerId,
    /// Content root backing the local executor
    content_root: TempDir,
}

/// Parsed response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// A signed-in owner
pub struct TestOwner {
    pub id: OwnerId,
    pub login: String,
    pub token: String,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let content_root = TempDir::new().expect("Failed to create content root");
        let server_id = ServerId::new();
        let config = test_config(content_root.path(), server_id);

        let catalog = Arc::new(MemoryFolderCatalog::new());
        let executor = Arc::new(LocalFolderExecutor::with_root(
            content_root.path().to_string_lossy().into_owned(),
            Duration::from_secs(10),
            RetryPolicy::none(),
        ));

        let state = AppState::new(config, catalog.clone(), executor, Some(server_id));

        Self {
            router: build_app(state),
            catalog,
            server_id,
            content_root,
        }
    }

    /// Issue a token for a fresh owner whose login is `login`.
    pub fn owner(&self, login: &str) -> TestOwner {
        let id = OwnerId::new();
        let now = chrono::Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": id,
            "email": format!("{login}@example.com"),
            "iat": now,
            "exp": now + 3600,
        });
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("Failed to sign token");

        TestOwner {
            id,
            login: login.to_string(),
            token,
        }
    }

    /// Local path of `<root>/<login>/<name>`.
    pub fn folder_path(&self, login: &str, name: &str) -> PathBuf {
        self.content_root.path().join(login).join(name)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Create a folder and return its id.
    pub async fn create_folder(&self, owner: &TestOwner, name: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/folders",
                Some(serde_json::json!({ "name": name })),
                Some(&owner.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"]
            .as_str()
            .expect("Folder id missing")
            .to_string()
    }
}

fn test_config(content_root: &Path, server_id: ServerId) -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused@localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
            run_migrations: false,
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            leeway_seconds: 0,
        },
        remote: RemoteConfig {
            transport: RemoteTransport::Local,
            content_root: content_root.to_string_lossy().into_owned(),
            default_server: Some(server_id),
            ..RemoteConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}
