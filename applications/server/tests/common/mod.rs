/// Common test utilities and fixtures
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use dharma_core::{PersistenceGateway, UpdateUser, User};
use dharma_server::{build_state, create_router, AppState, ServerConfig, StorageBackend};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub config: ServerConfig,
    pub temp_dir: TempDir,
}

/// App on a local-blob store inside a temp directory
pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

pub async fn create_test_app_with(configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let temp_dir = TempDir::new().unwrap();

    let mut config = ServerConfig::default();
    config.auth.jwt_secret = "test-secret-key".to_string();
    config.storage.backend = StorageBackend::Local;
    config.storage.local_path = temp_dir.path().join("store.json");
    config.storage.uploads_dir = temp_dir.path().join("uploads");
    config.server.web_dir = temp_dir.path().join("dist");
    configure(&mut config);

    let state = build_state(&config).await.unwrap();
    let router = create_router(state.clone(), &config);

    TestApp {
        router,
        state,
        config,
        temp_dir,
    }
}

impl TestApp {
    pub fn gateway(&self) -> &dyn PersistenceGateway {
        self.state.gateway.as_ref()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: serde_json::Value,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Register a user directly in the store, optionally as admin
    pub async fn create_user(&self, email: &str, password: &str, admin: bool) -> User {
        let user = self.gateway().register(email, password).await.unwrap();
        if !admin {
            return user;
        }
        self.gateway()
            .update_user(
                user.id,
                UpdateUser {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    /// Sign in through the API and return the access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/api/users/authenticate",
                serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["accessToken"].as_str().unwrap().to_string()
    }
}

/// Build a multipart/form-data body with one file field
pub fn multipart_body(field: &str, file_name: &str, contents: &[u8]) -> (String, Vec<u8>) {
    let boundary = "dharma-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/mpeg\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}
