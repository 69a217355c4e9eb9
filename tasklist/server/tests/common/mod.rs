use assert_fs::TempDir;
use assert_fs::prelude::*;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tasklist_server::config::Config;
use tasklist_server::store::JsonFileRepository;
use tasklist_server::task::TaskState;
use tasklist_server::web::create_app;
use tower::ServiceExt;

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><h1>Lista de tareas</h1></body></html>";

/// Test context for endpoint tests.
pub struct TestContext {
    #[allow(dead_code)] // dir is kept so the files are not removed mid-test
    pub dir: TempDir,
    #[allow(dead_code)]
    pub db_file: PathBuf,
    pub app: Router,
}

/// Builds the application over a fresh temporary task document and public directory.
pub async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let dir = TempDir::new()?;
    dir.child("public").create_dir_all()?;
    dir.child("public/index.html").write_str(INDEX_HTML)?;
    dir.child("public/app.css").write_str("body { margin: 0; }")?;

    let config = Config {
        port: 0,
        db_path: dir.child("db.json").path().to_path_buf(),
        public_dir: dir.child("public").path().to_path_buf(),
    };
    let repository = JsonFileRepository::new(&config.db_path);
    repository.init().await?;
    let state = Arc::new(TaskState::new(Arc::new(repository)));
    let app = create_app(&config, state);

    Ok(TestContext {
        db_file: config.db_path.clone(),
        dir,
        app,
    })
}

/// Sends a request through the router and returns status, headers and body text.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    json_body: Option<&str>,
) -> (StatusCode, HeaderMap, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match json_body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_text = String::from_utf8(body.to_vec()).unwrap();
    (status, headers, body_text)
}

/// HTTP response snapshot for JSON endpoints.
#[derive(Debug, Serialize)]
pub struct HttpResponseSnapshot {
    test_context: String,
    status: u16,
    headers: BTreeMap<String, String>,
    body: serde_json::Value,
}

impl HttpResponseSnapshot {
    /// Create a new HTTP response snapshot.
    #[allow(dead_code)]
    pub fn new(
        body_text: &str,
        status: StatusCode,
        headers: &HeaderMap,
        test_context: &str,
    ) -> Self {
        Self {
            test_context: test_context.to_string(),
            status: status.as_u16(),
            headers: filter_variable_headers(headers),
            body: serde_json::from_str(body_text).unwrap(),
        }
    }
}

/// Filter out variable headers from response headers for snapshot testing.
#[allow(dead_code)]
fn filter_variable_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let variable_headers = ["date", "content-length", "last-modified", "etag"];

    headers
        .iter()
        .filter_map(|(name, value)| {
            let name_str = name.as_str().to_lowercase();
            if variable_headers.contains(&name_str.as_str()) {
                None
            } else {
                value.to_str().ok().map(|v| (name_str, v.to_string()))
            }
        })
        .collect()
}
