use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::JsonFileRepository;
use crate::task::{TaskState, create_task_router};

pub mod api;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let repository = JsonFileRepository::new(&config.db_path);
    repository.init().await?;
    tracing::info!("Task store loaded from {}", repository.path().display());

    let task_state = Arc::new(TaskState::new(Arc::new(repository)));
    let app = create_app(&config, task_state);

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Servidor en marcha en el puerto {}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Assembles the full application: the task API, the API documentation, the
/// health check and the static front-end served from `config.public_dir`.
pub fn create_app(config: &Config, task_state: Arc<TaskState>) -> Router {
    Router::new()
        .merge(create_task_router(task_state))
        .merge(api::create_docs_router())
        .route("/health", get(health_check_handler))
        .route_service("/", ServeFile::new(config.index_file()))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
