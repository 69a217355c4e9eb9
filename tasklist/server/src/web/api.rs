use crate::task::Task;
use crate::task::api::{CreateTaskRequest, DeleteTaskResponse, UpdateTaskRequest};
use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// JSON body returned by every failing API call.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable description of the failure
    error: String,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::list_tasks_handler,
        crate::task::api::create_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
    ),
    components(schemas(
        Task,
        CreateTaskRequest,
        UpdateTaskRequest,
        DeleteTaskResponse,
        ErrorResponse
    )),
    tags((name = "Tasks", description = "Task list management"))
)]
pub struct ApiDoc;

/// Handler for GET /api-docs/openapi.json - Returns the OpenAPI description of the API.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the router serving the API documentation.
pub fn create_docs_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_handler))
}
