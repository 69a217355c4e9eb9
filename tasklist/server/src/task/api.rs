use crate::store::TaskRepository;
use crate::task::{Task, TaskService, TaskServiceError, TaskUpdate};
use crate::web::api::ErrorResponse;
use axum::{
    Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const MISSING_TITLE_MESSAGE: &str = "El título es obligatorio";
const TASK_NOT_FOUND_MESSAGE: &str = "Tarea no encontrada";
const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";
const INVALID_BODY_MESSAGE: &str = "Cuerpo de la petición inválido";

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Shared state of the task routes.
pub struct TaskState {
    pub service: TaskService,
}

impl TaskState {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self {
            service: TaskService::new(repository),
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Title of the new task, required and non-empty
    #[serde(default)]
    title: Option<String>,
}

/// Request body for updating a task. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// New title of the task
    #[serde(default)]
    title: Option<String>,
    /// New completion state of the task
    #[serde(default)]
    completed: Option<bool>,
}

impl From<UpdateTaskRequest> for TaskUpdate {
    fn from(request: UpdateTaskRequest) -> Self {
        Self {
            title: request.title,
            completed: request.completed,
        }
    }
}

/// API response for a successful deletion.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteTaskResponse {
    success: bool,
}

fn error_response(err: TaskServiceError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        TaskServiceError::MissingTitle => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(MISSING_TITLE_MESSAGE.to_string())),
        ),
        TaskServiceError::TaskNotFound(id) => {
            tracing::warn!("Task with ID {} not found", id);
            not_found()
        }
        TaskServiceError::Store(err) => {
            tracing::error!("Task store failure: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(INTERNAL_ERROR_MESSAGE.to_string())),
            )
        }
    }
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(TASK_NOT_FOUND_MESSAGE.to_string())),
    )
}

/// Parses the `:id` path segment. Anything that is not an integer cannot name a task.
fn parse_task_id(raw_id: &str) -> ApiResult<i64> {
    raw_id.trim().parse::<i64>().map_err(|_| {
        tracing::warn!("Task ID '{}' is not a number", raw_id);
        not_found()
    })
}

/// Reads an update body. An empty body carries no fields and leaves the task untouched.
fn parse_update_body(body: &[u8]) -> Result<TaskUpdate, serde_json::Error> {
    if body.trim_ascii().is_empty() {
        return Ok(TaskUpdate::default());
    }
    serde_json::from_slice::<UpdateTaskRequest>(body).map(TaskUpdate::from)
}

/// Handler for GET /api/tasks - Returns every task in store order.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = Vec<Task>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> ApiResult<Json<Vec<Task>>> {
    state
        .service
        .list_tasks()
        .await
        .map(Json)
        .map_err(error_response)
}

/// Handler for POST /api/tasks - Creates a task from a `{title}` body.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Title missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    // A body that cannot be read leaves the title absent.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Unreadable create request body: {}", rejection.body_text());
            CreateTaskRequest::default()
        }
    };

    state
        .service
        .create_task(request.title)
        .await
        .map(|task| (StatusCode::CREATED, Json(task)))
        .map_err(error_response)
}

/// Handler for PUT /api/tasks/{id} - Overwrites the fields present in the body.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(
        ("id" = i64, Path, description = "ID of the task to update")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Malformed body or empty title", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;
    let update = match parse_update_body(&body) {
        Ok(update) => update,
        Err(err) => {
            // An unknown task is reported before a malformed body.
            state.service.get_task(id).await.map_err(error_response)?;
            tracing::warn!("Unreadable update request body: {}", err);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(INVALID_BODY_MESSAGE.to_string())),
            ));
        }
    };

    state
        .service
        .update_task(id, update)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Handler for DELETE /api/tasks/{id} - Removes the task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = i64, Path, description = "ID of the task to delete")
    ),
    responses(
        (status = 200, description = "Task deleted", body = DeleteTaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let id = parse_task_id(&id)?;

    state
        .service
        .delete_task(id)
        .await
        .map(|()| Json(DeleteTaskResponse { success: true }))
        .map_err(error_response)
}

/// Creates and returns the tasks API router.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/api/tasks/{id}",
            put(update_task_handler).delete(delete_task_handler),
        )
        .with_state(state)
}
