//! HTTP surface for the student registry.
//!
//! The router exposes CRUD endpoints over the in-memory [`StudentStore`] plus a summary
//! endpoint backed by a [`SummaryClient`]:
//!
//! - `GET /` – Machine-readable endpoint catalog.
//! - `GET /students` – List every student.
//! - `POST /students` – Validate and create a student; responds `201` with the stored record.
//! - `GET /students/{id}` – Fetch one student.
//! - `PUT /students/{id}` – Validate and fully replace a student.
//! - `DELETE /students/{id}` – Remove a student; responds `{"result":"success"}`.
//! - `GET /students/{id}/summary` – Generate a short summary via the text generation service.
//!
//! Success bodies are the raw payload. Every failure is rendered as `{"error": "<message>"}`
//! by [`ApiError`].

use crate::logging::log_requests;
use crate::students::{
    NewStudent, StoreError, Student, StudentId, StudentStore, ValidationError, validate_student,
};
use crate::summarization::{SummaryClient, SummaryError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Shared state handed to every handler.
pub struct AppState<C> {
    /// Record store shared by all requests.
    pub store: Arc<StudentStore>,
    /// Generator used by the summary endpoint.
    pub summarizer: Arc<C>,
}

/// Build the HTTP router with request logging applied to every route.
pub fn create_router<C>(store: Arc<StudentStore>, summarizer: Arc<C>) -> Router
where
    C: SummaryClient + 'static,
{
    let state = Arc::new(AppState { store, summarizer });
    Router::new()
        .route("/", get(get_index))
        .route(
            "/students",
            get(list_students::<C>)
                .post(create_student::<C>)
                .fallback(method_not_allowed),
        )
        .route(
            "/students/:id",
            get(get_student::<C>)
                .put(update_student::<C>)
                .delete(delete_student::<C>)
                .fallback(method_not_allowed),
        )
        .route(
            "/students/:id/summary",
            get(get_student_summary::<C>).fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
}

/// Failures a handler can report, each mapped to a status code and JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Path identifier was not a non-negative integer.
    #[error("Invalid student ID")]
    InvalidId,
    /// Request body was missing, not JSON, or had a field of the wrong type.
    #[error("Invalid request payload")]
    InvalidPayload,
    /// Body decoded but failed a required-field check.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No student exists under the requested identifier.
    #[error("Student not found")]
    StudentNotFound(#[from] StoreError),
    /// The text generation service could not produce a summary.
    #[error("Failed to generate summary: {0}")]
    Summary(#[from] SummaryError),
    /// No route matched the request path.
    #[error("Not found")]
    RouteNotFound,
    /// The path exists but does not accept the request method.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidPayload | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::StudentNotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Summary(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::InvalidId
    }
}

/// Ids are plain decimal digits; signs, whitespace, and overflow are rejected.
fn parse_id(path: Result<Path<String>, PathRejection>) -> Result<StudentId, ApiError> {
    let Path(raw) = path?;
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ApiError::InvalidId);
    }
    raw.parse().map_err(|_| ApiError::InvalidId)
}

/// Decode the body as JSON whatever `Content-Type` the client sent, then validate it.
fn parse_body(body: &Bytes) -> Result<NewStudent, ApiError> {
    let student: NewStudent = serde_json::from_slice(body).map_err(|error| {
        tracing::debug!(%error, "Rejected request body");
        ApiError::InvalidPayload
    })?;
    validate_student(&student)?;
    Ok(student)
}

async fn list_students<C>(State(state): State<Arc<AppState<C>>>) -> Json<Vec<Student>>
where
    C: SummaryClient,
{
    Json(state.store.list())
}

async fn get_student<C>(
    State(state): State<Arc<AppState<C>>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Student>, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(path)?;
    Ok(Json(state.store.get(id)?))
}

async fn create_student<C>(
    State(state): State<Arc<AppState<C>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Student>), ApiError>
where
    C: SummaryClient,
{
    let student = parse_body(&body)?;
    let created = state.store.create(student);
    tracing::info!(id = created.id, "Student created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_student<C>(
    State(state): State<Arc<AppState<C>>>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Student>, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(path)?;
    let student = parse_body(&body)?;
    let updated = state.store.update(id, student)?;
    tracing::info!(id, "Student updated");
    Ok(Json(updated))
}

async fn delete_student<C>(
    State(state): State<Arc<AppState<C>>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(path)?;
    state.store.delete(id)?;
    tracing::info!(id, "Student deleted");
    Ok(Json(json!({ "result": "success" })))
}

/// Look the student up first so an unknown id never reaches the generation service. The
/// record is a clone, so no store lock is held while the upstream call runs.
async fn get_student_summary<C>(
    State(state): State<Arc<AppState<C>>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(path)?;
    let student = state.store.get(id)?;
    let summary = state.summarizer.generate_summary(&student).await?;
    tracing::info!(id, chars = summary.len(), "Summary generated");
    Ok(Json(json!({ "summary": summary })))
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Descriptor for a single endpoint in the index catalog.
#[derive(Serialize)]
struct EndpointDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /`.
#[derive(Serialize)]
struct IndexResponse {
    service: &'static str,
    version: &'static str,
    endpoints: Vec<EndpointDescriptor>,
}

async fn get_index() -> Json<IndexResponse> {
    let student_example = || Some(json!({ "name": "Ann", "age": 30, "email": "a@x.com" }));
    Json(IndexResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            EndpointDescriptor {
                name: "list_students",
                method: "GET",
                path: "/students",
                description: "Return every stored student.",
                request_example: None,
            },
            EndpointDescriptor {
                name: "create_student",
                method: "POST",
                path: "/students",
                description: "Create a student. Name, a positive age, and email are required.",
                request_example: student_example(),
            },
            EndpointDescriptor {
                name: "get_student",
                method: "GET",
                path: "/students/{id}",
                description: "Return one student by numeric id.",
                request_example: None,
            },
            EndpointDescriptor {
                name: "update_student",
                method: "PUT",
                path: "/students/{id}",
                description: "Replace every field of an existing student.",
                request_example: student_example(),
            },
            EndpointDescriptor {
                name: "delete_student",
                method: "DELETE",
                path: "/students/{id}",
                description: "Remove a student. Identifiers are never reused.",
                request_example: None,
            },
            EndpointDescriptor {
                name: "student_summary",
                method: "GET",
                path: "/students/{id}/summary",
                description: "Generate a short professional summary with the configured model.",
                request_example: None,
            },
        ],
    })
}
