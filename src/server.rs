//! HTTP transport over the coordinator.
//!
//! One route per coordinator operation, JSON bodies both ways, permissive
//! CORS for the browser frontend. All engine state lives behind the
//! injected [`Coordinator`]; handlers only translate outcomes into HTTP
//! statuses.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::CoordinatorConfig;
use crate::coord::{Coordinator, ExpressionView, Task};
use crate::error::CoordError;

#[derive(Deserialize)]
struct CalculateRequest {
    expression: String,
}

#[derive(Serialize)]
struct CalculateResponse {
    id: String,
}

#[derive(Serialize)]
struct ExpressionsResponse {
    expressions: Vec<ExpressionView>,
}

#[derive(Serialize)]
struct ExpressionResponse {
    expression: ExpressionView,
}

#[derive(Serialize)]
struct TaskResponse {
    task: Task,
}

#[derive(Deserialize)]
struct ReportRequest {
    id: String,
    result: f64,
}

#[derive(Serialize)]
struct AcceptedResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Build the application router around an injected coordinator.
pub fn router(coordinator: Arc<Coordinator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/calculate", post(calculate))
        .route("/api/v1/expressions", get(list_expressions))
        .route("/api/v1/expressions/{id}", get(get_expression))
        .route("/internal/task", get(fetch_task).post(report_result))
        .fallback(not_found)
        .layer(cors)
        .with_state(coordinator)
}

/// Run the coordinator server until the process exits.
pub async fn serve(config: CoordinatorConfig) -> Result<()> {
    let port = config.port;
    let coordinator = Arc::new(Coordinator::new(config));
    let app = router(coordinator.clone());

    tokio::spawn(monitor_queue(coordinator));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("coordinator listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodic visibility into queue backlog.
async fn monitor_queue(coordinator: Arc<Coordinator>) {
    let mut tick = tokio::time::interval(Duration::from_secs(2));
    loop {
        tick.tick().await;
        let depth = coordinator.queue_depth();
        if depth > 0 {
            info!(pending = depth, "tasks awaiting assignment");
        }
    }
}

async fn calculate(
    State(coordinator): State<Arc<Coordinator>>,
    body: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid Request");
    };
    if req.expression.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid Request");
    }

    match coordinator.submit(&req.expression) {
        Ok(id) => (StatusCode::OK, Json(CalculateResponse { id })).into_response(),
        Err(err) => error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
    }
}

async fn list_expressions(State(coordinator): State<Arc<Coordinator>>) -> Response {
    Json(ExpressionsResponse {
        expressions: coordinator.list_expressions(),
    })
    .into_response()
}

async fn get_expression(
    State(coordinator): State<Arc<Coordinator>>,
    Path(id): Path<String>,
) -> Response {
    match coordinator.get_expression(&id) {
        Ok(expression) => Json(ExpressionResponse { expression }).into_response(),
        Err(err) => error_response(StatusCode::NOT_FOUND, err.to_string()),
    }
}

async fn fetch_task(State(coordinator): State<Arc<Coordinator>>) -> Response {
    match coordinator.fetch_task() {
        Ok(task) => Json(TaskResponse { task }).into_response(),
        Err(err) => error_response(StatusCode::NOT_FOUND, err.to_string()),
    }
}

async fn report_result(
    State(coordinator): State<Arc<Coordinator>>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid Request");
    };
    if req.id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid Request");
    }

    match coordinator.report_result(&req.id, req.result) {
        Ok(()) => Json(AcceptedResponse { status: "accepted" }).into_response(),
        Err(err @ CoordError::TaskNotFound { .. }) => {
            error_response(StatusCode::NOT_FOUND, err.to_string())
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}
