//! HTTP surface tests against the real router, no sockets involved.

use std::sync::Arc;

use abacus::{server, Coordinator, CoordinatorConfig};
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    server::router(Arc::new(Coordinator::new(CoordinatorConfig::default())))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn calculate_returns_an_id() {
    let app = app();
    let response = app
        .oneshot(post_json("/api/v1/calculate", r#"{"expression":"2+2"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"id": "1"}));
}

#[tokio::test]
async fn calculate_rejects_bad_bodies() {
    for body in ["", "not json", r#"{"expression":""}"#, r#"{"other":1}"#] {
        let response = app()
            .oneshot(post_json("/api/v1/calculate", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
    }
}

#[tokio::test]
async fn calculate_rejects_unparsable_expressions() {
    let response = app()
        .oneshot(post_json("/api/v1/calculate", r#"{"expression":"2+*2"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("invalid number"));
}

#[tokio::test]
async fn expressions_listing_and_lookup() {
    let app = app();
    app.clone()
        .oneshot(post_json("/api/v1/calculate", r#"{"expression":"1+1"}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/api/v1/expressions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"expressions": [{"id": "1", "expression": "1+1", "status": "pending"}]})
    );

    let response = app.clone().oneshot(get("/api/v1/expressions/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/v1/expressions/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_queue_yields_not_found() {
    let response = app().oneshot(get("/internal/task")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_for_unknown_task_yields_not_found() {
    let response = app()
        .oneshot(post_json("/internal/task", r#"{"id":"7","result":4.0}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_rejects_bad_bodies() {
    for body in ["", "not json", r#"{"id":"","result":1.0}"#, r#"{"result":1.0}"#] {
        let response = app()
            .oneshot(post_json("/internal/task", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
    }
}

#[tokio::test]
async fn unknown_paths_yield_json_not_found() {
    let response = app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn full_reduction_over_http() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/calculate", r#"{"expression":"2+2*2"}"#))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    // First task: the multiplication.
    let response = app.clone().oneshot(get("/internal/task")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await["task"].clone();
    assert_eq!(task["operation"], "*");
    assert_eq!(task["arg1"], 2.0);
    assert_eq!(task["arg2"], 2.0);
    assert_eq!(task["operation_time"], 100);

    let report = json!({"id": task["id"], "result": 4.0}).to_string();
    let response = app
        .clone()
        .oneshot(post_json("/internal/task", &report))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "accepted"}));

    // Second task: the addition over the settled value.
    let response = app.clone().oneshot(get("/internal/task")).await.unwrap();
    let task = body_json(response).await["task"].clone();
    assert_eq!(task["operation"], "+");
    assert_eq!(task["arg1"], 2.0);
    assert_eq!(task["arg2"], 4.0);

    let report = json!({"id": task["id"], "result": 6.0}).to_string();
    app.clone()
        .oneshot(post_json("/internal/task", &report))
        .await
        .unwrap();

    let response = app
        .oneshot(get(&format!("/api/v1/expressions/{id}")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["expression"]["status"], "completed");
    assert_eq!(body["expression"]["result"], 6.0);
}

#[tokio::test]
async fn cors_headers_are_present() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/expressions")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}
