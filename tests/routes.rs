//! Route behaviour and the log lines each route produces.

use axum::http::{header, Request, StatusCode};
use axum::body::Body;
use axum::routing::get as get_route;
use axum::Router;
use log_correlation_demo::http::server::{apply_middleware, routes};
use log_correlation_demo::http::{HttpServer, GREETING, INTERNAL_SERVER_ERROR_BODY};

mod common;
use common::{capture, config, get, send};

#[tokio::test]
async fn root_returns_greeting_and_logs_once() {
    let config = config(false);
    let (logging, logs, _guard) = capture(&config);
    let router = HttpServer::new(config, &logging).router();

    let (response, body) = send(router, get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, GREETING);

    let info = logs.app_lines("INFO");
    assert_eq!(info.len(), 1, "{:?}", logs.lines());
    assert!(info[0].ends_with("trace_id=0 span_id=0 Request received at '/'"), "{}", info[0]);
}

#[tokio::test]
async fn healthz_returns_ok_json_and_is_silent() {
    let config = config(true);
    let (logging, logs, _guard) = capture(&config);
    let router = HttpServer::new(config, &logging).router();

    let (response, body) = send(router, get("/healthz")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "ok" }));
    assert!(logs.lines().is_empty(), "{:?}", logs.lines());
}

#[tokio::test]
async fn error_route_returns_plain_500_and_logs_the_fault() {
    let config = config(false);
    let (logging, logs, _guard) = capture(&config);
    let router = HttpServer::new(config, &logging).router();

    let (response, body) = send(router, get("/error")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, INTERNAL_SERVER_ERROR_BODY);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let errors = logs.app_lines("ERROR");
    assert!(
        errors.iter().any(|line| line.contains("Demo error!")),
        "{:?}",
        logs.lines()
    );
    assert!(errors
        .iter()
        .any(|line| line.contains("Global handler caught an exception")));
    assert!(errors
        .iter()
        .any(|line| line.contains(r#"kind="RuntimeError" reason=Demo error! stack=at src/http/handlers.rs:"#)));

    let all_errors = logs
        .lines()
        .into_iter()
        .filter(|line| line.contains(" ERROR "))
        .count();
    assert_eq!(all_errors, 3, "{:?}", logs.lines());
}

#[tokio::test]
async fn datadog_headers_are_interpolated() {
    let config = config(true);
    let (logging, logs, _guard) = capture(&config);
    let router = HttpServer::new(config, &logging).router();

    let request = Request::builder()
        .uri("/error")
        .header("x-datadog-trace-id", "123")
        .header("x-datadog-parent-id", "456")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(router, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let errors = logs.app_lines("ERROR");
    assert!(!errors.is_empty());
    for line in errors {
        assert!(line.contains(" trace_id=123 span_id=456 "), "{line}");
    }
}

#[tokio::test]
async fn traceparent_is_interpolated() {
    let config = config(true);
    let (logging, logs, _guard) = capture(&config);
    let router = HttpServer::new(config, &logging).router();

    let request = Request::builder()
        .uri("/")
        .header(
            "traceparent",
            "00-0af7651916cd43dd00000000000000ff-00000000000000aa-01",
        )
        .body(Body::empty())
        .unwrap();
    send(router, request).await;

    let info = logs.app_lines("INFO");
    assert!(info[0].contains(" trace_id=255 span_id=170 "), "{}", info[0]);
}

#[tokio::test]
async fn headers_ignored_when_correlation_disabled() {
    let config = config(false);
    let (logging, logs, _guard) = capture(&config);
    let router = HttpServer::new(config, &logging).router();

    let request = Request::builder()
        .uri("/")
        .header("x-datadog-trace-id", "123")
        .body(Body::empty())
        .unwrap();
    send(router, request).await;

    assert!(logs.app_lines("INFO")[0].contains(" trace_id=0 span_id=0 "));
}

#[tokio::test]
async fn panics_hit_the_same_fault_boundary() {
    let config = config(true);
    let (logging, logs, _guard) = capture(&config);
    let router = apply_middleware(
        Router::new().route("/panic", get_route(explode)),
        &config,
        &logging,
    );

    let request = Request::builder()
        .uri("/panic")
        .header("x-datadog-trace-id", "9")
        .header("x-datadog-parent-id", "10")
        .body(Body::empty())
        .unwrap();
    let (response, body) = send(router, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, INTERNAL_SERVER_ERROR_BODY);

    let errors = logs.app_lines("ERROR");
    assert_eq!(errors.len(), 1, "{:?}", logs.lines());
    assert!(errors[0].contains("trace_id=9 span_id=10 Global handler caught an exception"));
    assert!(errors[0].contains("kaboom"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let config = config(false);
    let (logging, _logs, _guard) = capture(&config);

    let (response, _) = send(routes_with(&config, &logging), get("/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let config = config(false);
    let (logging, _logs, _guard) = capture(&config);
    let router = HttpServer::new(config, &logging).router();

    let (response, _) = send(router.clone(), get("/healthz")).await;
    assert!(response.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/healthz")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(router, request).await;
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

async fn explode() -> &'static str {
    panic!("kaboom")
}

fn routes_with(
    config: &log_correlation_demo::ServiceConfig,
    logging: &log_correlation_demo::LoggingContext,
) -> Router {
    apply_middleware(routes(), config, logging)
}
