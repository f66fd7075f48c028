use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use test_server::{app, Echo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::USER_AGENT, "api-test")
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_get() {
    let resp = app().oneshot(request("GET", "/echo", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.headers["user-agent"], "api-test");
    assert!(echo.body.is_empty());
}

#[tokio::test]
async fn echo_reflects_body_for_any_method() {
    for method in ["POST", "PUT", "PATCH", "DELETE"] {
        let resp = app()
            .oneshot(request(method, "/echo", r#"{"foo":"bar"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK, "{method}");
        let echo: Echo = body_json(resp).await;
        assert_eq!(echo.method, method);
        assert_eq!(echo.body, r#"{"foo":"bar"}"#);
        assert_eq!(echo.headers["content-type"], "application/json");
    }
}

#[tokio::test]
async fn echo_keeps_first_header_value() {
    let req = Request::builder()
        .uri("/echo")
        .header("x-multi", "first")
        .header("x-multi", "second")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.headers["x-multi"], "first");
}

// --- status ---

#[tokio::test]
async fn status_returns_requested_code() {
    let resp = app().oneshot(request("GET", "/status/404", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, "status 404");
}

#[tokio::test]
async fn status_accepts_post() {
    let resp = app().oneshot(request("POST", "/status/503", "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn status_rejects_out_of_range_code() {
    let resp = app().oneshot(request("GET", "/status/42", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_rejects_non_numeric_code() {
    let resp = app().oneshot(request("GET", "/status/teapot", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delay ---

#[tokio::test]
async fn delay_answers_after_sleeping() {
    let started = std::time::Instant::now();
    let resp = app().oneshot(request("GET", "/delay/50", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(started.elapsed() >= std::time::Duration::from_millis(50));
    assert_eq!(body_bytes(resp).await, "done");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let resp = app().oneshot(request("GET", "/orders", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
