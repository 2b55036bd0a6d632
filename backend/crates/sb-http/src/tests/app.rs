use crate::{HttpInstanceConfig, build_app};

use std::net::SocketAddr;

use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use http::StatusCode;
use sb_core::{HandlerArgs, HandlerResponse, Router};
use tokio::net::TcpListener;

async fn serve(router: Option<Router>, config: HttpInstanceConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(router, &config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn echo_router() -> Router {
    let mut router = Router::new();
    router
        .register_route("/echo", "POST", |args: HandlerArgs| {
            let body = String::from_utf8_lossy(&args.body).into_owned();
            let query = args.query.unwrap_or_default();
            HandlerResponse::text(StatusCode::OK, format!("{query}|{body}"))
        })
        .unwrap();
    router
        .register_route("/echo", "PUT", |_| HandlerResponse::empty(StatusCode::NO_CONTENT))
        .unwrap();
    router
}

#[tokio::test]
async fn given_no_router_when_requested_then_not_found() {
    // Given
    let addr = serve(None, HttpInstanceConfig::default()).await;

    // When
    let response = reqwest::get(format!("http://{addr}/anything")).await.unwrap();

    // Then
    assert_that!(response.status().as_u16(), eq(404));
}

#[tokio::test]
async fn given_bound_route_when_requested_then_handler_sees_query_and_body() {
    // Given
    let addr = serve(Some(echo_router()), HttpInstanceConfig::default()).await;

    // When
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/echo?x=1"))
        .body("payload")
        .send()
        .await
        .unwrap();

    // Then
    assert_that!(response.status().as_u16(), eq(200));
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_that!(content_type, some(eq("text/plain; charset=utf-8")));
    assert_that!(response.text().await.unwrap().as_str(), eq("x=1|payload"));
}

#[tokio::test]
async fn given_known_path_wrong_method_when_requested_then_method_not_allowed_with_allow() {
    // Given
    let addr = serve(Some(echo_router()), HttpInstanceConfig::default()).await;

    // When
    let response = reqwest::get(format!("http://{addr}/echo")).await.unwrap();

    // Then
    assert_that!(response.status().as_u16(), eq(405));
    let allow = response
        .headers()
        .get("allow")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_that!(allow, some(eq("POST, PUT")));
}

#[tokio::test]
async fn given_permissive_cors_when_preflight_then_origin_allowed() {
    // Given
    let config = HttpInstanceConfig {
        permissive_cors: true,
        ..HttpInstanceConfig::default()
    };
    let addr = serve(Some(echo_router()), config).await;

    // When
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/echo"))
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    // Then
    assert_that!(
        response.headers().get("access-control-allow-origin").is_some(),
        eq(true)
    );
}

#[tokio::test]
async fn given_default_cors_when_request_with_origin_then_no_cors_headers() {
    // Given
    let addr = serve(Some(echo_router()), HttpInstanceConfig::default()).await;

    // When
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/echo"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();

    // Then
    assert_that!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.as_bytes().to_vec()),
        none()
    );
}
