use crate::HttpInstanceConfig;

use std::sync::Arc;

use axum::Router as AxumRouter;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use log::error;
use sb_core::{HandlerArgs, Router};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;

/// Build the axum app serving `router`.
///
/// Every request goes through one dispatcher that looks up the exact
/// `(path, method)` binding. No router means every request is a 404.
/// Handlers are synchronous and run on the blocking pool, so they may block.
pub fn build_app(router: Option<Router>, config: &HttpInstanceConfig) -> AxumRouter {
    let router = Arc::new(router.unwrap_or_default());

    let app = AxumRouter::new()
        .fallback(dispatch)
        .with_state(router)
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests.max(1)));

    if config.permissive_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn dispatch(
    State(router): State<Arc<Router>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path();

    let Some(route) = router.find(path, &method).cloned() else {
        return unmatched(&router, path);
    };

    let args = HandlerArgs {
        method: method.clone(),
        path: path.to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
        user_data: None,
    };

    let response = match tokio::task::spawn_blocking(move || route.call(args)).await {
        Ok(response) => response,
        Err(e) => {
            error!("Handler for {method} {path} failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    (
        response.status,
        [(CONTENT_TYPE, HeaderValue::from_static(response.content_type))],
        response.body,
    )
        .into_response()
}

fn unmatched(router: &Router, path: &str) -> Response {
    let allowed = router.methods_for(path);
    if allowed.is_empty() {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    match HeaderValue::from_str(&allow) {
        Ok(allow) => (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, allow)]).into_response(),
        Err(_) => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
