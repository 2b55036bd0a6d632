use sb_core::{HandlerArgs, HandlerResponse, Result as CoreResult, Router};

use http::StatusCode;
use serde_json::json;

/// Who a health router answers for
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub name: String,
    pub uuid: String,
}

/// Built-in routes attached to every server
pub fn health_router(name: &str, uuid: &str) -> CoreResult<Router> {
    let identity = ServerIdentity {
        name: name.to_string(),
        uuid: uuid.to_string(),
    };

    let mut router = Router::new();
    router.register_route_with_data("/health", "GET", health_check, identity)?;
    router.register_route("/live", "GET", liveness_check)?;
    router.register_route("/ready", "GET", readiness_check)?;
    Ok(router)
}

/// GET /health - identity of the answering server
pub fn health_check(args: HandlerArgs) -> HandlerResponse {
    let (name, uuid) = args
        .user_data::<ServerIdentity>()
        .map(|identity| (identity.name.as_str(), identity.uuid.as_str()))
        .unwrap_or(("unknown", "unknown"));

    let health = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "server": name,
        "uuid": uuid,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    HandlerResponse::json(StatusCode::OK, health.to_string())
}

/// GET /live - the process is up
pub fn liveness_check(_args: HandlerArgs) -> HandlerResponse {
    HandlerResponse::text(StatusCode::OK, "OK")
}

/// GET /ready - a server that answers has finished bring-up
pub fn readiness_check(_args: HandlerArgs) -> HandlerResponse {
    HandlerResponse::text(StatusCode::OK, "Ready")
}
