//! Liveness probe.

use axum::{http::StatusCode, routing::get, Router};

use super::RouteModule;

pub const PREFIX: &str = "/monitor";

const ALIVE: &str = "/alive";

pub const PUBLIC_ROUTES: &[&str] = &[ALIVE];

pub fn router() -> Router {
    Router::new().route(ALIVE, get(alive))
}

pub fn module() -> RouteModule {
    RouteModule::new(PREFIX, router()).public(PUBLIC_ROUTES)
}

/// GET /monitor/alive - 200 with an empty body while the process serves requests.
pub async fn alive() -> StatusCode {
    StatusCode::OK
}
