use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use tollgate_auth::{ContextResolver, RequestHead};
use tollgate_core::{EnvironmentArgs, GateError, RequestId, RouteRegistry, StorageProvider};

use crate::app::errors::ApiError;
use crate::middleware::ResponseSeal;

/// Everything the gate needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct GateState {
    pub args: Arc<EnvironmentArgs>,
    pub registry: Arc<RouteRegistry>,
    pub resolver: Arc<dyn ContextResolver>,
    pub storage: Arc<dyn StorageProvider>,
}

/// The single authorization checkpoint. Runs for every request, routed or not.
///
/// On success the derived `RequestContext` is inserted into the request
/// extensions; on failure the translated error is the response and no router runs.
pub async fn context_gate(
    State(state): State<GateState>,
    mut req: axum::http::Request<Body>,
    next: Next,
) -> Response {
    if req.extensions().get::<ResponseSeal>().is_none() {
        tracing::error!("context gate reached without the response encryption stage");
        return ApiError(GateError::unclassified("response encryption stage not installed"))
            .into_response();
    }

    let head = request_head(&req);
    let derived = state
        .resolver
        .context(
            &head,
            &state.args,
            state.registry.public(),
            state.registry.admin(),
            state.storage.as_ref(),
        )
        .await;

    match derived {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => {
            tracing::info!(
                request_id = %head.request_id,
                method = %head.method,
                path = %head.path,
                error = %err,
                "request rejected"
            );
            ApiError(err).into_response()
        }
    }
}

fn request_head(req: &axum::http::Request<Body>) -> RequestHead {
    RequestHead {
        request_id: RequestId::new(),
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization: req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension, Router,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    use tollgate_auth::{AuthorizationDecision, RequestContext, TokenContextResolver};
    use tollgate_core::RouteClassification;
    use tollgate_crypto::Passthrough;

    use crate::app::services::InMemoryStorageProvider;
    use crate::middleware::{InterceptorState, encrypt_response};

    fn gate_state() -> GateState {
        GateState {
            args: Arc::new(EnvironmentArgs::new("secret")),
            registry: Arc::new(RouteRegistry::build([RouteClassification::declare(
                "/monitor",
                &["/alive"],
                &[],
            )
            .unwrap()])),
            resolver: Arc::new(TokenContextResolver::new()),
            storage: Arc::new(InMemoryStorageProvider),
        }
    }

    async fn alive(Extension(ctx): Extension<RequestContext>) -> StatusCode {
        assert_eq!(ctx.decision(), AuthorizationDecision::NotRequired);
        StatusCode::OK
    }

    fn routes() -> Router {
        Router::new().route("/monitor/alive", get(alive))
    }

    fn get_req(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn gate_without_encryption_stage_fails_closed() {
        let app = routes().layer(axum::middleware::from_fn_with_state(gate_state(), context_gate));

        let res = app.oneshot(get_req("/monitor/alive")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn encryption_stage_ahead_of_gate_lets_requests_through() {
        let app = routes()
            .layer(axum::middleware::from_fn_with_state(gate_state(), context_gate))
            .layer(axum::middleware::from_fn_with_state(
                InterceptorState {
                    cipher: Arc::new(Passthrough),
                },
                encrypt_response,
            ));

        let res = app.clone().oneshot(get_req("/monitor/alive")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.oneshot(get_req("/monitor/other")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn request_head_captures_authorization() {
        let req = Request::post("/user/me?x=1")
            .header(AUTHORIZATION, "Bearer abc")
            .body(Body::empty())
            .unwrap();
        let head = request_head(&req);

        assert_eq!(head.method, "POST");
        assert_eq!(head.path, "/user/me");
        assert_eq!(head.bearer_token().unwrap(), "abc");
    }
}
