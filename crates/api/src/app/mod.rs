//! Pipeline assembly (Axum router + collaborator wiring).
//!
//! This folder is structured like:
//! - `services.rs`: storage provider wiring and preload
//! - `routes/`: route modules (router + public/admin declarations)
//! - `errors.rs`: the error translator every failure goes through

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use tollgate_auth::{ContextResolver, TokenContextResolver};
use tollgate_core::{EnvironmentArgs, RoutePath, RouteRegistry, StorageProvider};
use tollgate_crypto::{ResponseCipher, cipher_from_args};

use crate::config::Environment;
use crate::middleware::{self, GateState, InterceptorState};

pub mod errors;
pub mod routes;
pub mod services;

use routes::RouteModule;

/// The external collaborators the pipeline calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn StorageProvider>,
    pub cipher: Arc<dyn ResponseCipher>,
    pub resolver: Arc<dyn ContextResolver>,
}

impl Collaborators {
    /// The production collaborators selected by configuration.
    pub fn from_args(args: &EnvironmentArgs) -> anyhow::Result<Self> {
        Ok(Self {
            storage: services::storage_provider(args)
                .context("failed to initialize storage provider")?,
            cipher: cipher_from_args(args),
            resolver: Arc::new(TokenContextResolver::new()),
        })
    }
}

/// An assembled pipeline, ready to serve.
pub struct Pipeline {
    router: Router,
    registry: Arc<RouteRegistry>,
    preload: JoinHandle<()>,
}

impl Pipeline {
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The router plus the still-running (or finished) preload task.
    pub fn split(self) -> (Router, JoinHandle<()>) {
        (self.router, self.preload)
    }

    /// The router; the preload task keeps running detached.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Build the full pipeline with the collaborators the environment selects
/// (public entrypoint used by `main.rs`).
pub async fn start(environment: &Environment, modules: Vec<RouteModule>) -> anyhow::Result<Pipeline> {
    environment.report();
    let args = environment.args();
    let collaborators = Collaborators::from_args(&args)?;
    start_with(args, collaborators, modules).await
}

/// Build the pipeline around the given collaborators.
///
/// The order of the steps below is a security invariant: the encryption stage
/// wraps the error rewrite, which wraps the gate, which wraps every router.
pub async fn start_with(
    args: Arc<EnvironmentArgs>,
    collaborators: Collaborators,
    modules: Vec<RouteModule>,
) -> anyhow::Result<Pipeline> {
    let Collaborators {
        storage,
        cipher,
        resolver,
    } = collaborators;
    tracing::info!(provider = storage.name(), "storage provider initialized");

    let preload = services::spawn_preload(Arc::clone(&storage));

    let classifications = modules
        .iter()
        .map(|m| {
            m.classification()
                .with_context(|| format!("invalid route declarations for '{}'", m.prefix()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let registry = Arc::new(RouteRegistry::build(classifications));
    tracing::info!(routes = ?paths(registry.public()), "public routes");
    tracing::info!(routes = ?paths(registry.admin()), "admin routes");
    tracing::debug!(declared = registry.len(), "route registry built");

    tracing::info!(
        algorithm = cipher.algorithm().unwrap_or("none"),
        "response encryption installed"
    );
    let interceptor = InterceptorState { cipher };
    let gate = GateState {
        args,
        registry: Arc::clone(&registry),
        resolver,
        storage,
    };

    let mut router = Router::new();
    for module in modules {
        router = module.mount(router);
    }

    // Outermost first.
    let router = router.fallback(errors::not_found).layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(errors::panic_response))
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn_with_state(
                interceptor,
                middleware::encrypt_response,
            ))
            .layer(axum::middleware::map_response(errors::translate_response))
            .layer(axum::middleware::from_fn_with_state(
                gate,
                middleware::context_gate,
            )),
    );

    Ok(Pipeline {
        router,
        registry,
        preload,
    })
}

fn paths(paths: &[RoutePath]) -> Vec<&str> {
    paths.iter().map(RoutePath::as_str).collect()
}
