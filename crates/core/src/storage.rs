//! Storage provider boundary.
//!
//! The pipeline never inspects storage contents; it only preloads the
//! provider at startup and hands the handle to the context resolver.

use async_trait::async_trait;

use crate::GateResult;

#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Short name for logs (e.g. "in-memory", "postgres").
    fn name(&self) -> &'static str;

    /// Warm up connections. Run once at startup, off the request path.
    async fn preload(&self) -> GateResult<()>;

    /// Fail with [`GateError::UpstreamUnavailable`](crate::GateError) when the provider
    /// cannot serve requests.
    async fn check(&self) -> GateResult<()>;
}
