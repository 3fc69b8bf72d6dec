//! `tollgate-core` — shared building blocks of the request pipeline.
//!
//! This crate is HTTP-agnostic: route classification, the error taxonomy,
//! the configuration bundle and the storage provider boundary.

pub mod config;
pub mod error;
pub mod id;
pub mod route;
pub mod storage;

pub use config::EnvironmentArgs;
pub use error::{GateError, GateResult};
pub use id::{PrincipalId, RequestId};
pub use route::{RouteClassification, RouteError, RoutePath, RouteRegistry, classify};
pub use storage::StorageProvider;
