//! `tollgate-auth` — derives the per-request context (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP: the gate hands it a
//! [`RequestHead`] and receives a [`RequestContext`] or a `GateError`.

pub mod authorize;
pub mod claims;
pub mod context;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use authorize::{ADMIN_ROLE, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use context::{AuthorizationDecision, RequestContext};
pub use principal::PrincipalContext;
pub use resolver::{ContextResolver, RequestHead, RouteAccess, TokenContextResolver, route_access};
pub use roles::Role;
