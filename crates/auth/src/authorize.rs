//! Privilege check for classified routes.

use tollgate_core::{GateError, GateResult};

use crate::{AuthorizationDecision, PrincipalContext, Role, RouteAccess};

/// Role that unlocks admin-classified routes.
pub const ADMIN_ROLE: &str = "admin";

/// Decide what an authenticated principal may do on a route of the given class.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &PrincipalContext, access: RouteAccess) -> GateResult<AuthorizationDecision> {
    match access {
        RouteAccess::Public => Ok(AuthorizationDecision::NotRequired),
        RouteAccess::Protected => Ok(AuthorizationDecision::Standard),
        RouteAccess::Admin if principal.roles().iter().any(Role::is_admin) => Ok(AuthorizationDecision::Elevated),
        RouteAccess::Admin => Err(GateError::forbidden("admin privileges required")),
    }
}
