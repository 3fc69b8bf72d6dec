use tollgate_core::RequestId;

use crate::PrincipalContext;

/// What the gate decided for this request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// Public route: no credentials were inspected.
    NotRequired,
    /// Protected route: a valid token was presented.
    Standard,
    /// Admin route: a valid token carrying the admin role was presented.
    Elevated,
}

/// Per-request context produced by the gate and read by handlers.
///
/// Lives in the request extensions; never shared across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: RequestId,
    decision: AuthorizationDecision,
    principal: Option<PrincipalContext>,
}

impl RequestContext {
    pub fn anonymous(request_id: RequestId) -> Self {
        Self {
            request_id,
            decision: AuthorizationDecision::NotRequired,
            principal: None,
        }
    }

    pub fn authorized(
        request_id: RequestId,
        decision: AuthorizationDecision,
        principal: PrincipalContext,
    ) -> Self {
        Self {
            request_id,
            decision,
            principal: Some(principal),
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn decision(&self) -> AuthorizationDecision {
        self.decision
    }

    pub fn principal(&self) -> Option<&PrincipalContext> {
        self.principal.as_ref()
    }

    pub fn is_elevated(&self) -> bool {
        self.decision == AuthorizationDecision::Elevated
    }
}
