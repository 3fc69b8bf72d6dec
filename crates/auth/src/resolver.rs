//! Context derivation: classify the request path, then authenticate and authorize.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use tollgate_core::{
    EnvironmentArgs, GateError, GateResult, RequestId, RoutePath, StorageProvider, route,
};

use crate::{JwtClaims, PrincipalContext, RequestContext, authorize, validate_claims};

/// Transport-neutral view of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub request_id: RequestId,
    pub method: String,
    pub path: String,
    /// Raw `Authorization` header, if present and valid UTF-8.
    pub authorization: Option<String>,
}

impl RequestHead {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method: method.into(),
            path: path.into(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// The token of a `Bearer <token>` authorization header.
    pub fn bearer_token(&self) -> GateResult<&str> {
        let header = self
            .authorization
            .as_deref()
            .ok_or_else(|| GateError::unauthenticated("missing bearer token"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| GateError::unauthenticated("malformed authorization header"))?
            .trim();

        if token.is_empty() {
            return Err(GateError::unauthenticated("missing bearer token"));
        }
        Ok(token)
    }
}

/// Which class of route a request path falls into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Protected,
    Admin,
}

/// Public wins over admin; anything unlisted is protected.
pub fn route_access(path: &str, public: &[RoutePath], admin: &[RoutePath]) -> RouteAccess {
    if route::contains(public, path) {
        RouteAccess::Public
    } else if route::contains(admin, path) {
        RouteAccess::Admin
    } else {
        RouteAccess::Protected
    }
}

/// Produces the context for one request or the reason it must be rejected.
#[async_trait]
pub trait ContextResolver: Send + Sync {
    async fn context(
        &self,
        head: &RequestHead,
        args: &EnvironmentArgs,
        public: &[RoutePath],
        admin: &[RoutePath],
        storage: &dyn StorageProvider,
    ) -> GateResult<RequestContext>;
}

/// Verifies HS256 bearer tokens signed with `EnvironmentArgs::jwt_secret`.
#[derive(Debug, Default, Clone)]
pub struct TokenContextResolver;

impl TokenContextResolver {
    pub fn new() -> Self {
        Self
    }

    fn verify(&self, token: &str, args: &EnvironmentArgs) -> GateResult<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked by `validate_claims` against a single "now".
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let key = DecodingKey::from_secret(args.jwt_secret.as_bytes());
        let data = jsonwebtoken::decode::<JwtClaims>(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            GateError::unauthenticated("invalid token")
        })?;

        validate_claims(&data.claims, Utc::now())
            .map_err(|e| GateError::unauthenticated(e.to_string()))?;
        Ok(data.claims)
    }
}

#[async_trait]
impl ContextResolver for TokenContextResolver {
    async fn context(
        &self,
        head: &RequestHead,
        args: &EnvironmentArgs,
        public: &[RoutePath],
        admin: &[RoutePath],
        storage: &dyn StorageProvider,
    ) -> GateResult<RequestContext> {
        let access = route_access(&head.path, public, admin);
        if access == RouteAccess::Public {
            return Ok(RequestContext::anonymous(head.request_id));
        }

        let claims = self.verify(head.bearer_token()?, args)?;
        let principal = PrincipalContext::new(claims.sub, claims.username, claims.roles);
        let decision = authorize(&principal, access)?;

        // Only authorized principals cost a storage round trip.
        storage.check().await?;

        tracing::debug!(
            request_id = %head.request_id,
            principal_id = %principal.principal_id(),
            ?decision,
            "request authorized"
        );
        Ok(RequestContext::authorized(head.request_id, decision, principal))
    }
}
