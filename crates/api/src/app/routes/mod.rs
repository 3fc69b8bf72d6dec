use axum::Router;

use tollgate_core::{RouteClassification, RouteError};

pub mod monitor;

/// A business router plus the suffixes it declares public or admin-only.
///
/// Suffixes are relative to `prefix`; `"/"` stands for the prefix itself.
/// Anything not declared is protected.
pub struct RouteModule {
    prefix: &'static str,
    router: Router,
    public: &'static [&'static str],
    admin: &'static [&'static str],
}

impl RouteModule {
    pub fn new(prefix: &'static str, router: Router) -> Self {
        Self {
            prefix,
            router,
            public: &[],
            admin: &[],
        }
    }

    pub fn public(mut self, suffixes: &'static [&'static str]) -> Self {
        self.public = suffixes;
        self
    }

    pub fn admin(mut self, suffixes: &'static [&'static str]) -> Self {
        self.admin = suffixes;
        self
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn classification(&self) -> Result<RouteClassification, RouteError> {
        RouteClassification::declare(self.prefix, self.public, self.admin)
    }

    /// Mount under the prefix; a root prefix is merged rather than nested.
    pub(crate) fn mount(self, app: Router) -> Router {
        if self.prefix == tollgate_core::route::ROOT {
            app.merge(self.router)
        } else {
            app.nest(self.prefix, self.router)
        }
    }
}

/// Every module this service mounts, in declaration order.
pub fn modules() -> Vec<RouteModule> {
    vec![monitor::module()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_declares_alive_as_public() {
        let classification = monitor::module().classification().unwrap();
        let public: Vec<&str> = classification.public().iter().map(|p| p.as_str()).collect();
        assert_eq!(public, ["/monitor/alive"]);
        assert!(classification.admin().is_empty());
    }

    #[test]
    fn malformed_declarations_are_reported() {
        let module = RouteModule::new("/user", Router::new()).admin(&["all"]);
        assert!(module.classification().is_err());
    }
}
