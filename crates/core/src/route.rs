//! Route classification: which fully-qualified paths are public and which are admin-only.
//!
//! Every route module declares its public/admin suffixes relative to its own
//! mount prefix. At startup those declarations are qualified and concatenated
//! into a [`RouteRegistry`], which is then shared read-only with the request
//! gate for the lifetime of the process.

use serde::Serialize;
use thiserror::Error;

/// Suffix that denotes "the mount prefix itself".
pub const ROOT: &str = "/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("mount prefix '{0}' must start with '/' and have no trailing '/'")]
    MalformedPrefix(String),

    #[error("route suffix '{suffix}' under '{prefix}' must start with '/'")]
    MalformedSuffix { prefix: String, suffix: String },
}

/// A fully-qualified, normalized URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoutePath(String);

impl RoutePath {
    /// Validate a mount prefix: a leading `/`, and no trailing `/` unless it is the root.
    pub fn prefix(prefix: impl Into<String>) -> Result<Self, RouteError> {
        let prefix = prefix.into();
        let trailing = prefix.len() > 1 && prefix.ends_with('/');
        if !prefix.starts_with('/') || trailing {
            return Err(RouteError::MalformedPrefix(prefix));
        }
        Ok(Self(prefix))
    }

    /// Normalize a request path for lookup (drops one trailing `/`, keeps the root).
    pub fn normalize(path: &str) -> &str {
        match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        }
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoutePath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RoutePath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RoutePath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Qualify `suffixes` with `prefix`, preserving declaration order.
///
/// The [`ROOT`] suffix yields the prefix itself, and a root prefix collapses
/// so that no path ever starts with `//`.
pub fn classify(prefix: &RoutePath, suffixes: &[&str]) -> Result<Vec<RoutePath>, RouteError> {
    suffixes
        .iter()
        .map(|suffix| {
            if !suffix.starts_with('/') {
                return Err(RouteError::MalformedSuffix {
                    prefix: prefix.to_string(),
                    suffix: (*suffix).to_string(),
                });
            }
            let path = if *suffix == ROOT {
                prefix.0.clone()
            } else if prefix.is_root() {
                (*suffix).to_string()
            } else {
                format!("{}{}", prefix.0, suffix)
            };
            Ok(RoutePath(path))
        })
        .collect()
}

/// Public and admin paths contributed by one route module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteClassification {
    public: Vec<RoutePath>,
    admin: Vec<RoutePath>,
}

impl RouteClassification {
    pub fn declare(
        prefix: &str,
        public_suffixes: &[&str],
        admin_suffixes: &[&str],
    ) -> Result<Self, RouteError> {
        let prefix = RoutePath::prefix(prefix)?;
        Ok(Self {
            public: classify(&prefix, public_suffixes)?,
            admin: classify(&prefix, admin_suffixes)?,
        })
    }

    pub fn public(&self) -> &[RoutePath] {
        &self.public
    }

    pub fn admin(&self) -> &[RoutePath] {
        &self.admin
    }
}

/// The two global path sets, in module-then-suffix declaration order.
///
/// Built once before the first request is accepted; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RouteRegistry {
    public: Vec<RoutePath>,
    admin: Vec<RoutePath>,
}

impl RouteRegistry {
    pub fn build(classifications: impl IntoIterator<Item = RouteClassification>) -> Self {
        let mut registry = Self::default();
        for classification in classifications {
            registry.public.extend(classification.public);
            registry.admin.extend(classification.admin);
        }
        registry
    }

    pub fn public(&self) -> &[RoutePath] {
        &self.public
    }

    pub fn admin(&self) -> &[RoutePath] {
        &self.admin
    }

    pub fn is_public(&self, path: &str) -> bool {
        contains(&self.public, path)
    }

    pub fn is_admin(&self, path: &str) -> bool {
        contains(&self.admin, path)
    }

    /// Number of declared paths across both sets.
    pub fn len(&self) -> usize {
        self.public.len() + self.admin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.admin.is_empty()
    }
}

/// Exact membership after trailing-slash normalization.
pub fn contains(paths: &[RoutePath], path: &str) -> bool {
    let path = RoutePath::normalize(path);
    paths.iter().any(|p| p.as_str() == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prefix(p: &str) -> RoutePath {
        RoutePath::prefix(p).unwrap()
    }

    #[test]
    fn monitor_alive_is_qualified() {
        let paths = classify(&prefix("/monitor"), &["/alive"]).unwrap();
        assert_eq!(paths, vec![RoutePath("/monitor/alive".into())]);
    }

    #[test]
    fn root_sentinel_yields_bare_prefix() {
        let paths = classify(&prefix("/product"), &["/", "/list"]).unwrap();
        assert_eq!(paths[0], "/product");
        assert_eq!(paths[1], "/product/list");
    }

    #[test]
    fn root_prefix_collapses() {
        let paths = classify(&prefix("/"), &["/", "/alive"]).unwrap();
        assert_eq!(paths[0], "/");
        assert_eq!(paths[1], "/alive");
    }

    #[test]
    fn malformed_input_fails_fast() {
        assert_eq!(
            RoutePath::prefix("monitor"),
            Err(RouteError::MalformedPrefix("monitor".into()))
        );
        assert!(RoutePath::prefix("/monitor/").is_err());
        assert!(RoutePath::prefix("").is_err());

        let err = classify(&prefix("/user"), &["me"]).unwrap_err();
        assert!(matches!(err, RouteError::MalformedSuffix { .. }));
    }

    #[test]
    fn empty_declarations_contribute_nothing() {
        let registry = RouteRegistry::build([
            RouteClassification::declare("/monitor", &["/alive"], &[]).unwrap(),
            RouteClassification::declare("/product", &[], &[]).unwrap(),
        ]);
        assert_eq!(registry.public().len(), 1);
        assert!(registry.admin().is_empty());
    }

    #[test]
    fn registry_preserves_module_then_suffix_order() {
        let registry = RouteRegistry::build([
            RouteClassification::declare("/monitor", &["/alive"], &[]).unwrap(),
            RouteClassification::declare("/user", &["/signup", "/login"], &["/all"]).unwrap(),
            RouteClassification::declare("/product", &[], &["/"]).unwrap(),
        ]);

        let public: Vec<&str> = registry.public().iter().map(RoutePath::as_str).collect();
        let admin: Vec<&str> = registry.admin().iter().map(RoutePath::as_str).collect();
        assert_eq!(public, ["/monitor/alive", "/user/signup", "/user/login"]);
        assert_eq!(admin, ["/user/all", "/product"]);
    }

    #[test]
    fn lookups_are_exact_modulo_trailing_slash() {
        let registry = RouteRegistry::build([
            RouteClassification::declare("/monitor", &["/alive"], &[]).unwrap(),
            RouteClassification::declare("/product", &[], &["/"]).unwrap(),
        ]);

        assert!(registry.is_public("/monitor/alive"));
        assert!(registry.is_public("/monitor/alive/"));
        assert!(!registry.is_public("/monitor"));
        assert!(!registry.is_public("/monitor/alive/extra"));
        assert!(registry.is_admin("/product"));
        assert!(!registry.is_admin("/product/42"));
    }

    #[test]
    fn normalize_keeps_root() {
        assert_eq!(RoutePath::normalize("/"), "/");
        assert_eq!(RoutePath::normalize("/a/"), "/a");
        assert_eq!(RoutePath::normalize("/a"), "/a");
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z]{1,8}".prop_map(|s| format!("/{s}"))
    }

    fn suffixes() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop_oneof![Just(ROOT.to_string()), segment()], 0..6)
    }

    proptest! {
        #[test]
        fn classify_is_idempotent(p in segment(), s in suffixes()) {
            let refs: Vec<&str> = s.iter().map(String::as_str).collect();
            let prefix = prefix(&p);
            prop_assert_eq!(classify(&prefix, &refs).unwrap(), classify(&prefix, &refs).unwrap());
        }

        #[test]
        fn classified_paths_start_with_prefix_and_never_double_root(p in segment(), s in suffixes()) {
            let refs: Vec<&str> = s.iter().map(String::as_str).collect();
            let paths = classify(&prefix(&p), &refs).unwrap();
            prop_assert_eq!(paths.len(), refs.len());
            for (path, suffix) in paths.iter().zip(&refs) {
                prop_assert!(path.as_str().starts_with(&p));
                prop_assert!(!path.as_str().starts_with("//"));
                if *suffix == ROOT {
                    prop_assert_eq!(path.as_str(), p.as_str());
                }
            }
        }

        #[test]
        fn registry_length_is_the_aggregate(modules in prop::collection::vec((segment(), suffixes(), suffixes()), 0..5)) {
            let mut expected_public = Vec::new();
            let mut expected_admin = Vec::new();
            let mut classifications = Vec::new();
            for (p, public, admin) in &modules {
                let public: Vec<&str> = public.iter().map(String::as_str).collect();
                let admin: Vec<&str> = admin.iter().map(String::as_str).collect();
                let c = RouteClassification::declare(p, &public, &admin).unwrap();
                expected_public.extend(c.public().iter().cloned());
                expected_admin.extend(c.admin().iter().cloned());
                classifications.push(c);
            }

            let registry = RouteRegistry::build(classifications);
            prop_assert_eq!(registry.public(), expected_public.as_slice());
            prop_assert_eq!(registry.admin(), expected_admin.as_slice());
        }
    }
}
