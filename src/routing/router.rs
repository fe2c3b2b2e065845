//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in configuration order
//! - Look up the upstream for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - First registered match wins, even if a later prefix is longer

use crate::config::GatewayConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// A downstream service the gateway forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    /// Logical service name, used for logs and metrics.
    pub service: String,
    /// Base URL without trailing slash, e.g. `http://order-service:8002`.
    pub base_url: String,
}

impl Upstream {
    pub fn new(service: impl Into<String>, base_url: impl AsRef<str>) -> Self {
        Self {
            service: service.into(),
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    /// Target URL for `path` and an optional raw query string.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.base_url, path, q),
            _ => format!("{}{}", self.base_url, path),
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    matcher: PathPrefixMatcher,
    upstream: Upstream,
}

/// Ordered prefix → upstream table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Insertion order decides ties.
    pub fn with_route(mut self, prefix: impl Into<String>, upstream: Upstream) -> Self {
        self.routes.push(Route {
            matcher: PathPrefixMatcher::new(prefix),
            upstream,
        });
        self
    }

    /// Build the table from validated configuration.
    ///
    /// Routes naming an unknown service are skipped; validation reports them.
    pub fn from_config(config: &GatewayConfig) -> Self {
        config
            .routes
            .iter()
            .filter_map(|route| {
                config
                    .services
                    .get(&route.service)
                    .map(|url| (route.prefix.clone(), Upstream::new(&route.service, url)))
            })
            .fold(Self::new(), |table, (prefix, upstream)| {
                table.with_route(prefix, upstream)
            })
    }

    /// First upstream whose prefix matches `path`.
    pub fn resolve(&self, path: &str) -> Option<&Upstream> {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(path))
            .map(|route| &route.upstream)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    fn table() -> RouteTable {
        RouteTable::new()
            .with_route("/v1/users", Upstream::new("user", "http://user-svc"))
            .with_route("/v1/users/admin", Upstream::new("admin", "http://admin-svc"))
            .with_route("/v1/orders", Upstream::new("order", "http://order-svc/"))
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let table = table();
        assert_eq!(table.resolve("/v1/users/admin/7").unwrap().service, "user");
        assert_eq!(table.resolve("/v1/orders/42").unwrap().service, "order");
        assert!(table.resolve("/unknown/path").is_none());
        assert!(table.resolve("/").is_none());
    }

    #[test]
    fn test_registration_order_decides_overlap() {
        let table = RouteTable::new()
            .with_route("/v1/users/admin", Upstream::new("admin", "http://admin-svc"))
            .with_route("/v1/users", Upstream::new("user", "http://user-svc"));
        assert_eq!(table.resolve("/v1/users/admin/7").unwrap().service, "admin");
        assert_eq!(table.resolve("/v1/users/7").unwrap().service, "user");
    }

    #[test]
    fn test_target_url() {
        let table = table();
        let upstream = table.resolve("/v1/orders/42").unwrap();
        assert_eq!(upstream.base_url, "http://order-svc");
        assert_eq!(
            upstream.target_url("/v1/orders/42", None),
            "http://order-svc/v1/orders/42"
        );
        assert_eq!(
            upstream.target_url("/v1/orders/42", Some("")),
            "http://order-svc/v1/orders/42"
        );
        assert_eq!(
            upstream.target_url("/v1/orders", Some("page=2&sort=desc")),
            "http://order-svc/v1/orders?page=2&sort=desc"
        );
    }

    #[test]
    fn test_from_config_preserves_order() {
        let mut config = GatewayConfig::default();
        config.routes = vec![
            RouteConfig::new("/v1/items", "inventory"),
            RouteConfig::new("/v1", "user"),
            RouteConfig::new("/v1/ghost", "missing"),
        ];
        let table = RouteTable::from_config(&config);

        assert_eq!(table.len(), 2);
        let upstream = table.resolve("/v1/items/3").unwrap();
        assert_eq!(upstream.service, "inventory");
        assert_eq!(upstream.base_url, "http://inventory-service:8003");
        assert_eq!(table.resolve("/v1/ghost").unwrap().service, "user");
    }
}
