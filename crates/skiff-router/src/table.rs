//! Method-keyed route storage with registration-order lookup.

use std::collections::HashMap;
use std::fmt;

use http::Method;

use crate::pattern::{self, CompiledPattern, PatternError};

/// A registered route: a template, its compiled pattern, and the handler
/// chain to run when it matches.
///
/// Routes are created at registration and immutable afterwards. The
/// handler payload is generic so this layer stays independent of how the
/// runtime represents handlers; the chain is ordered and non-empty, with
/// the element at index 0 being the terminal handler.
pub struct Route<H> {
    method: Method,
    template: String,
    pattern: CompiledPattern,
    handlers: Vec<H>,
}

impl<H> Route<H> {
    /// The HTTP method this route was registered under.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The original template, e.g. `/auth/:name`.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The pattern compiled from the template at registration.
    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// The handler chain, in registration order.
    #[must_use]
    pub fn handlers(&self) -> &[H] {
        &self.handlers
    }
}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

/// Routes bucketed by method, scanned in registration order.
///
/// Lookup is first-match-wins: two routes with overlapping patterns are
/// distinguished only by the order they were registered in. There is no
/// specificity-based reordering; this is a design constraint, not an
/// accident, and the test suite pins it.
pub struct RouteTable<H> {
    routes: HashMap<Method, Vec<Route<H>>>,
}

impl<H> RouteTable<H> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Compiles `template` once and appends the route to its method bucket.
    ///
    /// # Panics
    ///
    /// Panics if `handlers` is empty; every route carries at least a
    /// terminal handler.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        handlers: Vec<H>,
    ) -> Result<(), PatternError> {
        assert!(!handlers.is_empty(), "route requires at least one handler");
        let pattern = pattern::compile(template)?;
        self.routes.entry(method.clone()).or_default().push(Route {
            method,
            template: template.to_string(),
            pattern,
            handlers,
        });
        Ok(())
    }

    /// Returns the first registered route whose pattern matches `path`.
    ///
    /// `None` when the method has no bucket or nothing in the bucket
    /// matches; the caller owns the not-found policy.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Route<H>> {
        self.routes
            .get(method)?
            .iter()
            .find(|route| route.pattern.matches(path))
    }

    /// Total number of registered routes across all methods.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Iterates all routes, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.values().flatten()
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.route_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(routes: &[(&'static str, &'static str)]) -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        for (template, tag) in routes {
            table.register(Method::GET, template, vec![*tag]).unwrap();
        }
        table
    }

    #[test]
    fn lookup_returns_first_registered_match() {
        // `/users/:id` also matches `/users/me`; registration order decides.
        let table = table_with(&[("/users/:id", "param"), ("/users/me", "literal")]);
        let route = table.lookup(&Method::GET, "/users/me").unwrap();
        assert_eq!(route.template(), "/users/:id");
        assert_eq!(route.handlers(), &["param"]);
    }

    #[test]
    fn registration_order_beats_specificity_both_ways() {
        let table = table_with(&[("/users/me", "literal"), ("/users/:id", "param")]);
        assert_eq!(
            table.lookup(&Method::GET, "/users/me").unwrap().template(),
            "/users/me"
        );
        assert_eq!(
            table.lookup(&Method::GET, "/users/42").unwrap().template(),
            "/users/:id"
        );
    }

    #[test]
    fn lookup_misses_without_method_bucket() {
        let table = table_with(&[("/hey", "hey")]);
        assert!(table.lookup(&Method::POST, "/hey").is_none());
    }

    #[test]
    fn lookup_misses_when_no_pattern_matches() {
        let table = table_with(&[("/hey", "hey")]);
        assert!(table.lookup(&Method::GET, "/missing").is_none());
    }

    #[test]
    fn register_rejects_malformed_template() {
        let mut table: RouteTable<()> = RouteTable::new();
        assert!(table.register(Method::GET, "/a/:x/:x", vec![()]).is_err());
    }

    #[test]
    fn route_count_spans_methods() {
        let mut table: RouteTable<()> = RouteTable::new();
        table.register(Method::GET, "/a", vec![()]).unwrap();
        table.register(Method::GET, "/b", vec![()]).unwrap();
        table.register(Method::POST, "/a", vec![()]).unwrap();
        assert_eq!(table.route_count(), 3);
    }
}
