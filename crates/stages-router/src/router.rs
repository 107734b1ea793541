//! The ordered route table.

use http::Method;
use regex::Regex;

use crate::pattern::{compile, normalize};
use crate::{Params, RouteMatch, RouterError};

/// A single compiled route.
#[derive(Debug, Clone)]
struct Route<T> {
    method: Method,
    pattern: String,
    regex: Regex,
    target: T,
}

/// Ordered pattern router.
///
/// Routes are tried in declaration order and the first one whose verb and
/// pattern both match wins. There is no specificity ranking: if two patterns
/// overlap, the one inserted first shadows the other.
///
/// The router is built once and then only read, so a shared reference can be
/// handed to every request.
///
/// # Example
///
/// ```rust
/// use stages_router::Router;
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "items", "list").unwrap();
/// router.insert(Method::GET, "items/(:num)", "get").unwrap();
///
/// let m = router.match_route(&Method::GET, "/items/7").unwrap();
/// assert_eq!(*m.target(), "get");
/// assert_eq!(m.params().get(0), Some("7"));
///
/// assert!(router.match_route(&Method::GET, "/items/seven").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    routes: Vec<Route<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route to the end of the table.
    pub fn insert(
        &mut self,
        method: Method,
        pattern: &str,
        target: T,
    ) -> Result<(), RouterError> {
        let regex = compile(pattern)?;
        self.routes.push(Route {
            method,
            pattern: normalize(pattern).to_string(),
            regex,
            target,
        });
        Ok(())
    }

    /// Finds the first route matching `method` and `path`.
    ///
    /// Leading and trailing slashes of `path` are ignored, and both the verb
    /// and the path are compared case-insensitively.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let path = normalize(path);
        self.routes
            .iter()
            .filter(|route| same_method(&route.method, method))
            .find_map(|route| {
                let captures = route.regex.captures(path)?;
                let params: Params = captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .collect();
                Some(RouteMatch::new(&route.target, &route.pattern, params))
            })
    }

    /// Returns the verbs of every route whose pattern matches `path`, in
    /// declaration order.
    pub fn methods_for(&self, path: &str) -> Vec<&Method> {
        let path = normalize(path);
        self.routes
            .iter()
            .filter(|route| route.regex.is_match(path))
            .map(|route| &route.method)
            .collect()
    }

    /// Iterates over `(method, pattern, target)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &str, &T)> {
        self.routes
            .iter()
            .map(|route| (&route.method, route.pattern.as_str(), &route.target))
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes have been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn same_method(declared: &Method, requested: &Method) -> bool {
    declared == requested || declared.as_str().eq_ignore_ascii_case(requested.as_str())
}
