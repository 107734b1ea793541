//! Ordered pattern router for the construction stages API.
//!
//! Routes are declared as a verb plus a path template whose segments may
//! contain typed placeholders. Matching walks the table in declaration order
//! and the first hit wins.
//!
//! # Placeholders
//!
//! | Placeholder | Matches |
//! |-------------|---------|
//! | `:num`      | one or more digits |
//! | `:alpha`    | one or more letters |
//! | `:alnum`    | one or more letters or digits |
//! | `:any`      | any run of characters except `/` |
//!
//! Parenthesised placeholders are captured and returned positionally.
//!
//! # Example
//!
//! ```rust
//! use stages_router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "constructionStages", "listStages").unwrap();
//! router.insert(Method::GET, "constructionStages/(:num)", "getStage").unwrap();
//!
//! let m = router.match_route(&Method::GET, "/constructionStages/42").unwrap();
//! assert_eq!(*m.target(), "getStage");
//! assert_eq!(m.params().get(0), Some("42"));
//! ```

mod error;
mod params;
mod pattern;
mod router;

pub use error::RouterError;
pub use params::Params;
pub use pattern::{normalize, Placeholder};
pub use router::Router;

/// A matched route with its target and captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    target: &'a T,
    pattern: &'a str,
    params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(target: &'a T, pattern: &'a str, params: Params) -> Self {
        Self {
            target,
            pattern,
            params,
        }
    }

    /// The target registered with the matched route.
    pub fn target(&self) -> &'a T {
        self.target
    }

    /// The matched route's pattern, slashes trimmed.
    pub fn pattern(&self) -> &'a str {
        self.pattern
    }

    /// Captured parameters in pattern order.
    pub fn params(&self) -> &Params {
        &self.params
    }
}
