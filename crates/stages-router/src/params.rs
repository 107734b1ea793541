//! Positional path parameter storage.
//!
//! Captured groups are kept in pattern order using a small-vector
//! optimization, since routes rarely capture more than a couple of values.

use std::str::FromStr;

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Parameters captured by a route pattern, in the order their groups
/// appear in the pattern. The implicit whole-match group is never stored.
///
/// # Example
///
/// ```rust
/// use stages_router::Params;
///
/// let params: Params = vec!["42".to_string()].into_iter().collect();
///
/// assert_eq!(params.get(0), Some("42"));
/// assert_eq!(params.parse::<i64>(0), Some(42));
/// assert_eq!(params.get(1), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[String; INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured value.
    pub fn push(&mut self, value: impl Into<String>) {
        self.inner.push(value.into());
    }

    /// Returns the captured value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.inner.get(index).map(String::as_str)
    }

    /// Parses the captured value at `index`.
    ///
    /// Returns `None` if the capture is missing or does not parse. A `(:num)`
    /// capture that overflows the target type also yields `None`.
    pub fn parse<N: FromStr>(&self, index: usize) -> Option<N> {
        self.get(index).and_then(|v| v.parse().ok())
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the captured values in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(String::as_str)
    }
}

impl FromIterator<String> for Params {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_params_positional_get() {
        let mut params = Params::new();
        params.push("acme");
        params.push("123");

        assert_eq!(params.get(0), Some("acme"));
        assert_eq!(params.get(1), Some("123"));
        assert_eq!(params.get(2), None);
    }

    #[test]
    fn test_params_parse() {
        let mut params = Params::new();
        params.push("17");
        params.push("seventeen");
        params.push("99999999999999999999999");

        assert_eq!(params.parse::<i64>(0), Some(17));
        assert_eq!(params.parse::<i64>(1), None);
        assert_eq!(params.parse::<i64>(2), None);
        assert_eq!(params.parse::<i64>(3), None);
    }

    #[test]
    fn test_params_iter_preserves_order() {
        let params: Params = ["a", "b", "c"].iter().map(|s| (*s).to_string()).collect();
        let values: Vec<_> = params.iter().collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_params_many_params() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get(5), Some("value5"));
    }
}
