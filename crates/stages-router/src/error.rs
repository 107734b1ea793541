//! Router construction errors.

use thiserror::Error;

/// Errors raised while building a route table.
///
/// Matching itself never fails; an unmatched request simply yields `None`.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The pattern did not compile into a valid regular expression.
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as declared
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// The pattern references a placeholder type the router does not know.
    #[error("unknown placeholder ':{placeholder}' in route pattern '{pattern}'")]
    UnknownPlaceholder {
        /// The pattern as declared
        pattern: String,
        /// Placeholder name without the leading colon
        placeholder: String,
    },
}
