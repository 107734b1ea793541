//! Store error types.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`StageStore`](crate::StageStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database driver failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped back to the model.
    #[error("corrupt value '{value}' in column '{column}'")]
    Corrupt {
        /// Column name
        column: &'static str,
        /// Offending raw value
        value: String,
    },
}

impl StoreError {
    pub(crate) fn corrupt(column: &'static str, value: impl Into<String>) -> Self {
        Self::Corrupt {
            column,
            value: value.into(),
        }
    }
}
