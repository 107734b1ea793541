//! Server error types.

use thiserror::Error;

/// Errors raised while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address is invalid or already in use.
    #[error("Bind error: {0}")]
    BindError(String),

    /// The route table failed to compile.
    #[error("Invalid route table: {0}")]
    Routes(#[from] stages_router::RouterError),

    /// The API document could not be generated.
    #[error("Failed to build API document: {0}")]
    Docs(#[from] stages_docs::DocsError),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let bind_err = ServerError::BindError("Address in use".to_string());
        assert!(bind_err.to_string().contains("Bind error"));

        let io_err: ServerError =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset").into();
        assert!(io_err.to_string().contains("I/O error"));
    }
}
