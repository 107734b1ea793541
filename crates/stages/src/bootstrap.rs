//! Wiring from a loaded [`StagesConfig`] to a runnable [`Server`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use stages_config::{DatabaseSection, ServerSection, StagesConfig, StagesSection, StorageBackend};
use stages_docs::DocsError;
use stages_server::{
    routes, App, HandlerConfig, Server, ServerConfig, ServerError, StageHandler, API_VERSION,
};
use stages_store::{MemoryStore, SqliteStore, StageStore, StoreError};
use thiserror::Error;
use tracing::info;

/// Failures while assembling the service.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The store could not be opened or prepared.
    #[error("storage setup failed: {0}")]
    Store(#[from] StoreError),

    /// The route table or static documents could not be built.
    #[error("server setup failed: {0}")]
    Server(#[from] ServerError),

    /// The documentation could not be generated or written.
    #[error("documentation generation failed: {0}")]
    Docs(#[from] DocsError),
}

/// Maps the `[server]` section onto the server's own configuration.
pub fn server_config(section: &ServerSection) -> ServerConfig {
    ServerConfig::builder()
        .http_addr(section.http_addr.clone())
        .request_timeout(Duration::from_millis(section.request_timeout_ms))
        .shutdown_timeout(Duration::from_secs(section.shutdown_timeout_secs))
        .max_connections(Some(section.max_connections))
        .max_body_bytes(section.max_body_bytes)
        .build()
}

/// Maps the `[stages]` section onto the handler's switches.
pub fn handler_config(section: &StagesSection) -> HandlerConfig {
    HandlerConfig {
        allow_delete_via_update: section.allow_delete_via_update,
    }
}

/// Opens the configured store, creating the SQLite table if absent.
pub async fn open_store(section: &DatabaseSection) -> Result<Arc<dyn StageStore>, BootstrapError> {
    match section.backend {
        StorageBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Sqlite => {
            let store = SqliteStore::connect(&section.url, section.max_connections).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}

/// Prepares persistent storage and returns without serving.
pub async fn setup(section: &DatabaseSection) -> Result<(), BootstrapError> {
    let store = open_store(section).await?;
    store.ping().await?;
    info!(backend = ?section.backend, "Storage ready");
    Ok(())
}

/// Builds the dispatcher for `config` on top of `store`.
pub fn build_app(config: &StagesConfig, store: Arc<dyn StageStore>) -> Result<App, BootstrapError> {
    let handler = StageHandler::new(store, handler_config(&config.stages));
    Ok(App::new(handler)?)
}

/// Opens storage and assembles the HTTP server.
pub async fn build_server(config: &StagesConfig) -> Result<Server, BootstrapError> {
    let store = open_store(&config.database).await?;
    let app = build_app(config, store)?;
    Ok(Server::new(server_config(&config.server), app))
}

/// Writes `swagger.json` and `api.md` into `dir`.
pub fn generate_docs(dir: &Path) -> Result<Vec<PathBuf>, BootstrapError> {
    let doc = routes::openapi(API_VERSION)?;
    let written = stages_docs::write_docs(dir, &doc)?;
    info!(dir = %dir.display(), files = written.len(), "Documentation written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_mapping() {
        let section = ServerSection {
            http_addr: "0.0.0.0:9000".to_string(),
            request_timeout_ms: 1500,
            shutdown_timeout_secs: 5,
            max_connections: 16,
            max_body_bytes: 2048,
        };
        let config = server_config(&section);

        assert_eq!(config.http_addr(), "0.0.0.0:9000");
        assert_eq!(config.request_timeout(), Duration::from_millis(1500));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_connections(), Some(16));
        assert_eq!(config.max_body_bytes(), 2048);
    }

    #[test]
    fn test_handler_config_mapping() {
        let strict = StagesSection {
            allow_delete_via_update: false,
        };
        assert!(!handler_config(&strict).allow_delete_via_update);
        assert!(handler_config(&StagesSection::default()).allow_delete_via_update);
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let section = DatabaseSection {
            backend: StorageBackend::Memory,
            ..DatabaseSection::default()
        };
        let store = open_store(&section).await.unwrap();
        assert!(store.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_setup_sqlite_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stages.db");
        let section = DatabaseSection {
            backend: StorageBackend::Sqlite,
            url: format!("sqlite://{}", path.display()),
            max_connections: 1,
        };

        setup(&section).await.unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_generate_docs() {
        let dir = tempfile::tempdir().unwrap();
        let written = generate_docs(dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        let swagger = std::fs::read_to_string(dir.path().join("swagger.json")).unwrap();
        assert!(swagger.contains("/constructionStages/{id}"));
        let markdown = std::fs::read_to_string(dir.path().join("api.md")).unwrap();
        assert!(markdown.contains("## Endpoints"));
    }
}
