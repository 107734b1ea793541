//! In-memory test client.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use stages_core::{ConstructionStage, StageStatus};
use stages_server::{App, HandlerConfig, StageHandler};
use stages_store::MemoryStore;

use crate::error::TestError;
use crate::response::TestResponse;

/// Drives an [`App`] backed by a [`MemoryStore`] without binding a socket.
///
/// Requests go through the same dispatcher the HTTP server uses, so routing,
/// body parsing, error envelopes and headers are all exercised.
#[derive(Clone)]
pub struct TestClient {
    app: Arc<App>,
    store: Arc<MemoryStore>,
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("config", &self.app.handler().config())
            .finish_non_exhaustive()
    }
}

impl TestClient {
    /// Creates a client over an empty [`MemoryStore`] with default settings.
    pub fn memory() -> Self {
        Self::with_config(HandlerConfig::default())
    }

    /// Creates a client over an empty [`MemoryStore`].
    pub fn with_config(config: HandlerConfig) -> Self {
        Self::try_with_config(config).expect("route table should compile")
    }

    /// Creates a client over an empty [`MemoryStore`], reporting setup
    /// failures.
    pub fn try_with_config(config: HandlerConfig) -> Result<Self, TestError> {
        let store = Arc::new(MemoryStore::new());
        let handler = StageHandler::new(store.clone(), config);
        let app = App::new(handler)?;
        Ok(Self {
            app: Arc::new(app),
            store,
        })
    }

    /// The app under test.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The store behind the app, for inspecting state the API hides.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Creates a GET request builder.
    pub fn get(&self, path: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::GET, path)
    }

    /// Creates a POST request builder.
    pub fn post(&self, path: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::POST, path)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, path: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::PATCH, path)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, path: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, path: impl Into<String>) -> TestRequest<'_> {
        TestRequest {
            client: self,
            method,
            path: path.into(),
            body: Ok(Bytes::new()),
        }
    }

    /// Creates a stage through the API and returns the stored record.
    ///
    /// # Panics
    ///
    /// Panics if the app does not answer 201.
    pub async fn create_stage<T: Serialize>(&self, payload: &T) -> ConstructionStage {
        let response = self.post("/constructionStages").json(payload).send().await;
        response.assert_status(http::StatusCode::CREATED);
        response.json().expect("created stage should deserialize")
    }

    /// Returns the status a stage has in storage, deleted or not.
    pub fn stored_status(&self, id: i64) -> Option<StageStatus> {
        self.store.get_raw(id).map(|stage| stage.status)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> Result<TestResponse, TestError> {
        let response = self.app.handle(method, path, body).await;
        TestResponse::from_http(response).await
    }
}

/// A request builder bound to a test client.
pub struct TestRequest<'a> {
    client: &'a TestClient,
    method: Method,
    path: String,
    body: Result<Bytes, TestError>,
}

impl TestRequest<'_> {
    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Ok(body.into());
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.body = serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| TestError::RequestBuild(e.to_string()));
        self
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the body could not be built or read.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("request should succeed")
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let body = self.body?;
        self.client.dispatch(&self.method, &self.path, &body).await
    }
}
