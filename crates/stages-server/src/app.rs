//! Transport-independent request dispatch.
//!
//! [`App::handle`] takes a verb, a path and the raw body and produces the
//! complete HTTP response, so the hyper server and the in-process test
//! client share one code path.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, Response, StatusCode};
use http_body_util::Full;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use stages_core::{ApiError, ApiResult, RequestContext, RequestId};
use stages_router::{normalize, Router};
use stages_telemetry::{log_request_complete, log_request_error, log_request_start};

use crate::handler::{StageHandler, UpdateOutcome};
use crate::routes::{self, Operation};
use crate::ServerError;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Version reported by the welcome document and the API document.
pub const API_VERSION: &str = "1.0.0";

/// Header carrying the request id on every response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
];

const FALLBACK_ERROR: &str = r#"{"error":{"code":500,"message":"Internal server error"}}"#;

#[derive(Debug, Serialize)]
struct Welcome {
    message: &'static str,
    version: &'static str,
    endpoints: IndexMap<String, &'static str>,
    documentation: &'static str,
    swagger: &'static str,
}

/// A status plus an already-serialized JSON body.
struct Reply {
    status: StatusCode,
    body: Bytes,
}

impl Reply {
    fn json<T: Serialize>(status: StatusCode, value: &T) -> ApiResult<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| ApiError::persistence("Failed to encode response", e))?;
        Ok(Self {
            status,
            body: Bytes::from(body),
        })
    }

    fn error(error: &ApiError) -> Self {
        let body = serde_json::to_vec(&error.to_envelope())
            .map_or_else(|_| Bytes::from_static(FALLBACK_ERROR.as_bytes()), Bytes::from);
        Self {
            status: error.status_code(),
            body,
        }
    }
}

/// The construction stages API as a function from request to response.
pub struct App {
    router: Router<Operation>,
    handler: StageHandler,
    welcome: Bytes,
    openapi: Bytes,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.router.len())
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Builds the route table and pre-renders the static documents.
    pub fn new(handler: StageHandler) -> Result<Self, ServerError> {
        let router = routes::stage_routes()?;

        let welcome = Welcome {
            message: "Welcome to the Construction Stages API",
            version: API_VERSION,
            endpoints: Operation::ALL
                .iter()
                .map(|op| {
                    let path = if op.pattern().contains("(:num)") {
                        "/constructionStages/{id}"
                    } else {
                        "/constructionStages"
                    };
                    (format!("{} {path}", op.method()), op.summary())
                })
                .collect(),
            documentation: "See docs/api.md for detailed API documentation",
            swagger: "See /swagger.json for OpenAPI/Swagger documentation",
        };
        let welcome = Bytes::from(
            serde_json::to_vec(&welcome).map_err(stages_docs::DocsError::from)?,
        );

        let openapi = routes::openapi(API_VERSION)?;
        let openapi = Bytes::from(
            serde_json::to_vec_pretty(&openapi).map_err(stages_docs::DocsError::from)?,
        );

        Ok(Self {
            router,
            handler,
            welcome,
            openapi,
        })
    }

    /// The resource handler.
    pub fn handler(&self) -> &StageHandler {
        &self.handler
    }

    /// Handles one request.
    ///
    /// Never fails: every error is rendered as an error envelope.
    pub async fn handle(&self, method: &Method, path: &str, body: &[u8]) -> HttpResponse {
        let mut ctx = RequestContext::new();
        log_request_start!(ctx.request_id(), method, path);

        let reply = match self.dispatch(&mut ctx, method, path, body).await {
            Ok(reply) => reply,
            Err(error) => {
                if error.status_code().is_server_error() {
                    log_request_error!(ctx.request_id(), error);
                } else {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        error = %error,
                        "Request rejected"
                    );
                }
                Reply::error(&error)
            }
        };

        let elapsed_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX);
        log_request_complete!(
            ctx.request_id(),
            ctx.operation_id(),
            reply.status.as_u16(),
            elapsed_ms
        );

        build_response(reply, ctx.request_id())
    }

    async fn dispatch(
        &self,
        ctx: &mut RequestContext,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> ApiResult<Reply> {
        if !matches!(
            *method,
            Method::GET | Method::POST | Method::PATCH | Method::DELETE
        ) {
            return Err(ApiError::method_not_allowed(method.as_str()));
        }

        let normalized = normalize(path);
        if *method == Method::GET {
            if normalized.is_empty() {
                return Ok(Reply {
                    status: StatusCode::OK,
                    body: self.welcome.clone(),
                });
            }
            if normalized.eq_ignore_ascii_case("swagger.json") {
                return Ok(Reply {
                    status: StatusCode::OK,
                    body: self.openapi.clone(),
                });
            }
        }

        let matched = self
            .router
            .match_route(method, normalized)
            .ok_or_else(|| ApiError::route_not_found(path))?;
        let op = *matched.target();
        ctx.set_operation_id(op.operation_id());

        // Digit runs too long for i64 cannot name a stored record.
        let id = || {
            matched
                .params()
                .parse::<i64>(0)
                .ok_or_else(ApiError::stage_not_found)
        };
        let payload = if op.has_body() {
            Some(parse_body(body)?)
        } else {
            None
        };
        let payload = payload.as_ref().unwrap_or(&Value::Null);

        match op {
            Operation::ListStages => Reply::json(StatusCode::OK, &self.handler.list().await?),
            Operation::GetStage => Reply::json(StatusCode::OK, &self.handler.get(id()?).await?),
            Operation::CreateStage => {
                Reply::json(StatusCode::CREATED, &self.handler.create(payload).await?)
            }
            Operation::UpdateStage => match self.handler.update(id()?, payload).await? {
                UpdateOutcome::Updated(stage) => Reply::json(StatusCode::OK, &stage),
                UpdateOutcome::Deleted(envelope) => Reply::json(StatusCode::OK, &envelope),
            },
            Operation::DeleteStage => {
                Reply::json(StatusCode::OK, &self.handler.delete(id()?).await?)
            }
        }
    }
}

fn parse_body(body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::malformed("Request body is empty"));
    }
    serde_json::from_slice(body).map_err(|_| ApiError::malformed("Invalid JSON in request body"))
}

fn build_response(reply: Reply, request_id: RequestId) -> HttpResponse {
    let mut response = Response::new(Full::new(reply.body));
    *response.status_mut() = reply.status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerConfig;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use stages_store::MemoryStore;

    fn app() -> App {
        let handler = StageHandler::new(Arc::new(MemoryStore::new()), HandlerConfig::default());
        App::new(handler).unwrap()
    }

    async fn json_body(response: HttpResponse) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_welcome_document() {
        let response = app().handle(&Method::GET, "/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Welcome to the Construction Stages API");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(
            body["endpoints"]["GET /constructionStages/{id}"],
            "Get a specific construction stage"
        );
        assert_eq!(body["endpoints"].as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_swagger_document() {
        let response = app().handle(&Method::GET, "/swagger.json", b"").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["openapi"], "3.1.0");
        assert_eq!(body["info"]["title"], "Construction Stages API");
    }

    #[tokio::test]
    async fn test_headers() {
        let response = app().handle(&Method::GET, "/constructionStages", b"").await;
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");

        let request_id = headers[REQUEST_ID_HEADER].to_str().unwrap();
        assert_eq!(uuid_version(request_id), Some('7'));
    }

    fn uuid_version(id: &str) -> Option<char> {
        id.chars().nth(14)
    }

    #[tokio::test]
    async fn test_unsupported_verb() {
        let response = app().handle(&Method::PUT, "/constructionStages/1", b"{}").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], 405);
        assert_eq!(body["error"]["message"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_route_not_found() {
        let app = app();
        for (method, path) in [
            (Method::GET, "/unknown"),
            (Method::GET, "/constructionStages/abc"),
            (Method::DELETE, "/constructionStages"),
            (Method::POST, "/"),
        ] {
            let response = app.handle(&method, path, b"{}").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {path}");
            let body = json_body(response).await;
            assert_eq!(body["error"]["message"], "Route not found");
        }
    }

    #[tokio::test]
    async fn test_empty_body() {
        let response = app().handle(&Method::POST, "/constructionStages", b"  ").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Request body is empty");
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let response = app()
            .handle(&Method::POST, "/constructionStages", b"{not json")
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Invalid JSON in request body");
    }

    #[tokio::test]
    async fn test_create_returns_201() {
        let body = br#"{"name":"Foundation","startDate":"2024-01-01T00:00:00Z","endDate":"2024-01-08T00:00:00Z","durationUnit":"DAYS"}"#;
        let response = app().handle(&Method::POST, "/constructionStages", body).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["duration"], 7.0);
        assert_eq!(body["status"], "NEW");
        assert_eq!(body["color"], Value::Null);
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let response = app()
            .handle(&Method::POST, "/constructionStages", br#"{"name":""}"#)
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], 422);
        assert_eq!(body["error"]["message"], "Validation failed");
        let errors = body["error"]["errors"].as_array().unwrap();
        assert!(errors.iter().any(|e| e.as_str().unwrap().contains("required")));
    }

    #[tokio::test]
    async fn test_oversized_id_is_not_found() {
        let response = app()
            .handle(&Method::GET, "/constructionStages/99999999999999999999999", b"")
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Construction stage not found");
    }

    #[tokio::test]
    async fn test_get_ignores_body() {
        let response = app()
            .handle(&Method::GET, "/constructionStages", b"{garbage")
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!([]));
    }
}
