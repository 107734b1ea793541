//! Endpoint descriptions consumed by the generator.

use http::{Method, StatusCode};

/// Shape of a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseBody {
    /// A single instance of the named component.
    One(&'static str),
    /// A JSON array of the named component.
    List(&'static str),
}

/// A path parameter description, bound positionally to the pattern's captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDoc {
    /// Name used in the OpenAPI path template.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

/// Documentation for one routed endpoint.
///
/// `pattern` is the router pattern (e.g. `constructionStages/(:num)`); the
/// generator turns captured placeholders into `{name}` path parameters.
#[derive(Debug, Clone)]
pub struct EndpointDoc {
    /// HTTP verb.
    pub method: Method,
    /// Router pattern.
    pub pattern: String,
    /// Unique operation identifier.
    pub operation_id: &'static str,
    /// One-line summary.
    pub summary: &'static str,
    /// Grouping tag.
    pub tag: &'static str,
    /// Path parameters in capture order.
    pub params: Vec<ParamDoc>,
    /// Request body component, if the endpoint takes one.
    pub request: Option<&'static str>,
    /// Success status and body.
    pub success: (StatusCode, &'static str, ResponseBody),
    /// Documented failure statuses.
    pub errors: Vec<(StatusCode, &'static str)>,
}

impl EndpointDoc {
    /// Starts a description answering `200` with `body`.
    pub fn new(
        method: Method,
        pattern: impl Into<String>,
        operation_id: &'static str,
        summary: &'static str,
        body: ResponseBody,
    ) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            operation_id,
            summary,
            tag: "default",
            params: Vec::new(),
            request: None,
            success: (StatusCode::OK, "Successful response", body),
            errors: Vec::new(),
        }
    }

    /// Sets the grouping tag.
    #[must_use]
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    /// Adds the next path parameter.
    #[must_use]
    pub fn param(mut self, name: &'static str, description: &'static str) -> Self {
        self.params.push(ParamDoc { name, description });
        self
    }

    /// Sets the request body component.
    #[must_use]
    pub fn request(mut self, component: &'static str) -> Self {
        self.request = Some(component);
        self
    }

    /// Overrides the success status and its description.
    #[must_use]
    pub fn success(mut self, status: StatusCode, description: &'static str) -> Self {
        self.success.0 = status;
        self.success.1 = description;
        self
    }

    /// Documents a failure status.
    #[must_use]
    pub fn error(mut self, status: StatusCode, description: &'static str) -> Self {
        self.errors.push((status, description));
        self
    }
}
