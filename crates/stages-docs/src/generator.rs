//! Builds an OpenAPI document from endpoint descriptions.

use std::sync::OnceLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use stages_router::Placeholder;

use crate::endpoint::{EndpointDoc, ResponseBody};
use crate::error::{DocsError, DocsResult};
use crate::openapi::{
    Components, Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Schema, Server, Tag,
};
use crate::schemas;

/// Default document title.
pub const DEFAULT_TITLE: &str = "Construction Stages API";

/// Default document description.
pub const DEFAULT_DESCRIPTION: &str =
    "API for managing construction stages with validation and automatic duration calculation";

/// Generator for OpenAPI documents.
///
/// # Example
///
/// ```
/// use http::Method;
/// use stages_docs::{EndpointDoc, OpenApiGenerator, ResponseBody};
///
/// let endpoints = vec![EndpointDoc::new(
///     Method::GET,
///     "constructionStages/(:num)",
///     "getStage",
///     "Get a specific construction stage",
///     ResponseBody::One("ConstructionStage"),
/// )
/// .param("id", "The ID of the construction stage")];
///
/// let doc = OpenApiGenerator::new().version("1.0.0").generate(&endpoints).unwrap();
/// assert!(doc.paths.contains_key("/constructionStages/{id}"));
/// ```
#[derive(Debug, Clone)]
pub struct OpenApiGenerator {
    title: String,
    version: String,
    description: Option<String>,
    servers: Vec<Server>,
}

impl Default for OpenApiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiGenerator {
    /// Create a generator with the default title and description.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: "1.0.0".to_string(),
            description: Some(DEFAULT_DESCRIPTION.to_string()),
            servers: Vec::new(),
        }
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Generate the document. Paths keep the order of `endpoints`.
    pub fn generate(&self, endpoints: &[EndpointDoc]) -> DocsResult<OpenApi> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tags: IndexSet<&str> = IndexSet::new();

        for endpoint in endpoints {
            let (path, parameters) = path_template(endpoint)?;
            let operation = convert_endpoint(endpoint, parameters);
            tags.insert(endpoint.tag);

            paths
                .entry(path)
                .or_default()
                .set(&endpoint.method, operation)
                .map_err(|_| DocsError::InvalidOperation {
                    operation_id: endpoint.operation_id.to_string(),
                    reason: format!("unsupported HTTP method: {}", endpoint.method),
                })?;
        }

        Ok(OpenApi {
            openapi: "3.1.0".to_string(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            servers: self.servers.clone(),
            paths,
            components: Some(Components {
                schemas: schemas::components(),
            }),
            tags: tags
                .into_iter()
                .map(|name| Tag {
                    name: name.to_string(),
                    description: None,
                })
                .collect(),
        })
    }

    /// Generate the document as pretty-printed JSON.
    pub fn generate_json(&self, endpoints: &[EndpointDoc]) -> DocsResult<String> {
        let doc = self.generate(endpoints)?;
        serde_json::to_string_pretty(&doc).map_err(DocsError::from)
    }
}

fn convert_endpoint(endpoint: &EndpointDoc, parameters: Vec<Parameter>) -> Operation {
    let mut responses: IndexMap<String, Response> = IndexMap::new();

    let (status, description, body) = endpoint.success;
    let schema = match body {
        ResponseBody::One(name) => Schema::component(name),
        ResponseBody::List(name) => Schema::array(Schema::component(name)),
    };
    responses.insert(
        status.as_u16().to_string(),
        Response {
            description: description.to_string(),
            content: MediaType::json(schema),
        },
    );

    for (status, description) in &endpoint.errors {
        responses.insert(
            status.as_u16().to_string(),
            Response {
                description: (*description).to_string(),
                content: MediaType::json(Schema::component(schemas::ERROR)),
            },
        );
    }

    let request_body = endpoint.request.map(|name| RequestBody {
        description: None,
        required: true,
        content: MediaType::json(Schema::component(name)),
    });

    Operation {
        operation_id: endpoint.operation_id.to_string(),
        summary: Some(endpoint.summary.to_string()),
        description: None,
        tags: vec![endpoint.tag.to_string()],
        parameters,
        request_body,
        responses,
    }
}

fn capture_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(:([a-z]+)\)").expect("valid regex"))
}

/// Turns `constructionStages/(:num)` into `/constructionStages/{id}` and the
/// matching path parameters.
fn path_template(endpoint: &EndpointDoc) -> DocsResult<(String, Vec<Parameter>)> {
    let invalid = |reason: String| DocsError::InvalidOperation {
        operation_id: endpoint.operation_id.to_string(),
        reason,
    };

    let pattern = stages_router::normalize(&endpoint.pattern);
    let mut path = String::with_capacity(pattern.len() + 8);
    path.push('/');

    let mut parameters = Vec::new();
    let mut last = 0;

    for (index, caps) in capture_regex().captures_iter(pattern).enumerate() {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let placeholder = Placeholder::from_name(kind.as_str())
            .ok_or_else(|| invalid(format!("unknown placeholder :{}", kind.as_str())))?;
        let doc = endpoint.params.get(index).ok_or_else(|| {
            invalid(format!("no parameter documented for capture {}", index + 1))
        })?;

        path.push_str(&pattern[last..whole.start()]);
        path.push('{');
        path.push_str(doc.name);
        path.push('}');
        last = whole.end();

        let schema = match placeholder {
            Placeholder::Num => Schema::integer(),
            _ => Schema::string(),
        };
        parameters.push(Parameter {
            name: doc.name.to_string(),
            location: ParameterIn::Path,
            description: Some(doc.description.to_string()),
            required: true,
            schema: Some(schema),
        });
    }
    path.push_str(&pattern[last..]);

    if parameters.len() != endpoint.params.len() {
        return Err(invalid(format!(
            "{} parameters documented but pattern has {} captures",
            endpoint.params.len(),
            parameters.len()
        )));
    }

    Ok((path, parameters))
}
