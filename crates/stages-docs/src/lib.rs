//! API documentation for the construction stages service.
//!
//! - **OpenAPI 3.1** document generated from [`EndpointDoc`] descriptions,
//!   served at `/swagger.json`
//! - **Markdown** reference rendered from the same document
//!
//! ```rust
//! use http::Method;
//! use stages_docs::{render_markdown, EndpointDoc, OpenApiGenerator, ResponseBody};
//!
//! let endpoints = vec![EndpointDoc::new(
//!     Method::GET,
//!     "constructionStages",
//!     "listStages",
//!     "Get all construction stages",
//!     ResponseBody::List("ConstructionStage"),
//! )];
//!
//! let doc = OpenApiGenerator::new().generate(&endpoints).unwrap();
//! let md = render_markdown(&doc);
//! assert!(md.contains("GET /constructionStages"));
//! ```

#![doc(html_root_url = "https://docs.rs/stages-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod endpoint;
mod error;
mod generator;
mod markdown;
mod openapi;
pub mod schemas;

use std::fs;
use std::path::{Path, PathBuf};

pub use endpoint::{EndpointDoc, ParamDoc, ResponseBody};
pub use error::{DocsError, DocsResult};
pub use generator::{OpenApiGenerator, DEFAULT_DESCRIPTION, DEFAULT_TITLE};
pub use markdown::render_markdown;
pub use openapi::{
    Components, Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Schema, SchemaType, Server, Tag,
};

/// File name of the OpenAPI document written by [`write_docs`].
pub const SWAGGER_FILE: &str = "swagger.json";
/// File name of the Markdown reference written by [`write_docs`].
pub const MARKDOWN_FILE: &str = "api.md";

/// Writes `swagger.json` and `api.md` into `dir`, creating it if needed.
///
/// Returns the paths written.
pub fn write_docs(dir: impl AsRef<Path>, doc: &OpenApi) -> DocsResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let swagger = dir.join(SWAGGER_FILE);
    fs::write(&swagger, serde_json::to_string_pretty(doc)?)?;

    let markdown = dir.join(MARKDOWN_FILE);
    fs::write(&markdown, render_markdown(doc))?;

    Ok(vec![swagger, markdown])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_docs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("docs");
        let doc = OpenApiGenerator::new().generate(&[]).unwrap();

        let written = write_docs(&target, &doc).unwrap();
        assert_eq!(written, vec![target.join(SWAGGER_FILE), target.join(MARKDOWN_FILE)]);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json["info"]["title"], DEFAULT_TITLE);

        let md = fs::read_to_string(&written[1]).unwrap();
        assert!(md.contains("## Schemas"));
    }
}
