//! Markdown API reference rendered from an OpenAPI document.

use std::fmt::Write;

use crate::openapi::{OpenApi, Operation, Schema, SchemaType};

/// Renders a human-readable API reference.
///
/// Endpoints appear in document order, followed by one field table per
/// component schema.
pub fn render_markdown(doc: &OpenApi) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", doc.info.title);
    if let Some(description) = &doc.info.description {
        let _ = writeln!(out, "{description}\n");
    }
    let _ = writeln!(out, "Version: `{}`\n", doc.info.version);

    out.push_str("## Endpoints\n\n");
    for (path, verb, op) in doc.operations() {
        render_operation(&mut out, path, verb, op);
    }

    if let Some(components) = &doc.components {
        out.push_str("## Schemas\n\n");
        for (name, schema) in &components.schemas {
            render_schema(&mut out, name, schema);
        }
    }

    out
}

fn render_operation(out: &mut String, path: &str, verb: &str, op: &Operation) {
    let _ = writeln!(out, "### {verb} {path}\n");
    if let Some(summary) = &op.summary {
        let _ = writeln!(out, "{summary}\n");
    }
    let _ = writeln!(out, "Operation ID: `{}`\n", op.operation_id);

    if !op.parameters.is_empty() {
        out.push_str("**Path parameters**\n\n");
        out.push_str("| Name | Type | Description |\n|------|------|-------------|\n");
        for param in &op.parameters {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} |",
                param.name,
                param.schema.as_ref().map_or_else(|| "string".to_string(), type_name),
                param.description.as_deref().unwrap_or("")
            );
        }
        out.push('\n');
    }

    if let Some(body) = &op.request_body {
        let schema = body.content.values().find_map(|m| m.schema.as_ref());
        if let Some(schema) = schema {
            let _ = writeln!(out, "**Request body**: {}\n", type_name(schema));
        }
    }

    out.push_str("**Responses**\n\n");
    out.push_str("| Status | Description | Body |\n|--------|-------------|------|\n");
    for (status, response) in &op.responses {
        let body = response
            .content
            .values()
            .find_map(|m| m.schema.as_ref())
            .map_or_else(String::new, type_name);
        let _ = writeln!(out, "| {status} | {} | {body} |", response.description);
    }
    out.push('\n');
}

fn render_schema(out: &mut String, name: &str, schema: &Schema) {
    let _ = writeln!(out, "### {name}\n");
    if let Some(description) = &schema.description {
        let _ = writeln!(out, "{description}\n");
    }
    if schema.properties.is_empty() {
        return;
    }

    out.push_str("| Field | Type | Required | Notes |\n|-------|------|----------|-------|\n");
    for (field, prop) in &schema.properties {
        let required = if schema.required.iter().any(|r| r == field) {
            "yes"
        } else {
            "no"
        };
        let _ = writeln!(
            out,
            "| `{field}` | {} | {required} | {} |",
            type_name(prop),
            notes(prop)
        );
    }
    out.push('\n');
}

fn type_name(schema: &Schema) -> String {
    if let Some(name) = schema.component_name() {
        return format!("`{name}`");
    }

    let base = match schema.schema_type {
        Some(SchemaType::Array) => {
            let items = schema.items.as_deref().map_or_else(|| "any".to_string(), type_name);
            return format!("array of {items}");
        }
        Some(SchemaType::String) => "string",
        Some(SchemaType::Number) => "number",
        Some(SchemaType::Integer) => "integer",
        Some(SchemaType::Boolean) => "boolean",
        Some(SchemaType::Object) => "object",
        None => "any",
    };

    let mut name = match &schema.format {
        Some(format) => format!("{base} ({format})"),
        None => base.to_string(),
    };
    if schema.nullable {
        name.push_str(", nullable");
    }
    name
}

fn notes(schema: &Schema) -> String {
    let mut notes = Vec::new();

    if !schema.enum_values.is_empty() {
        let values: Vec<String> = schema
            .enum_values
            .iter()
            .map(|v| format!("`{}`", v.as_str().unwrap_or_default()))
            .collect();
        notes.push(format!("one of {}", values.join(", ")));
    }
    if let Some(default) = schema.default.as_ref().and_then(|v| v.as_str()) {
        notes.push(format!("default `{default}`"));
    }
    if let Some(max) = schema.max_length {
        notes.push(format!("max {max} chars"));
    }
    if let Some(pattern) = &schema.pattern {
        notes.push(format!("pattern `{pattern}`"));
    }
    if schema.read_only {
        notes.push("read-only".to_string());
    }
    if let Some(description) = &schema.description {
        notes.push(description.clone());
    }

    notes.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointDoc, ResponseBody};
    use crate::schemas;
    use crate::OpenApiGenerator;
    use http::{Method, StatusCode};

    fn sample() -> OpenApi {
        let endpoints = vec![
            EndpointDoc::new(
                Method::GET,
                "constructionStages",
                "listStages",
                "Get all construction stages",
                ResponseBody::List(schemas::STAGE),
            ),
            EndpointDoc::new(
                Method::PATCH,
                "constructionStages/(:num)",
                "updateStage",
                "Update a construction stage",
                ResponseBody::One(schemas::STAGE),
            )
            .param("id", "The ID of the construction stage")
            .request(schemas::STAGE_UPDATE)
            .error(StatusCode::NOT_FOUND, "Construction stage not found"),
        ];
        OpenApiGenerator::new().generate(&endpoints).unwrap()
    }

    #[test]
    fn test_render_header() {
        let md = render_markdown(&sample());
        assert!(md.starts_with("# Construction Stages API\n"));
        assert!(md.contains("Version: `1.0.0`"));
    }

    #[test]
    fn test_render_endpoints_in_order() {
        let md = render_markdown(&sample());
        let list = md.find("### GET /constructionStages").unwrap();
        let patch = md.find("### PATCH /constructionStages/{id}").unwrap();
        assert!(list < patch);
        assert!(md.contains("| `id` | integer | The ID of the construction stage |"));
        assert!(md.contains("**Request body**: `ConstructionStageUpdate`"));
        assert!(md.contains("| 200 | Successful response | array of `ConstructionStage` |"));
        assert!(md.contains("| 404 | Construction stage not found | `Error` |"));
    }

    #[test]
    fn test_render_schema_tables() {
        let md = render_markdown(&sample());
        assert!(md.contains("### ConstructionStage\n"));
        assert!(md.contains("| `name` | string | yes | max 255 chars |"));
        assert!(md.contains("one of `HOURS`, `DAYS`, `WEEKS`; default `DAYS`"));
        assert!(md.contains("| `endDate` | string (date-time), nullable | no |"));
    }
}
