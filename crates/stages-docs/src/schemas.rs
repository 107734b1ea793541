//! Component schemas for the construction stage resource.

use indexmap::IndexMap;

use stages_core::validate::MAX_TEXT_LENGTH;
use stages_core::{DurationUnit, StageStatus};

use crate::openapi::Schema;

/// Resource object component.
pub const STAGE: &str = "ConstructionStage";
/// Create payload component.
pub const STAGE_CREATE: &str = "ConstructionStageCreate";
/// Update payload component.
pub const STAGE_UPDATE: &str = "ConstructionStageUpdate";
/// Success envelope component.
pub const SUCCESS: &str = "Success";
/// Error envelope component.
pub const ERROR: &str = "Error";

/// Hex colour pattern accepted for `color`.
pub const COLOR_PATTERN: &str = "^#([a-fA-F0-9]{3}){1,2}$";

fn timestamp() -> Schema {
    Schema::string()
        .with_format("date-time")
        .with_example("2024-01-01T00:00:00Z")
}

fn duration_unit() -> Schema {
    Schema::string()
        .with_enum(DurationUnit::ALL.iter().map(|u| u.as_str()))
        .with_default(DurationUnit::default().as_str())
}

fn status(values: &[StageStatus]) -> Schema {
    Schema::string()
        .with_enum(values.iter().map(|s| s.as_str()))
        .with_default(StageStatus::default().as_str())
}

fn color() -> Schema {
    Schema::string()
        .with_pattern(COLOR_PATTERN)
        .with_example("#FF0000")
}

fn text() -> Schema {
    Schema::string().with_max_length(MAX_TEXT_LENGTH)
}

fn stage() -> Schema {
    Schema::object()
        .with_description("A construction stage as stored by the service")
        .property("id", Schema::integer().read_only())
        .property("name", text())
        .property("startDate", timestamp())
        .property("endDate", timestamp().nullable())
        .property(
            "duration",
            Schema::number()
                .nullable()
                .read_only()
                .with_description("Derived from startDate, endDate and durationUnit"),
        )
        .property("durationUnit", duration_unit())
        .property("color", color().nullable())
        .property("externalId", text().nullable())
        .property("status", status(&StageStatus::ALL))
        .required_property("id")
        .required_property("name")
        .required_property("startDate")
        .required_property("durationUnit")
        .required_property("status")
}

fn create() -> Schema {
    Schema::object()
        .with_description("Payload for creating a construction stage")
        .property("name", text())
        .property("startDate", timestamp())
        .property(
            "endDate",
            timestamp().with_description("Must be after startDate"),
        )
        .property("durationUnit", duration_unit())
        .property("color", color())
        .property("externalId", text())
        .property("status", status(&[StageStatus::New, StageStatus::Planned]))
        .required_property("name")
        .required_property("startDate")
}

fn update() -> Schema {
    Schema::object()
        .with_description(
            "Partial update; omitted fields keep their stored value, null or empty \
             endDate, color and externalId clear it",
        )
        .property("name", text())
        .property("startDate", timestamp())
        .property("endDate", timestamp().nullable())
        .property("durationUnit", duration_unit())
        .property("color", color().nullable())
        .property("externalId", text().nullable())
        .property("status", status(&StageStatus::ALL))
}

fn success() -> Schema {
    Schema::object().property(
        "success",
        Schema::object()
            .property("code", Schema::integer())
            .property("message", Schema::string())
            .required_property("code")
            .required_property("message"),
    )
}

fn error() -> Schema {
    Schema::object().property(
        "error",
        Schema::object()
            .property("code", Schema::integer())
            .property("message", Schema::string())
            .property(
                "errors",
                Schema::array(Schema::string())
                    .with_description("One message per violated rule (422 only)"),
            )
            .required_property("code")
            .required_property("message"),
    )
}

/// All component schemas, in document order.
pub fn components() -> IndexMap<String, Schema> {
    [
        (STAGE, stage()),
        (STAGE_CREATE, create()),
        (STAGE_UPDATE, update()),
        (SUCCESS, success()),
        (ERROR, error()),
    ]
    .into_iter()
    .map(|(name, schema)| (name.to_string(), schema))
    .collect()
}
