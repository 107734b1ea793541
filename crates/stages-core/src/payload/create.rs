use serde_json::Value;

use super::{Field, RawStage};
use crate::validate::{self, MAX_TEXT_LENGTH};
use crate::{duration, timestamp, ApiError, DurationUnit, NewStage, StageStatus};

/// Body of a create request.
///
/// Omitted optional fields take their defaults: no end date, `DAYS`, no
/// color, no external id, `NEW`. A client-sent `duration` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    raw: RawStage,
}

impl CreateRequest {
    /// Decodes a request body. Fails only when the body is not a JSON object.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        RawStage::from_json(body).map(|raw| Self { raw })
    }

    /// Runs every rule and returns either the normalized record or all
    /// violations in rule order.
    pub fn validate(&self) -> Result<NewStage, Vec<String>> {
        let raw = &self.raw;
        let mut errors = Vec::new();

        let name = raw.name.text();
        errors.extend(
            raw.name
                .type_error(Field::Name)
                .or_else(|| validate::required(name, Field::Name.label()))
                .or_else(|| validate::max_length(name, Field::Name.label(), MAX_TEXT_LENGTH)),
        );

        let start_raw = raw.start_date.text();
        errors.extend(
            raw.start_date
                .type_error(Field::StartDate)
                .or_else(|| validate::required(start_raw, Field::StartDate.label()))
                .or_else(|| validate::iso_timestamp(start_raw, Field::StartDate.label())),
        );
        let start_date = start_raw.and_then(timestamp::parse);

        let end_raw = raw.end_date.non_blank();
        errors.extend(
            raw.end_date
                .type_error(Field::EndDate)
                .or_else(|| validate::iso_timestamp(end_raw, Field::EndDate.label())),
        );
        let end_date = end_raw.and_then(timestamp::parse);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.push("End date must be after start date".to_string());
            }
        }

        let unit_raw = raw.duration_unit.non_blank();
        errors.extend(
            raw.duration_unit
                .type_error(Field::DurationUnit)
                .or_else(|| {
                    validate::enum_one_of(
                        unit_raw,
                        Field::DurationUnit.label(),
                        &DurationUnit::ALL.map(DurationUnit::as_str),
                    )
                }),
        );

        let color = raw.color.non_blank();
        errors.extend(
            raw.color
                .type_error(Field::Color)
                .or_else(|| validate::hex_color(color, Field::Color.label())),
        );

        let external_id = raw.external_id.non_blank();
        errors.extend(
            raw.external_id
                .type_error(Field::ExternalId)
                .or_else(|| validate::max_length(external_id, Field::ExternalId.label(), MAX_TEXT_LENGTH)),
        );

        let status_raw = raw.status.non_blank();
        errors.extend(
            raw.status
                .type_error(Field::Status)
                .or_else(|| {
                    validate::enum_one_of(
                        status_raw,
                        Field::Status.label(),
                        &StageStatus::ALL.map(StageStatus::as_str),
                    )
                }),
        );
        let status = status_raw.map_or(Some(StageStatus::default()), |s| s.parse().ok());
        if status == Some(StageStatus::Deleted) {
            errors.push("Status DELETED cannot be set on a new construction stage".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let duration_unit = unit_raw.map_or(Some(DurationUnit::default()), |u| u.parse().ok());
        let (Some(name), Some(start_date), Some(duration_unit), Some(status)) =
            (name, start_date, duration_unit, status)
        else {
            return Err(errors);
        };

        Ok(NewStage {
            name: name.trim().to_string(),
            start_date,
            end_date,
            duration: duration::compute(Some(start_date), end_date, Some(duration_unit)),
            duration_unit,
            color: color.map(str::to_string),
            external_id: external_id.map(str::to_string),
            status,
        })
    }
}
