use serde_json::Value;

use super::{Field, FieldValue, RawStage};
use crate::validate::{self, MAX_TEXT_LENGTH};
use crate::{duration, timestamp, ApiError, ConstructionStage, DurationUnit, StagePatch, StageStatus};

/// Body of a partial update.
///
/// Omitted keys are neither validated nor changed. `null` or a blank string
/// clears `endDate`, `color` and `externalId`. On `durationUnit` and `status`
/// it counts as omitted, just as create falls back to the default there; on
/// `name` and `startDate` a blank string fails `required`. The patch is
/// merged with the stored record before the date ordering check and before
/// the duration is recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    raw: RawStage,
}

impl UpdateRequest {
    /// Decodes a request body. Fails only when the body is not a JSON object.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        RawStage::from_json(body).map(|raw| Self { raw })
    }

    /// Validates the supplied fields against `existing` and returns the
    /// normalized patch, or every violation in rule order.
    ///
    /// An empty patch carries no duration either, so applying it is a no-op.
    pub fn validate(&self, existing: &ConstructionStage) -> Result<StagePatch, Vec<String>> {
        let raw = &self.raw;
        let mut errors = Vec::new();
        let mut patch = StagePatch::default();

        if raw.name.is_supplied() {
            let name = raw.name.text();
            match raw
                .name
                .type_error(Field::Name)
                .or_else(|| validate::required(name, Field::Name.label()))
                .or_else(|| validate::max_length(name, Field::Name.label(), MAX_TEXT_LENGTH))
            {
                Some(error) => errors.push(error),
                None => patch.name = name.map(|n| n.trim().to_string()),
            }
        }

        let mut dates_valid = true;
        if raw.start_date.is_supplied() {
            let start = raw.start_date.text();
            match raw
                .start_date
                .type_error(Field::StartDate)
                .or_else(|| validate::required(start, Field::StartDate.label()))
                .or_else(|| validate::iso_timestamp(start, Field::StartDate.label()))
            {
                Some(error) => {
                    errors.push(error);
                    dates_valid = false;
                }
                None => patch.start_date = start.and_then(timestamp::parse),
            }
        }

        match clearable(&raw.end_date, Field::EndDate, |v| {
            validate::iso_timestamp(Some(v), Field::EndDate.label())
        }) {
            Ok(Some(None)) => patch.end_date = Some(None),
            Ok(Some(Some(end))) => patch.end_date = Some(timestamp::parse(&end)),
            Ok(None) => {}
            Err(error) => {
                errors.push(error);
                dates_valid = false;
            }
        }

        let start = patch.start_date.unwrap_or(existing.start_date);
        let end = patch.end_date.unwrap_or(existing.end_date);
        let dates_touched = patch.start_date.is_some() || patch.end_date.is_some();
        if dates_valid && dates_touched && end.is_some_and(|end| end < start) {
            errors.push("End date must be after start date".to_string());
        }

        if raw.duration_unit.is_supplied() {
            let unit = raw.duration_unit.non_blank();
            match raw
                .duration_unit
                .type_error(Field::DurationUnit)
                .or_else(|| {
                    validate::enum_one_of(
                        unit,
                        Field::DurationUnit.label(),
                        &DurationUnit::ALL.map(DurationUnit::as_str),
                    )
                }) {
                Some(error) => errors.push(error),
                None => patch.duration_unit = unit.and_then(|u| u.parse().ok()),
            }
        }

        match clearable(&raw.color, Field::Color, |v| {
            validate::hex_color(Some(v), Field::Color.label())
        }) {
            Ok(color) => patch.color = color,
            Err(error) => errors.push(error),
        }

        match clearable(&raw.external_id, Field::ExternalId, |v| {
            validate::max_length(Some(v), Field::ExternalId.label(), MAX_TEXT_LENGTH)
        }) {
            Ok(external_id) => patch.external_id = external_id,
            Err(error) => errors.push(error),
        }

        if raw.status.is_supplied() {
            let status = raw.status.non_blank();
            match raw.status.type_error(Field::Status).or_else(|| {
                validate::enum_one_of(
                    status,
                    Field::Status.label(),
                    &StageStatus::ALL.map(StageStatus::as_str),
                )
            }) {
                Some(error) => errors.push(error),
                None => patch.status = status.and_then(|s| s.parse().ok()),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        if patch.is_empty() {
            return Ok(patch);
        }

        let unit = patch.duration_unit.unwrap_or(existing.duration_unit);
        match duration::compute(Some(start), end, Some(unit)) {
            Some(value) => patch.duration = Some(Some(value)),
            None if patch.end_date == Some(None) => patch.duration = Some(None),
            None => {}
        }

        Ok(patch)
    }
}

/// Resolves a field that may be cleared.
///
/// `Ok(None)` leaves the field alone, `Ok(Some(None))` clears it and
/// `Ok(Some(Some(v)))` sets it to a value that passed `rule`.
fn clearable(
    value: &FieldValue,
    field: Field,
    rule: impl Fn(&str) -> Option<String>,
) -> Result<Option<Option<String>>, String> {
    if let Some(error) = value.type_error(field) {
        return Err(error);
    }
    if value.is_cleared() {
        return Ok(Some(None));
    }
    match value.text() {
        Some(text) => rule(text).map_or_else(|| Ok(Some(Some(text.to_string()))), Err),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use serde_json::json;

    fn existing() -> ConstructionStage {
        ConstructionStage {
            id: 1,
            name: "Foundation".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Some(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()),
            duration: Some(7.0),
            duration_unit: DurationUnit::Days,
            color: Some("#FF0000".to_string()),
            external_id: Some("EXT-1".to_string()),
            status: StageStatus::New,
        }
    }

    fn validate(body: Value) -> Result<StagePatch, Vec<String>> {
        UpdateRequest::from_json(&body).unwrap().validate(&existing())
    }

    #[test]
    fn test_empty_body_is_empty_patch() {
        let patch = validate(json!({})).unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.duration, None);
    }

    #[test]
    fn test_unknown_fields_are_empty_patch() {
        let patch = validate(json!({"id": 99, "duration": 3, "foo": "bar"})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_name_only() {
        let patch = validate(json!({"name": "Framing"})).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Framing"));
        assert_eq!(patch.end_date, None);
        assert_eq!(patch.start_date, None);
        assert_eq!(patch.duration, Some(Some(7.0)));
    }

    #[test]
    fn test_unit_change_recomputes_from_stored_dates() {
        let patch = validate(json!({"durationUnit": "HOURS"})).unwrap();
        assert_eq!(patch.duration_unit, Some(DurationUnit::Hours));
        assert_eq!(patch.duration, Some(Some(168.0)));
    }

    #[test]
    fn test_end_date_merged_with_stored_start() {
        let patch = validate(json!({"endDate": "2024-01-15T00:00:00Z"})).unwrap();
        assert_eq!(patch.duration, Some(Some(14.0)));
    }

    #[test]
    fn test_ordering_checked_against_stored_end() {
        let errors = validate(json!({"startDate": "2024-02-01T00:00:00Z"})).unwrap_err();
        assert_eq!(errors, vec!["End date must be after start date"]);
    }

    #[test]
    fn test_clearing_end_date_clears_duration() {
        let patch = validate(json!({"endDate": null})).unwrap();
        assert_eq!(patch.end_date, Some(None));
        assert_eq!(patch.duration, Some(None));
    }

    #[test]
    fn test_clear_color_and_external_id() {
        let patch = validate(json!({"color": null, "externalId": ""})).unwrap();
        assert_eq!(patch.color, Some(None));
        assert_eq!(patch.external_id, Some(None));
    }

    #[test]
    fn test_null_required_field_is_omitted() {
        let patch = validate(json!({"name": null, "startDate": null, "status": null})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_blank_unit_and_status_are_omitted() {
        let patch = validate(json!({"durationUnit": "", "status": "  "})).unwrap();
        assert!(patch.is_empty());

        let patch = validate(json!({"durationUnit": " ", "name": "Framing"})).unwrap();
        assert_eq!(patch.duration_unit, None);
        assert_eq!(patch.name.as_deref(), Some("Framing"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let errors = validate(json!({"name": ""})).unwrap_err();
        assert_eq!(errors, vec!["Name is required"]);
    }

    #[test]
    fn test_invalid_values_collected() {
        let errors = validate(json!({
            "startDate": "soon",
            "durationUnit": "YEARS",
            "color": "#ZZZ",
            "status": "done"
        }))
        .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("Start date is not in the correct format"));
        assert!(errors[1].starts_with("Duration unit is not valid"));
        assert!(errors[2].contains("hex color"));
        assert!(errors[3].starts_with("Status is not valid"));
    }

    #[test]
    fn test_status_transition() {
        let patch = validate(json!({"status": "PLANNED"})).unwrap();
        assert_eq!(patch.status, Some(StageStatus::Planned));

        let patch = validate(json!({"status": "DELETED"})).unwrap();
        assert!(patch.requests_delete());
    }

    #[test]
    fn test_no_duration_without_end() {
        let mut stage = existing();
        stage.end_date = None;
        stage.duration = None;

        let body = json!({"durationUnit": "WEEKS"});
        let patch = UpdateRequest::from_json(&body).unwrap().validate(&stage).unwrap();
        assert_eq!(patch.duration, None);
    }

    proptest! {
        #[test]
        fn prop_omitted_end_date_is_never_touched(name in "[A-Za-z ]{1,40}[A-Za-z]") {
            let patch = validate(json!({"name": name})).unwrap();
            prop_assert_eq!(patch.end_date, None);

            let mut stage = existing();
            stage.apply(&patch);
            prop_assert_eq!(stage.end_date, existing().end_date);
        }
    }
}
