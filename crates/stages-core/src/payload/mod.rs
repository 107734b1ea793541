//! Request payload models.
//!
//! Bodies are decoded through an explicit field table rather than by
//! deserializing straight into the record: every accepted key is listed in
//! [`Field`], anything else (including `id` and `duration`) is ignored, and
//! each value keeps enough shape information to tell "omitted", "null" and
//! "wrong JSON type" apart.

mod create;
mod update;

pub use create::CreateRequest;
pub use update::UpdateRequest;

use serde_json::{Map, Value};

use crate::ApiError;

/// A field accepted in create and update bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `name`
    Name,
    /// `startDate`
    StartDate,
    /// `endDate`
    EndDate,
    /// `durationUnit`
    DurationUnit,
    /// `color`
    Color,
    /// `externalId`
    ExternalId,
    /// `status`
    Status,
}

impl Field {
    /// Every accepted field, in validation order.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::StartDate,
        Self::EndDate,
        Self::DurationUnit,
        Self::Color,
        Self::ExternalId,
        Self::Status,
    ];

    /// JSON key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::DurationUnit => "durationUnit",
            Self::Color => "color",
            Self::ExternalId => "externalId",
            Self::Status => "status",
        }
    }

    /// Label used in validation messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::StartDate => "Start date",
            Self::EndDate => "End date",
            Self::DurationUnit => "Duration unit",
            Self::Color => "Color",
            Self::ExternalId => "External ID",
            Self::Status => "Status",
        }
    }
}

/// A single raw field as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// The key was not present.
    #[default]
    Missing,
    /// The key was present with `null`.
    Null,
    /// The key was present with a string.
    Text(String),
    /// The key was present with a non-string value.
    WrongType,
}

impl FieldValue {
    fn read(object: &Map<String, Value>, field: Field) -> Self {
        match object.get(field.key()) {
            None => Self::Missing,
            Some(Value::Null) => Self::Null,
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(_) => Self::WrongType,
        }
    }

    /// The string value, if one was sent.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The string value, if one was sent and it is not blank.
    pub fn non_blank(&self) -> Option<&str> {
        self.text().filter(|s| !s.trim().is_empty())
    }

    /// True when the client sent a non-null value for the key.
    pub fn is_supplied(&self) -> bool {
        matches!(self, Self::Text(_) | Self::WrongType)
    }

    /// True when the client sent `null` or a blank string.
    pub fn is_cleared(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The message for a non-string value, if this is one.
    fn type_error(&self, field: Field) -> Option<String> {
        matches!(self, Self::WrongType).then(|| format!("{} must be a string", field.label()))
    }
}

/// Raw field values shared by both payload models.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawStage {
    pub name: FieldValue,
    pub start_date: FieldValue,
    pub end_date: FieldValue,
    pub duration_unit: FieldValue,
    pub color: FieldValue,
    pub external_id: FieldValue,
    pub status: FieldValue,
}

impl RawStage {
    fn from_json(body: &Value) -> Result<Self, ApiError> {
        let object = body
            .as_object()
            .ok_or_else(|| ApiError::malformed("Request body must be a JSON object"))?;

        Ok(Self {
            name: FieldValue::read(object, Field::Name),
            start_date: FieldValue::read(object, Field::StartDate),
            end_date: FieldValue::read(object, Field::EndDate),
            duration_unit: FieldValue::read(object, Field::DurationUnit),
            color: FieldValue::read(object, Field::Color),
            external_id: FieldValue::read(object, Field::ExternalId),
            status: FieldValue::read(object, Field::Status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_keys_are_unique() {
        let mut keys: Vec<_> = Field::ALL.iter().map(|f| f.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Field::ALL.len());
    }

    #[test]
    fn test_read_distinguishes_shapes() {
        let body = json!({"name": "A", "color": null, "externalId": 12, "id": 9, "duration": 3});
        let raw = RawStage::from_json(&body).unwrap();

        assert_eq!(raw.name, FieldValue::Text("A".to_string()));
        assert_eq!(raw.color, FieldValue::Null);
        assert_eq!(raw.external_id, FieldValue::WrongType);
        assert_eq!(raw.start_date, FieldValue::Missing);
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        for body in [json!([1, 2]), json!("text"), json!(null), json!(4)] {
            let err = RawStage::from_json(&body).unwrap_err();
            assert!(matches!(err, ApiError::MalformedRequest { .. }));
        }
    }

    #[test]
    fn test_field_value_helpers() {
        assert!(FieldValue::Null.is_cleared());
        assert!(FieldValue::Text("  ".to_string()).is_cleared());
        assert!(!FieldValue::Missing.is_cleared());
        assert!(FieldValue::WrongType.is_supplied());
        assert!(!FieldValue::Null.is_supplied());
        assert_eq!(FieldValue::Text(" ".to_string()).non_blank(), None);
    }
}
