//! The construction stage resource and its enumerations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Unit in which a stage's duration is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DurationUnit {
    /// Fractional hours
    Hours,
    /// Fractional days
    #[default]
    Days,
    /// Fractional weeks
    Weeks,
}

impl DurationUnit {
    /// Every unit, in canonical order.
    pub const ALL: [Self; 3] = [Self::Hours, Self::Days, Self::Weeks];

    /// Canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hours => "HOURS",
            Self::Days => "DAYS",
            Self::Weeks => "WEEKS",
        }
    }
}

/// Lifecycle status of a stage.
///
/// `Deleted` is terminal: it marks a soft-deleted record that is hidden from
/// every read but kept in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageStatus {
    /// Freshly created
    #[default]
    New,
    /// Scheduled
    Planned,
    /// Soft-deleted
    Deleted,
}

impl StageStatus {
    /// Every status, in canonical order.
    pub const ALL: [Self; 3] = [Self::New, Self::Planned, Self::Deleted];

    /// Canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Planned => "PLANNED",
            Self::Deleted => "DELETED",
        }
    }
}

/// Error returned when parsing an unknown enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

macro_rules! string_enum {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(DurationUnit, "duration unit");
string_enum!(StageStatus, "status");

/// A persisted construction stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionStage {
    /// Store-assigned identifier
    pub id: i64,
    /// Display name, at most 255 characters
    pub name: String,
    /// Start of the stage
    #[serde(with = "timestamp::utc")]
    pub start_date: DateTime<Utc>,
    /// End of the stage, never earlier than `start_date`
    #[serde(with = "timestamp::utc_option")]
    pub end_date: Option<DateTime<Utc>>,
    /// Derived length of the stage in `duration_unit`
    pub duration: Option<f64>,
    /// Unit of `duration`
    pub duration_unit: DurationUnit,
    /// Hex display color
    pub color: Option<String>,
    /// Identifier in an external planning system
    pub external_id: Option<String>,
    /// Lifecycle status
    pub status: StageStatus,
}

impl ConstructionStage {
    /// Returns true if the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.status == StageStatus::Deleted
    }

    /// Applies a validated patch in place. Fields the patch leaves as `None`
    /// are untouched.
    pub fn apply(&mut self, patch: &StagePatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(unit) = patch.duration_unit {
            self.duration_unit = unit;
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(external_id) = &patch.external_id {
            self.external_id.clone_from(external_id);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// A validated, normalized record ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStage {
    /// Display name
    pub name: String,
    /// Start of the stage
    pub start_date: DateTime<Utc>,
    /// End of the stage
    pub end_date: Option<DateTime<Utc>>,
    /// Derived duration
    pub duration: Option<f64>,
    /// Unit of `duration`
    pub duration_unit: DurationUnit,
    /// Hex display color
    pub color: Option<String>,
    /// External identifier
    pub external_id: Option<String>,
    /// Initial status, never `Deleted`
    pub status: StageStatus,
}

impl NewStage {
    /// Attaches a store-assigned id.
    pub fn into_stage(self, id: i64) -> ConstructionStage {
        ConstructionStage {
            id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            duration: self.duration,
            duration_unit: self.duration_unit,
            color: self.color,
            external_id: self.external_id,
            status: self.status,
        }
    }
}

/// A validated partial update.
///
/// An outer `None` means the field is left unchanged. For the clearable
/// fields, `Some(None)` sets the stored value to null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePatch {
    /// New name
    pub name: Option<String>,
    /// New start
    pub start_date: Option<DateTime<Utc>>,
    /// New or cleared end
    pub end_date: Option<Option<DateTime<Utc>>>,
    /// Recomputed or cleared duration
    pub duration: Option<Option<f64>>,
    /// New unit
    pub duration_unit: Option<DurationUnit>,
    /// New or cleared color
    pub color: Option<Option<String>>,
    /// New or cleared external id
    pub external_id: Option<Option<String>>,
    /// New status
    pub status: Option<StageStatus>,
}

impl StagePatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.duration.is_none()
            && self.duration_unit.is_none()
            && self.color.is_none()
            && self.external_id.is_none()
            && self.status.is_none()
    }

    /// Returns true if the patch asks for the soft-delete status.
    pub fn requests_delete(&self) -> bool {
        self.status == Some(StageStatus::Deleted)
    }
}
