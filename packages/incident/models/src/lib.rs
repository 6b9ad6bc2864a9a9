#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record, dataset identifier, and date range types.
//!
//! These are the shared value types that flow between the dataset store,
//! the derivation pipeline, and the HTTP server. Nothing in this crate
//! performs I/O.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Identifier of one of the two datasets the dashboard serves.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DatasetId {
    /// The full filtered incident dataset.
    Primary,
    /// The subset of incidents with validated victim information.
    ValidatedSubset,
}

impl DatasetId {
    /// The dataset selected when a client first connects.
    pub const DEFAULT: Self = Self::Primary;

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Primary, Self::ValidatedSubset]
    }

    /// Human-readable label shown in the dataset picker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "Filtered Data",
            Self::ValidatedSubset => "Valid Victim Data",
        }
    }
}

/// A single recorded incident (one row of a dataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// When the incident occurred.
    pub occurred_at: NaiveDateTime,
    /// Case status code (e.g. "Invest Cont", "Adult Arrest").
    pub status: String,
    /// Crime category description.
    pub category: String,
    /// Victim age-group label.
    pub age_group: String,
    /// Latitude, `None` when the source value is not a number.
    pub latitude: Option<f64>,
    /// Longitude, `None` when the source value is not a number.
    pub longitude: Option<f64>,
    /// Name of the area the incident was reported in.
    pub area_name: String,
}

impl IncidentRecord {
    /// Calendar date of occurrence, dropping the time of day.
    #[must_use]
    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_at.date()
    }
}

/// An inclusive range of calendar dates.
///
/// A range whose `start` is after its `end` is legal and contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First date included in the range.
    pub start: NaiveDate,
    /// Last date included in the range.
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns `true` if no date can fall inside this range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Returns `true` if `date` lies within `[start, end]`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The dataset and date range a client is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Active dataset.
    pub dataset: DatasetId,
    /// Active date range.
    pub range: DateRange,
}
