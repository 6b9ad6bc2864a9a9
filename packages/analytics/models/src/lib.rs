#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived view types for the dashboard.
//!
//! Every value here is recomputed on demand from a dataset and a date
//! range, handed to the presentation layer, and dropped. None of them are
//! cached.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use violations_dashboard_incident_models::{DatasetId, DateRange};

/// Incident count for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// First day of the month.
    pub month_start: NaiveDate,
    /// Period label (e.g. "2020-01").
    pub period: String,
    /// Number of incidents that occurred in the month.
    pub count: u64,
}

/// Incident count for a single status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    /// Status code.
    pub status: String,
    /// Number of incidents.
    pub count: u64,
}

/// Incident count for a single age group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupCount {
    /// Age-group label.
    pub age_group: String,
    /// Number of incidents.
    pub count: u64,
}

/// A located incident for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude, `None` when the source value was not a number.
    pub lat: Option<f64>,
    /// Longitude, `None` when the source value was not a number.
    pub lon: Option<f64>,
    /// Status code, used for coloring.
    pub status: String,
    /// Area name, used as the hover label.
    pub area_name: String,
}

/// Headline figures emitted when a dataset is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Dataset the figures describe.
    pub dataset: DatasetId,
    /// Total number of incidents.
    pub total_count: u64,
    /// Most frequent status, `None` when there are no incidents.
    pub most_common_status: Option<String>,
    /// Most frequent category, `None` when there are no incidents.
    pub top_category: Option<String>,
    /// Calendar-date bounds of the dataset.
    pub span: DateRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_point_serializes_camel_case() {
        let point = TrendPoint {
            month_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            period: "2020-01".to_string(),
            count: 2,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["monthStart"], "2020-01-01");
        assert_eq!(json["period"], "2020-01");
        assert_eq!(json["count"], 2);
    }

    #[test]
    fn geo_point_keeps_missing_coordinates_as_null() {
        let point = GeoPoint {
            lat: None,
            lon: Some(-118.25),
            status: "Open".to_string(),
            area_name: "Central".to_string(),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert!(json["lat"].is_null());
        assert_eq!(json["areaName"], "Central");
    }
}
