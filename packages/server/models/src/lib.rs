#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the derived view types to allow independent evolution of the API
//! contract. Chart types carry everything a front-end charting library
//! needs (titles, axis labels, per-point values) but no rendering detail.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use violations_dashboard_analytics_models::{StatusCount, TrendPoint};
use violations_dashboard_incident_models::{DatasetId, Selection};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Number of open client sessions.
    pub active_sessions: usize,
}

/// A dataset entry for the dataset picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDatasetSummary {
    /// Dataset identifier.
    pub id: DatasetId,
    /// Picker label.
    pub label: String,
    /// Number of incidents in the dataset.
    pub record_count: u64,
    /// Earliest occurrence date.
    pub min_date: NaiveDate,
    /// Latest occurrence date.
    pub max_date: NaiveDate,
}

/// Query parameters for the date-filtered chart endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQueryParams {
    /// First date to include (`YYYY-MM-DD`).
    pub from: Option<NaiveDate>,
    /// Last date to include (`YYYY-MM-DD`).
    pub to: Option<NaiveDate>,
}

/// Overview card values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverview {
    /// Dataset the figures describe.
    pub dataset: DatasetId,
    /// Total number of incidents.
    pub total_count: u64,
    /// Most frequent status.
    pub most_common_status: String,
    /// Most frequent category.
    pub top_category: String,
    /// Earliest occurrence date; the date picker's initial start.
    pub start_date: NaiveDate,
    /// Latest occurrence date; the date picker's initial end.
    pub end_date: NaiveDate,
}

/// Line chart of incidents per month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrendChart {
    /// Chart title.
    pub title: String,
    /// X axis label.
    pub x_axis_title: String,
    /// Y axis label.
    pub y_axis_title: String,
    /// Points in chronological order.
    pub points: Vec<ApiTrendPoint>,
}

/// A single point on the trend line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrendPoint {
    /// First day of the month.
    pub date: NaiveDate,
    /// Period label (e.g. "2020-01").
    pub period: String,
    /// Number of incidents.
    pub count: u64,
}

impl From<TrendPoint> for ApiTrendPoint {
    fn from(point: TrendPoint) -> Self {
        Self {
            date: point.month_start,
            period: point.period,
            count: point.count,
        }
    }
}

/// Bar chart of incidents per status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatusChart {
    /// Chart title.
    pub title: String,
    /// X axis label.
    pub x_axis_title: String,
    /// Y axis label.
    pub y_axis_title: String,
    /// Layout template name.
    pub template: String,
    /// Bar grouping mode.
    pub bar_mode: String,
    /// One bar per status, most frequent first.
    pub bars: Vec<ApiStatusBar>,
}

/// A single bar in the status chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatusBar {
    /// Status code.
    pub status: String,
    /// Number of incidents.
    pub count: u64,
    /// Label drawn on the bar.
    pub text: String,
}

impl From<StatusCount> for ApiStatusBar {
    fn from(s: StatusCount) -> Self {
        Self {
            text: s.count.to_string(),
            status: s.status,
            count: s.count,
        }
    }
}

/// Scatter map of incident locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocationMap {
    /// Chart title.
    pub title: String,
    /// Base map style.
    pub map_style: String,
    /// Initial zoom level.
    pub zoom: u8,
    /// Status-to-color legend, in first-occurrence order.
    pub legend: Vec<ApiLegendEntry>,
    /// One point per incident.
    pub points: Vec<ApiMapPoint>,
}

/// Color assigned to a status on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLegendEntry {
    /// Status code.
    pub status: String,
    /// CSS hex color.
    pub color: String,
}

/// A single incident on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapPoint {
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
    /// Status code.
    pub status: String,
    /// Hover label (area name).
    pub hover_name: String,
    /// CSS hex color for the status.
    pub color: String,
}

/// Pie chart of incidents per age group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAgeGroupChart {
    /// Chart title.
    pub title: String,
    /// Layout template name.
    pub template: String,
    /// One slice per age group, most frequent first.
    pub slices: Vec<ApiPieSlice>,
}

/// A single slice of the age-group pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPieSlice {
    /// Age-group label.
    pub age_group: String,
    /// Number of incidents.
    pub count: u64,
    /// Share of the total, in `[0, 1]`.
    pub fraction: f64,
}

/// A newly created client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSession {
    /// Session identifier to use in subsequent requests.
    pub session_id: Uuid,
    /// Initial selection.
    pub selection: Selection,
}

/// Body of `PUT /api/sessions/{id}/dataset`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDatasetRequest {
    /// Dataset identifier to activate.
    pub dataset: String,
}

/// Body of `PUT /api/sessions/{id}/range`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRangeRequest {
    /// First date to include.
    pub start: NaiveDate,
    /// Last date to include.
    pub end: NaiveDate,
}

/// Response to a dataset switch: the reset selection and new overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDatasetChanged {
    /// Selection after the switch.
    pub selection: Selection,
    /// Overview of the newly active dataset.
    pub overview: ApiOverview,
}

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDashboard {
    /// Selection the figures were computed for.
    pub selection: Selection,
    /// Overview cards.
    pub overview: ApiOverview,
    /// Monthly trend line.
    pub trend: ApiTrendChart,
    /// Status distribution bars.
    pub status: ApiStatusChart,
    /// Location map.
    pub locations: ApiLocationMap,
    /// Age-group pie.
    pub age_groups: ApiAgeGroupChart,
}
