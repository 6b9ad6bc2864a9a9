//! Presentation layer: maps derived views to chart specifications.
//!
//! Empty views get a "no data" title instead of an error; that is a
//! display default only, the underlying views are simply empty.

use std::collections::BTreeMap;

use violations_dashboard_analytics::pipeline;
use violations_dashboard_analytics_models::{
    AgeGroupCount, GeoPoint, Overview, StatusCount, TrendPoint,
};
use violations_dashboard_dataset::DatasetStore;
use violations_dashboard_incident_models::Selection;
use violations_dashboard_server_models::{
    ApiAgeGroupChart, ApiDashboard, ApiLegendEntry, ApiLocationMap, ApiMapPoint, ApiOverview,
    ApiPieSlice, ApiStatusChart, ApiTrendChart,
};

pub const TREND_TITLE: &str = "Violation Trends Over Time";
pub const TREND_NO_DATA_TITLE: &str = "No data available in this date range";
pub const STATUS_TITLE: &str = "Violation Status Distribution";
pub const STATUS_NO_DATA_TITLE: &str = "Violation Status Distribution - No data available";
pub const MAP_TITLE: &str = "Violation Locations";
pub const MAP_NO_DATA_TITLE: &str = "Violation Locations - No data available";
pub const AGE_GROUP_TITLE: &str = "Crimes by Age Group";

/// Placeholder for overview cards with no value.
pub const NOT_AVAILABLE: &str = "N/A";

const TEMPLATE: &str = "plotly_white";
const MAP_STYLE: &str = "carto-positron";
const MAP_ZOOM: u8 = 10;

/// Qualitative palette for status colors, cycled when exhausted.
const STATUS_PALETTE: &[&str] = &[
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

fn title(has_data: bool, title: &str, no_data_title: &str) -> String {
    (if has_data { title } else { no_data_title }).to_string()
}

#[must_use]
pub fn overview_cards(overview: Overview) -> ApiOverview {
    ApiOverview {
        dataset: overview.dataset,
        total_count: overview.total_count,
        most_common_status: overview
            .most_common_status
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        top_category: overview
            .top_category
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        start_date: overview.span.start,
        end_date: overview.span.end,
    }
}

#[must_use]
pub fn trend_chart(points: Vec<TrendPoint>) -> ApiTrendChart {
    ApiTrendChart {
        title: title(!points.is_empty(), TREND_TITLE, TREND_NO_DATA_TITLE),
        x_axis_title: "Date".to_string(),
        y_axis_title: "Number of Violations".to_string(),
        points: points.into_iter().map(Into::into).collect(),
    }
}

#[must_use]
pub fn status_chart(counts: Vec<StatusCount>) -> ApiStatusChart {
    ApiStatusChart {
        title: title(!counts.is_empty(), STATUS_TITLE, STATUS_NO_DATA_TITLE),
        x_axis_title: "Violation Status".to_string(),
        y_axis_title: "Count".to_string(),
        template: TEMPLATE.to_string(),
        bar_mode: "stack".to_string(),
        bars: counts.into_iter().map(Into::into).collect(),
    }
}

/// Builds the location map, coloring points by status.
///
/// Colors are assigned in order of first appearance.
#[must_use]
pub fn location_map(points: Vec<GeoPoint>) -> ApiLocationMap {
    let mut colors: BTreeMap<String, &'static str> = BTreeMap::new();
    let mut legend = Vec::new();

    let map_points: Vec<ApiMapPoint> = points
        .into_iter()
        .map(|p| {
            let color = *colors.entry(p.status.clone()).or_insert_with(|| {
                let color = STATUS_PALETTE[legend.len() % STATUS_PALETTE.len()];
                legend.push(ApiLegendEntry {
                    status: p.status.clone(),
                    color: color.to_string(),
                });
                color
            });

            ApiMapPoint {
                lat: p.lat,
                lon: p.lon,
                status: p.status,
                hover_name: p.area_name,
                color: color.to_string(),
            }
        })
        .collect();

    ApiLocationMap {
        title: title(!map_points.is_empty(), MAP_TITLE, MAP_NO_DATA_TITLE),
        map_style: MAP_STYLE.to_string(),
        zoom: MAP_ZOOM,
        legend,
        points: map_points,
    }
}

#[must_use]
pub fn age_group_chart(counts: Vec<AgeGroupCount>) -> ApiAgeGroupChart {
    let total: u64 = counts.iter().map(|c| c.count).sum();

    ApiAgeGroupChart {
        title: AGE_GROUP_TITLE.to_string(),
        template: TEMPLATE.to_string(),
        slices: counts
            .into_iter()
            .map(|c| {
                #[allow(clippy::cast_precision_loss)]
                let fraction = if total == 0 {
                    0.0
                } else {
                    c.count as f64 / total as f64
                };
                ApiPieSlice {
                    age_group: c.age_group,
                    count: c.count,
                    fraction,
                }
            })
            .collect(),
    }
}

/// Computes every dashboard figure for `selection`.
///
/// The date range applies to the trend, status, and map views. The
/// overview and the age-group pie always describe the whole dataset.
#[must_use]
pub fn dashboard(store: &DatasetStore, selection: &Selection) -> ApiDashboard {
    let dataset = store.dataset(selection.dataset);
    let filtered = pipeline::filter_by_range(dataset, Some(&selection.range));

    ApiDashboard {
        selection: *selection,
        overview: overview_cards(pipeline::overview(dataset)),
        trend: trend_chart(pipeline::monthly_trend(filtered.iter().copied())),
        status: status_chart(pipeline::status_distribution(filtered.iter().copied())),
        locations: location_map(pipeline::geo_points(filtered.iter().copied())),
        age_groups: age_group_chart(pipeline::age_group_distribution(dataset.records())),
    }
}
