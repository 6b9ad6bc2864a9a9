//! Filtering and aggregation functions.
//!
//! Aggregations accept any iterator of record references so they apply to
//! a whole dataset (`dataset.records()`) and to the output of
//! [`filter_by_range`] alike.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate};
use violations_dashboard_analytics_models::{
    AgeGroupCount, GeoPoint, Overview, StatusCount, TrendPoint,
};
use violations_dashboard_dataset::Dataset;
use violations_dashboard_incident_models::{DateRange, IncidentRecord};

/// Counts occurrences of each key, sorted by descending count.
///
/// Equal counts keep first-occurrence order.
fn value_counts<'a, I, F>(records: I, key: F) -> Vec<(&'a str, u64)>
where
    I: IntoIterator<Item = &'a IncidentRecord>,
    F: Fn(&'a IncidentRecord) -> &'a str,
{
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    let mut counts: Vec<(&str, u64)> = Vec::new();

    for record in records {
        let value = key(record);
        let i = *index.entry(value).or_insert_with(|| {
            counts.push((value, 0));
            counts.len() - 1
        });
        counts[i].1 += 1;
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Number of records.
#[must_use]
pub fn total_count<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> u64 {
    records.into_iter().count() as u64
}

/// Most frequent status value.
///
/// Which of several equally frequent values wins is an implementation
/// detail. Returns `None` when there are no records.
#[must_use]
pub fn most_common_status<'a>(
    records: impl IntoIterator<Item = &'a IncidentRecord>,
) -> Option<String> {
    value_counts(records, |r| r.status.as_str())
        .first()
        .map(|(status, _)| (*status).to_owned())
}

/// Most frequent category description, with the same tie policy as
/// [`most_common_status`].
#[must_use]
pub fn top_category<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> Option<String> {
    value_counts(records, |r| r.category.as_str())
        .first()
        .map(|(category, _)| (*category).to_owned())
}

/// Earliest and latest occurrence dates, or `None` when there are no
/// records.
#[must_use]
pub fn date_span<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> Option<DateRange> {
    records
        .into_iter()
        .map(IncidentRecord::occurred_on)
        .fold(None, |span: Option<DateRange>, d| {
            Some(span.map_or_else(
                || DateRange::new(d, d),
                |s| DateRange::new(s.start.min(d), s.end.max(d)),
            ))
        })
}

/// Keeps the records whose occurrence date lies in `range`, inclusive on
/// both ends. `None` keeps every record.
#[must_use]
pub fn filter_by_range<'a>(
    dataset: &'a Dataset,
    range: Option<&DateRange>,
) -> Vec<&'a IncidentRecord> {
    let Some(range) = range else {
        return dataset.records().iter().collect();
    };

    if range.is_empty() {
        return Vec::new();
    }

    let filtered: Vec<&IncidentRecord> = dataset
        .records()
        .iter()
        .filter(|r| range.contains(r.occurred_on()))
        .collect();

    log::debug!(
        "Filtered '{}' to {} of {} records ({} to {})",
        dataset.id(),
        filtered.len(),
        dataset.len(),
        range.start,
        range.end
    );

    filtered
}

/// Incident counts per calendar month, in chronological order.
///
/// Months with no incidents are omitted.
#[must_use]
pub fn monthly_trend<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> Vec<TrendPoint> {
    let mut months: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for record in records {
        let Some(month_start) = record.occurred_on().with_day(1) else {
            continue;
        };
        *months.entry(month_start).or_insert(0) += 1;
    }

    months
        .into_iter()
        .map(|(month_start, count)| TrendPoint {
            month_start,
            period: month_start.format("%Y-%m").to_string(),
            count,
        })
        .collect()
}

/// Incident counts per status, most frequent first.
#[must_use]
pub fn status_distribution<'a>(
    records: impl IntoIterator<Item = &'a IncidentRecord>,
) -> Vec<StatusCount> {
    value_counts(records, |r| r.status.as_str())
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_owned(),
            count,
        })
        .collect()
}

/// One map point per record, in record order.
#[must_use]
pub fn geo_points<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> Vec<GeoPoint> {
    records
        .into_iter()
        .map(|r| GeoPoint {
            lat: r.latitude,
            lon: r.longitude,
            status: r.status.clone(),
            area_name: r.area_name.clone(),
        })
        .collect()
}

/// Incident counts per age group, most frequent first.
///
/// The dashboard always passes the whole dataset here: the age-group
/// chart ignores the selected date range.
#[must_use]
pub fn age_group_distribution<'a>(
    records: impl IntoIterator<Item = &'a IncidentRecord>,
) -> Vec<AgeGroupCount> {
    value_counts(records, |r| r.age_group.as_str())
        .into_iter()
        .map(|(age_group, count)| AgeGroupCount {
            age_group: age_group.to_owned(),
            count,
        })
        .collect()
}

/// Headline figures for a whole dataset.
#[must_use]
pub fn overview(dataset: &Dataset) -> Overview {
    Overview {
        dataset: dataset.id(),
        total_count: total_count(dataset.records()),
        most_common_status: most_common_status(dataset.records()),
        top_category: top_category(dataset.records()),
        span: dataset.span(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use violations_dashboard_incident_models::DatasetId;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn record(occurred_at: NaiveDateTime, status: &str, category: &str, age: &str) -> IncidentRecord {
        IncidentRecord {
            occurred_at,
            status: status.to_string(),
            category: category.to_string(),
            age_group: age.to_string(),
            latitude: Some(34.05),
            longitude: Some(-118.25),
            area_name: "Central".to_string(),
        }
    }

    /// Three rows: 2020-01-15, 2020-01-20, 2020-02-01 with statuses
    /// Open, Open, Closed.
    fn scenario() -> Dataset {
        Dataset::new(
            DatasetId::Primary,
            vec![
                record(at(2020, 1, 15, 0), "Open", "ASSAULT", "Adult"),
                record(at(2020, 1, 20, 0), "Open", "VANDALISM", "Senior"),
                record(at(2020, 2, 1, 0), "Closed", "ASSAULT", "Adult"),
            ],
        )
        .unwrap()
    }

    /// A wider dataset with times of day and several months.
    fn wide() -> Dataset {
        Dataset::new(
            DatasetId::ValidatedSubset,
            vec![
                record(at(2021, 3, 31, 23), "Invest Cont", "THEFT", "Adult"),
                record(at(2021, 1, 2, 8), "Adult Arrest", "BURGLARY", "Youth"),
                record(at(2021, 1, 2, 17), "Invest Cont", "THEFT", "Adult"),
                record(at(2021, 5, 10, 12), "Juv Arrest", "THEFT", "Youth"),
                record(at(2021, 3, 1, 0), "Invest Cont", "ROBBERY", "Senior"),
                record(at(2021, 5, 31, 23), "Adult Other", "BURGLARY", "Adult"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn scenario_headline_figures() {
        let d = scenario();
        assert_eq!(total_count(d.records()), 3);
        assert_eq!(most_common_status(d.records()).as_deref(), Some("Open"));
        assert_eq!(top_category(d.records()).as_deref(), Some("ASSAULT"));
    }

    #[test]
    fn scenario_monthly_trend() {
        let d = scenario();
        let trend = monthly_trend(d.records());
        let pairs: Vec<(NaiveDate, u64)> =
            trend.iter().map(|p| (p.month_start, p.count)).collect();
        assert_eq!(pairs, vec![(date(2020, 1, 1), 2), (date(2020, 2, 1), 1)]);
        assert_eq!(trend[0].period, "2020-01");
        assert_eq!(trend[1].period, "2020-02");
    }

    #[test]
    fn scenario_status_distribution() {
        let d = scenario();
        let counts = status_distribution(d.records());
        assert_eq!(
            counts,
            vec![
                StatusCount {
                    status: "Open".to_string(),
                    count: 2
                },
                StatusCount {
                    status: "Closed".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn tied_status_returns_a_member_of_the_tied_set() {
        let d = Dataset::new(
            DatasetId::Primary,
            vec![
                record(at(2020, 1, 1, 0), "Open", "A", "Adult"),
                record(at(2020, 1, 2, 0), "Closed", "B", "Adult"),
            ],
        )
        .unwrap();

        let winner = most_common_status(d.records()).unwrap();
        assert!(["Open", "Closed"].contains(&winner.as_str()));
        assert_eq!(most_common_status(d.records()).unwrap(), winner);

        let category = top_category(d.records()).unwrap();
        assert!(["A", "B"].contains(&category.as_str()));
    }

    #[test]
    fn date_span_drops_time_of_day() {
        let d = wide();
        assert_eq!(
            date_span(d.records()),
            Some(DateRange::new(date(2021, 1, 2), date(2021, 5, 31)))
        );
        assert_eq!(date_span(d.records()), Some(d.span()));
        assert_eq!(date_span(std::iter::empty()), None);
    }

    #[test]
    fn filter_is_inclusive_at_date_granularity() {
        let d = wide();
        // Rows at 23:00 on the end date are kept.
        let range = DateRange::new(date(2021, 3, 1), date(2021, 3, 31));
        let filtered = filter_by_range(&d, Some(&range));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| range.contains(r.occurred_on())));
    }

    #[test]
    fn filtered_rows_are_contained_in_dataset_and_range() {
        let d = wide();
        let ranges = [
            DateRange::new(date(2021, 1, 1), date(2021, 12, 31)),
            DateRange::new(date(2021, 1, 2), date(2021, 1, 2)),
            DateRange::new(date(2021, 2, 1), date(2021, 2, 28)),
            DateRange::new(date(2021, 3, 31), date(2021, 5, 10)),
            DateRange::new(date(2021, 5, 31), date(2021, 5, 31)),
        ];

        for range in &ranges {
            let filtered = filter_by_range(&d, Some(range));
            for row in &filtered {
                assert!(d.records().contains(*row), "{row:?} not in dataset");
                assert!(
                    range.contains(row.occurred_on()),
                    "{row:?} outside {range:?}"
                );
            }
            let expected = d
                .records()
                .iter()
                .filter(|r| range.contains(r.occurred_on()))
                .count();
            assert_eq!(filtered.len(), expected);
        }
    }

    #[test]
    fn inverted_range_yields_nothing() {
        for d in [scenario(), wide()] {
            let range = DateRange::new(d.span().end, d.span().start);
            assert!(filter_by_range(&d, Some(&range)).is_empty());
        }
        let d = wide();
        let range = DateRange::new(date(2021, 5, 1), date(2021, 1, 1));
        assert!(filter_by_range(&d, Some(&range)).is_empty());
    }

    #[test]
    fn no_range_keeps_every_record() {
        let d = wide();
        assert_eq!(filter_by_range(&d, None).len(), d.len());
    }

    #[test]
    fn range_before_all_rows_yields_empty_views() {
        let d = scenario();
        let range = DateRange::new(date(2019, 1, 1), date(2019, 12, 31));
        let filtered = filter_by_range(&d, Some(&range));

        assert!(filtered.is_empty());
        assert_eq!(total_count(filtered.iter().copied()), 0);
        assert!(monthly_trend(filtered.iter().copied()).is_empty());
        assert!(status_distribution(filtered.iter().copied()).is_empty());
        assert!(geo_points(filtered.iter().copied()).is_empty());
        assert_eq!(most_common_status(filtered.iter().copied()), None);
    }

    #[test]
    fn status_counts_sum_to_total() {
        for d in [scenario(), wide()] {
            let sum: u64 = status_distribution(d.records())
                .iter()
                .map(|s| s.count)
                .sum();
            assert_eq!(sum, total_count(d.records()));
        }
    }

    #[test]
    fn trend_over_full_span_loses_no_rows() {
        for d in [scenario(), wide()] {
            let span = date_span(d.records()).unwrap();
            let filtered = filter_by_range(&d, Some(&span));
            let sum: u64 = monthly_trend(filtered.iter().copied())
                .iter()
                .map(|p| p.count)
                .sum();
            assert_eq!(sum, total_count(d.records()));
        }
    }

    #[test]
    fn trend_skips_empty_months_and_stays_chronological() {
        let d = wide();
        let periods: Vec<String> = monthly_trend(d.records())
            .into_iter()
            .map(|p| p.period)
            .collect();
        assert_eq!(periods, vec!["2021-01", "2021-03", "2021-05"]);
    }

    #[test]
    fn status_ties_keep_first_occurrence_order() {
        let d = wide();
        let statuses: Vec<String> = status_distribution(d.records())
            .into_iter()
            .map(|s| s.status)
            .collect();
        assert_eq!(
            statuses,
            vec!["Invest Cont", "Adult Arrest", "Juv Arrest", "Adult Other"]
        );
    }

    #[test]
    fn geo_points_project_every_row() {
        let mut records = scenario().records().to_vec();
        records[1].latitude = None;
        records[1].area_name = "Hollywood".to_string();
        let d = Dataset::new(DatasetId::Primary, records).unwrap();

        let points = geo_points(d.records());
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].lat, None);
        assert_eq!(points[1].area_name, "Hollywood");
        assert_eq!(points[2].status, "Closed");
    }

    #[test]
    fn age_groups_count_whole_dataset() {
        let d = wide();
        let groups = age_group_distribution(d.records());
        assert_eq!(
            groups,
            vec![
                AgeGroupCount {
                    age_group: "Adult".to_string(),
                    count: 3
                },
                AgeGroupCount {
                    age_group: "Youth".to_string(),
                    count: 2
                },
                AgeGroupCount {
                    age_group: "Senior".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn overview_describes_whole_dataset() {
        let d = scenario();
        let o = overview(&d);
        assert_eq!(o.dataset, DatasetId::Primary);
        assert_eq!(o.total_count, 3);
        assert_eq!(o.most_common_status.as_deref(), Some("Open"));
        assert_eq!(o.top_category.as_deref(), Some("ASSAULT"));
        assert_eq!(o.span, DateRange::new(date(2020, 1, 15), date(2020, 2, 1)));
    }
}
