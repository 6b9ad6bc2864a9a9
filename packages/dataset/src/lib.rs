#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV-backed incident dataset store.
//!
//! Both datasets are read once at startup with the `csv` crate and held in
//! memory for the life of the process. Nothing here mutates a dataset after
//! it has been loaded; per-client state lives in [`selection`].

pub mod parsing;
pub mod selection;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use violations_dashboard_incident_models::{DatasetId, DateRange, IncidentRecord};

/// Column headers every incident CSV must provide.
pub mod columns {
    pub const OCCURRED_AT: &str = "DATE OCC";
    pub const STATUS: &str = "Status";
    pub const CATEGORY: &str = "Crm Cd Desc";
    pub const AGE_GROUP: &str = "Age Group";
    pub const LATITUDE: &str = "LAT";
    pub const LONGITUDE: &str = "LON";
    pub const AREA_NAME: &str = "AREA NAME";
}

/// Errors that can occur while loading or looking up datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The input file could not be opened or read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the header row.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Header name that was not found.
        column: &'static str,
    },

    /// An occurrence timestamp could not be parsed.
    #[error("Unparsable occurrence timestamp '{value}' on line {line}")]
    InvalidTimestamp {
        /// 1-based line number in the CSV (the header is line 1).
        line: u64,
        /// Raw field value.
        value: String,
    },

    /// The input contained a header but no rows.
    #[error("Dataset '{id}' contains no rows")]
    Empty {
        /// Dataset that was empty.
        id: DatasetId,
    },

    /// An unknown dataset identifier was requested.
    #[error("Dataset '{id}' not found")]
    NotFound {
        /// The identifier that was requested.
        id: String,
    },
}

/// An immutable, ordered collection of incident records.
#[derive(Debug, Clone)]
pub struct Dataset {
    id: DatasetId,
    records: Vec<IncidentRecord>,
    span: DateRange,
}

impl Dataset {
    /// Wraps loaded records, computing the calendar-date span once.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Empty`] if `records` is empty.
    pub fn new(id: DatasetId, records: Vec<IncidentRecord>) -> Result<Self, DatasetError> {
        let mut dates = records.iter().map(IncidentRecord::occurred_on);
        let first = dates.next().ok_or(DatasetError::Empty { id })?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

        Ok(Self {
            id,
            records,
            span: DateRange::new(start, end),
        })
    }

    #[must_use]
    pub const fn id(&self) -> DatasetId {
        self.id
    }

    /// All records, in file order.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for a loaded dataset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest occurrence dates.
    #[must_use]
    pub const fn span(&self) -> DateRange {
        self.span
    }
}

/// Indexes of the required columns within a CSV header row.
struct ColumnIndexes {
    occurred_at: usize,
    status: usize,
    category: usize,
    age_group: usize,
    latitude: usize,
    longitude: usize,
    area_name: usize,
}

impl ColumnIndexes {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, DatasetError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or(DatasetError::MissingColumn { column })
        };

        Ok(Self {
            occurred_at: find(columns::OCCURRED_AT)?,
            status: find(columns::STATUS)?,
            category: find(columns::CATEGORY)?,
            age_group: find(columns::AGE_GROUP)?,
            latitude: find(columns::LATITUDE)?,
            longitude: find(columns::LONGITUDE)?,
            area_name: find(columns::AREA_NAME)?,
        })
    }

    fn record(&self, row: &csv::StringRecord, line: u64) -> Result<IncidentRecord, DatasetError> {
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let raw_date = field(self.occurred_at);
        let occurred_at =
            parsing::parse_occurrence(raw_date).ok_or_else(|| DatasetError::InvalidTimestamp {
                line,
                value: raw_date.to_owned(),
            })?;

        Ok(IncidentRecord {
            occurred_at,
            status: field(self.status).to_owned(),
            category: field(self.category).to_owned(),
            age_group: field(self.age_group).to_owned(),
            latitude: parsing::parse_coordinate(field(self.latitude)),
            longitude: parsing::parse_coordinate(field(self.longitude)),
            area_name: field(self.area_name).to_owned(),
        })
    }
}

/// Loads a dataset from any CSV source.
///
/// # Errors
///
/// Returns [`DatasetError`] if the CSV is malformed, a required column is
/// missing, any occurrence timestamp is unparsable, or there are no rows.
pub fn load_dataset_from_reader<R: Read>(id: DatasetId, reader: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndexes::from_headers(reader.headers()?)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        let line = row.position().map_or(i as u64 + 2, csv::Position::line);
        records.push(columns.record(&row, line)?);
    }

    Dataset::new(id, records)
}

/// Loads a dataset from a CSV file on disk.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if the file cannot be opened, or any error
/// from [`load_dataset_from_reader`].
pub fn load_dataset(id: DatasetId, path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = load_dataset_from_reader(id, BufReader::new(file))?;
    log::info!(
        "Loaded dataset '{id}' from {}: {} records ({} to {})",
        path.display(),
        dataset.len(),
        dataset.span().start,
        dataset.span().end,
    );

    Ok(dataset)
}

/// Locations of the two input CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// CSV for [`DatasetId::Primary`].
    pub primary: PathBuf,
    /// CSV for [`DatasetId::ValidatedSubset`].
    pub validated_subset: PathBuf,
}

impl DatasetPaths {
    #[must_use]
    pub fn path(&self, id: DatasetId) -> &Path {
        match id {
            DatasetId::Primary => &self.primary,
            DatasetId::ValidatedSubset => &self.validated_subset,
        }
    }
}

/// Read-only holder of both datasets.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    primary: Dataset,
    validated_subset: Dataset,
}

impl DatasetStore {
    /// Builds a store from already-loaded datasets.
    #[must_use]
    pub const fn new(primary: Dataset, validated_subset: Dataset) -> Self {
        Self {
            primary,
            validated_subset,
        }
    }

    /// Loads both datasets from disk.
    ///
    /// # Errors
    ///
    /// Returns the first [`DatasetError`] encountered; the store is never
    /// built with a missing dataset.
    pub fn load(paths: &DatasetPaths) -> Result<Self, DatasetError> {
        let primary = load_dataset(DatasetId::Primary, paths.path(DatasetId::Primary))?;
        let validated_subset = load_dataset(
            DatasetId::ValidatedSubset,
            paths.path(DatasetId::ValidatedSubset),
        )?;

        Ok(Self::new(primary, validated_subset))
    }

    /// Typed lookup; every [`DatasetId`] is present.
    #[must_use]
    pub const fn dataset(&self, id: DatasetId) -> &Dataset {
        match id {
            DatasetId::Primary => &self.primary,
            DatasetId::ValidatedSubset => &self.validated_subset,
        }
    }

    /// Looks up a dataset by its string identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] if `id` is not a known identifier.
    pub fn get(&self, id: &str) -> Result<&Dataset, DatasetError> {
        id.parse::<DatasetId>()
            .map(|id| self.dataset(id))
            .map_err(|_| DatasetError::NotFound { id: id.to_owned() })
    }

    /// Both datasets, in [`DatasetId::all`] order.
    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        DatasetId::all().iter().map(move |id| self.dataset(*id))
    }
}

/// In-memory fixtures shared by this crate's tests and its dependents'.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use super::*;

    pub const PRIMARY_CSV: &str = "\
DR_NO,DATE OCC,AREA NAME,Crm Cd Desc,Status,LAT,LON,Age Group
1,01/15/2020 12:00:00 AM,Central,BATTERY - SIMPLE ASSAULT,Open,34.05,-118.25,Adult
2,01/20/2020 12:00:00 AM,Hollywood,VANDALISM,Open,34.10,-118.33,Senior
3,02/01/2020 12:00:00 AM,Central,BATTERY - SIMPLE ASSAULT,Closed,34.04,-118.26,Adult
";

    pub const VALIDATED_CSV: &str = "\
DATE OCC,Status,Crm Cd Desc,Age Group,LAT,LON,AREA NAME
2021-06-01,Closed,ROBBERY,Youth,34.0,-118.2,Newton
2021-07-04,Closed,ROBBERY,Adult,34.1,-118.3,Newton
";

    /// Builds a store from [`PRIMARY_CSV`] and [`VALIDATED_CSV`].
    ///
    /// # Panics
    ///
    /// Panics if either fixture fails to load.
    #[must_use]
    pub fn store() -> DatasetStore {
        DatasetStore::new(
            load_dataset_from_reader(DatasetId::Primary, PRIMARY_CSV.as_bytes()).unwrap(),
            load_dataset_from_reader(DatasetId::ValidatedSubset, VALIDATED_CSV.as_bytes())
                .unwrap(),
        )
    }
}
