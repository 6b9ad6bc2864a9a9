//! Per-client selection state.
//!
//! Each client owns one [`SelectionState`]. The store is passed in
//! explicitly wherever the selection needs to consult a dataset, so the
//! state itself holds nothing but plain values.

use chrono::NaiveDate;
use violations_dashboard_incident_models::{DatasetId, DateRange, Selection};

use crate::{DatasetError, DatasetStore};

/// The active dataset and date range for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    current: Selection,
}

impl SelectionState {
    /// Starts on the default dataset with its full date span selected.
    #[must_use]
    pub const fn new(store: &DatasetStore) -> Self {
        Self {
            current: Selection {
                dataset: DatasetId::DEFAULT,
                range: store.dataset(DatasetId::DEFAULT).span(),
            },
        }
    }

    /// Switches the active dataset.
    ///
    /// The date range is always reset to the full span of the newly active
    /// dataset, even when the same dataset is selected again.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] for an unknown identifier; the
    /// selection is left unchanged.
    pub fn set_active_dataset(
        &mut self,
        store: &DatasetStore,
        id: &str,
    ) -> Result<&Selection, DatasetError> {
        let dataset = store.get(id)?;
        self.current = Selection {
            dataset: dataset.id(),
            range: dataset.span(),
        };
        log::debug!(
            "Selection switched to '{}' ({} to {})",
            self.current.dataset,
            self.current.range.start,
            self.current.range.end
        );
        Ok(&self.current)
    }

    /// Replaces the date range. `start > end` is accepted and selects
    /// nothing.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) -> &Selection {
        self.current.range = DateRange::new(start, end);
        &self.current
    }

    #[must_use]
    pub const fn current(&self) -> &Selection {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::store;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn starts_on_default_dataset_full_span() {
        let store = store();
        let state = SelectionState::new(&store);
        assert_eq!(state.current().dataset, DatasetId::Primary);
        assert_eq!(
            state.current().range,
            store.dataset(DatasetId::Primary).span()
        );
    }

    #[test]
    fn switching_dataset_resets_range_to_its_span() {
        let store = store();
        let mut state = SelectionState::new(&store);
        state.set_date_range(date(2020, 1, 16), date(2020, 1, 18));

        let selection = *state.set_active_dataset(&store, "validated-subset").unwrap();
        assert_eq!(selection.dataset, DatasetId::ValidatedSubset);
        assert_eq!(
            selection.range,
            DateRange::new(date(2021, 6, 1), date(2021, 7, 4))
        );
        assert_eq!(
            selection.range,
            store.get("validated-subset").unwrap().span()
        );
    }

    #[test]
    fn reselecting_same_dataset_still_resets_range() {
        let store = store();
        let mut state = SelectionState::new(&store);
        state.set_date_range(date(2020, 1, 16), date(2020, 1, 18));
        state.set_active_dataset(&store, "primary").unwrap();
        assert_eq!(
            state.current().range,
            store.dataset(DatasetId::Primary).span()
        );
    }

    #[test]
    fn unknown_dataset_leaves_selection_unchanged() {
        let store = store();
        let mut state = SelectionState::new(&store);
        state.set_date_range(date(2020, 1, 16), date(2020, 1, 18));
        let before = *state.current();

        let err = state.set_active_dataset(&store, "nope").unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
        assert_eq!(*state.current(), before);
    }

    #[test]
    fn inverted_range_is_accepted() {
        let store = store();
        let mut state = SelectionState::new(&store);
        let selection = state.set_date_range(date(2020, 3, 1), date(2020, 1, 1));
        assert!(selection.range.is_empty());
    }

    #[test]
    fn states_are_independent() {
        let store = store();
        let mut a = SelectionState::new(&store);
        let b = SelectionState::new(&store);

        a.set_active_dataset(&store, "validated-subset").unwrap();
        assert_eq!(a.current().dataset, DatasetId::ValidatedSubset);
        assert_eq!(b.current().dataset, DatasetId::Primary);
    }
}
