//! Per-client selection sessions.
//!
//! Each session owns an independent [`SelectionState`]. The lock is only
//! held to read or update one selection; derived views are computed from a
//! copy after it is released.
//!
//! Sessions idle for longer than the configured timeout are evicted the
//! next time a session is created, so abandoned clients do not hold slots.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use uuid::Uuid;
use violations_dashboard_dataset::selection::SelectionState;
use violations_dashboard_dataset::{DatasetError, DatasetStore};
use violations_dashboard_incident_models::Selection;

/// Errors that can occur while operating on sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session with the given id exists.
    #[error("Session {id} not found")]
    NotFound {
        /// The requested session id.
        id: Uuid,
    },

    /// The session limit has been reached.
    #[error("Session limit of {max} reached")]
    Full {
        /// Configured maximum.
        max: usize,
    },

    /// A dataset lookup failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A previous holder of the session lock panicked.
    #[error("Session store lock poisoned")]
    Poisoned,
}

struct Session {
    state: SelectionState,
    last_access: Instant,
}

type SessionMap = BTreeMap<Uuid, Session>;

/// Looks up a session and marks it as just used.
fn touch(sessions: &mut SessionMap, id: Uuid) -> Result<&mut SelectionState, SessionError> {
    let session = sessions
        .get_mut(&id)
        .ok_or(SessionError::NotFound { id })?;
    session.last_access = Instant::now();
    Ok(&mut session.state)
}

/// In-memory map of session id to selection state.
pub struct SessionStore {
    sessions: Mutex<SessionMap>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    #[must_use]
    pub const fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(BTreeMap::new()),
            max_sessions,
            idle_timeout,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionMap>, SessionError> {
        self.sessions.lock().map_err(|_| SessionError::Poisoned)
    }

    /// Opens a new session on the default dataset and its full span.
    ///
    /// Sessions idle for longer than the timeout are evicted first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Full`] when the session limit is reached.
    pub fn create(&self, store: &DatasetStore) -> Result<(Uuid, Selection), SessionError> {
        let now = Instant::now();
        let mut sessions = self.lock()?;

        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_access) < self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            log::debug!("Evicted {evicted} idle session(s)");
        }

        if sessions.len() >= self.max_sessions {
            return Err(SessionError::Full {
                max: self.max_sessions,
            });
        }

        let id = Uuid::new_v4();
        let state = SelectionState::new(store);
        let selection = *state.current();
        sessions.insert(
            id,
            Session {
                state,
                last_access: now,
            },
        );
        log::debug!("Created session {id} ({} active)", sessions.len());

        Ok((id, selection))
    }

    /// Returns a copy of the session's current selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] for an unknown session.
    pub fn current(&self, id: Uuid) -> Result<Selection, SessionError> {
        let mut sessions = self.lock()?;
        Ok(*touch(&mut sessions, id)?.current())
    }

    /// Switches the session's dataset, resetting its range to the
    /// dataset's span.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] for an unknown session, or
    /// [`SessionError::Dataset`] for an unknown dataset id.
    pub fn set_active_dataset(
        &self,
        id: Uuid,
        store: &DatasetStore,
        dataset: &str,
    ) -> Result<Selection, SessionError> {
        let mut sessions = self.lock()?;
        Ok(*touch(&mut sessions, id)?.set_active_dataset(store, dataset)?)
    }

    /// Replaces the session's date range.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] for an unknown session.
    pub fn set_date_range(
        &self,
        id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Selection, SessionError> {
        let mut sessions = self.lock()?;
        Ok(*touch(&mut sessions, id)?.set_date_range(start, end))
    }

    /// Closes a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] for an unknown session.
    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.lock()?;
        sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound { id })
    }

    /// Number of open sessions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Poisoned`] if the lock is poisoned.
    pub fn count(&self) -> Result<usize, SessionError> {
        Ok(self.lock()?.len())
    }
}
