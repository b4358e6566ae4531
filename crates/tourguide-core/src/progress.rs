//! Per-tour progress persisted across page loads.
//!
//! Layout, matching what the product has always written:
//!
//! | Scope   | Key                  | Value                 |
//! |---------|----------------------|-----------------------|
//! | session | `<tourId>Step`       | last shown step id    |
//! | durable | `<tourId>Completed`  | `"true"` once complete|
//!
//! Every operation is infallible from the caller's point of view: read
//! failures behave as absent keys and write failures are logged and dropped.

use std::sync::Arc;

use log::{debug, warn};

use crate::models::{ProgressRecord, StepId, TourId};
use crate::storage::Storage;

const STEP_SUFFIX: &str = "Step";
const COMPLETED_SUFFIX: &str = "Completed";
const COMPLETED_VALUE: &str = "true";

/// Session key holding the resume cursor of `tour`.
pub fn step_key(tour: &TourId) -> String {
    format!("{tour}{STEP_SUFFIX}")
}

/// Durable key holding the completion flag of `tour`.
pub fn completed_key(tour: &TourId) -> String {
    format!("{tour}{COMPLETED_SUFFIX}")
}

/// Resume cursors and completion flags over two storage scopes.
#[derive(Clone)]
pub struct ProgressStore {
    durable: Arc<dyn Storage>,
    session: Arc<dyn Storage>,
}

impl ProgressStore {
    pub fn new(durable: Arc<dyn Storage>, session: Arc<dyn Storage>) -> Self {
        Self { durable, session }
    }

    pub fn is_completed(&self, tour: &TourId) -> bool {
        read(self.durable.as_ref(), &completed_key(tour)).as_deref() == Some(COMPLETED_VALUE)
    }

    /// Sets the durable completion flag. Idempotent.
    pub fn mark_completed(&self, tour: &TourId) {
        debug!("Marking {tour} completed");
        write(self.durable.as_ref(), &completed_key(tour), COMPLETED_VALUE);
    }

    pub fn get_resume_step(&self, tour: &TourId) -> Option<StepId> {
        read(self.session.as_ref(), &step_key(tour)).map(StepId::new)
    }

    /// Overwrites the resume cursor.
    pub fn set_resume_step(&self, tour: &TourId, step: &StepId) {
        write(self.session.as_ref(), &step_key(tour), step.as_str());
    }

    pub fn clear_resume_step(&self, tour: &TourId) {
        remove(self.session.as_ref(), &step_key(tour));
    }

    /// Clears the cursor and the completion flag of one tour.
    pub fn reset(&self, tour: &TourId) {
        debug!("Resetting progress for {tour}");
        remove(self.session.as_ref(), &step_key(tour));
        remove(self.durable.as_ref(), &completed_key(tour));
    }

    /// Clears every cursor and completion flag, including those of tours no
    /// longer in the catalog.
    pub fn reset_all(&self) {
        debug!("Resetting progress for all tours");
        remove_suffixed(self.session.as_ref(), STEP_SUFFIX);
        remove_suffixed(self.durable.as_ref(), COMPLETED_SUFFIX);
    }

    /// Forgets every session-scoped value, as closing the browser does.
    /// Completion flags are kept.
    pub fn end_session(&self) {
        debug!("Ending browsing session");
        if let Err(e) = self.session.clear() {
            warn!("Failed to clear session storage: {e}");
        }
    }

    pub fn record(&self, tour: &TourId) -> ProgressRecord {
        ProgressRecord {
            tour_id: tour.clone(),
            last_shown_step: self.get_resume_step(tour),
            completed: self.is_completed(tour),
        }
    }
}

fn read(storage: &dyn Storage, key: &str) -> Option<String> {
    storage.get_item(key).unwrap_or_else(|e| {
        warn!("Treating '{key}' as absent: {e}");
        None
    })
}

fn write(storage: &dyn Storage, key: &str, value: &str) {
    if let Err(e) = storage.set_item(key, value) {
        warn!("Dropped write of '{key}': {e}");
    }
}

fn remove(storage: &dyn Storage, key: &str) {
    if let Err(e) = storage.remove_item(key) {
        warn!("Failed to remove '{key}': {e}");
    }
}

fn remove_suffixed(storage: &dyn Storage, suffix: &str) {
    let keys = match storage.keys() {
        Ok(keys) => keys,
        Err(e) => {
            warn!("Failed to list storage keys: {e}");
            return;
        }
    };
    for key in keys.iter().filter(|k| k.ends_with(suffix)) {
        remove(storage, key);
    }
}
