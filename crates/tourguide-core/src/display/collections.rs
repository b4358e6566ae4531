//! Collection wrapper types for displaying groups of domain objects.
//!
//! This module provides wrapper types that format collections of domain objects
//! with consistent structure and empty collection handling.

use std::{fmt, ops::Index, sync::Arc};

use crate::models::{ProgressRecord, TourDefinition, TourStatus};

/// Newtype wrapper for displaying the progress of several tours.
///
/// # Examples
///
/// ```rust
/// use tourguide_core::{
///     display::ProgressReport,
///     models::{ProgressRecord, TourId},
/// };
///
/// let report = ProgressReport(vec![ProgressRecord {
///     tour_id: TourId::new("dashboardTour"),
///     last_shown_step: None,
///     completed: true,
/// }]);
/// let output = format!("{}", report);
/// assert!(output.contains("dashboardTour"));
/// assert!(output.contains("1/1 completed"));
/// ```
pub struct ProgressReport(pub Vec<ProgressRecord>);

impl ProgressReport {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&ProgressRecord> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProgressRecord> {
        self.0.iter()
    }

    /// Number of tours in the report that are completed.
    pub fn completed(&self) -> usize {
        self.0
            .iter()
            .filter(|record| record.status() == TourStatus::Completed)
            .count()
    }
}

impl Index<usize> for ProgressReport {
    type Output = ProgressRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for ProgressReport {
    type Item = ProgressRecord;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProgressReport {
    type Item = &'a ProgressRecord;
    type IntoIter = std::slice::Iter<'a, ProgressRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tours found.");
        }

        writeln!(f, "{}/{} completed", self.completed(), self.len())?;
        writeln!(f)?;
        for record in &self.0 {
            write!(f, "{record}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for listing tours without their step copy.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use tourguide_core::{display::TourSummaries, models::TourDefinition};
///
/// let tours = TourSummaries(vec![Arc::new(TourDefinition::new("reportsTour", vec![]))]);
/// assert!(format!("{}", tours).contains("- **reportsTour** (0 steps)"));
/// ```
pub struct TourSummaries(pub Vec<Arc<TourDefinition>>);

impl TourSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<TourDefinition>> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a TourSummaries {
    type Item = &'a Arc<TourDefinition>;
    type IntoIter = std::slice::Iter<'a, Arc<TourDefinition>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for TourSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tours found.");
        }

        for tour in &self.0 {
            let noun = if tour.len() == 1 { "step" } else { "steps" };
            write!(f, "- **{}** ({} {noun})", tour.id, tour.len())?;
            if let Some(first) = tour.first_step() {
                write!(f, ": {}", first.title)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
