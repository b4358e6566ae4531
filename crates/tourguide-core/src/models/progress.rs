//! Per-tour progress as seen through the progress store.

use serde::Serialize;

use super::{StepId, TourId};

/// Where a user stands with one tour.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProgressRecord {
    pub tour_id: TourId,
    /// Last step shown in the current browsing session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_shown_step: Option<StepId>,
    /// Durable completion flag.
    pub completed: bool,
}

/// Summary status derived from a [`ProgressRecord`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressRecord {
    pub fn status(&self) -> TourStatus {
        match (self.completed, &self.last_shown_step) {
            (true, _) => TourStatus::Completed,
            (false, Some(_)) => TourStatus::InProgress,
            (false, None) => TourStatus::NotStarted,
        }
    }
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::NotStarted => "not started",
            TourStatus::InProgress => "in progress",
            TourStatus::Completed => "completed",
        }
    }

    /// Status with an icon for terminal display.
    ///
    /// ```rust
    /// use tourguide_core::models::TourStatus;
    ///
    /// assert_eq!(TourStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TourStatus::InProgress.with_icon(), "➤ In Progress");
    /// assert_eq!(TourStatus::NotStarted.with_icon(), "○ Not Started");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TourStatus::Completed => "✓ Completed",
            TourStatus::InProgress => "➤ In Progress",
            TourStatus::NotStarted => "○ Not Started",
        }
    }
}
