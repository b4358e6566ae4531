//! Confirmation lines for commands that clear stored progress.

use std::fmt;

use crate::models::TourId;

/// Which stored progress a reset removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressCleared {
    /// Completion flag and resume step of one tour.
    Tour(TourId),
    /// Every tour's completion flag and resume step.
    AllTours,
    /// Resume steps of the current browsing session only.
    Session,
}

impl fmt::Display for ProgressCleared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressCleared::Tour(id) => writeln!(f, "Success: Progress cleared for {id}"),
            ProgressCleared::AllTours => writeln!(f, "Success: Progress cleared for all tours"),
            ProgressCleared::Session => writeln!(f, "Success: Session progress cleared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_cleared_display() {
        assert_eq!(
            ProgressCleared::Tour(TourId::new("contactsTour")).to_string(),
            "Success: Progress cleared for contactsTour\n"
        );
        assert_eq!(
            ProgressCleared::AllTours.to_string(),
            "Success: Progress cleared for all tours\n"
        );
        assert!(ProgressCleared::Session
            .to_string()
            .contains("Session progress cleared"));
    }
}
