//! Data models for tours and progress.
//!
//! - [`TourId`] / [`StepId`]: string identifiers.
//! - [`StepDescriptor`]: one anchored callout with copy, buttons, an optional
//!   auto-advance trigger and an optional readiness wait.
//! - [`TourDefinition`]: an ordered sequence of steps.
//! - [`ProgressRecord`]: the resume cursor and completion flag of one tour.
//!
//! Display implementations live in [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use tourguide_core::dom::Selector;
//! use tourguide_core::models::{ButtonAction, Side, StepDescriptor, TourDefinition};
//!
//! let header = Selector::parse(".page-header-title").unwrap();
//! let tour = TourDefinition::new(
//!     "reportsTour",
//!     vec![StepDescriptor::new("reports1", "Reports", "Gain insights.", header, Side::Right)
//!         .with_button("Finish", ButtonAction::Complete)],
//! );
//!
//! assert_eq!(tour.first_step().unwrap().id, "reports1");
//! assert!(tour.next_after(&"reports1".into()).is_none());
//! ```

pub mod ids;
pub mod progress;
pub mod step;
pub mod tour;

#[cfg(test)]
mod tests;

pub use ids::{StepId, TourId};
pub use progress::{ProgressRecord, TourStatus};
pub use step::{Anchor, AnchorResolver, ButtonAction, NavigationTrigger, Side, StepButton, StepDescriptor};
pub use tour::TourDefinition;
