//! Display formatting for tours, progress and orchestrator state.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! groups of values and command outcomes are formatted through small wrapper
//! types. Every formatter produces markdown so the CLI can render it through
//! a terminal skin.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │    Wrappers     │    │    Markdown     │
//! │ (Tour, Step,    │───▶│ (ProgressReport,│───▶│     Output      │
//! │  ProgressRecord)│    │  TourSummaries) │    │   (Terminal)    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrapper types (ProgressReport, TourSummaries)
//! - [`cleared`]: Confirmation after progress is cleared (ProgressCleared)
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage Examples
//!
//! ```rust
//! use tourguide_core::{
//!     display::{ProgressCleared, ProgressReport},
//!     models::{ProgressRecord, StepId, TourId},
//! };
//!
//! let report = ProgressReport(vec![ProgressRecord {
//!     tour_id: TourId::new("contactsTour"),
//!     last_shown_step: Some(StepId::new("contacts2")),
//!     completed: false,
//! }]);
//! let output = format!("{report}");
//! assert!(output.contains("contactsTour"));
//! assert!(output.contains("contacts2"));
//!
//! let cleared = ProgressCleared::Tour(TourId::new("contactsTour"));
//! assert_eq!(cleared.to_string(), "Success: Progress cleared for contactsTour\n");
//! ```

pub mod cleared;
pub mod collections;
pub mod models;

pub use collections::{ProgressReport, TourSummaries};
pub use cleared::ProgressCleared;
