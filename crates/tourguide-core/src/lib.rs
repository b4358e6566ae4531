//! Core library for the tourguide onboarding orchestrator.
//!
//! Given the path of a page being loaded, the orchestrator decides which
//! guided tour (if any) to show, drives a pluggable tour engine through its
//! steps, waits for late-rendered anchor elements, auto-advances on user
//! actions, and remembers per tour whether it was completed (durably) and
//! where the user left off (per browsing session).
//!
//! # Building Blocks
//!
//! - **Routing** ([`routes`]): ordered exact/prefix rules mapping paths to tours
//! - **Catalog** ([`catalog`]): tour definitions, loaded from JSON data
//! - **Progress** ([`progress`], [`storage`]): completion flags and resume
//!   cursors over durable and session-scoped key/value storage
//! - **Document** ([`dom`], [`waiter`]): selectors, mutation observers and
//!   one-shot event listeners over a page model
//! - **Engine** ([`engine`]): the presentation seam; [`HeadlessEngineFactory`]
//!   renders steps to values
//! - **Orchestration** ([`orchestrator`]): the page lifecycle tying it together
//!
//! # Display Architecture
//!
//! Domain models implement [`std::fmt::Display`] as markdown (see
//! [`display`]), and the CLI renders that markdown in the terminal.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tourguide_core::{HeadlessEngineFactory, OrchestratorBuilder, VirtualDocument};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Arc::new(VirtualDocument::new());
//! let engines = Arc::new(HeadlessEngineFactory::new(document.clone()));
//! let mut orchestrator = OrchestratorBuilder::new()
//!     .with_storage_path(Some("progress.db"))
//!     .build(document, engines.clone())
//!     .await?;
//!
//! orchestrator.load_page("/s/contacts");
//! if let Some(step) = engines.screen() {
//!     println!("{step}");
//! }
//!
//! if let Some(session) = orchestrator.session() {
//!     session.press("Next");
//! }
//! orchestrator.settle();
//! println!("{}", orchestrator.state());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod display;
pub mod dom;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod routes;
pub mod storage;
pub mod waiter;

// Re-export commonly used types
pub use catalog::TourCatalog;
pub use config::OrchestratorConfig;
pub use display::{ProgressCleared, ProgressReport, TourSummaries};
pub use dom::{Document, Element, Selector, VirtualDocument};
pub use engine::{EngineFactory, HeadlessEngineFactory, RenderedStep, TourEngine, TourEvent};
pub use error::{Result, TourError};
pub use keyboard::{KeyCombo, KeyEvent};
pub use models::{
    ButtonAction, ProgressRecord, Side, StepDescriptor, StepId, TourDefinition, TourId,
    TourStatus,
};
pub use orchestrator::{
    ActiveTourSession, Orchestrator, OrchestratorBuilder, OrchestratorState, TourHandle,
};
pub use progress::ProgressStore;
pub use routes::{RouteRule, RouteTable};
pub use storage::{Scope, Storage};
pub use waiter::WaitPolicy;
