//! Document model: selectors, element snapshots, and the [`Document`] trait
//! the orchestrator uses to find anchors, observe mutations and listen for
//! user actions.
//!
//! [`VirtualDocument`] is the in-process implementation used by the CLI and
//! the tests.

pub mod document;
pub mod element;
pub mod selector;

pub use document::{
    Document, EventListener, ListenerId, MutationCallback, ObserveControl, ObserverId,
    VirtualDocument,
};
pub use element::{Element, NodeId};
pub use selector::Selector;
