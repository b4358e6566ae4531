//! The step-rendering engine seam.
//!
//! The orchestrator never renders anything itself. It creates one engine per
//! tour activation through an [`EngineFactory`], registers every step, and
//! drives it with `start`/`show`/`next`/`complete`. The engine reports back
//! through the [`EngineEvents`] handle it was created with.

use tokio::sync::mpsc::UnboundedSender;

use crate::models::{StepDescriptor, StepId};
use crate::orchestrator::Message;

pub mod headless;

pub use headless::{EngineCall, HeadlessEngine, HeadlessEngineFactory, RenderedStep};

/// Lifecycle notification emitted by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    /// A step became visible.
    Shown { step_id: StepId },
    /// The tour finished, whatever the cause.
    Completed,
}

/// Emits engine notifications into the orchestrator's inbox.
///
/// Each handle is bound to one tour activation; notifications from an engine
/// whose activation has ended are discarded by the orchestrator.
#[derive(Debug, Clone)]
pub struct EngineEvents {
    generation: u64,
    sender: UnboundedSender<Message>,
}

impl EngineEvents {
    pub(crate) fn new(generation: u64, sender: UnboundedSender<Message>) -> Self {
        Self { generation, sender }
    }

    pub fn shown(&self, step_id: &StepId) {
        self.emit(TourEvent::Shown {
            step_id: step_id.clone(),
        });
    }

    pub fn completed(&self) {
        self.emit(TourEvent::Completed);
    }

    fn emit(&self, event: TourEvent) {
        // The orchestrator owns the receiver; a send only fails after it is gone.
        let _ = self.sender.send(Message::Engine {
            generation: self.generation,
            event,
        });
    }
}

/// A step-rendering engine driving one tour.
pub trait TourEngine: Send {
    /// Registers a step. Steps are shown in registration order.
    fn add_step(&mut self, step: &StepDescriptor);

    /// Shows the first step.
    fn start(&mut self);

    /// Shows the step with the given id.
    fn show(&mut self, step_id: &StepId);

    /// Shows the step after the current one, completing the tour after the
    /// last step.
    fn next(&mut self);

    /// Ends the tour and emits [`TourEvent::Completed`].
    fn complete(&mut self);

    /// The step currently shown, if any.
    fn current_step(&self) -> Option<StepId>;
}

/// Creates a fresh engine for each tour activation.
pub trait EngineFactory: Send + Sync {
    fn create(&self, events: EngineEvents) -> Box<dyn TourEngine>;
}
