//! The running tour and the handles that navigate it.

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use tokio::sync::mpsc::UnboundedSender;

use super::{Message, Navigation};
use crate::dom::{Document, Element, ListenerId, Selector};
use crate::engine::TourEngine;
use crate::models::{ButtonAction, StepDescriptor, StepId, TourDefinition, TourId};
use crate::waiter::ElementWait;

/// A step held back until its element exists.
pub(crate) struct PendingStep {
    pub(crate) step_id: StepId,
    pub(crate) wait: ElementWait,
    pub(crate) deadline: Option<Instant>,
}

/// The one tour currently running. Owned by the orchestrator; created when a
/// tour starts and dropped on completion, reset or page unload.
pub struct ActiveTourSession {
    pub(crate) tour: Arc<TourDefinition>,
    pub(crate) cursor: Option<StepId>,
    pub(crate) engine: Box<dyn TourEngine>,
    pub(crate) generation: u64,
    pub(crate) trigger: Option<(StepId, ListenerId)>,
    pub(crate) pending: Option<PendingStep>,
    pub(crate) sender: UnboundedSender<Message>,
}

impl ActiveTourSession {
    pub fn tour_id(&self) -> &TourId {
        &self.tour.id
    }

    pub fn tour(&self) -> &TourDefinition {
        &self.tour
    }

    /// The step last reported as shown.
    pub fn current_step(&self) -> Option<&StepDescriptor> {
        self.cursor.as_ref().and_then(|id| self.tour.step(id))
    }

    /// The engine's step, which is ahead of the cursor while its shown
    /// notification is still queued.
    pub(crate) fn current_id(&self) -> Option<StepId> {
        self.engine.current_step().or_else(|| self.cursor.clone())
    }

    /// The step waiting for its element, if any.
    pub fn pending_step(&self) -> Option<&StepId> {
        self.pending.as_ref().map(|p| &p.step_id)
    }

    /// A navigation handle bound to this session.
    pub fn handle(&self) -> TourHandle {
        TourHandle {
            generation: self.generation,
            sender: self.sender.clone(),
        }
    }

    /// Presses a button of the current step by its label. Returns `false`
    /// when no step is shown or the step has no such button.
    pub fn press(&self, text: &str) -> bool {
        let Some(button) = self.current_step().and_then(|step| step.button(text)) else {
            return false;
        };
        let nav = match &button.action {
            ButtonAction::Next => Navigation::Next,
            ButtonAction::Complete => Navigation::Complete,
            ButtonAction::Follow { selector, complete } => Navigation::Follow {
                selector: selector.clone(),
                complete: *complete,
            },
        };
        self.handle().send(nav);
        true
    }

    /// Arms the step's auto-advance listener, replacing any previous one.
    pub(crate) fn arm(&mut self, document: &dyn Document, step: &StepDescriptor) {
        self.disarm(document);
        let Some(trigger) = &step.advance_on else {
            return;
        };

        let sender = self.sender.clone();
        let generation = self.generation;
        let step_id = step.id.clone();
        let listener = document.listen_once(
            &trigger.selector,
            &trigger.event,
            Box::new(move |_: &Element| {
                let _ = sender.send(Message::Triggered {
                    generation,
                    step_id,
                });
            }),
        );
        debug!(
            "Armed '{}' on '{}' for {}",
            trigger.event, trigger.selector, step.id
        );
        self.trigger = Some((step.id.clone(), listener));
    }

    pub(crate) fn disarm(&mut self, document: &dyn Document) {
        if let Some((_, listener)) = self.trigger.take() {
            document.remove_listener(listener);
        }
    }

    pub(crate) fn cancel_wait(&mut self) {
        if let Some(mut pending) = self.pending.take() {
            pending.wait.cancel();
        }
    }

    /// Releases every document resource held by the session.
    pub(crate) fn release(&mut self, document: &dyn Document) {
        self.cancel_wait();
        self.disarm(document);
    }
}

/// Cloneable navigation handle for the active tour.
///
/// Commands are queued and take effect when the orchestrator next processes
/// its inbox. Commands sent through a handle of a session that has since
/// ended are ignored.
#[derive(Debug, Clone)]
pub struct TourHandle {
    generation: u64,
    sender: UnboundedSender<Message>,
}

impl TourHandle {
    pub fn next(&self) {
        self.send(Navigation::Next);
    }

    pub fn show(&self, step_id: impl Into<String>) {
        self.send(Navigation::Show(StepId::new(step_id)));
    }

    pub fn complete(&self) {
        self.send(Navigation::Complete);
    }

    /// Clicks `selector` on the page, completing the tour first when
    /// `complete` is set and advancing it otherwise.
    pub fn follow(&self, selector: Selector, complete: bool) {
        self.send(Navigation::Follow { selector, complete });
    }

    fn send(&self, nav: Navigation) {
        let _ = self.sender.send(Message::Navigate {
            generation: self.generation,
            nav,
        });
    }
}
