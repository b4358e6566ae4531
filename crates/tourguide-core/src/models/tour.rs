//! Tour definition model.

use serde::Deserialize;

use super::{StepDescriptor, StepId, TourId};

/// A tour: an ordered, non-branching sequence of steps.
#[derive(Debug, Clone, Deserialize)]
pub struct TourDefinition {
    pub id: TourId,
    pub steps: Vec<StepDescriptor>,
}

impl TourDefinition {
    pub fn new(id: impl Into<String>, steps: Vec<StepDescriptor>) -> Self {
        Self {
            id: TourId::new(id),
            steps,
        }
    }

    pub fn first_step(&self) -> Option<&StepDescriptor> {
        self.steps.first()
    }

    pub fn step(&self, id: &StepId) -> Option<&StepDescriptor> {
        self.steps.iter().find(|s| &s.id == id)
    }

    /// 0-based position of a step.
    pub fn position(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == id)
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.position(id).is_some()
    }

    /// The step after `id`; `None` when `id` is the last step or unknown.
    pub fn next_after(&self, id: &StepId) -> Option<&StepDescriptor> {
        self.position(id).and_then(|i| self.steps.get(i + 1))
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}
