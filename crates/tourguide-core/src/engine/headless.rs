//! An in-process engine that renders steps to a value instead of a screen.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use super::{EngineEvents, EngineFactory, TourEngine};
use crate::dom::{Document, Element};
use crate::models::{Side, StepDescriptor, StepId};

/// A call made on a [`HeadlessEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    AddStep(StepId),
    Start,
    Show(StepId),
    Next,
    Complete,
}

/// What the engine currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    pub step_id: StepId,
    pub title: String,
    pub text: String,
    pub side: Side,
    /// The element the step is attached to; `None` renders it unattached.
    pub anchor: Option<Element>,
    pub buttons: Vec<String>,
}

impl RenderedStep {
    fn render(step: &StepDescriptor, document: &dyn Document) -> Self {
        Self {
            step_id: step.id.clone(),
            title: step.title.clone(),
            text: step.text.clone(),
            side: step.side,
            anchor: step.anchor.resolve(document),
            buttons: step.buttons.iter().map(|b| b.text.clone()).collect(),
        }
    }
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<EngineCall>,
    created: usize,
    screen: Option<RenderedStep>,
}

/// Creates [`HeadlessEngine`]s that share one call log and one screen.
#[derive(Clone)]
pub struct HeadlessEngineFactory {
    document: Arc<dyn Document>,
    recorder: Arc<Mutex<Recorder>>,
}

impl HeadlessEngineFactory {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self {
            document,
            recorder: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call made on any engine of this factory, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().calls.clone()
    }

    /// Number of engines created so far.
    pub fn created(&self) -> usize {
        self.lock().created
    }

    /// The step currently on screen.
    pub fn screen(&self) -> Option<RenderedStep> {
        self.lock().screen.clone()
    }
}

impl EngineFactory for HeadlessEngineFactory {
    fn create(&self, events: EngineEvents) -> Box<dyn TourEngine> {
        let mut recorder = self.lock();
        recorder.created += 1;
        recorder.screen = None;
        Box::new(HeadlessEngine {
            document: Arc::clone(&self.document),
            recorder: Arc::clone(&self.recorder),
            events,
            steps: Vec::new(),
            current: None,
        })
    }
}

/// Engine that keeps the rendered step in memory and logs every call.
pub struct HeadlessEngine {
    document: Arc<dyn Document>,
    recorder: Arc<Mutex<Recorder>>,
    events: EngineEvents,
    steps: Vec<StepDescriptor>,
    current: Option<usize>,
}

impl HeadlessEngine {
    fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: EngineCall) {
        self.lock().calls.push(call);
    }

    fn show_index(&mut self, index: usize) {
        let Some(step) = self.steps.get(index) else {
            return;
        };
        let rendered = RenderedStep::render(step, self.document.as_ref());
        if rendered.anchor.is_none() {
            debug!("Anchor for {} not found, rendering unattached", step.id);
        }
        self.lock().screen = Some(rendered);
        self.current = Some(index);
        self.events.shown(&step.id);
    }

    fn finish(&mut self) {
        if self.current.take().is_some() {
            self.lock().screen = None;
            self.events.completed();
        }
    }
}

impl TourEngine for HeadlessEngine {
    fn add_step(&mut self, step: &StepDescriptor) {
        self.record(EngineCall::AddStep(step.id.clone()));
        self.steps.push(step.clone());
    }

    fn start(&mut self) {
        self.record(EngineCall::Start);
        self.show_index(0);
    }

    fn show(&mut self, step_id: &StepId) {
        self.record(EngineCall::Show(step_id.clone()));
        match self.steps.iter().position(|s| &s.id == step_id) {
            Some(index) => self.show_index(index),
            None => warn!("Engine has no step {step_id}"),
        }
    }

    fn next(&mut self) {
        self.record(EngineCall::Next);
        match self.current {
            Some(index) if index + 1 < self.steps.len() => self.show_index(index + 1),
            Some(_) => self.finish(),
            None => {}
        }
    }

    fn complete(&mut self) {
        self.record(EngineCall::Complete);
        self.finish();
    }

    fn current_step(&self) -> Option<StepId> {
        self.current
            .and_then(|index| self.steps.get(index))
            .map(|step| step.id.clone())
    }
}
