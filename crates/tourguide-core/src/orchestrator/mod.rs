//! Page-load driven tour orchestration.
//!
//! The [`Orchestrator`] ties the other components together:
//!
//! ```text
//! load_page(path)
//!     │
//!     ▼
//! RouteTable ──none──▶ Idle
//!     │ tour
//!     ▼
//! ProgressStore ──completed──▶ CompletedSkip
//!     │
//!     ▼
//! TourCatalog ─▶ EngineFactory ─▶ Active ──Completed──▶ Finished
//! ```
//!
//! Everything that happens after activation arrives as a message in a single
//! inbox: engine notifications, navigation commands from [`TourHandle`]s,
//! auto-advance triggers fired by the document and key presses. Messages are
//! tagged with the generation of the activation that produced them, and
//! messages from an activation that has since ended are dropped.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tourguide_core::{HeadlessEngineFactory, OrchestratorBuilder, OrchestratorState, VirtualDocument};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Arc::new(VirtualDocument::new());
//! let engines = Arc::new(HeadlessEngineFactory::new(document.clone()));
//! let mut orchestrator = OrchestratorBuilder::new()
//!     .with_memory_storage()
//!     .build(document, engines)
//!     .await?;
//!
//! orchestrator.load_page("/s/dashboard");
//! assert!(matches!(orchestrator.state(), OrchestratorState::Active { .. }));
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::catalog::TourCatalog;
use crate::config::OrchestratorConfig;
use crate::dom::{Document, Element, Selector};
use crate::engine::{EngineEvents, EngineFactory, TourEvent};
use crate::keyboard::KeyEvent;
use crate::models::{StepId, TourId};
use crate::progress::ProgressStore;
use crate::routes::RouteTable;
use crate::waiter::ElementWaiter;

pub mod builder;
pub mod session;

#[cfg(test)]
mod tests;

pub use builder::OrchestratorBuilder;
use session::PendingStep;
pub use session::{ActiveTourSession, TourHandle};

/// Where the orchestrator stands for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorState {
    /// No page loaded, or the page maps to no tour.
    Idle,
    /// The page maps to a tour that cannot run (unknown to the catalog or
    /// without steps).
    Resolved(TourId),
    /// The page's tour was completed earlier; nothing runs.
    CompletedSkip(TourId),
    /// A tour is running. `step_id` is the last step shown, `None` until the
    /// first step appears.
    Active {
        tour_id: TourId,
        step_id: Option<StepId>,
    },
    /// The page's tour completed during this page view.
    Finished(TourId),
}

impl OrchestratorState {
    pub fn tour_id(&self) -> Option<&TourId> {
        match self {
            OrchestratorState::Idle => None,
            OrchestratorState::Resolved(tour_id)
            | OrchestratorState::CompletedSkip(tour_id)
            | OrchestratorState::Finished(tour_id)
            | OrchestratorState::Active { tour_id, .. } => Some(tour_id),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::Resolved(_) => "resolved",
            OrchestratorState::CompletedSkip(_) => "completed-skip",
            OrchestratorState::Active { .. } => "active",
            OrchestratorState::Finished(_) => "finished",
        }
    }
}

/// Navigation requested by a button, handle or trigger.
#[derive(Debug, Clone)]
pub(crate) enum Navigation {
    Next,
    Show(StepId),
    Complete,
    Follow { selector: Selector, complete: bool },
}

/// Inbox message.
#[derive(Debug)]
pub(crate) enum Message {
    Engine { generation: u64, event: TourEvent },
    Navigate { generation: u64, nav: Navigation },
    Triggered { generation: u64, step_id: StepId },
    Key(KeyEvent),
}

/// How a step is handed to the engine once it may render.
#[derive(Debug, Clone, Copy)]
enum Entry {
    Start,
    Next,
    Show,
}

enum Wake {
    Stop,
    Message(Option<Message>),
    Ready(Option<Element>),
    Deadline,
}

/// Decides which tour runs on a page and keeps its progress current.
pub struct Orchestrator {
    document: Arc<dyn Document>,
    waiter: ElementWaiter,
    catalog: TourCatalog,
    routes: RouteTable,
    progress: ProgressStore,
    engines: Arc<dyn EngineFactory>,
    config: OrchestratorConfig,
    state: OrchestratorState,
    session: Option<ActiveTourSession>,
    path: Option<String>,
    generation: u64,
    sender: UnboundedSender<Message>,
    inbox: UnboundedReceiver<Message>,
}

impl Orchestrator {
    pub(crate) fn new(
        document: Arc<dyn Document>,
        engines: Arc<dyn EngineFactory>,
        catalog: TourCatalog,
        routes: RouteTable,
        progress: ProgressStore,
        config: OrchestratorConfig,
    ) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        Self {
            waiter: ElementWaiter::new(Arc::clone(&document)),
            document,
            catalog,
            routes,
            progress,
            engines,
            config,
            state: OrchestratorState::Idle,
            session: None,
            path: None,
            generation: 0,
            sender,
            inbox,
        }
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn session(&self) -> Option<&ActiveTourSession> {
        self.session.as_ref()
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn catalog(&self) -> &TourCatalog {
        &self.catalog
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// The path of the loaded page.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The selector a held-back step is waiting for.
    pub fn waiting_for(&self) -> Option<&Selector> {
        self.session
            .as_ref()
            .and_then(|s| s.pending.as_ref())
            .map(|p| p.wait.selector())
    }

    /// Handles a page load: tears down whatever ran on the previous page,
    /// then resolves, gates and starts the page's tour.
    pub fn load_page(&mut self, path: &str) {
        self.teardown();
        info!("Page loaded: {path}");
        self.path = Some(path.to_string());
        self.activate();
        self.settle();
    }

    /// Page teardown. Pending waits and listeners are dropped without any
    /// progress write; the resume cursor stays where it was.
    pub fn unload(&mut self) {
        self.settle();
        self.teardown();
        self.path = None;
        self.state = OrchestratorState::Idle;
    }

    /// Clears the progress of every tour and restarts the current page's tour
    /// from its first step. The running tour is force-completed without being
    /// recorded as completed.
    pub fn reset(&mut self) {
        info!("Resetting all tours");
        self.progress.reset_all();
        if let Some(mut session) = self.session.take() {
            session.release(self.document.as_ref());
            session.engine.complete();
        }
        self.generation += 1;

        if self.path.is_some() {
            self.activate();
        } else {
            self.state = OrchestratorState::Idle;
        }
        self.settle();
    }

    /// Delivers a key press; the reset shortcut triggers [`reset`](Self::reset).
    pub fn handle_key(&mut self, event: KeyEvent) {
        let _ = self.sender.send(Message::Key(event));
        self.settle();
    }

    /// Processes everything that is ready without blocking: queued messages,
    /// resolved element waits and expired wait deadlines.
    pub fn settle(&mut self) {
        loop {
            self.poll_pending();
            match self.inbox.try_recv() {
                Ok(message) => self.handle(message),
                Err(_) => break,
            }
        }
    }

    /// Runs the event loop until `stop` resolves, sleeping while nothing is
    /// ready.
    pub async fn run_until<F>(&mut self, stop: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);
        loop {
            self.settle();
            let wake = {
                let pending = self.session.as_mut().and_then(|s| s.pending.as_mut());
                let deadline = pending.as_ref().and_then(|p| p.deadline);
                tokio::select! {
                    () = &mut stop => Wake::Stop,
                    message = self.inbox.recv() => Wake::Message(message),
                    element = wait_pending(pending) => Wake::Ready(element),
                    () = sleep_until(deadline) => Wake::Deadline,
                }
            };

            match wake {
                Wake::Stop => break,
                Wake::Message(Some(message)) => self.handle(message),
                Wake::Message(None) => break,
                Wake::Ready(Some(_)) => self.release_pending(),
                Wake::Ready(None) => {
                    if let Some(session) = self.session.as_mut() {
                        session.pending = None;
                    }
                }
                Wake::Deadline => self.poll_pending(),
            }
        }
    }

    fn activate(&mut self) {
        let Some(path) = self.path.as_deref() else {
            self.state = OrchestratorState::Idle;
            return;
        };
        let Some(tour_id) = self.routes.resolve(path).cloned() else {
            debug!("No tour for {path}");
            self.state = OrchestratorState::Idle;
            return;
        };
        self.state = OrchestratorState::Resolved(tour_id.clone());

        if self.progress.is_completed(&tour_id) {
            info!("{tour_id} already completed, not starting again");
            self.state = OrchestratorState::CompletedSkip(tour_id);
            return;
        }

        let Some(tour) = self.catalog.get(&tour_id).filter(|t| !t.is_empty()) else {
            warn!("No steps for {tour_id}");
            return;
        };

        self.generation += 1;
        let mut engine = self
            .engines
            .create(EngineEvents::new(self.generation, self.sender.clone()));
        for step in &tour.steps {
            debug!("Adding step {}", step.id);
            engine.add_step(step);
        }

        let resume = self.progress.get_resume_step(&tour_id).and_then(|step_id| {
            if tour.contains(&step_id) {
                Some(step_id)
            } else {
                warn!("Stored step {step_id} is not part of {tour_id}, starting over");
                None
            }
        });
        let first = tour.steps[0].id.clone();

        self.session = Some(ActiveTourSession {
            tour,
            cursor: None,
            engine,
            generation: self.generation,
            trigger: None,
            pending: None,
            sender: self.sender.clone(),
        });
        self.state = OrchestratorState::Active {
            tour_id: tour_id.clone(),
            step_id: None,
        };

        match resume {
            Some(step_id) => {
                info!("Resuming {tour_id} at {step_id}");
                self.enter_step(step_id, Entry::Show);
            }
            None => {
                info!("Starting {tour_id}");
                self.enter_step(first, Entry::Start);
            }
        }
    }

    /// Hands a step to the engine, or holds it back until its element exists.
    fn enter_step(&mut self, step_id: StepId, entry: Entry) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.cancel_wait();

        let ready_wait = session.tour.step(&step_id).and_then(|s| s.ready_wait.clone());
        if let Some(selector) = ready_wait {
            let mut wait = self.waiter.wait_for(&selector);
            if wait.try_take().is_none() {
                debug!("Holding {step_id} until '{selector}' appears");
                let deadline = self.config.wait_policy.timeout().map(|d| Instant::now() + d);
                session.pending = Some(PendingStep {
                    step_id,
                    wait,
                    deadline,
                });
                return;
            }
        }

        match entry {
            Entry::Start => session.engine.start(),
            Entry::Next => session.engine.next(),
            Entry::Show => session.engine.show(&step_id),
        }
    }

    /// Shows the held-back step once its wait resolved.
    fn release_pending(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(pending) = session.pending.take() {
            debug!("'{}' appeared, showing {}", pending.wait.selector(), pending.step_id);
            session.engine.show(&pending.step_id);
        }
    }

    fn poll_pending(&mut self) {
        let Some(pending) = self.session.as_mut().and_then(|s| s.pending.as_mut()) else {
            return;
        };
        if pending.wait.try_take().is_some() {
            self.release_pending();
        } else if pending.deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(
                "Gave up waiting for '{}', {} stays hidden",
                pending.wait.selector(),
                pending.step_id
            );
            if let Some(session) = self.session.as_mut() {
                session.cancel_wait();
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        let current = self.session.is_some() && generation == self.generation;
        if !current {
            debug!("Dropping message from ended activation {generation}");
        }
        current
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Engine { generation, event } if self.is_current(generation) => match event {
                TourEvent::Shown { step_id } => self.on_shown(step_id),
                TourEvent::Completed => self.on_completed(),
            },
            Message::Navigate { generation, nav } if self.is_current(generation) => {
                self.navigate(nav);
            }
            Message::Triggered {
                generation,
                step_id,
            } if self.is_current(generation) => self.on_triggered(&step_id),
            Message::Key(event) => {
                if self.config.reset_shortcut.matches(&event) {
                    self.reset();
                }
            }
            Message::Engine { .. } | Message::Navigate { .. } | Message::Triggered { .. } => {}
        }
    }

    fn on_shown(&mut self, step_id: StepId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        debug!("Shown {step_id}");
        self.progress.set_resume_step(&session.tour.id, &step_id);

        let tour = Arc::clone(&session.tour);
        match tour.step(&step_id) {
            Some(step) => session.arm(self.document.as_ref(), step),
            None => session.disarm(self.document.as_ref()),
        }
        session.cursor = Some(step_id.clone());
        self.state = OrchestratorState::Active {
            tour_id: tour.id.clone(),
            step_id: Some(step_id),
        };
    }

    fn on_completed(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let tour_id = session.tour.id.clone();
        info!("{tour_id} completed");
        self.progress.mark_completed(&tour_id);
        self.progress.clear_resume_step(&tour_id);
        session.release(self.document.as_ref());
        self.generation += 1;
        self.state = OrchestratorState::Finished(tour_id);
    }

    fn on_triggered(&mut self, step_id: &StepId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.current_id().as_ref() != Some(step_id) {
            debug!("Ignoring trigger for {step_id}, no longer current");
            return;
        }
        debug!("Trigger fired on {step_id}");
        session.trigger = None;
        self.navigate(Navigation::Next);
    }

    fn navigate(&mut self, nav: Navigation) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match nav {
            Navigation::Next => {
                let Some(cursor) = session.current_id() else {
                    debug!("Ignoring next before the first step is shown");
                    return;
                };
                match session.tour.next_after(&cursor).map(|s| s.id.clone()) {
                    Some(next) => self.enter_step(next, Entry::Next),
                    None => {
                        session.cancel_wait();
                        session.engine.next();
                    }
                }
            }
            Navigation::Show(step_id) => {
                if session.tour.contains(&step_id) {
                    self.enter_step(step_id, Entry::Show);
                } else {
                    warn!("{} has no step {step_id}", session.tour.id);
                }
            }
            Navigation::Complete => {
                session.cancel_wait();
                session.engine.complete();
            }
            Navigation::Follow { selector, complete } => {
                if complete {
                    self.navigate(Navigation::Complete);
                    self.document.dispatch(&selector, "click");
                } else {
                    self.document.dispatch(&selector, "click");
                    self.navigate(Navigation::Next);
                }
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            debug!("Tearing down {}", session.tour.id);
            session.release(self.document.as_ref());
        }
        self.generation += 1;
    }
}

async fn wait_pending(pending: Option<&mut PendingStep>) -> Option<Element> {
    match pending {
        Some(pending) => (&mut pending.wait).await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
