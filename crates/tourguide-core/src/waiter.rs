//! Waiting for elements that may not have been rendered yet.
//!
//! [`ElementWaiter::wait_for`] resolves immediately when the selector already
//! matches, otherwise it observes the document and resolves on the first
//! mutation batch after which the selector matches. There is no timeout in
//! the waiter: see [`WaitPolicy`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use log::debug;
use tokio::sync::oneshot;

use crate::dom::{Document, Element, ObserveControl, ObserverId, Selector};

/// How long the orchestrator lets a step wait for its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Wait until the element appears, however long that takes. A step whose
    /// element never appears stalls the tour at that point.
    #[default]
    Indefinite,
    /// Abandon the wait after the given duration. The tour stays on its
    /// current step. When the wait was started by the step's advance-on
    /// trigger, that trigger is already spent, so a step without buttons
    /// can no longer move forward until the page is loaded again.
    Timeout(Duration),
}

impl WaitPolicy {
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            WaitPolicy::Indefinite => None,
            WaitPolicy::Timeout(duration) => Some(*duration),
        }
    }
}

/// Creates [`ElementWait`] futures against one document.
#[derive(Clone)]
pub struct ElementWaiter {
    document: Arc<dyn Document>,
}

impl ElementWaiter {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self { document }
    }

    /// Waits for an element matching `selector`.
    pub fn wait_for(&self, selector: &Selector) -> ElementWait {
        let (sender, receiver) = oneshot::channel();

        if let Some(element) = self.document.query_selector(selector) {
            debug!("'{selector}' already present");
            let _ = sender.send(element);
            return ElementWait {
                selector: selector.clone(),
                receiver,
                observer: None,
                document: Arc::clone(&self.document),
            };
        }

        debug!("Observing document for '{selector}'");
        let target = selector.clone();
        let mut sender = Some(sender);
        let observer = self.document.observe(Box::new(move |document: &dyn Document| {
            let Some(element) = document.query_selector(&target) else {
                return ObserveControl::Continue;
            };
            if let Some(sender) = sender.take() {
                let _ = sender.send(element);
            }
            ObserveControl::Disconnect
        }));

        ElementWait {
            selector: selector.clone(),
            receiver,
            observer: Some(observer),
            document: Arc::clone(&self.document),
        }
    }
}

/// A single-resolution wait for an element.
///
/// Resolves to `Some(element)` exactly once, or `None` if the wait was
/// cancelled. Dropping the wait disconnects its observer.
pub struct ElementWait {
    selector: Selector,
    receiver: oneshot::Receiver<Element>,
    observer: Option<ObserverId>,
    document: Arc<dyn Document>,
}

impl ElementWait {
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Takes the element if the wait has resolved, without blocking.
    pub fn try_take(&mut self) -> Option<Element> {
        let element = self.receiver.try_recv().ok()?;
        self.observer = None;
        Some(element)
    }

    /// Stops observing. The wait will never resolve afterwards.
    pub fn cancel(&mut self) {
        if let Some(observer) = self.observer.take() {
            debug!("Cancelled wait for '{}'", self.selector);
            self.document.disconnect(observer);
        }
        self.receiver.close();
    }
}

impl Future for ElementWait {
    type Output = Option<Element>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        Pin::new(&mut this.receiver).poll(cx).map(|result| {
            this.observer = None;
            result.ok()
        })
    }
}

impl Drop for ElementWait {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            self.document.disconnect(observer);
        }
    }
}
