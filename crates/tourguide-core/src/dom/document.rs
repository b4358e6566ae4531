//! The document seam and its in-process implementation.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use super::element::{Element, NodeId};
use super::selector::Selector;
use crate::error::Result;

/// What an observer wants after handling a mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveControl {
    Continue,
    Disconnect,
}

/// Handle for a registered mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Handle for a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Called once per mutation batch (node insertions or removals anywhere in
/// the document).
pub type MutationCallback = Box<dyn FnMut(&dyn Document) -> ObserveControl + Send>;

/// Called with the event target the first time a matching event fires.
pub type EventListener = Box<dyn FnOnce(&Element) + Send>;

/// The subset of a live DOM the orchestrator depends on.
pub trait Document: Send + Sync {
    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &Selector) -> Option<Element>;

    /// Watches the whole subtree for insertions and removals.
    fn observe(&self, callback: MutationCallback) -> ObserverId;

    /// Stops an observer. Unknown ids are ignored.
    fn disconnect(&self, id: ObserverId);

    /// Registers a delegated listener that fires at most once, for the first
    /// `event` whose target (or one of its ancestors) matches `selector`.
    fn listen_once(&self, selector: &Selector, event: &str, listener: EventListener)
        -> ListenerId;

    /// Removes a listener that has not fired yet. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Dispatches `event` at the first element matching `selector`. Returns
    /// `false` when no such element exists.
    fn dispatch(&self, selector: &Selector, event: &str) -> bool;
}

struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Observer {
    id: ObserverId,
    // Taken out while the callback runs so it can re-enter the document.
    callback: Option<MutationCallback>,
}

struct Listener {
    id: ListenerId,
    selector: Selector,
    event: String,
    listener: EventListener,
}

#[derive(Default)]
struct DomState {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    observers: Vec<Observer>,
    listeners: Vec<Listener>,
    next_id: u64,
}

impl DomState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn attach(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = NodeId(self.allocate());
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.nodes.insert(
            id,
            Node {
                element,
                parent,
                children: Vec::new(),
            },
        );
        id
    }

    fn detach(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        match node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                stack.extend(removed.children);
            }
        }
        true
    }

    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// The node's element followed by its ancestors, nearest first.
    fn ancestry(&self, id: NodeId) -> Vec<&Element> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(&c)) {
            chain.push(&node.element);
            current = node.parent;
        }
        chain
    }

    fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.preorder().into_iter().find(|id| {
            let chain = self.ancestry(*id);
            chain
                .split_first()
                .is_some_and(|(element, ancestors)| selector.matches(element, ancestors.iter().copied()))
        })
    }

    fn snapshot(&self, id: NodeId) -> Option<Element> {
        self.nodes
            .get(&id)
            .map(|node| node.element.clone().attached(id))
    }
}

/// An in-memory document tree with mutation observers and delegated event
/// listeners.
#[derive(Default)]
pub struct VirtualDocument {
    state: Mutex<DomState>,
}

impl VirtualDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `element` under `parent` (or at the top level) and notifies
    /// observers.
    pub fn append(&self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = self.lock().attach(parent, element);
        self.notify_observers();
        id
    }

    /// Inserts a chain of nested elements described by a selector path, for
    /// example `#trackingconfig pre`, as one mutation batch. Returns the
    /// innermost node.
    ///
    /// # Errors
    ///
    /// Returns `TourError::InvalidSelector` if the path does not parse.
    pub fn insert(&self, selector_path: &str) -> Result<NodeId> {
        let selector = Selector::parse(selector_path)?;
        Ok(self.insert_selector(&selector))
    }

    /// Like [`insert`](Self::insert) for an already parsed selector.
    pub fn insert_selector(&self, selector: &Selector) -> NodeId {
        let id = {
            let mut state = self.lock();
            let mut parent = None;
            for compound in selector.compounds() {
                parent = Some(state.attach(parent, Element::from_compound(compound)));
            }
            parent.unwrap_or_else(|| state.attach(None, Element::detached("div", &[])))
        };
        debug!("Inserted element for '{selector}'");
        self.notify_observers();
        id
    }

    /// Removes a node and its subtree, notifying observers when something
    /// was removed.
    pub fn remove(&self, id: NodeId) -> bool {
        let removed = self.lock().detach(id);
        if removed {
            self.notify_observers();
        }
        removed
    }

    /// Number of connected mutation observers.
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    /// Number of listeners that have not fired yet.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn notify_observers(&self) {
        let batch: Vec<(ObserverId, MutationCallback)> = self
            .lock()
            .observers
            .iter_mut()
            .filter_map(|o| o.callback.take().map(|cb| (o.id, cb)))
            .collect();

        for (id, mut callback) in batch {
            let control = callback(self);
            let mut state = self.lock();
            match control {
                ObserveControl::Disconnect => state.observers.retain(|o| o.id != id),
                ObserveControl::Continue => {
                    // Stays dropped if it was disconnected while running.
                    if let Some(observer) = state.observers.iter_mut().find(|o| o.id == id) {
                        observer.callback = Some(callback);
                    }
                }
            }
        }
    }
}

impl Document for VirtualDocument {
    fn query_selector(&self, selector: &Selector) -> Option<Element> {
        let state = self.lock();
        state.find(selector).and_then(|id| state.snapshot(id))
    }

    fn observe(&self, callback: MutationCallback) -> ObserverId {
        let mut state = self.lock();
        let id = ObserverId(state.allocate());
        state.observers.push(Observer {
            id,
            callback: Some(callback),
        });
        id
    }

    fn disconnect(&self, id: ObserverId) {
        self.lock().observers.retain(|o| o.id != id);
    }

    fn listen_once(
        &self,
        selector: &Selector,
        event: &str,
        listener: EventListener,
    ) -> ListenerId {
        let mut state = self.lock();
        let id = ListenerId(state.allocate());
        state.listeners.push(Listener {
            id,
            selector: selector.clone(),
            event: event.to_string(),
            listener,
        });
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.lock().listeners.retain(|l| l.id != id);
    }

    fn dispatch(&self, selector: &Selector, event: &str) -> bool {
        let (target, fired) = {
            let mut state = self.lock();
            let Some(target_id) = state.find(selector) else {
                return false;
            };
            let Some(target) = state.snapshot(target_id) else {
                return false;
            };
            let path: Vec<Element> = state.ancestry(target_id).into_iter().cloned().collect();

            let (fired, kept): (Vec<Listener>, Vec<Listener>) = std::mem::take(&mut state.listeners)
                .into_iter()
                .partition(|l| {
                    l.event == event
                        && (0..path.len())
                            .any(|i| l.selector.matches(&path[i], path[i + 1..].iter()))
                });
            state.listeners = kept;
            (target, fired)
        };

        debug!("Dispatched '{event}' at {target} ({} listener(s))", fired.len());
        for listener in fired {
            (listener.listener)(&target);
        }
        true
    }
}
