#![forbid(unsafe_code)]

//! In-memory [`DomBackend`] for tests.
//!
//! [`MockDom`] keeps a flat element table with parent links, class sets and
//! attachment flags, records every listener subscription, and queues deferred
//! closures until [`run_deferred`](MockDom::run_deferred) drains them. Tests
//! drive it with [`fire`](MockDom::fire) and [`fire_window`](MockDom::fire_window).

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use crate::dom::{CaptureListener, DomBackend, NodeId, WindowEvent, WindowListener};
use crate::event::{UiEvent, UiEventKind};

#[derive(Default)]
struct MockNode {
    parent: Option<NodeId>,
    classes: BTreeSet<String>,
    attached: bool,
    scroll_resets: u32,
}

#[derive(Default)]
struct MockState {
    nodes: Vec<MockNode>,
    capture: HashMap<UiEventKind, Vec<CaptureListener>>,
    window: HashMap<WindowEvent, Vec<WindowListener>>,
    deferred: VecDeque<Box<dyn FnOnce()>>,
    capture_installs: usize,
}

/// In-memory host environment.
pub struct MockDom {
    state: RefCell<MockState>,
}

impl MockDom {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(MockState::default()),
        })
    }

    /// Create an element, optionally under a parent. Elements start detached.
    pub fn create_element(&self, parent: Option<NodeId>) -> NodeId {
        let mut state = self.state.borrow_mut();
        let id = NodeId::new(state.nodes.len() as u64);
        state.nodes.push(MockNode {
            parent,
            ..MockNode::default()
        });
        id
    }

    /// Deliver a capture-phase event and return it for flag inspection.
    pub fn fire(&self, kind: UiEventKind, target: NodeId) -> UiEvent {
        let listeners: Vec<CaptureListener> = self
            .state
            .borrow()
            .capture
            .get(&kind)
            .map(|list| list.iter().map(Rc::clone).collect())
            .unwrap_or_default();
        let event = UiEvent::new(kind, target);
        for listener in listeners {
            listener(&event);
        }
        event
    }

    /// Deliver a window-level event.
    pub fn fire_window(&self, event: WindowEvent) {
        let listeners: Vec<WindowListener> = self
            .state
            .borrow()
            .window
            .get(&event)
            .map(|list| list.iter().map(Rc::clone).collect())
            .unwrap_or_default();
        for listener in listeners {
            listener();
        }
    }

    /// Run queued deferred closures, including ones they queue in turn.
    pub fn run_deferred(&self) {
        loop {
            let next = self.state.borrow_mut().deferred.pop_front();
            match next {
                Some(f) => f(),
                None => break,
            }
        }
    }

    /// Number of deferred closures waiting.
    pub fn deferred_len(&self) -> usize {
        self.state.borrow().deferred.len()
    }

    /// Snapshot of an element's class list, sorted.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.state.borrow().nodes[node.raw() as usize]
            .classes
            .iter()
            .cloned()
            .collect()
    }

    /// How many capture-phase subscriptions were made in total.
    pub fn capture_install_count(&self) -> usize {
        self.state.borrow().capture_installs
    }

    /// How many times an element was scrolled to the top.
    pub fn scroll_resets(&self, node: NodeId) -> u32 {
        self.state.borrow().nodes[node.raw() as usize].scroll_resets
    }
}

impl DomBackend for MockDom {
    fn add_capture_listener(&self, kind: UiEventKind, listener: CaptureListener) {
        let mut state = self.state.borrow_mut();
        state.capture_installs += 1;
        state.capture.entry(kind).or_default().push(listener);
    }

    fn add_window_listener(&self, event: WindowEvent, listener: WindowListener) {
        self.state
            .borrow_mut()
            .window
            .entry(event)
            .or_default()
            .push(listener);
    }

    fn is_descendant_or_self(&self, node: NodeId, ancestor: NodeId) -> bool {
        let state = self.state.borrow();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = state.nodes[id.raw() as usize].parent;
        }
        false
    }

    fn add_class(&self, node: NodeId, class: &str) {
        self.state.borrow_mut().nodes[node.raw() as usize]
            .classes
            .insert(class.to_owned());
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        self.state.borrow_mut().nodes[node.raw() as usize]
            .classes
            .remove(class);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.state.borrow().nodes[node.raw() as usize]
            .classes
            .contains(class)
    }

    fn attach(&self, node: NodeId) {
        self.state.borrow_mut().nodes[node.raw() as usize].attached = true;
    }

    fn detach(&self, node: NodeId) {
        self.state.borrow_mut().nodes[node.raw() as usize].attached = false;
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.state.borrow().nodes[node.raw() as usize].attached
    }

    fn scroll_to_top(&self, node: NodeId) {
        self.state.borrow_mut().nodes[node.raw() as usize].scroll_resets += 1;
    }

    fn defer(&self, f: Box<dyn FnOnce()>) {
        self.state.borrow_mut().deferred.push_back(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn descendant_check_walks_parents() {
        let dom = MockDom::new();
        let root = dom.create_element(None);
        let mid = dom.create_element(Some(root));
        let leaf = dom.create_element(Some(mid));
        let other = dom.create_element(None);

        assert!(dom.is_descendant_or_self(leaf, root));
        assert!(dom.is_descendant_or_self(leaf, leaf));
        assert!(!dom.is_descendant_or_self(leaf, other));
        assert!(!dom.is_descendant_or_self(root, leaf));
    }

    #[test]
    fn class_operations_are_idempotent() {
        let dom = MockDom::new();
        let node = dom.create_element(None);
        dom.add_class(node, "show");
        dom.add_class(node, "show");
        assert!(dom.has_class(node, "show"));
        assert_eq!(dom.classes(node), vec!["show"]);
        dom.remove_class(node, "show");
        dom.remove_class(node, "show");
        assert!(!dom.has_class(node, "show"));
    }

    #[test]
    fn deferred_closures_run_in_order_and_may_chain() {
        let dom = MockDom::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let dom2 = Rc::clone(&dom);
        let o2 = Rc::clone(&order);
        dom.defer(Box::new(move || {
            o1.borrow_mut().push(1);
            dom2.defer(Box::new(move || o2.borrow_mut().push(3)));
        }));
        let o3 = Rc::clone(&order);
        dom.defer(Box::new(move || o3.borrow_mut().push(2)));

        dom.run_deferred();
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
        assert_eq!(dom.deferred_len(), 0);
    }

    #[test]
    fn fire_without_listeners_returns_untouched_event() {
        let dom = MockDom::new();
        let node = dom.create_element(None);
        let event = dom.fire(UiEventKind::Click, node);
        assert!(!event.propagation_stopped());
    }

    #[test]
    fn fire_window_reaches_all_listeners() {
        let dom = MockDom::new();
        let count = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let counter = Rc::clone(&count);
            dom.add_window_listener(
                WindowEvent::Scroll,
                Rc::new(move || counter.set(counter.get() + 1)),
            );
        }
        dom.fire_window(WindowEvent::Scroll);
        assert_eq!(count.get(), 2);
    }
}
