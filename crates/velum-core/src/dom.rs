#![forbid(unsafe_code)]

//! The boundary with the host environment.
//!
//! Velum never touches a document tree directly. The [`DomBackend`] trait
//! covers everything it needs from the host: capture-phase subscription,
//! ancestor tests, class application, attachment, scrolling, and a
//! yield-one-tick scheduling primitive. A browser integration implements
//! this over the real DOM; tests use the in-memory backend from
//! [`crate::testing`].

use std::rc::Rc;

use crate::event::{UiEvent, UiEventKind};

/// Opaque identity of an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a raw host-assigned identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Window-level auxiliary events the runtime can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    /// The window was resized.
    Resize,
    /// The document scrolled.
    Scroll,
}

/// Listener invoked with a captured input event.
pub type CaptureListener = Rc<dyn Fn(&UiEvent)>;

/// Listener invoked on a window-level event.
pub type WindowListener = Rc<dyn Fn()>;

/// Host environment services required by the event and modal cores.
///
/// Implementations are expected to be single-threaded; all methods take
/// `&self` and interior mutability is the implementor's concern.
pub trait DomBackend {
    /// Subscribe a capture-phase listener for one event kind at the window.
    ///
    /// The runtime installs at most one listener per kind; implementations
    /// need not dedupe.
    fn add_capture_listener(&self, kind: UiEventKind, listener: CaptureListener);

    /// Subscribe a listener for a window-level event.
    fn add_window_listener(&self, event: WindowEvent, listener: WindowListener);

    /// Whether `node` is `ancestor` itself or lies in its subtree.
    fn is_descendant_or_self(&self, node: NodeId, ancestor: NodeId) -> bool;

    /// Add a CSS class to an element. Adding a present class is a no-op.
    fn add_class(&self, node: NodeId, class: &str);

    /// Remove a CSS class from an element. Removing an absent class is a
    /// no-op.
    fn remove_class(&self, node: NodeId, class: &str);

    /// Whether an element carries a CSS class.
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Insert an element into the document tree (render it).
    fn attach(&self, node: NodeId);

    /// Remove an element from the document tree.
    fn detach(&self, node: NodeId);

    /// Whether an element is currently in the document tree.
    fn is_attached(&self, node: NodeId) -> bool;

    /// Scroll an element's content area to the top.
    fn scroll_to_top(&self, node: NodeId);

    /// Run `f` on a subsequent event-loop turn, after pending layout work.
    fn defer(&self, f: Box<dyn FnOnce()>);
}
