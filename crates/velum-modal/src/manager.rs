#![forbid(unsafe_code)]

//! The shared stack of open modals.
//!
//! One [`ModalManager`] per UI surface tracks which modals are open, in
//! stacking order, assigns nesting levels at open time, dims the shared
//! backdrop target while anything is open, and fans open/close events out to
//! globally registered handlers.
//!
//! # Invariants
//!
//! - A modal appears in [`open_modals`](ModalManager::open_modals) exactly
//!   when its open flag is set.
//! - The backdrop carries the dim class exactly when the stack is non-empty.
//! - Nesting levels are assigned from the stack depth at open time and never
//!   recomputed; closing out of LIFO order can leave two modals on the same
//!   visual tier. Callers wanting distinct tiers must close in reverse open
//!   order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use velum_core::notify::guarded;
use velum_core::{NodeId, UiRuntime};

use crate::style;

static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a modal within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalId(u64);

impl ModalId {
    pub(crate) fn next() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handler observing every modal open or close on a manager.
///
/// Receives the stack as it was before the change and the modal changing.
pub type StackHandler = Rc<dyn Fn(&[ModalId], ModalId)>;

/// Coordinates stacking, backdrop dimming and global observers.
pub struct ModalManager {
    runtime: Rc<UiRuntime>,
    open: RefCell<Vec<ModalId>>,
    open_handlers: RefCell<Vec<StackHandler>>,
    close_handlers: RefCell<Vec<StackHandler>>,
    blur_target: Cell<Option<NodeId>>,
}

impl ModalManager {
    /// Create a manager bound to a runtime.
    pub fn new(runtime: Rc<UiRuntime>) -> Rc<Self> {
        Rc::new(Self {
            runtime,
            open: RefCell::new(Vec::new()),
            open_handlers: RefCell::new(Vec::new()),
            close_handlers: RefCell::new(Vec::new()),
            blur_target: Cell::new(None),
        })
    }

    pub(crate) fn runtime(&self) -> &Rc<UiRuntime> {
        &self.runtime
    }

    /// Observe every modal open on this manager.
    pub fn add_open_handler(&self, handler: impl Fn(&[ModalId], ModalId) + 'static) {
        self.open_handlers.borrow_mut().push(Rc::new(handler));
    }

    /// Observe every modal close on this manager.
    pub fn add_close_handler(&self, handler: impl Fn(&[ModalId], ModalId) + 'static) {
        self.close_handlers.borrow_mut().push(Rc::new(handler));
    }

    /// Designate the element dimmed while modals are open.
    ///
    /// A previously configured target is re-dimmed before switching, so a
    /// swap during an open stack cannot leave the old target undimmed by a
    /// later clear racing the change.
    pub fn set_blur_target(&self, target: NodeId) {
        if let Some(previous) = self.blur_target.get() {
            self.runtime.dom().add_class(previous, style::BLUR);
        }
        self.blur_target.set(Some(target));
    }

    /// The currently open modals, bottom of the stack first.
    pub fn open_modals(&self) -> Vec<ModalId> {
        self.open.borrow().clone()
    }

    /// How many modals are open.
    pub fn depth(&self) -> usize {
        self.open.borrow().len()
    }

    /// Level for a modal opening now: the stack depth before insertion.
    pub(crate) fn assign_level(&self) -> usize {
        self.open.borrow().len()
    }

    pub(crate) fn notify_opened(&self, id: ModalId) {
        let stack = self.open.borrow().clone();
        let handlers: Vec<StackHandler> =
            self.open_handlers.borrow().iter().map(Rc::clone).collect();
        for handler in handlers {
            guarded("modal open handler", || handler(&stack, id));
        }
    }

    pub(crate) fn push_open(&self, id: ModalId) {
        self.open.borrow_mut().push(id);
    }

    pub(crate) fn remove_open(&self, id: ModalId) {
        self.open.borrow_mut().retain(|open| *open != id);
    }

    pub(crate) fn notify_closed(&self, id: ModalId) {
        let stack = self.open.borrow().clone();
        let handlers: Vec<StackHandler> =
            self.close_handlers.borrow().iter().map(Rc::clone).collect();
        for handler in handlers {
            guarded("modal close handler", || handler(&stack, id));
        }
    }

    pub(crate) fn apply_blur(&self) {
        if let Some(target) = self.blur_target.get() {
            self.runtime.dom().add_class(target, style::BLUR);
        }
    }

    pub(crate) fn clear_blur_if_empty(&self) {
        if !self.open.borrow().is_empty() {
            return;
        }
        if let Some(target) = self.blur_target.get() {
            self.runtime.dom().remove_class(target, style::BLUR);
        }
    }
}
