#![forbid(unsafe_code)]

//! "Click outside closes" panel behavior.
//!
//! An [`ActivationHandler`] couples an open/closed flag to a set of style
//! toggles and a preview registered while open. Clicks landing outside every
//! exclusion zone close the handler; clicks inside a cancel zone close it
//! *and* swallow the event so the same click cannot re-trigger an open
//! handler further along the bubble chain.
//!
//! # Invariants
//!
//! - The handler is open exactly when it holds a preview registration.
//! - `open()` while open and `close()` while closed are no-ops with no
//!   listener notifications.
//! - Listener failures are isolated per listener and logged.
//!
//! # Example
//!
//! ```ignore
//! let handler = ActivationHandler::for_panel(&runtime, activator, panel, "open");
//! handler.listen(|open| tracing::debug!(open, "panel toggled"));
//! handler.toggle();
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dom::NodeId;
use crate::event::UiEventKind;
use crate::notify::{guarded, notify_all};
use crate::preview::{PreviewHandle, PreviewOutcome, UiRuntime};

struct ActivationInner {
    runtime: Rc<UiRuntime>,
    styles: RefCell<Vec<(NodeId, String)>>,
    exclusions: RefCell<Vec<NodeId>>,
    cancels: RefCell<Vec<NodeId>>,
    preview: RefCell<Option<PreviewHandle>>,
    listeners: RefCell<Vec<Rc<dyn Fn(bool)>>>,
    on_open: RefCell<Option<Box<dyn Fn()>>>,
    on_close: RefCell<Option<Box<dyn Fn()>>>,
}

impl ActivationInner {
    fn is_open(&self) -> bool {
        self.preview.borrow().is_some()
    }

    fn open(self: &Rc<Self>) {
        if self.is_open() {
            return;
        }
        for (node, class) in self.styles.borrow().iter() {
            self.runtime.dom().add_class(*node, class);
        }
        let weak = Rc::downgrade(self);
        let handle = self.runtime.register_preview(move |event| {
            match weak.upgrade() {
                Some(inner) => inner.preview_click(event.kind(), event.target()),
                None => PreviewOutcome::Continue,
            }
        });
        *self.preview.borrow_mut() = Some(handle);
        if let Some(hook) = self.on_open.borrow().as_ref() {
            guarded("activation open hook", hook);
        }
        self.notify(true);
    }

    fn close(&self) {
        if !self.is_open() {
            return;
        }
        for (node, class) in self.styles.borrow().iter() {
            self.runtime.dom().remove_class(*node, class);
        }
        if let Some(handle) = self.preview.borrow_mut().take() {
            handle.remove();
        }
        if let Some(hook) = self.on_close.borrow().as_ref() {
            guarded("activation close hook", hook);
        }
        self.notify(false);
    }

    fn preview_click(&self, kind: UiEventKind, target: NodeId) -> PreviewOutcome {
        if kind != UiEventKind::Click {
            return PreviewOutcome::Continue;
        }
        let dom = self.runtime.dom();
        let excluded = self
            .exclusions
            .borrow()
            .iter()
            .any(|zone| dom.is_descendant_or_self(target, *zone));
        if excluded {
            return PreviewOutcome::Continue;
        }
        self.close();
        let cancelled = self
            .cancels
            .borrow()
            .iter()
            .any(|zone| dom.is_descendant_or_self(target, *zone));
        if cancelled {
            PreviewOutcome::Cancel
        } else {
            PreviewOutcome::Continue
        }
    }

    fn notify(&self, open: bool) {
        let snapshot: Vec<Rc<dyn Fn(bool)>> =
            self.listeners.borrow().iter().map(Rc::clone).collect();
        notify_all("activation listener", &snapshot, open);
    }
}

impl Drop for ActivationInner {
    fn drop(&mut self) {
        // Releases the preview registration; styles stay as-is because the
        // host elements may already be gone.
        if let Some(handle) = self.preview.borrow_mut().take() {
            handle.remove();
        }
    }
}

/// Controller binding an "open" style to a trigger and exclusion zones.
///
/// Configuration accumulates through the builder-style methods and may be
/// extended while open; it takes effect on the next relevant event.
pub struct ActivationHandler {
    inner: Rc<ActivationInner>,
}

impl ActivationHandler {
    /// Create a handler with no styles or zones configured.
    pub fn new(runtime: &Rc<UiRuntime>) -> Self {
        Self {
            inner: Rc::new(ActivationInner {
                runtime: Rc::clone(runtime),
                styles: RefCell::new(Vec::new()),
                exclusions: RefCell::new(Vec::new()),
                cancels: RefCell::new(Vec::new()),
                preview: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                on_open: RefCell::new(None),
                on_close: RefCell::new(None),
            }),
        }
    }

    /// Wire up the common activator-button-plus-panel shape: `open_class`
    /// toggles on `panel`, clicks inside `panel` never close, and a click on
    /// `activator` closes and swallows the event.
    pub fn for_panel(
        runtime: &Rc<UiRuntime>,
        activator: NodeId,
        panel: NodeId,
        open_class: &str,
    ) -> Self {
        let handler = Self::new(runtime);
        handler
            .style(panel, open_class, true)
            .cancel(activator);
        handler
    }

    /// Register a style to add on open and remove on close. With `exclude`
    /// set, clicks inside `node` also never close the handler.
    pub fn style(&self, node: NodeId, class: &str, exclude: bool) -> &Self {
        self.inner.styles.borrow_mut().push((node, class.to_owned()));
        if exclude {
            self.inner.exclusions.borrow_mut().push(node);
        }
        self
    }

    /// Clicks inside `node`'s subtree never close the handler.
    pub fn exclude(&self, node: NodeId) -> &Self {
        self.inner.exclusions.borrow_mut().push(node);
        self
    }

    /// Clicks inside `node`'s subtree close the handler and stop the event.
    pub fn cancel(&self, node: NodeId) -> &Self {
        self.inner.cancels.borrow_mut().push(node);
        self
    }

    /// Subscribe to open/close transitions; `true` on open, `false` on close.
    pub fn listen(&self, callback: impl Fn(bool) + 'static) -> &Self {
        self.inner.listeners.borrow_mut().push(Rc::new(callback));
        self
    }

    /// Hook invoked after styles are applied on each open.
    pub fn on_open(&self, hook: impl Fn() + 'static) -> &Self {
        *self.inner.on_open.borrow_mut() = Some(Box::new(hook));
        self
    }

    /// Hook invoked after styles are removed on each close.
    pub fn on_close(&self, hook: impl Fn() + 'static) -> &Self {
        *self.inner.on_close.borrow_mut() = Some(Box::new(hook));
        self
    }

    /// Whether the handler is currently open.
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Open the handler. No-op if already open.
    pub fn open(&self) {
        self.inner.open();
    }

    /// Close the handler. No-op if already closed.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Flip the state; returns the new openness.
    pub fn toggle(&self) -> bool {
        if self.inner.is_open() {
            self.inner.close();
            false
        } else {
            self.inner.open();
            true
        }
    }

    /// Force-close and drop all configuration and listeners. Idempotent.
    pub fn dispose(&self) {
        self.inner.close();
        self.inner.styles.borrow_mut().clear();
        self.inner.exclusions.borrow_mut().clear();
        self.inner.cancels.borrow_mut().clear();
        self.inner.listeners.borrow_mut().clear();
        *self.inner.on_open.borrow_mut() = None;
        *self.inner.on_close.borrow_mut() = None;
    }
}
