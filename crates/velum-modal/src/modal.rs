#![forbid(unsafe_code)]

//! One modal dialog: attachment, open/close state machine, negotiation.
//!
//! Opening is two-phase. A detached modal is first attached to the document
//! and the actual open is deferred one event-loop tick so layout can settle;
//! `open()` calls arriving during that window are no-ops. Closing runs
//! through negotiation: the content gets a [`CloseRequest`] and the close
//! proceeds only once the request is confirmed (the default content
//! implementation confirms immediately).
//!
//! # Invariants
//!
//! - `open()` while open, or while the deferred first open is pending, does
//!   nothing.
//! - The nesting level is read from the manager once per open and drives the
//!   tier class; it is not revised while the modal stays open.
//! - Observer and hook failures never leave the stack or the open flag
//!   inconsistent.
//!
//! # Example
//!
//! ```ignore
//! let modal = Modal::build(&manager, root, body, Box::new(()), ModalConfig::new());
//! modal.open();
//! dom.run_deferred();   // first open is deferred until after attach
//! assert!(modal.is_open());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use velum_core::NodeId;
use velum_core::notify::{guarded, notify_all};

use crate::content::{CloseRequest, ModalContent};
use crate::manager::{ModalId, ModalManager};
use crate::style;

/// Presentation variants of a modal frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalKind {
    /// Centered over the backdrop.
    #[default]
    Center,
    /// Anchored at the top edge, no positioning class of its own.
    Top,
    /// Slides in from the edge; the slide class lands a tick after open.
    Slider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttachPhase {
    Detached,
    Attaching,
    Attached,
}

type Hook = Box<dyn Fn()>;

/// Static configuration for one modal.
pub struct ModalConfig {
    kind: ModalKind,
    remove_on_close: bool,
    close_guard: Option<Box<dyn Fn() -> bool>>,
    on_open: Option<Hook>,
    on_close: Option<Hook>,
    after_close: Option<Hook>,
}

impl ModalConfig {
    pub fn new() -> Self {
        Self {
            kind: ModalKind::Center,
            remove_on_close: false,
            close_guard: None,
            on_open: None,
            on_close: None,
            after_close: None,
        }
    }

    /// Presentation variant; defaults to [`ModalKind::Center`].
    pub fn kind(mut self, kind: ModalKind) -> Self {
        self.kind = kind;
        self
    }

    /// Detach the root element from the document after each close.
    pub fn remove_on_close(mut self, remove: bool) -> Self {
        self.remove_on_close = remove;
        self
    }

    /// Predicate consulted before negotiation; returning `false` vetoes the
    /// close outright without asking the contents.
    pub fn close_guard(mut self, guard: impl Fn() -> bool + 'static) -> Self {
        self.close_guard = Some(Box::new(guard));
        self
    }

    /// Hook invoked at the start of each completed open.
    pub fn on_open(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_open = Some(Box::new(hook));
        self
    }

    /// Hook invoked at the start of each close.
    pub fn on_close(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Replaces the default after-close step (detach when configured for
    /// removal on close).
    pub fn after_close(mut self, hook: impl Fn() + 'static) -> Self {
        self.after_close = Some(Box::new(hook));
        self
    }
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A stackable modal dialog.
pub struct Modal {
    id: ModalId,
    manager: Rc<ModalManager>,
    root: NodeId,
    body: NodeId,
    contents: RefCell<Box<dyn ModalContent>>,
    config: ModalConfig,
    listeners: RefCell<Vec<Rc<dyn Fn(bool)>>>,
    open: Cell<bool>,
    level: Cell<usize>,
    phase: Cell<AttachPhase>,
    negotiating: Cell<bool>,
    confirm_pending: Cell<bool>,
}

impl Modal {
    /// Create a modal over a root element and its scrollable body element.
    pub fn build(
        manager: &Rc<ModalManager>,
        root: NodeId,
        body: NodeId,
        contents: Box<dyn ModalContent>,
        config: ModalConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            id: ModalId::next(),
            manager: Rc::clone(manager),
            root,
            body,
            contents: RefCell::new(contents),
            config,
            listeners: RefCell::new(Vec::new()),
            open: Cell::new(false),
            level: Cell::new(0),
            phase: Cell::new(AttachPhase::Detached),
            negotiating: Cell::new(false),
            confirm_pending: Cell::new(false),
        })
    }

    /// This modal's identity.
    pub fn id(&self) -> ModalId {
        self.id
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether the modal is currently open.
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Nesting level assigned at the most recent open.
    pub fn level(&self) -> usize {
        self.level.get()
    }

    /// Subscribe to this modal's open/close transitions; `true` just before
    /// the open completes, `false` just before the close completes.
    pub fn listen(&self, callback: impl Fn(bool) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(callback));
    }

    /// Scroll the body back to the top. No effect before first attachment.
    pub fn scroll_contents_to_top(&self) {
        if self.phase.get() == AttachPhase::Attached {
            self.manager.runtime().dom().scroll_to_top(self.body);
        }
    }

    /// Open the modal. No-op if already open or mid-attachment; the very
    /// first open completes on a later event-loop tick.
    pub fn open(self: &Rc<Self>) {
        if self.open.get() {
            return;
        }
        match self.phase.get() {
            AttachPhase::Attaching => {}
            AttachPhase::Detached => self.begin_attach(),
            AttachPhase::Attached => self.finish_open(),
        }
    }

    fn begin_attach(self: &Rc<Self>) {
        let dom = self.manager.runtime().dom();
        dom.attach(self.root);
        match self.config.kind {
            ModalKind::Center => dom.add_class(self.root, style::CENTER),
            ModalKind::Slider => dom.add_class(self.root, style::SLIDER),
            ModalKind::Top => {}
        }
        self.phase.set(AttachPhase::Attaching);
        let weak = Rc::downgrade(self);
        dom.defer(Box::new(move || {
            if let Some(modal) = weak.upgrade() {
                modal.phase.set(AttachPhase::Attached);
                modal.open();
            }
        }));
    }

    fn finish_open(self: &Rc<Self>) {
        self.notify(true);
        if let Some(hook) = &self.config.on_open {
            guarded("modal open hook", hook);
        }
        let dom = self.manager.runtime().dom();
        let level = self.manager.assign_level();
        for tier in style::TIERS {
            dom.remove_class(self.root, tier);
        }
        if let Some(tier) = style::tier_class(level) {
            dom.add_class(self.root, tier);
        }
        self.level.set(level);
        dom.add_class(self.root, style::SHOW);
        if self.config.kind == ModalKind::Slider {
            let weak = Rc::downgrade(self);
            dom.defer(Box::new(move || {
                if let Some(modal) = weak.upgrade()
                    && modal.open.get()
                {
                    modal
                        .manager
                        .runtime()
                        .dom()
                        .add_class(modal.root, style::SLIDE_IN);
                }
            }));
        }
        dom.scroll_to_top(self.body);
        self.open.set(true);
        guarded("modal contents open", || {
            self.contents.borrow_mut().on_open();
        });
        self.manager.notify_opened(self.id);
        self.manager.push_open(self.id);
        self.manager.apply_blur();
        tracing::debug!(id = self.id.raw(), level, "modal opened");
    }

    /// Request a close. The close runs only once negotiation confirms it;
    /// no-op if not open.
    pub fn close(self: &Rc<Self>) {
        if !self.open.get() || self.negotiating.get() {
            return;
        }
        if let Some(guard) = &self.config.close_guard
            && !guarded("modal close guard", guard).unwrap_or(true)
        {
            return;
        }
        self.negotiating.set(true);
        let request = CloseRequest::new(Rc::downgrade(self));
        guarded("modal close request", || {
            self.contents.borrow_mut().on_close_requested(request);
        });
        self.negotiating.set(false);
        if self.confirm_pending.replace(false) {
            self.finish_close();
        }
    }

    /// Complete a negotiated close. Invoked by [`CloseRequest::confirm`];
    /// callers that want to skip negotiation may call it directly.
    pub fn confirm_close(self: &Rc<Self>) {
        if !self.open.get() {
            return;
        }
        if self.negotiating.get() {
            self.confirm_pending.set(true);
        } else {
            self.finish_close();
        }
    }

    fn finish_close(self: &Rc<Self>) {
        if let Some(hook) = &self.config.on_close {
            guarded("modal close hook", hook);
        }
        self.notify(false);
        let dom = self.manager.runtime().dom();
        dom.remove_class(self.root, style::SHOW);
        if self.config.kind == ModalKind::Slider {
            dom.remove_class(self.root, style::SLIDE_IN);
        }
        self.open.set(false);
        self.manager.remove_open(self.id);
        match &self.config.after_close {
            Some(hook) => {
                guarded("modal after-close hook", hook);
            }
            None => {
                if self.config.remove_on_close {
                    dom.detach(self.root);
                    self.phase.set(AttachPhase::Detached);
                }
            }
        }
        guarded("modal contents close", || {
            self.contents.borrow_mut().on_close();
        });
        self.manager.notify_closed(self.id);
        self.manager.clear_blur_if_empty();
        tracing::debug!(id = self.id.raw(), remaining = self.manager.depth(), "modal closed");
    }

    fn notify(&self, open: bool) {
        let snapshot: Vec<Rc<dyn Fn(bool)>> =
            self.listeners.borrow().iter().map(Rc::clone).collect();
        notify_all("modal listener", &snapshot, open);
    }
}

impl Drop for Modal {
    fn drop(&mut self) {
        // A modal dropped while open must not wedge the stack or the
        // backdrop dim.
        if self.open.get() {
            self.manager.remove_open(self.id);
            self.manager.clear_blur_if_empty();
        }
    }
}
