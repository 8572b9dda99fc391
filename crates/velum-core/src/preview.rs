#![forbid(unsafe_code)]

//! Event preview chain and the UI runtime context.
//!
//! The [`UiRuntime`] is the single point of interception for the fixed
//! catalogue of capture-phase input events. Registered previews are
//! consulted in registration order; the first non-[`Continue`] outcome wins
//! and halts iteration, and a terminal [`Cancel`] stops native propagation
//! of the event (default browser handling is untouched unless a preview
//! separately calls `prevent_default`).
//!
//! # Invariants
//!
//! - Iteration order equals registration order.
//! - Dispatch iterates over a snapshot, so a preview removing itself (or
//!   any other entry) mid-dispatch is safe.
//! - A panicking preview is reported and treated as `Continue`; later
//!   previews still run.
//! - Capture listeners are installed on the backend lazily, exactly once.
//!
//! # Failure Modes
//!
//! - `PreviewHandle::remove` after the runtime is gone: no-op.
//! - Removing a handle twice: no-op.
//!
//! [`Continue`]: PreviewOutcome::Continue
//! [`Cancel`]: PreviewOutcome::Cancel

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dom::{DomBackend, WindowEvent};
use crate::event::{UiEvent, UiEventKind};
use crate::notify::guarded;

/// Global counter for registration identities.
static REGISTRATION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_registration_id() -> u64 {
    REGISTRATION_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Outcome returned by a preview callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewOutcome {
    /// Continue processing the event.
    #[default]
    Continue,
    /// Cancel processing of the event (stops propagation).
    Cancel,
}

/// A registered preview callback.
pub type PreviewFn = Rc<dyn Fn(&UiEvent) -> PreviewOutcome>;

struct PreviewEntry {
    id: u64,
    preview: PreviewFn,
}

/// Registration of one preview; dropping the handle does not unregister,
/// removal is explicit and idempotent.
pub struct PreviewHandle {
    registry: Weak<RefCell<Vec<PreviewEntry>>>,
    id: u64,
}

impl PreviewHandle {
    /// Remove this preview from the chain. Safe to call more than once.
    pub fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().retain(|entry| entry.id != self.id);
        }
    }
}

struct WindowEntry {
    id: u64,
    listener: Rc<dyn Fn()>,
}

/// Registration of one window-level listener. Removal is idempotent.
pub struct WindowRegistration {
    registry: Weak<RefCell<Vec<WindowEntry>>>,
    id: u64,
}

impl WindowRegistration {
    /// Remove this listener. Safe to call more than once.
    pub fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().retain(|entry| entry.id != self.id);
        }
    }
}

/// Context object funneling capture-phase events into registered previews.
///
/// One runtime per independent UI surface; tests construct a fresh runtime
/// per case. Nothing here is process-global except registration identity.
pub struct UiRuntime {
    dom: Rc<dyn DomBackend>,
    previews: Rc<RefCell<Vec<PreviewEntry>>>,
    capture_installed: Cell<bool>,
    resize_listeners: Rc<RefCell<Vec<WindowEntry>>>,
    resize_installed: Cell<bool>,
    scroll_listeners: Rc<RefCell<Vec<WindowEntry>>>,
    scroll_installed: Cell<bool>,
}

impl UiRuntime {
    /// Create a runtime over the given backend.
    pub fn new(dom: Rc<dyn DomBackend>) -> Rc<Self> {
        Rc::new(Self {
            dom,
            previews: Rc::new(RefCell::new(Vec::new())),
            capture_installed: Cell::new(false),
            resize_listeners: Rc::new(RefCell::new(Vec::new())),
            resize_installed: Cell::new(false),
            scroll_listeners: Rc::new(RefCell::new(Vec::new())),
            scroll_installed: Cell::new(false),
        })
    }

    /// The backend this runtime drives.
    pub fn dom(&self) -> &Rc<dyn DomBackend> {
        &self.dom
    }

    /// Register a previewer of input events.
    ///
    /// The preview will see every catalogued event before per-element
    /// listeners do, and may return [`PreviewOutcome::Cancel`] to stop
    /// propagation. Returns a handle whose `remove()` deletes the entry.
    pub fn register_preview(
        self: &Rc<Self>,
        preview: impl Fn(&UiEvent) -> PreviewOutcome + 'static,
    ) -> PreviewHandle {
        self.ensure_capture();
        let id = next_registration_id();
        self.previews.borrow_mut().push(PreviewEntry {
            id,
            preview: Rc::new(preview),
        });
        PreviewHandle {
            registry: Rc::downgrade(&self.previews),
            id,
        }
    }

    /// Number of currently registered previews.
    pub fn preview_count(&self) -> usize {
        self.previews.borrow().len()
    }

    /// Dispatch an event through the preview chain.
    ///
    /// Normally invoked by the backend's capture listeners; exposed so
    /// hosts and tests can feed events directly.
    pub fn process_preview(&self, event: &UiEvent) {
        let snapshot: Vec<PreviewFn> = self
            .previews
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.preview))
            .collect();
        let mut outcome = PreviewOutcome::Continue;
        for preview in snapshot {
            outcome =
                guarded("event preview", || preview(event)).unwrap_or(PreviewOutcome::Continue);
            if outcome != PreviewOutcome::Continue {
                break;
            }
        }
        if outcome == PreviewOutcome::Cancel {
            event.stop_propagation();
        }
    }

    /// Register a listener for window resize events.
    pub fn register_resize_listener(
        self: &Rc<Self>,
        listener: impl Fn() + 'static,
    ) -> WindowRegistration {
        self.register_window_listener(WindowEvent::Resize, listener)
    }

    /// Register a listener for document scroll events.
    pub fn register_scroll_listener(
        self: &Rc<Self>,
        listener: impl Fn() + 'static,
    ) -> WindowRegistration {
        self.register_window_listener(WindowEvent::Scroll, listener)
    }

    fn register_window_listener(
        self: &Rc<Self>,
        event: WindowEvent,
        listener: impl Fn() + 'static,
    ) -> WindowRegistration {
        let (installed, registry) = match event {
            WindowEvent::Resize => (&self.resize_installed, &self.resize_listeners),
            WindowEvent::Scroll => (&self.scroll_installed, &self.scroll_listeners),
        };
        if !installed.replace(true) {
            let weak = Rc::downgrade(registry);
            self.dom.add_window_listener(
                event,
                Rc::new(move || {
                    let Some(registry) = weak.upgrade() else {
                        return;
                    };
                    let snapshot: Vec<Rc<dyn Fn()>> = registry
                        .borrow()
                        .iter()
                        .map(|entry| Rc::clone(&entry.listener))
                        .collect();
                    for listener in snapshot {
                        guarded("window listener", || listener());
                    }
                }),
            );
        }
        let id = next_registration_id();
        registry.borrow_mut().push(WindowEntry {
            id,
            listener: Rc::new(listener),
        });
        WindowRegistration {
            registry: Rc::downgrade(registry),
            id,
        }
    }

    /// Hook the capture catalogue up to the backend, once.
    fn ensure_capture(self: &Rc<Self>) {
        if self.capture_installed.replace(true) {
            return;
        }
        for kind in UiEventKind::CAPTURE_CATALOGUE {
            let runtime = Rc::downgrade(self);
            self.dom.add_capture_listener(
                kind,
                Rc::new(move |event| {
                    if let Some(runtime) = runtime.upgrade() {
                        runtime.process_preview(event);
                    }
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDom;

    fn fixture() -> (Rc<MockDom>, Rc<UiRuntime>) {
        let dom = MockDom::new();
        let runtime = UiRuntime::new(dom.clone());
        (dom, runtime)
    }

    #[test]
    fn previews_run_in_registration_order() {
        let (dom, runtime) = fixture();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["p1", "p2", "p3"] {
            let order = Rc::clone(&order);
            runtime.register_preview(move |_| {
                order.borrow_mut().push(tag);
                PreviewOutcome::Continue
            });
        }
        let target = dom.create_element(None);
        dom.fire(UiEventKind::Click, target);
        assert_eq!(*order.borrow(), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn first_cancel_halts_chain_and_stops_propagation() {
        let (dom, runtime) = fixture();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        runtime.register_preview(move |_| {
            o1.borrow_mut().push("p1");
            PreviewOutcome::Continue
        });
        let o2 = Rc::clone(&order);
        runtime.register_preview(move |_| {
            o2.borrow_mut().push("p2");
            PreviewOutcome::Cancel
        });
        let o3 = Rc::clone(&order);
        runtime.register_preview(move |_| {
            o3.borrow_mut().push("p3");
            PreviewOutcome::Continue
        });

        let target = dom.create_element(None);
        let event = dom.fire(UiEventKind::Click, target);
        assert_eq!(*order.borrow(), vec!["p1", "p2"]);
        assert!(event.propagation_stopped());
        assert!(!event.default_prevented());
    }

    #[test]
    fn continue_outcome_leaves_propagation_alone() {
        let (dom, runtime) = fixture();
        runtime.register_preview(|_| PreviewOutcome::Continue);
        let target = dom.create_element(None);
        let event = dom.fire(UiEventKind::MouseMove, target);
        assert!(!event.propagation_stopped());
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dom, runtime) = fixture();
        let handle = runtime.register_preview(|_| PreviewOutcome::Continue);
        assert_eq!(runtime.preview_count(), 1);
        handle.remove();
        assert_eq!(runtime.preview_count(), 0);
        handle.remove();
        assert_eq!(runtime.preview_count(), 0);
    }

    #[test]
    fn preview_may_remove_itself_during_dispatch() {
        let (dom, runtime) = fixture();
        let handle_slot: Rc<RefCell<Option<PreviewHandle>>> =
            Rc::new(RefCell::new(None));
        let slot = Rc::clone(&handle_slot);
        let handle = runtime.register_preview(move |_| {
            if let Some(handle) = slot.borrow().as_ref() {
                handle.remove();
            }
            PreviewOutcome::Continue
        });
        *handle_slot.borrow_mut() = Some(handle);
        let later = Rc::new(Cell::new(0));
        let later2 = Rc::clone(&later);
        runtime.register_preview(move |_| {
            later2.set(later2.get() + 1);
            PreviewOutcome::Continue
        });

        let target = dom.create_element(None);
        dom.fire(UiEventKind::Click, target);
        assert_eq!(runtime.preview_count(), 1);
        assert_eq!(later.get(), 1, "later preview still ran");

        // The removed preview is gone on the next dispatch.
        dom.fire(UiEventKind::Click, target);
        assert_eq!(later.get(), 2);
    }

    #[test]
    fn panicking_preview_is_treated_as_continue() {
        let (dom, runtime) = fixture();
        runtime.register_preview(|_| panic!("preview failure"));
        let reached = Rc::new(Cell::new(false));
        let flag = Rc::clone(&reached);
        runtime.register_preview(move |_| {
            flag.set(true);
            PreviewOutcome::Continue
        });
        let target = dom.create_element(None);
        let event = dom.fire(UiEventKind::Click, target);
        assert!(reached.get());
        assert!(!event.propagation_stopped());
    }

    #[test]
    fn capture_install_is_lazy_and_one_time() {
        let (dom, runtime) = fixture();
        assert_eq!(dom.capture_install_count(), 0);
        runtime.register_preview(|_| PreviewOutcome::Continue);
        let installed = dom.capture_install_count();
        assert_eq!(installed, UiEventKind::CAPTURE_CATALOGUE.len());
        runtime.register_preview(|_| PreviewOutcome::Continue);
        assert_eq!(dom.capture_install_count(), installed);
    }

    #[test]
    fn all_catalogued_kinds_reach_previews() {
        let (dom, runtime) = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        runtime.register_preview(move |event| {
            sink.borrow_mut().push(event.kind());
            PreviewOutcome::Continue
        });
        let target = dom.create_element(None);
        for kind in UiEventKind::CAPTURE_CATALOGUE {
            dom.fire(kind, target);
        }
        assert_eq!(seen.borrow().as_slice(), &UiEventKind::CAPTURE_CATALOGUE);
    }

    #[test]
    fn click_only_canceller_lets_other_kinds_through() {
        let (dom, runtime) = fixture();
        let seen = Rc::new(Cell::new(0));
        let first = Rc::clone(&seen);
        runtime.register_preview(move |_| {
            first.set(first.get() + 1);
            PreviewOutcome::Continue
        });
        let second = Rc::clone(&seen);
        runtime.register_preview(move |event| {
            second.set(second.get() + 1);
            if event.kind() == UiEventKind::Click {
                PreviewOutcome::Cancel
            } else {
                PreviewOutcome::Continue
            }
        });

        let target = dom.create_element(None);
        let moved = dom.fire(UiEventKind::MouseMove, target);
        assert_eq!(seen.get(), 2);
        assert!(!moved.propagation_stopped());

        let clicked = dom.fire(UiEventKind::Click, target);
        assert_eq!(seen.get(), 4);
        assert!(clicked.propagation_stopped());
    }

    #[test]
    fn window_listeners_fire_and_isolate_failures() {
        let (dom, runtime) = fixture();
        let count = Rc::new(Cell::new(0));
        runtime.register_resize_listener(|| panic!("resize listener failure"));
        let counter = Rc::clone(&count);
        let registration = runtime.register_resize_listener(move || {
            counter.set(counter.get() + 1);
        });
        dom.fire_window(WindowEvent::Resize);
        assert_eq!(count.get(), 1);

        registration.remove();
        dom.fire_window(WindowEvent::Resize);
        assert_eq!(count.get(), 1);
        registration.remove();
    }

    #[test]
    fn resize_and_scroll_lists_are_independent() {
        let (dom, runtime) = fixture();
        let resized = Rc::new(Cell::new(0));
        let scrolled = Rc::new(Cell::new(0));
        let r = Rc::clone(&resized);
        runtime.register_resize_listener(move || r.set(r.get() + 1));
        let s = Rc::clone(&scrolled);
        runtime.register_scroll_listener(move || s.set(s.get() + 1));

        dom.fire_window(WindowEvent::Scroll);
        assert_eq!(resized.get(), 0);
        assert_eq!(scrolled.get(), 1);
    }
}
