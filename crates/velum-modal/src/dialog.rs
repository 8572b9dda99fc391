#![forbid(unsafe_code)]

//! Footer action dispatch for modal dialogs.
//!
//! A [`Dialog`] wraps a [`Modal`] and a list of named actions. Invoking an
//! action marks its button busy and hands an [`ActionCallback`] to the
//! registered handler; the handler reports back with
//! [`success`](ActionCallback::success) (close the dialog) or
//! [`fail`](ActionCallback::fail)/[`done`](ActionCallback::done) (stay
//! open). Whatever the handler does, the busy state is released exactly
//! once, so a button can never stay stuck in its loading state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use velum_core::notify::guarded;

use crate::modal::Modal;

/// Handler bound to a dialog action. Must eventually resolve the callback.
pub type ActionHandler = Rc<dyn Fn(ActionCallback)>;

struct DialogAction {
    reference: String,
    label: RefCell<String>,
    handler: RefCell<Option<ActionHandler>>,
    busy: Cell<bool>,
    hidden: Cell<bool>,
    enabled: Cell<bool>,
}

/// Resolution for one action invocation.
///
/// Cloneable so a handler can thread it through an async flow; the first
/// resolution wins and later calls on any clone are no-ops.
#[derive(Clone)]
pub struct ActionCallback {
    modal: Rc<Modal>,
    action: Rc<DialogAction>,
    released: Rc<Cell<bool>>,
}

impl ActionCallback {
    fn new(modal: Rc<Modal>, action: Rc<DialogAction>) -> Self {
        Self {
            modal,
            action,
            released: Rc::new(Cell::new(false)),
        }
    }

    fn release(&self) -> bool {
        if self.released.replace(true) {
            return false;
        }
        self.action.busy.set(false);
        true
    }

    /// The action completed; close the dialog and release the button.
    pub fn success(self) {
        if self.release() {
            self.modal.close();
        }
    }

    /// The action failed; release the button and keep the dialog open.
    pub fn fail(self) {
        self.release();
    }

    /// The action completed without closing; same release semantics as
    /// [`fail`](Self::fail).
    pub fn done(self) {
        self.release();
    }
}

/// A modal with named footer actions.
pub struct Dialog {
    modal: Rc<Modal>,
    actions: RefCell<Vec<Rc<DialogAction>>>,
    default_handler: RefCell<Option<ActionHandler>>,
}

impl Dialog {
    pub fn new(modal: Rc<Modal>) -> Self {
        Self {
            modal,
            actions: RefCell::new(Vec::new()),
            default_handler: RefCell::new(None),
        }
    }

    /// The underlying modal.
    pub fn modal(&self) -> &Rc<Modal> {
        &self.modal
    }

    pub fn open(&self) {
        self.modal.open();
    }

    pub fn close(&self) {
        self.modal.close();
    }

    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    /// Add an action button. Later additions with the same reference shadow
    /// nothing; the first match wins at dispatch.
    pub fn add_action(&self, reference: &str, label: &str) -> &Self {
        self.actions.borrow_mut().push(Rc::new(DialogAction {
            reference: reference.to_owned(),
            label: RefCell::new(label.to_owned()),
            handler: RefCell::new(None),
            busy: Cell::new(false),
            hidden: Cell::new(false),
            enabled: Cell::new(true),
        }));
        self
    }

    /// Bind a handler to one action.
    pub fn set_action_handler(&self, reference: &str, handler: impl Fn(ActionCallback) + 'static) {
        if let Some(action) = self.find(reference) {
            *action.handler.borrow_mut() = Some(Rc::new(handler));
        }
    }

    /// Handler used by actions without one of their own. When neither
    /// exists, dispatch resolves the callback with success immediately.
    pub fn set_default_handler(&self, handler: impl Fn(ActionCallback) + 'static) {
        *self.default_handler.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn show_action(&self, reference: &str) {
        if let Some(action) = self.find(reference) {
            action.hidden.set(false);
        }
    }

    pub fn hide_action(&self, reference: &str) {
        if let Some(action) = self.find(reference) {
            action.hidden.set(true);
        }
    }

    pub fn set_action_enabled(&self, reference: &str, enabled: bool) {
        if let Some(action) = self.find(reference) {
            action.enabled.set(enabled);
        }
    }

    pub fn update_label(&self, reference: &str, label: &str) {
        if let Some(action) = self.find(reference) {
            *action.label.borrow_mut() = label.to_owned();
        }
    }

    pub fn action_label(&self, reference: &str) -> Option<String> {
        self.find(reference).map(|action| action.label.borrow().clone())
    }

    pub fn is_action_busy(&self, reference: &str) -> bool {
        self.find(reference).is_some_and(|action| action.busy.get())
    }

    /// Dispatch a click on an action button.
    ///
    /// Hidden, disabled, and already-busy actions are skipped. A handler
    /// that panics is treated as a failure and the button is released.
    pub fn invoke(&self, reference: &str) {
        let Some(action) = self.find(reference) else {
            return;
        };
        if action.hidden.get() || !action.enabled.get() || action.busy.get() {
            return;
        }
        action.busy.set(true);
        let callback = ActionCallback::new(Rc::clone(&self.modal), Rc::clone(&action));
        let handler = action
            .handler
            .borrow()
            .clone()
            .or_else(|| self.default_handler.borrow().clone());
        match handler {
            Some(handler) => {
                let resolver = callback.clone();
                if guarded("dialog action", move || handler(callback)).is_none() {
                    resolver.fail();
                }
            }
            None => callback.success(),
        }
    }

    fn find(&self, reference: &str) -> Option<Rc<DialogAction>> {
        self.actions
            .borrow()
            .iter()
            .find(|action| action.reference == reference)
            .map(Rc::clone)
    }
}
