#![forbid(unsafe_code)]

//! The contract between a modal frame and the widget living inside it.
//!
//! Contents opt into lifecycle participation by overriding the default
//! methods; a bare content type needs nothing. Close negotiation hands the
//! content a [`CloseRequest`]; the close proceeds only once the request is
//! confirmed, which may happen synchronously inside
//! [`on_close_requested`](ModalContent::on_close_requested) or later from
//! some follow-up interaction.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::modal::Modal;

/// Hooks a modal invokes on its contents across the lifecycle.
pub trait ModalContent {
    /// Invoked after the modal finished opening.
    fn on_open(&mut self) {}

    /// Invoked after the modal finished closing.
    fn on_close(&mut self) {}

    /// Invoked when a close has been requested but not yet performed.
    ///
    /// Confirm the request to let the close proceed; drop it without
    /// confirming to veto. The default confirms immediately.
    fn on_close_requested(&mut self, request: CloseRequest) {
        request.confirm();
    }
}

/// Placeholder contents with no lifecycle participation.
impl ModalContent for () {}

/// Pending permission to close a modal.
///
/// Cloneable so contents can stash it in a confirmation flow; confirming
/// any clone confirms the request, and later confirms are no-ops.
#[derive(Clone)]
pub struct CloseRequest {
    modal: Weak<Modal>,
    fired: Rc<Cell<bool>>,
}

impl CloseRequest {
    pub(crate) fn new(modal: Weak<Modal>) -> Self {
        Self {
            modal,
            fired: Rc::new(Cell::new(false)),
        }
    }

    /// Allow the close to proceed. Idempotent.
    pub fn confirm(&self) {
        if self.fired.replace(true) {
            return;
        }
        if let Some(modal) = self.modal.upgrade() {
            modal.confirm_close();
        }
    }
}
