#![forbid(unsafe_code)]

//! Modal dialog stacking and lifecycle for Velum.
//!
//! A [`ModalManager`] owns the stack of open modals for one UI surface:
//! nesting levels and z-order tiers are assigned at open time, a shared
//! backdrop element is dimmed while the stack is non-empty, and global
//! open/close handlers observe every transition. Each [`Modal`] runs a
//! two-phase attach-then-open sequence and a close negotiation that lets
//! its [`ModalContent`] veto or defer the close. [`Dialog`] adds named
//! footer actions with a success/fail resolution protocol on top.

pub mod content;
pub mod dialog;
pub mod manager;
pub mod modal;
pub mod style;

pub use content::{CloseRequest, ModalContent};
pub use dialog::{ActionCallback, ActionHandler, Dialog};
pub use manager::{ModalId, ModalManager, StackHandler};
pub use modal::{Modal, ModalConfig, ModalKind};
