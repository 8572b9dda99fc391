#![forbid(unsafe_code)]

//! Core event lifecycle for Velum.
//!
//! Everything here is single-threaded and event-loop driven: a host backend
//! (see [`DomBackend`]) delivers capture-phase input events into a
//! [`UiRuntime`], which runs them through an ordered chain of preview
//! callbacks before any per-element listener sees them. A preview may cancel
//! the event, which stops native propagation.
//!
//! [`ActivationHandler`] builds "click outside closes" panel behavior on top
//! of the preview chain.

pub mod activation;
pub mod dom;
pub mod event;
pub mod notify;
pub mod preview;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use activation::ActivationHandler;
pub use dom::{DomBackend, NodeId, WindowEvent};
pub use event::{UiEvent, UiEventKind};
pub use preview::{PreviewHandle, PreviewOutcome, UiRuntime, WindowRegistration};
