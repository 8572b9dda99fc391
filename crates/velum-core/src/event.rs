#![forbid(unsafe_code)]

//! Input event catalogue and event values.
//!
//! The catalogue is a fixed data table: every kind knows its DOM event name,
//! and [`UiEventKind::CAPTURE_CATALOGUE`] lists the kinds the runtime hooks
//! at the capture phase. Attachment itself goes through
//! [`DomBackend::add_capture_listener`](crate::dom::DomBackend::add_capture_listener),
//! so kinds carry no behavior of their own.

use std::cell::Cell;

use crate::dom::NodeId;

/// Kinds of input events intercepted at the capture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseOut,
    Wheel,
    TouchStart,
    TouchEnd,
    TouchMove,
    TouchCancel,
    GestureStart,
    GestureEnd,
    GestureChange,
}

impl UiEventKind {
    /// Every kind funneled through the preview chain, in hook-up order.
    pub const CAPTURE_CATALOGUE: [Self; 15] = [
        Self::Click,
        Self::DblClick,
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseMove,
        Self::MouseOver,
        Self::MouseOut,
        Self::Wheel,
        Self::TouchStart,
        Self::TouchEnd,
        Self::TouchMove,
        Self::TouchCancel,
        Self::GestureStart,
        Self::GestureEnd,
        Self::GestureChange,
    ];

    /// The DOM event name used when attaching a listener for this kind.
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::Wheel => "wheel",
            Self::TouchStart => "touchstart",
            Self::TouchEnd => "touchend",
            Self::TouchMove => "touchmove",
            Self::TouchCancel => "touchcancel",
            Self::GestureStart => "gesturestart",
            Self::GestureEnd => "gestureend",
            Self::GestureChange => "gesturechange",
        }
    }

    /// Look a kind up by its DOM event name.
    pub fn from_dom_name(name: &str) -> Option<Self> {
        Self::CAPTURE_CATALOGUE
            .into_iter()
            .find(|kind| kind.dom_name() == name)
    }
}

/// A captured input event as seen by preview callbacks.
///
/// Previews receive a shared reference; the propagation and default flags
/// use interior mutability so any preview in the chain can set them.
/// Stopping propagation keeps the event away from bubbling listeners but
/// does not suppress default browser handling; that takes a separate
/// [`prevent_default`](Self::prevent_default) call.
#[derive(Debug)]
pub struct UiEvent {
    kind: UiEventKind,
    target: NodeId,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl UiEvent {
    /// Create an event of the given kind with the given target element.
    pub fn new(kind: UiEventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    /// The event kind.
    #[inline]
    pub fn kind(&self) -> UiEventKind {
        self.kind
    }

    /// The element the event targeted.
    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Stop the event from propagating to bubbling listeners.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Whether propagation has been stopped.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// Suppress the default browser handling for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Whether default handling has been suppressed.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}
