#![forbid(unsafe_code)]

//! CSS class names driven by the modal core.

/// Applied to a modal's root while it is visible.
pub const SHOW: &str = "vl-modal-show";

/// Base class for center-positioned modals.
pub const CENTER: &str = "vl-modal-center";

/// Base class for slide-in modals.
pub const SLIDER: &str = "vl-modal-slider";

/// Added one tick after a slide-in modal opens, so the transition runs.
pub const SLIDE_IN: &str = "vl-modal-slide-in";

/// Dimming class applied to the shared backdrop target.
pub const BLUR: &str = "vl-blur";

/// Z-order tier classes, outermost stacked modal first.
pub const TIERS: [&str; 6] = [
    "vl-modal-z1",
    "vl-modal-z2",
    "vl-modal-z3",
    "vl-modal-z4",
    "vl-modal-z5",
    "vl-modal-z6",
];

/// Tier class for a nesting level. The first modal (level 0) needs no
/// offset; levels past the last tier all share it.
pub fn tier_class(level: usize) -> Option<&'static str> {
    if level == 0 {
        None
    } else {
        Some(TIERS[level.min(TIERS.len()) - 1])
    }
}
