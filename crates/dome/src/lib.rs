//! Layout and interaction engine for the dome gallery.
//!
//! Tiles sit on a brick-pattern grid wrapped around a cylinder. A greedy
//! pass assigns the content pool so each image is used evenly and its
//! repeats land as far apart as possible. Rotation follows drags directly
//! (no inertia); touch input is split into hold-to-open and swipe-to-rotate.
//!
//! All time is passed in by the host. Timer-driven steps (`poll_hold`) and
//! per-frame work (`on_animation_frame`) are plain method calls, so the host
//! decides how to schedule them.

mod content;
mod depth;
mod drag;
mod engine;
mod gesture;
mod grid;
mod placement;
mod rotation;

pub use content::{ContentKind, ContentRef, OpenTile};
pub use depth::{depth_for, DepthScheduler};
pub use drag::{ClickGuard, DragMapping, DragTracker};
pub use engine::{DomeAction, DomeConfig, DomeEngine, DomeError, OpenGate};
pub use gesture::{
    Feedback, FeedbackError, GestureConfig, GestureState, GestureTracker, NoFeedback, TouchMove,
};
pub use grid::{DomeGrid, Slot};
pub use placement::{
    assign_content, fill_gaps, usage_quota, DomeLayout, DomeTile, PlacementWeights,
};
pub use rotation::{wrap_angle_signed, RotationState};
