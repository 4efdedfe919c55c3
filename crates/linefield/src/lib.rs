//! Adaptive renderer for the landing page's generative line-field background.
//!
//! The crate owns the decisions around a full-viewport line shader; the host
//! owns the actual canvas/context behind [`LineSurface`]. The flow is:
//!
//! ```text
//!   DeviceSignals ──▶ classify() ──▶ DeviceProfile (fixed per session)
//!                                         │
//!   animation callback ──▶ LineRenderer::on_animation_frame()
//!                              ├─▶ FrameThrottle (target interval)
//!                              ├─▶ QualityController (line count ±)
//!                              ├─▶ PointerSmoother ◀── PointerSubscription
//!                              └─▶ LineUniforms ─▶ LineSurface::draw()
//! ```
//!
//! Visibility and resize notifications arrive through `set_visible` and
//! `request_resize`; neither draws directly. Everything runs on the host's
//! single UI thread, so no state here is shared or locked.

mod device;
mod quality;
mod render_loop;
mod runtime;
mod scaling;
mod smoothing;
mod surface;
mod types;
mod uniforms;

#[cfg(feature = "gpu-probe")]
pub use device::{probe_gpu_renderer, probe_gpu_renderer_or_none};
pub use device::{
    classify, gpu_tier_from_renderer, DeviceProfile, DeviceSignals, DeviceTier, GpuTier,
    MOBILE_VIEWPORT_MAX,
};
pub use quality::{
    FrameWindow, QualityChange, QualityController, QualityPolicy, FRAME_WINDOW_CAPACITY,
};
pub use render_loop::{FrameOutcome, LineRenderer};
pub use runtime::{FrameGate, FrameThrottle, TimeSample};
pub use scaling::ResponsiveScale;
pub use smoothing::{PointerSmoother, RE_ENTRY_FRAMES, RE_ENTRY_JUMP};
pub use surface::{LineSurface, RecordingSurface, SurfaceError};
pub use types::{LineFieldConfig, SurfaceSize};
pub use uniforms::LineUniforms;
