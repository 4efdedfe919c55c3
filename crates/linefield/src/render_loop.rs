use std::time::Instant;

use pointerfeed::PointerSubscription;
use tracing::{debug, warn};

use crate::device::DeviceProfile;
use crate::quality::QualityController;
use crate::runtime::{FrameGate, FrameThrottle, TimeSample};
use crate::scaling::ResponsiveScale;
use crate::smoothing::PointerSmoother;
use crate::surface::LineSurface;
use crate::types::{LineFieldConfig, SurfaceSize};
use crate::uniforms::LineUniforms;

/// What a single animation callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered { line_count: u32 },
    /// Skipped to hold the target frame interval.
    Throttled,
    /// The surface is out of view; the host should stop scheduling.
    Suspended,
    /// The surface rejected the draw; the frame does not count.
    DrawFailed,
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    layout: SurfaceSize,
    deadline: Instant,
}

/// One mounted line-field background.
///
/// The host forwards animation callbacks, visibility changes, and resize
/// notifications; everything else is owned here and mutated only from those
/// entry points.
pub struct LineRenderer<S: LineSurface> {
    surface: S,
    config: LineFieldConfig,
    profile: DeviceProfile,
    pointer: Option<PointerSubscription>,
    throttle: FrameThrottle,
    quality: QualityController,
    smoother: PointerSmoother,
    scale: ResponsiveScale,
    uniforms: LineUniforms,
    origin: Instant,
    frame_index: u64,
    visible: bool,
    layout: SurfaceSize,
    backing: SurfaceSize,
    pending_resize: Option<PendingResize>,
}

impl<S: LineSurface> LineRenderer<S> {
    /// Mounts onto `surface`. A missing surface or an empty layout box is a
    /// valid no-op and yields `None`.
    pub fn mount(
        surface: Option<S>,
        layout: SurfaceSize,
        profile: DeviceProfile,
        config: LineFieldConfig,
        pointer: Option<PointerSubscription>,
        now: Instant,
    ) -> Option<Self> {
        let Some(surface) = surface else {
            debug!("no mount target; line field disabled");
            return None;
        };
        if layout.is_empty() {
            debug!(?layout, "mount target has no layout box; line field disabled");
            return None;
        }

        let mut renderer = Self {
            surface,
            throttle: FrameThrottle::new(profile.target_frame_interval()),
            quality: QualityController::new(
                profile.line_count,
                config.quality_policy.for_target_fps(profile.target_fps),
            ),
            smoother: PointerSmoother::new(profile.smoothing_factor),
            scale: ResponsiveScale::for_width(layout.width),
            uniforms: LineUniforms::new(layout, config.base_color),
            origin: now,
            frame_index: 0,
            visible: true,
            layout,
            backing: layout,
            pending_resize: None,
            config,
            profile,
            pointer,
        };
        renderer.apply_size(layout);
        debug!(
            tier = %profile.tier,
            lines = profile.line_count,
            fps = profile.target_fps,
            "line field mounted"
        );
        Some(renderer)
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn quality_level(&self) -> u32 {
        self.quality.level()
    }

    pub fn pointer_position(&self) -> [f32; 2] {
        self.smoother.position()
    }

    pub fn backing_size(&self) -> SurfaceSize {
        self.backing
    }

    pub fn layout_size(&self) -> SurfaceSize {
        self.layout
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the host should keep requesting animation callbacks.
    pub fn wants_animation_frame(&self) -> bool {
        self.visible
    }

    pub fn on_animation_frame(&mut self, now: Instant) -> FrameOutcome {
        if !self.visible {
            return FrameOutcome::Suspended;
        }
        self.poll_resize(now);

        let since_last = match self.throttle.ready_for_frame(now) {
            FrameGate::Skip => return FrameOutcome::Throttled,
            FrameGate::Render { since_last } => since_last,
        };

        if let Some(frame_time) = since_last {
            self.quality.record(frame_time);
        }

        let target = if self.config.pointer_enabled {
            self.pointer
                .as_mut()
                .and_then(|subscription| subscription.poll_latest().position())
        } else {
            None
        };
        let pointer = self.smoother.step(target);

        let line_count = self.quality.level();
        let amplitude = self
            .scale
            .effective_amplitude(self.config.amplitude, self.profile.amplitude_scale);
        let distance = self.scale.effective_distance(self.config.distance);
        let sample = TimeSample::new(
            now.saturating_duration_since(self.origin).as_secs_f32(),
            self.frame_index,
        );
        self.uniforms
            .update_frame(sample, pointer, amplitude, distance, line_count);

        match self.surface.draw(&self.uniforms) {
            Ok(()) => {
                self.frame_index = self.frame_index.saturating_add(1);
                FrameOutcome::Rendered { line_count }
            }
            Err(err) => {
                warn!(error = %err, frame = self.frame_index, "line field draw failed");
                FrameOutcome::DrawFailed
            }
        }
    }

    /// Visibility observer hook. Re-entering view restarts frame timing and
    /// the FPS sample window; quality level and pointer position are kept.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.throttle.reset();
            self.quality.reset_window();
            self.smoother.settle();
            debug!(lines = self.quality.level(), "line field resumed");
        } else {
            debug!("line field suspended (out of view)");
        }
    }

    /// Recolours the field; the next rendered frame uses the new colour.
    pub fn set_base_color(&mut self, color: [f32; 3]) {
        self.config.base_color = color;
        self.uniforms.set_color(color);
    }

    /// Records a layout change; it is applied once no further request has
    /// arrived for the debounce period.
    pub fn request_resize(&mut self, layout: SurfaceSize, now: Instant) {
        if layout.is_empty() {
            tracing::trace!(?layout, "ignoring empty resize");
            return;
        }
        // An unrepresentable debounce applies on the next poll.
        let deadline = now.checked_add(self.config.resize_debounce).unwrap_or(now);
        self.pending_resize = Some(PendingResize { layout, deadline });
    }

    pub fn resize_deadline(&self) -> Option<Instant> {
        self.pending_resize.map(|pending| pending.deadline)
    }

    /// Applies a settled resize. Returns true when one was applied.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        match self.pending_resize {
            Some(pending) if now >= pending.deadline => {
                self.pending_resize = None;
                self.apply_size(pending.layout);
                true
            }
            _ => false,
        }
    }

    fn apply_size(&mut self, layout: SurfaceSize) {
        let physical = layout.scaled(self.config.device_pixel_ratio.max(0.1));
        let backing = physical.scaled(self.profile.render_scale);
        if let Err(err) = self.surface.resize(backing, layout) {
            warn!(error = %err, ?backing, "line field surface resize failed");
            return;
        }
        self.layout = layout;
        self.backing = backing;
        self.uniforms.set_resolution(backing);
        self.scale = ResponsiveScale::for_width(layout.width);
        debug!(
            layout_w = layout.width,
            layout_h = layout.height,
            backing_w = backing.width,
            backing_h = backing.height,
            "line field resized"
        );
    }

    /// Stops the loop, detaches from the pointer feed, and disposes the
    /// surface. Disposal failures are ignored.
    pub fn teardown(self) -> S {
        let Self {
            mut surface,
            pointer,
            ..
        } = self;
        if let Some(subscription) = pointer {
            subscription.unsubscribe();
        }
        if let Err(err) = surface.dispose() {
            debug!(error = %err, "line field surface disposal failed; ignoring");
        }
        debug!("line field torn down");
        surface
    }
}
