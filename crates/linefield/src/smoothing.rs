/// Target jump (normalised units, either axis) treated as a discontinuity.
pub const RE_ENTRY_JUMP: f32 = 0.5;
/// Frames of extra smoothing after a discontinuity.
pub const RE_ENTRY_FRAMES: u32 = 10;

const VELOCITY_BLEND: f32 = 0.4;
const VELOCITY_GAIN: f32 = 0.15;
const CENTER_DECAY: f32 = 0.02;
const CENTER: [f32; 2] = [0.5, 0.5];

/// Spring-like follower that turns the raw pointer feed into the position
/// pushed to the shader.
#[derive(Debug, Clone)]
pub struct PointerSmoother {
    smoothing_factor: f32,
    current: [f32; 2],
    velocity: [f32; 2],
    last_target: Option<[f32; 2]>,
    re_entry_frames_remaining: u32,
    last_speed_scale: f32,
}

impl PointerSmoother {
    pub fn new(smoothing_factor: f32) -> Self {
        Self {
            smoothing_factor,
            current: CENTER,
            velocity: [0.0; 2],
            last_target: None,
            re_entry_frames_remaining: 0,
            last_speed_scale: 1.0,
        }
    }

    pub fn position(&self) -> [f32; 2] {
        self.current
    }

    pub fn velocity(&self) -> [f32; 2] {
        self.velocity
    }

    pub fn re_entry_frames_remaining(&self) -> u32 {
        self.re_entry_frames_remaining
    }

    /// Speed multiplier applied on the most recent step (1.0 outside a
    /// re-entry window).
    pub fn last_speed_scale(&self) -> f32 {
        self.last_speed_scale
    }

    /// Advances one rendered frame. `None` means pointer interaction is off
    /// or the pointer is outside the region; the position then drifts back to
    /// the centre.
    pub fn step(&mut self, target: Option<[f32; 2]>) -> [f32; 2] {
        let Some(target) = target else {
            for axis in 0..2 {
                self.current[axis] += (CENTER[axis] - self.current[axis]) * CENTER_DECAY;
            }
            self.velocity = [0.0; 2];
            self.last_speed_scale = 1.0;
            return self.current;
        };

        if let Some(previous) = self.last_target {
            let jumped = (target[0] - previous[0]).abs() > RE_ENTRY_JUMP
                || (target[1] - previous[1]).abs() > RE_ENTRY_JUMP;
            if jumped {
                self.re_entry_frames_remaining = RE_ENTRY_FRAMES;
                tracing::trace!(?previous, ?target, "pointer re-entry smoothing armed");
            }
        }
        self.last_target = Some(target);

        // Ramps linearly from half speed back to full over the window.
        let speed_scale = if self.re_entry_frames_remaining > 0 {
            let scale =
                1.0 - 0.5 * (self.re_entry_frames_remaining as f32 / RE_ENTRY_FRAMES as f32);
            self.re_entry_frames_remaining -= 1;
            scale
        } else {
            1.0
        };
        self.last_speed_scale = speed_scale;

        let factor = self.smoothing_factor * speed_scale;
        for axis in 0..2 {
            let delta = target[axis] - self.current[axis];
            let desired_velocity = delta * factor;
            self.velocity[axis] += (desired_velocity - self.velocity[axis]) * VELOCITY_BLEND;
            self.current[axis] =
                (self.current[axis] + delta * factor + self.velocity[axis] * VELOCITY_GAIN)
                    .clamp(0.0, 1.0);
        }
        self.current
    }

    /// Called when the surface comes back into view: discards momentum so
    /// the first frame does not read a stale jump as motion.
    pub fn settle(&mut self) {
        self.velocity = [0.0; 2];
        self.re_entry_frames_remaining = 0;
        self.last_speed_scale = 1.0;
    }
}
