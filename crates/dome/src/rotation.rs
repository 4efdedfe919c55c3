use serde::Serialize;

/// Wraps an angle in degrees into (-180, 180].
pub fn wrap_angle_signed(deg: f32) -> f32 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Orientation of the dome. Pitch is clamped by the owner, yaw is always
/// kept wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RotationState {
    pub pitch_deg: f32,
    pub yaw_deg: f32,
}

impl RotationState {
    pub fn new(pitch_deg: f32, yaw_deg: f32, max_pitch_deg: f32) -> Self {
        Self {
            pitch_deg: clamp_pitch(pitch_deg, max_pitch_deg),
            yaw_deg: wrap_angle_signed(yaw_deg),
        }
    }

    /// Rotation offset from `self` by the given deltas.
    pub fn offset(&self, pitch_delta: f32, yaw_delta: f32, max_pitch_deg: f32) -> Self {
        Self::new(
            self.pitch_deg + pitch_delta,
            self.yaw_deg + yaw_delta,
            max_pitch_deg,
        )
    }
}

fn clamp_pitch(pitch_deg: f32, max_pitch_deg: f32) -> f32 {
    let max = max_pitch_deg.abs();
    pitch_deg.clamp(-max, max)
}
