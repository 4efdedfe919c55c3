use std::time::Duration;

use crate::quality::QualityPolicy;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scales both axes, rounding and never collapsing below one pixel.
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |value: u32| ((value as f32 * factor).round() as u32).max(1);
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

/// Caller-supplied inputs for one mounted line field.
///
/// The base amplitude and distance are multiplied by the device tier and the
/// responsive viewport factors before reaching the shader.
#[derive(Debug, Clone)]
pub struct LineFieldConfig {
    pub base_color: [f32; 3],
    pub amplitude: f32,
    pub distance: f32,
    /// When false the field ignores the pointer feed and idles at the centre.
    pub pointer_enabled: bool,
    /// Quiet period a resize must survive before it is applied.
    pub resize_debounce: Duration,
    /// Physical pixels per layout pixel.
    pub device_pixel_ratio: f32,
    pub quality_policy: QualityPolicy,
}

impl Default for LineFieldConfig {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0],
            amplitude: 1.0,
            distance: 0.0,
            pointer_enabled: true,
            resize_debounce: Duration::from_millis(150),
            device_pixel_ratio: 1.0,
            quality_policy: QualityPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_rounds_and_keeps_one_pixel() {
        assert_eq!(
            SurfaceSize::new(1000, 500).scaled(0.6),
            SurfaceSize::new(600, 300)
        );
        assert_eq!(SurfaceSize::new(1, 1).scaled(0.1), SurfaceSize::new(1, 1));
        assert!(SurfaceSize::new(0, 10).is_empty());
    }
}
