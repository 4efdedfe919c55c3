/// Viewport-driven multipliers for wave amplitude and line spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsiveScale {
    pub amplitude: f32,
    pub distance: f32,
}

/// Upper width bound (exclusive) and the multipliers applied below it. The
/// last entry covers everything wider.
const BREAKPOINTS: [(u32, f32, f32); 5] = [
    (480, 0.55, 0.5),
    (768, 0.7, 0.65),
    (1024, 0.85, 0.8),
    (1440, 0.95, 0.9),
    (u32::MAX, 1.0, 1.0),
];

impl ResponsiveScale {
    pub fn for_width(width: u32) -> Self {
        let (_, amplitude, distance) = BREAKPOINTS
            .iter()
            .copied()
            .find(|(bound, _, _)| width < *bound)
            .unwrap_or(BREAKPOINTS[BREAKPOINTS.len() - 1]);
        Self {
            amplitude,
            distance,
        }
    }

    /// Combines the caller's base amplitude with the tier and viewport factors.
    pub fn effective_amplitude(&self, base: f32, tier_scale: f32) -> f32 {
        base * tier_scale * self.amplitude
    }

    pub fn effective_distance(&self, base: f32) -> f32 {
        base * self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrower_viewports_scale_down() {
        let widths = [320, 600, 900, 1280, 1920];
        let scales: Vec<_> = widths.iter().map(|w| ResponsiveScale::for_width(*w)).collect();
        for pair in scales.windows(2) {
            assert!(pair[0].amplitude < pair[1].amplitude);
            assert!(pair[0].distance < pair[1].distance);
        }
        assert_eq!(scales[4], ResponsiveScale { amplitude: 1.0, distance: 1.0 });
    }

    #[test]
    fn breakpoints_are_exclusive_upper_bounds() {
        assert_eq!(ResponsiveScale::for_width(479).amplitude, 0.55);
        assert_eq!(ResponsiveScale::for_width(480).amplitude, 0.7);
        assert_eq!(ResponsiveScale::for_width(u32::MAX).amplitude, 1.0);
    }

    #[test]
    fn effective_values_multiply() {
        let scale = ResponsiveScale::for_width(600);
        assert!((scale.effective_amplitude(2.0, 0.5) - 0.7).abs() < 1e-6);
        assert!((scale.effective_distance(1.0) - 0.65).abs() < 1e-6);
    }
}
