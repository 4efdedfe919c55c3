use crate::rotation::wrap_angle_signed;

/// Stacking order for a tile at `tile_yaw_deg` when the dome faces
/// `current_yaw_deg`. Tiles facing the viewer sit highest (999), the one
/// directly behind lowest (1).
pub fn depth_for(tile_yaw_deg: f32, current_yaw_deg: f32) -> u32 {
    let relative = wrap_angle_signed(tile_yaw_deg - current_yaw_deg);
    let depth = (500.0 + 499.0 * relative.to_radians().cos()).round();
    depth.max(1.0) as u32
}

/// Coalesces rotation changes into one depth recomputation per animation
/// frame.
#[derive(Debug, Clone)]
pub struct DepthScheduler {
    dirty: bool,
    depths: Vec<u32>,
}

impl Default for DepthScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthScheduler {
    /// Starts dirty so the first frame produces an ordering.
    pub fn new() -> Self {
        Self {
            dirty: true,
            depths: Vec::new(),
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn depths(&self) -> &[u32] {
        &self.depths
    }

    /// Recomputes depths if anything changed since the last frame.
    pub fn on_animation_frame<I>(&mut self, tile_yaws: I, current_yaw_deg: f32) -> Option<&[u32]>
    where
        I: IntoIterator<Item = f32>,
    {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.depths.clear();
        self.depths.extend(
            tile_yaws
                .into_iter()
                .map(|yaw| depth_for(yaw, current_yaw_deg)),
        );
        Some(&self.depths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_tiles_sit_on_top() {
        assert_eq!(depth_for(0.0, 0.0), 999);
        assert_eq!(depth_for(180.0, 0.0), 1);
        assert_eq!(depth_for(90.0, 0.0), 500);
        assert_eq!(depth_for(-170.0, 10.0), 1);
    }

    #[test]
    fn depth_is_never_zero() {
        for yaw in (-360..=360).map(|deg| deg as f32 * 0.5) {
            assert!(depth_for(yaw, 0.0) >= 1);
        }
    }

    #[test]
    fn recomputes_once_per_frame() {
        let mut scheduler = DepthScheduler::new();
        let yaws = [0.0, 90.0, 180.0];
        assert_eq!(
            scheduler.on_animation_frame(yaws, 0.0),
            Some(&[999, 500, 1][..])
        );
        assert_eq!(scheduler.on_animation_frame(yaws, 0.0), None);

        scheduler.mark_dirty();
        scheduler.mark_dirty();
        assert!(scheduler.on_animation_frame(yaws, 90.0).is_some());
        assert_eq!(scheduler.depths(), &[500, 999, 500]);
        assert_eq!(scheduler.on_animation_frame(yaws, 90.0), None);
    }
}
