use serde::Serialize;

/// Spherical grid description. Columns alternate between the two row
/// patterns so neighbouring columns interlock like brickwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomeGrid {
    pub segments: u32,
    pub even_rows: Vec<i32>,
    pub odd_rows: Vec<i32>,
    pub tile_size: (u32, u32),
}

impl DomeGrid {
    pub fn new(segments: u32) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    /// Horizontal grid units covering the full circle (two per column).
    pub fn span(&self) -> i32 {
        self.segments as i32 * 2
    }

    /// Degrees of yaw per horizontal grid unit.
    pub fn unit_deg(&self) -> f32 {
        360.0 / self.span().max(1) as f32
    }

    pub fn generate_slots(&self) -> Vec<Slot> {
        let first_x = -(self.segments as i32 - 1);
        let (size_x, size_y) = self.tile_size;
        (0..self.segments as i32)
            .flat_map(|column| {
                let rows = if column % 2 == 0 {
                    &self.even_rows
                } else {
                    &self.odd_rows
                };
                let x = first_x + column * 2;
                rows.iter().map(move |&y| Slot {
                    x,
                    y,
                    size_x,
                    size_y,
                })
            })
            .collect()
    }

    /// Shortest horizontal separation between two grid x positions, wrapping
    /// around the closed cylinder.
    pub fn wrapped_distance(&self, a: i32, b: i32) -> i32 {
        let span = self.span().max(1);
        let direct = (a - b).rem_euclid(span);
        direct.min(span - direct)
    }

    /// Yaw of a slot's centre in degrees.
    pub fn tile_yaw_deg(&self, slot: &Slot) -> f32 {
        let center = slot.x as f32 + (slot.size_x as f32 - 1.0) / 2.0;
        center * self.unit_deg()
    }

    /// Pitch of a slot's centre in degrees.
    pub fn tile_pitch_deg(&self, slot: &Slot) -> f32 {
        let center = slot.y as f32 - (slot.size_y as f32 - 1.0) / 2.0;
        center * self.unit_deg()
    }
}

impl Default for DomeGrid {
    fn default() -> Self {
        Self {
            segments: 35,
            even_rows: vec![-4, -2, 0, 2],
            odd_rows: vec![-3, -1, 1, 3],
            tile_size: (2, 2),
        }
    }
}

/// Fixed spherical grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub x: i32,
    pub y: i32,
    pub size_x: u32,
    pub size_y: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_four_slots_per_column() {
        let grid = DomeGrid::new(4);
        let slots = grid.generate_slots();
        assert_eq!(slots.len(), 16);
        let xs: Vec<i32> = slots.iter().step_by(4).map(|slot| slot.x).collect();
        assert_eq!(xs, vec![-3, -1, 1, 3]);
        assert_eq!(slots[0].y, -4);
        assert_eq!(slots[4].y, -3);
    }

    #[test]
    fn wrapped_distance_goes_the_short_way_round() {
        let grid = DomeGrid::new(4);
        assert_eq!(grid.wrapped_distance(-3, 3), 2);
        assert_eq!(grid.wrapped_distance(-3, 1), 4);
        assert_eq!(grid.wrapped_distance(-1, -1), 0);
        assert_eq!(grid.wrapped_distance(3, -1), 4);
    }

    #[test]
    fn yaw_spans_the_full_circle() {
        let grid = DomeGrid::new(4);
        let slots = grid.generate_slots();
        assert!((grid.unit_deg() - 45.0).abs() < 1e-6);
        assert!((grid.tile_yaw_deg(&slots[0]) - (-112.5)).abs() < 1e-4);
        assert!((grid.tile_yaw_deg(&slots[12]) - 157.5).abs() < 1e-4);
    }
}
