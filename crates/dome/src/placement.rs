use serde::Serialize;

use crate::content::ContentRef;
use crate::grid::{DomeGrid, Slot};

/// Scoring constants for the greedy placement pass. Only the qualitative
/// goals matter: even usage and maximal horizontal separation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementWeights {
    /// Score given to an image that has not been placed yet.
    pub first_placement_score: f32,
    /// Bonus per unit of remaining quota.
    pub remaining_quota_bonus: f32,
}

impl Default for PlacementWeights {
    fn default() -> Self {
        Self {
            first_placement_score: 1000.0,
            remaining_quota_bonus: 0.1,
        }
    }
}

/// Maximum number of slots any single image may occupy.
pub fn usage_quota(slot_count: usize, pool_len: usize) -> usize {
    if pool_len == 0 {
        0
    } else {
        slot_count.div_ceil(pool_len)
    }
}

/// Assigns a pool index to every slot. Returns an empty vector for an empty
/// pool.
pub fn assign_content(
    grid: &DomeGrid,
    slots: &[Slot],
    pool_len: usize,
    weights: &PlacementWeights,
) -> Vec<usize> {
    if pool_len == 0 {
        return Vec::new();
    }

    let mut remaining = vec![usage_quota(slots.len(), pool_len); pool_len];
    let mut placed: Vec<Vec<i32>> = vec![Vec::new(); pool_len];
    let mut assignment = Vec::with_capacity(slots.len());

    for (slot_index, slot) in slots.iter().enumerate() {
        let mut best: Option<(usize, f32)> = None;
        for (image, quota) in remaining.iter().enumerate() {
            if *quota == 0 {
                continue;
            }
            let separation = placed[image]
                .iter()
                .map(|x| grid.wrapped_distance(*x, slot.x))
                .min()
                .map(|distance| distance as f32)
                .unwrap_or(weights.first_placement_score);
            let score = separation + *quota as f32 * weights.remaining_quota_bonus;
            // Ties keep the lower index.
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((image, score));
            }
        }

        let chosen = match best {
            Some((image, _)) => {
                remaining[image] -= 1;
                image
            }
            None => {
                tracing::warn!(slot_index, "no image has quota left; using round-robin");
                slot_index % pool_len
            }
        };
        placed[chosen].push(slot.x);
        assignment.push(Some(chosen));
    }

    let (filled, gaps) = fill_gaps(assignment, pool_len);
    debug_assert_eq!(gaps, 0, "greedy placement left unassigned slots");
    filled
}

/// Substitutes round-robin indices for unassigned slots. Returns the filled
/// assignment and the number of gaps that needed repair.
pub fn fill_gaps(assignment: Vec<Option<usize>>, pool_len: usize) -> (Vec<usize>, usize) {
    let mut gaps = 0;
    let filled = assignment
        .into_iter()
        .enumerate()
        .map(|(slot_index, entry)| match entry {
            Some(image) if image < pool_len => image,
            _ => {
                gaps += 1;
                slot_index % pool_len.max(1)
            }
        })
        .collect();
    if gaps > 0 {
        tracing::warn!(gaps, "repaired unassigned dome slots with round-robin");
    }
    (filled, gaps)
}

/// Grid slot with its assigned content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomeTile {
    pub slot: Slot,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub content_index: usize,
    pub content: ContentRef,
}

/// Complete tile set for one grid and content pool. Rebuilt wholesale when
/// either changes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomeLayout {
    pub tiles: Vec<DomeTile>,
}

impl DomeLayout {
    pub fn build(grid: &DomeGrid, pool: &[ContentRef], weights: &PlacementWeights) -> Self {
        if pool.is_empty() {
            tracing::debug!("empty content pool; dome has no tiles");
            return Self::default();
        }
        let slots = grid.generate_slots();
        let assignment = assign_content(grid, &slots, pool.len(), weights);
        let tiles = slots
            .iter()
            .zip(assignment)
            .map(|(slot, content_index)| DomeTile {
                slot: *slot,
                yaw_deg: grid.tile_yaw_deg(slot),
                pitch_deg: grid.tile_pitch_deg(slot),
                content_index,
                content: pool[content_index].clone(),
            })
            .collect();
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, tile: usize) -> Option<&DomeTile> {
        self.tiles.get(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(assignment: &[usize], pool_len: usize) -> Vec<usize> {
        let mut counts = vec![0; pool_len];
        for image in assignment {
            counts[*image] += 1;
        }
        counts
    }

    #[test]
    fn every_slot_is_assigned_within_quota() {
        for segments in 1..=12 {
            let grid = DomeGrid::new(segments);
            let slots = grid.generate_slots();
            for pool_len in 1..=20 {
                let assignment =
                    assign_content(&grid, &slots, pool_len, &PlacementWeights::default());
                assert_eq!(assignment.len(), slots.len());
                assert!(assignment.iter().all(|image| *image < pool_len));
                let quota = usage_quota(slots.len(), pool_len);
                for count in usage(&assignment, pool_len) {
                    assert!(count <= quota, "segments={segments} pool={pool_len}");
                }
            }
        }
    }

    #[test]
    fn two_images_never_repeat_back_to_back() {
        let grid = DomeGrid::new(4);
        let slots = grid.generate_slots();
        let assignment = assign_content(&grid, &slots, 2, &PlacementWeights::default());
        assert_eq!(usage(&assignment, 2), vec![8, 8]);
        for pair in assignment.windows(2) {
            assert_ne!(pair[0], pair[1], "{assignment:?}");
        }
    }

    #[test]
    fn unused_images_are_preferred() {
        let grid = DomeGrid::new(4);
        let slots = grid.generate_slots();
        let assignment = assign_content(&grid, &slots, 16, &PlacementWeights::default());
        let mut sorted = assignment.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn repeats_land_in_distant_columns() {
        // 8 images over 16 slots: each image appears twice, and its second
        // copy should sit at least two columns away from the first.
        let grid = DomeGrid::new(4);
        let slots = grid.generate_slots();
        let assignment = assign_content(&grid, &slots, 8, &PlacementWeights::default());
        for image in 0..8 {
            let xs: Vec<i32> = slots
                .iter()
                .zip(&assignment)
                .filter(|(_, assigned)| **assigned == image)
                .map(|(slot, _)| slot.x)
                .collect();
            assert_eq!(xs.len(), 2);
            assert!(grid.wrapped_distance(xs[0], xs[1]) >= 4, "{image}: {xs:?}");
        }
    }

    #[test]
    fn gaps_are_repaired_round_robin() {
        let (filled, gaps) = fill_gaps(vec![Some(1), None, Some(0), None], 3);
        assert_eq!(gaps, 2);
        assert_eq!(filled, vec![1, 1, 0, 0]);
    }

    #[test]
    fn empty_pool_yields_no_tiles() {
        let layout = DomeLayout::build(&DomeGrid::new(4), &[], &PlacementWeights::default());
        assert!(layout.is_empty());
    }

    #[test]
    fn layout_attaches_content_and_angles() {
        let pool = vec![ContentRef::image("a.webp"), ContentRef::image("b.webp")];
        let grid = DomeGrid::new(4);
        let layout = DomeLayout::build(&grid, &pool, &PlacementWeights::default());
        assert_eq!(layout.len(), 16);
        let first = layout.get(0).unwrap();
        assert_eq!(first.content.preview_uri, pool[first.content_index].preview_uri);
        assert!((first.yaw_deg - grid.tile_yaw_deg(&first.slot)).abs() < 1e-6);
    }
}
