use std::time::{Duration, Instant};

use crate::rotation::RotationState;

/// Mapping from screen drag distance to rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMapping {
    /// Pixels of drag per degree of rotation.
    pub sensitivity: f32,
    pub max_pitch_deg: f32,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    origin: [f32; 2],
    start: RotationState,
    moved: bool,
}

/// Direct (non-inertial) drag-to-rotation state machine. Each drag is
/// relative to the rotation reached at the end of the previous one.
#[derive(Debug, Clone)]
pub struct DragTracker {
    mapping: DragMapping,
    rotation: RotationState,
    active: Option<ActiveDrag>,
}

impl DragTracker {
    pub fn new(mapping: DragMapping) -> Self {
        Self {
            mapping,
            rotation: RotationState::default(),
            active: None,
        }
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// True once the current drag has changed position.
    pub fn has_moved(&self) -> bool {
        self.active.is_some_and(|drag| drag.moved)
    }

    /// Starts a drag at `position`. A drag already in progress is restarted
    /// from the current rotation.
    pub fn start_drag(&mut self, position: [f32; 2]) {
        self.active = Some(ActiveDrag {
            origin: position,
            start: self.rotation,
            moved: false,
        });
    }

    /// Applies the total displacement since `start_drag`. Returns whether the
    /// rotation changed.
    pub fn update_drag(&mut self, position: [f32; 2]) -> bool {
        let Some(drag) = self.active.as_mut() else {
            return false;
        };
        let dx = position[0] - drag.origin[0];
        let dy = position[1] - drag.origin[1];
        if dx != 0.0 || dy != 0.0 {
            drag.moved = true;
        }

        let sensitivity = self.mapping.sensitivity.max(f32::EPSILON);
        let next = drag.start.offset(
            -dy / sensitivity,
            dx / sensitivity,
            self.mapping.max_pitch_deg,
        );
        let changed = next != self.rotation;
        self.rotation = next;
        changed
    }

    /// Ends the current drag. Returns whether it moved.
    pub fn end_drag(&mut self) -> bool {
        self.active.take().is_some_and(|drag| drag.moved)
    }
}

/// Suppresses the click that browsers deliver at the end of a drag.
#[derive(Debug, Clone)]
pub struct ClickGuard {
    window: Duration,
    last_drag_end: Option<Instant>,
}

impl ClickGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_drag_end: None,
        }
    }

    /// Records the end of a drag that moved.
    pub fn drag_ended(&mut self, now: Instant) {
        self.last_drag_end = Some(now);
    }

    pub fn allows_click(&self, now: Instant, drag_in_progress_moved: bool) -> bool {
        if drag_in_progress_moved {
            return false;
        }
        match self.last_drag_end {
            Some(ended) => now.saturating_duration_since(ended) >= self.window,
            None => true,
        }
    }
}
