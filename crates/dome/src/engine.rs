use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::content::{ContentRef, OpenTile};
use crate::depth::DepthScheduler;
use crate::drag::{ClickGuard, DragMapping, DragTracker};
use crate::gesture::{Feedback, GestureConfig, GestureTracker, TouchMove};
use crate::grid::DomeGrid;
use crate::placement::{DomeLayout, PlacementWeights};
use crate::rotation::RotationState;

#[derive(Debug, Error)]
pub enum DomeError {
    #[error("invalid dome configuration: {0}")]
    InvalidConfig(String),
}

/// Tunables for the dome engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DomeConfig {
    pub segments: u32,
    pub max_vertical_rotation_deg: f32,
    /// Pixels of drag per degree of rotation.
    pub drag_sensitivity: f32,
    pub hold_duration: Duration,
    pub scroll_threshold_sq: f32,
    pub click_guard: Duration,
    pub weights: PlacementWeights,
}

impl Default for DomeConfig {
    fn default() -> Self {
        Self {
            segments: 35,
            max_vertical_rotation_deg: 5.0,
            drag_sensitivity: 20.0,
            hold_duration: Duration::from_millis(400),
            scroll_threshold_sq: 100.0,
            click_guard: Duration::from_millis(100),
            weights: PlacementWeights::default(),
        }
    }
}

impl DomeConfig {
    pub fn validate(&self) -> Result<(), DomeError> {
        if self.segments == 0 {
            return Err(DomeError::InvalidConfig(
                "segments must be at least 1".into(),
            ));
        }
        if !(self.drag_sensitivity > 0.0) {
            return Err(DomeError::InvalidConfig(format!(
                "drag sensitivity must be positive (got {})",
                self.drag_sensitivity
            )));
        }
        if !(self.max_vertical_rotation_deg >= 0.0) {
            return Err(DomeError::InvalidConfig(format!(
                "max vertical rotation must be non-negative (got {})",
                self.max_vertical_rotation_deg
            )));
        }
        if !(self.scroll_threshold_sq >= 0.0) {
            return Err(DomeError::InvalidConfig(format!(
                "scroll threshold must be non-negative (got {})",
                self.scroll_threshold_sq
            )));
        }
        Ok(())
    }

    pub fn grid(&self) -> DomeGrid {
        DomeGrid::new(self.segments)
    }

    fn drag_mapping(&self) -> DragMapping {
        DragMapping {
            sensitivity: self.drag_sensitivity,
            max_pitch_deg: self.max_vertical_rotation_deg,
        }
    }

    fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            hold_duration: self.hold_duration,
            scroll_threshold_sq: self.scroll_threshold_sq,
        }
    }
}

/// Output handed to the overlay presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomeAction {
    Open(OpenTile),
}

/// Admits one open request at a time.
#[derive(Debug, Clone, Default)]
pub struct OpenGate {
    pending: Option<usize>,
}

impl OpenGate {
    pub fn try_acquire(&mut self, tile: usize) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(tile);
        true
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn release(&mut self) {
        self.pending = None;
    }
}

/// Layout, rotation, gestures and depth ordering for one dome gallery.
pub struct DomeEngine<F: Feedback> {
    config: DomeConfig,
    pool: Vec<ContentRef>,
    layout: DomeLayout,
    drag: DragTracker,
    click_guard: ClickGuard,
    gestures: GestureTracker,
    depth: DepthScheduler,
    open: OpenGate,
    feedback: F,
}

impl<F: Feedback> DomeEngine<F> {
    pub fn new(config: DomeConfig, pool: Vec<ContentRef>, feedback: F) -> Result<Self, DomeError> {
        config.validate()?;
        let layout = DomeLayout::build(&config.grid(), &pool, &config.weights);
        tracing::debug!(
            segments = config.segments,
            pool = pool.len(),
            tiles = layout.len(),
            "dome layout built"
        );
        Ok(Self {
            drag: DragTracker::new(config.drag_mapping()),
            click_guard: ClickGuard::new(config.click_guard),
            gestures: GestureTracker::new(config.gesture_config()),
            depth: DepthScheduler::new(),
            open: OpenGate::default(),
            config,
            pool,
            layout,
            feedback,
        })
    }

    pub fn config(&self) -> &DomeConfig {
        &self.config
    }

    pub fn layout(&self) -> &DomeLayout {
        &self.layout
    }

    pub fn rotation(&self) -> RotationState {
        self.drag.rotation()
    }

    pub fn pending_open(&self) -> Option<usize> {
        self.open.pending()
    }

    /// When the host should next call `poll_hold`.
    pub fn hold_deadline(&self) -> Option<Instant> {
        self.gestures.hold_deadline()
    }

    /// Replaces the content pool and rebuilds every tile.
    pub fn set_pool(&mut self, pool: Vec<ContentRef>) {
        self.pool = pool;
        self.rebuild();
    }

    /// Changes the column count and rebuilds every tile.
    pub fn set_segments(&mut self, segments: u32) -> Result<(), DomeError> {
        let mut config = self.config.clone();
        config.segments = segments;
        config.validate()?;
        self.config = config;
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        // An open tile stays open across rebuilds; only `finish_open` clears it.
        self.gestures.teardown();
        self.layout = DomeLayout::build(&self.config.grid(), &self.pool, &self.config.weights);
        self.depth.mark_dirty();
        tracing::debug!(
            segments = self.config.segments,
            pool = self.pool.len(),
            tiles = self.layout.len(),
            "dome layout rebuilt"
        );
    }

    pub fn pointer_down(&mut self, position: [f32; 2]) {
        self.drag.start_drag(position);
    }

    pub fn pointer_move(&mut self, position: [f32; 2]) {
        if self.drag.update_drag(position) {
            self.depth.mark_dirty();
        }
    }

    pub fn pointer_up(&mut self, now: Instant) {
        if self.drag.end_drag() {
            self.click_guard.drag_ended(now);
        }
    }

    /// Desktop click on a tile.
    pub fn click(&mut self, tile: usize, now: Instant) -> Option<DomeAction> {
        if !self.click_guard.allows_click(now, self.drag.has_moved()) {
            tracing::debug!(tile, "click suppressed after drag");
            return None;
        }
        self.request_open(tile)
    }

    /// Touch-start over `tile`. Touches outside any tile are ignored.
    pub fn touch_start(&mut self, tile: usize, position: [f32; 2], now: Instant) {
        if self.layout.get(tile).is_none() {
            return;
        }
        self.gestures.touch_start(tile, position, now);
    }

    pub fn touch_move(&mut self, position: [f32; 2], now: Instant) {
        self.poll_hold(now);
        match self.gestures.touch_move(position) {
            TouchMove::BeganScroll { handoff } => {
                self.drag.start_drag(handoff);
            }
            TouchMove::Scrolling { position } => self.pointer_move(position),
            TouchMove::Idle | TouchMove::Pressing | TouchMove::Held => {}
        }
    }

    /// Fires the hold timer if it is due. Returns whether a hold completed.
    pub fn poll_hold(&mut self, now: Instant) -> bool {
        if !self.gestures.poll_hold(now) {
            return false;
        }
        if let Err(err) = self.feedback.hold_cue() {
            tracing::trace!(error = %err, "hold feedback failed");
        }
        true
    }

    pub fn touch_end(&mut self, now: Instant) -> Option<DomeAction> {
        self.poll_hold(now);
        let scrolling = self.gestures.state().is_some_and(|state| state.scrolling);
        let tile = self.gestures.touch_end();
        if scrolling {
            self.pointer_up(now);
        }
        self.request_open(tile?)
    }

    pub fn touch_cancel(&mut self, now: Instant) {
        if self.gestures.touch_cancel() {
            self.pointer_up(now);
        }
    }

    /// Returns fresh per-tile stacking values when rotation changed since the
    /// previous frame.
    pub fn on_animation_frame(&mut self) -> Option<&[u32]> {
        let yaw = self.drag.rotation().yaw_deg;
        self.depth
            .on_animation_frame(self.layout.tiles.iter().map(|tile| tile.yaw_deg), yaw)
    }

    /// Called by the presenter once the opened tile has closed.
    pub fn finish_open(&mut self) {
        self.open.release();
    }

    /// Cancels the hold timer and any drag. Returns the feedback sink.
    pub fn teardown(mut self) -> F {
        self.gestures.teardown();
        self.drag.end_drag();
        self.feedback
    }

    fn request_open(&mut self, tile: usize) -> Option<DomeAction> {
        let entry = self.layout.get(tile)?;
        if !self.open.try_acquire(tile) {
            tracing::debug!(tile, "open ignored; another tile is pending");
            return None;
        }
        tracing::debug!(tile, target = %entry.content.target_uri, "tile open emitted");
        Some(DomeAction::Open(OpenTile {
            tile,
            target_uri: entry.content.target_uri.clone(),
            preview_uri: entry.content.preview_uri.clone(),
            kind: entry.content.kind,
        }))
    }
}
