use std::time::{Duration, Instant};

use thiserror::Error;

/// Failure to deliver a haptic or audio cue. Always cosmetic.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback unavailable: {0}")]
    Unavailable(String),
    #[error("feedback blocked by permissions")]
    Blocked,
}

/// Host hook fired when a press has been held long enough to open.
pub trait Feedback {
    fn hold_cue(&mut self) -> Result<(), FeedbackError>;
}

/// Feedback sink that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn hold_cue(&mut self) -> Result<(), FeedbackError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub hold_duration: Duration,
    /// Squared displacement, in px², past which a press becomes a swipe.
    pub scroll_threshold_sq: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hold_duration: Duration::from_millis(400),
            scroll_threshold_sq: 100.0,
        }
    }
}

/// State of one touch sequence over a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub tile: usize,
    pub start: [f32; 2],
    pub started_at: Instant,
    pub scrolling: bool,
    pub hold_completed: bool,
    hold_deadline: Option<Instant>,
}

/// Classification of a touch-move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchMove {
    /// No gesture is active.
    Idle,
    /// Still a candidate press.
    Pressing,
    /// The press just became a swipe; a drag should begin at `handoff`.
    BeganScroll { handoff: [f32; 2] },
    /// An established swipe continues at `position`.
    Scrolling { position: [f32; 2] },
    /// The hold already completed; movement is ignored.
    Held,
}

/// Hold-to-open versus swipe-to-rotate disambiguation.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    state: Option<GestureState>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn state(&self) -> Option<&GestureState> {
        self.state.as_ref()
    }

    /// When the host should call `poll_hold`, if a hold timer is armed.
    pub fn hold_deadline(&self) -> Option<Instant> {
        self.state.and_then(|state| state.hold_deadline)
    }

    pub fn touch_start(&mut self, tile: usize, position: [f32; 2], now: Instant) {
        // A hold too long to represent as an Instant never completes.
        let hold_deadline = now.checked_add(self.config.hold_duration);
        if hold_deadline.is_none() {
            tracing::debug!(tile, "hold duration out of range; hold disabled");
        }
        self.state = Some(GestureState {
            tile,
            start: position,
            started_at: now,
            scrolling: false,
            hold_completed: false,
            hold_deadline,
        });
    }

    /// Fires the hold timer if it is due. Returns true exactly once per
    /// completed hold.
    pub fn poll_hold(&mut self, now: Instant) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        match state.hold_deadline {
            Some(deadline) if now >= deadline => {
                state.hold_deadline = None;
                state.hold_completed = true;
                true
            }
            _ => false,
        }
    }

    /// Call `poll_hold` first so a hold that expired before this move is
    /// honoured.
    pub fn touch_move(&mut self, position: [f32; 2]) -> TouchMove {
        let threshold = self.config.scroll_threshold_sq;
        let Some(state) = self.state.as_mut() else {
            return TouchMove::Idle;
        };
        if state.scrolling {
            return TouchMove::Scrolling { position };
        }
        if state.hold_completed {
            return TouchMove::Held;
        }

        let dx = position[0] - state.start[0];
        let dy = position[1] - state.start[1];
        if dx * dx + dy * dy > threshold {
            state.scrolling = true;
            state.hold_deadline = None;
            TouchMove::BeganScroll { handoff: position }
        } else {
            TouchMove::Pressing
        }
    }

    /// Ends the sequence. Returns the tile to open when the hold completed
    /// without turning into a swipe.
    pub fn touch_end(&mut self) -> Option<usize> {
        let state = self.state.take()?;
        (state.hold_completed && !state.scrolling).then_some(state.tile)
    }

    /// Ends the sequence without opening. Returns whether it was scrolling.
    pub fn touch_cancel(&mut self) -> bool {
        self.state.take().is_some_and(|state| state.scrolling)
    }

    pub fn teardown(&mut self) {
        self.state = None;
    }
}
