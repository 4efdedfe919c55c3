use std::time::Duration;

/// Upper bound on retained frame-time samples.
pub const FRAME_WINDOW_CAPACITY: usize = 60;

/// Fixed-size ring buffer of recent frame times in milliseconds.
#[derive(Debug, Clone)]
pub struct FrameWindow {
    samples: [f32; FRAME_WINDOW_CAPACITY],
    len: usize,
    head: usize,
}

impl FrameWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame_ms: f32) {
        self.samples[self.head] = frame_ms;
        self.head = (self.head + 1) % FRAME_WINDOW_CAPACITY;
        self.len = (self.len + 1).min(FRAME_WINDOW_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.head = 0;
    }

    pub fn average_ms(&self) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        // While filling, the live samples are exactly the first `len` slots.
        let sum: f32 = self.samples[..self.len].iter().sum();
        Some(sum / self.len as f32)
    }

    pub fn average_fps(&self) -> Option<f32> {
        self.average_ms()
            .filter(|ms| *ms > 0.0)
            .map(|ms| 1000.0 / ms)
    }
}

impl Default for FrameWindow {
    fn default() -> Self {
        Self {
            samples: [0.0; FRAME_WINDOW_CAPACITY],
            len: 0,
            head: 0,
        }
    }
}

/// Thresholds for the hysteretic quality stepper. Degradation is larger and
/// triggers sooner than recovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPolicy {
    pub floor: u32,
    /// Rendered frames between evaluations.
    pub evaluation_interval: u32,
    pub degrade_below_fps: f32,
    pub degrade_step: u32,
    pub upgrade_at_fps: f32,
    pub upgrade_step: u32,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            floor: 10,
            evaluation_interval: 120,
            degrade_below_fps: 30.0,
            degrade_step: 5,
            upgrade_at_fps: 50.0,
            upgrade_step: 3,
        }
    }
}

impl QualityPolicy {
    /// Fits the thresholds under a frame-rate target. The throttle never
    /// renders faster than the target, so a target below `degrade_below_fps`
    /// would otherwise read as a permanently slow device.
    pub fn for_target_fps(self, target_fps: f32) -> Self {
        if !(target_fps > 0.0) || target_fps >= self.degrade_below_fps {
            return self;
        }
        Self {
            degrade_below_fps: target_fps * 0.8,
            upgrade_at_fps: self.upgrade_at_fps.min(target_fps * 0.95),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityChange {
    pub from: u32,
    pub to: u32,
    pub average_fps: f32,
}

/// Owns the live line count and steps it between the floor and the device
/// tier's ceiling based on sampled frame times.
#[derive(Debug, Clone)]
pub struct QualityController {
    policy: QualityPolicy,
    ceiling: u32,
    level: u32,
    window: FrameWindow,
    frames_since_evaluation: u32,
}

impl QualityController {
    pub fn new(ceiling: u32, policy: QualityPolicy) -> Self {
        let ceiling = ceiling.max(policy.floor);
        Self {
            policy,
            ceiling,
            level: ceiling,
            window: FrameWindow::new(),
            frames_since_evaluation: 0,
        }
    }

    /// Starts below the ceiling; the level is clamped into range.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.clamp(self.policy.floor, self.ceiling);
        self
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn average_fps(&self) -> Option<f32> {
        self.window.average_fps()
    }

    /// Drops collected samples and restarts the evaluation countdown. The
    /// current level is kept.
    pub fn reset_window(&mut self) {
        self.window.clear();
        self.frames_since_evaluation = 0;
    }

    pub fn record(&mut self, frame_time: Duration) -> Option<QualityChange> {
        self.window.push(frame_time.as_secs_f32() * 1000.0);
        self.frames_since_evaluation += 1;
        if self.frames_since_evaluation < self.policy.evaluation_interval {
            return None;
        }
        self.frames_since_evaluation = 0;

        let average_fps = self.window.average_fps()?;
        let from = self.level;
        let to = if average_fps < self.policy.degrade_below_fps && from > self.policy.floor {
            from.saturating_sub(self.policy.degrade_step)
                .max(self.policy.floor)
        } else if average_fps >= self.policy.upgrade_at_fps && from < self.ceiling {
            (from + self.policy.upgrade_step).min(self.ceiling)
        } else {
            return None;
        };

        self.level = to;
        tracing::debug!(from, to, average_fps, "adjusted line-field quality");
        Some(QualityChange {
            from,
            to,
            average_fps,
        })
    }
}
