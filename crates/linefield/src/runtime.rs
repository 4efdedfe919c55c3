use std::time::{Duration, Instant};

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds since the renderer was mounted.
    pub seconds: f32,
    /// Monotonic count of rendered frames.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Outcome of offering an animation callback to the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameGate {
    /// Too early for the target interval; keep scheduling but do not draw.
    Skip,
    /// Draw this callback. `since_last` is the wall time since the previous
    /// rendered frame, absent for the first frame after a reset.
    Render { since_last: Option<Duration> },
}

/// Interval gate that caps how often animation callbacks turn into frames.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    /// Cadence reference; trails the last render by the interval overshoot.
    baseline: Option<Instant>,
    last_rendered: Option<Instant>,
}

impl FrameThrottle {
    /// A zero interval renders every callback.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            baseline: None,
            last_rendered: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn ready_for_frame(&mut self, now: Instant) -> FrameGate {
        let (Some(baseline), Some(last_rendered)) = (self.baseline, self.last_rendered) else {
            self.baseline = Some(now);
            self.last_rendered = Some(now);
            return FrameGate::Render { since_last: None };
        };

        let elapsed = now.saturating_duration_since(baseline);
        if elapsed < self.interval {
            return FrameGate::Skip;
        }

        // Carry the overshoot forward so the cadence does not drift towards
        // the next callback boundary.
        let baseline = if self.interval.is_zero() {
            now
        } else {
            let overshoot = elapsed.as_nanos() % self.interval.as_nanos();
            now.checked_sub(Duration::from_nanos(overshoot as u64))
                .unwrap_or(now)
        };
        self.baseline = Some(baseline);
        self.last_rendered = Some(now);
        FrameGate::Render {
            since_last: Some(now.saturating_duration_since(last_rendered)),
        }
    }

    /// Forgets the timing baseline; the next callback renders immediately.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.last_rendered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_callback_renders_without_sample() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(20));
        assert_eq!(
            throttle.ready_for_frame(Instant::now()),
            FrameGate::Render { since_last: None }
        );
    }

    #[test]
    fn early_callbacks_are_skipped() {
        let start = Instant::now();
        let mut throttle = FrameThrottle::new(Duration::from_millis(20));
        throttle.ready_for_frame(start);
        assert_eq!(
            throttle.ready_for_frame(start + Duration::from_millis(10)),
            FrameGate::Skip
        );
        assert_eq!(
            throttle.ready_for_frame(start + Duration::from_millis(21)),
            FrameGate::Render {
                since_last: Some(Duration::from_millis(21))
            }
        );
    }

    #[test]
    fn overshoot_is_carried_forward() {
        let start = Instant::now();
        let mut throttle = FrameThrottle::new(Duration::from_millis(20));
        throttle.ready_for_frame(start);
        // Rendered 5ms late; the cadence baseline becomes start + 20ms while
        // the reported frame time stays the real gap.
        throttle.ready_for_frame(start + Duration::from_millis(25));
        assert_eq!(
            throttle.ready_for_frame(start + Duration::from_millis(40)),
            FrameGate::Render {
                since_last: Some(Duration::from_millis(15))
            }
        );
    }

    #[test]
    fn reset_drops_baseline() {
        let start = Instant::now();
        let mut throttle = FrameThrottle::new(Duration::from_millis(20));
        throttle.ready_for_frame(start);
        throttle.reset();
        assert_eq!(
            throttle.ready_for_frame(start + Duration::from_millis(1)),
            FrameGate::Render { since_last: None }
        );
    }

    #[test]
    fn zero_interval_renders_every_callback() {
        let start = Instant::now();
        let mut throttle = FrameThrottle::new(Duration::ZERO);
        throttle.ready_for_frame(start);
        assert!(matches!(
            throttle.ready_for_frame(start),
            FrameGate::Render { .. }
        ));
    }
}
