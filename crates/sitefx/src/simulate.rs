use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use linefield::{
    classify, DeviceProfile, FrameOutcome, LineRenderer, RecordingSurface, SurfaceSize,
};
use pointerfeed::{PointerSample, PointerTracker};
use rand::prelude::*;
use serde::Serialize;

use crate::cli::SimulateArgs;
use crate::run::{device_signals, line_field_config, load_config, print_json};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityStep {
    pub at_ms: f64,
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub profile: DeviceProfile,
    pub callbacks: u32,
    pub rendered_frames: u64,
    pub throttled_frames: u64,
    pub suspended_frames: u64,
    pub simulated_ms: f64,
    pub average_fps: f64,
    pub initial_quality: u32,
    pub final_quality: u32,
    pub quality_changes: Vec<QualityStep>,
    pub backing_width: u32,
    pub backing_height: u32,
}

/// Synthetic GPU: a frame costs a fixed amount per line plus bounded jitter,
/// and the next callback lands on the first refresh boundary after the
/// frame finishes.
struct FrameCostModel {
    refresh: Duration,
    cost_per_line_ms: f32,
    jitter_ms: f32,
    rng: StdRng,
}

impl FrameCostModel {
    fn advance_after_render(&mut self, line_count: u32) -> Duration {
        let jitter = if self.jitter_ms > 0.0 {
            self.rng.gen_range(-self.jitter_ms..=self.jitter_ms)
        } else {
            0.0
        };
        let cost_ms = (line_count as f32 * self.cost_per_line_ms + jitter).max(0.0);
        let refresh_ms = self.refresh.as_secs_f32() * 1000.0;
        let refreshes = (cost_ms / refresh_ms).ceil().max(1.0) as u32;
        self.refresh * refreshes
    }
}

fn pointer_sample(elapsed: Duration) -> PointerSample {
    let angle = elapsed.as_secs_f32() * std::f32::consts::TAU / 4.0;
    PointerSample::inside(0.5 + 0.3 * angle.cos(), 0.5 + 0.3 * angle.sin())
}

pub fn simulate(args: &SimulateArgs) -> Result<SimulationReport> {
    let config = load_config(args.config.as_deref())?;
    let signals = device_signals(&args.device);
    let profile = classify(&signals).with_fps_cap(config.render.max_fps);
    let mut field = line_field_config(&config.render);
    field.device_pixel_ratio = args.device_pixel_ratio;

    let mut tracker = PointerTracker::new();
    let subscription = args.pointer.then(|| tracker.subscribe());

    let start = Instant::now();
    let layout = SurfaceSize::new(args.device.viewport_width, args.viewport_height);
    let Some(mut renderer) = LineRenderer::mount(
        Some(RecordingSurface::new()),
        layout,
        profile,
        field,
        subscription,
        start,
    ) else {
        bail!("viewport {layout:?} has no area; nothing to simulate");
    };

    let mut model = FrameCostModel {
        refresh: Duration::from_secs_f32(args.callback_ms / 1000.0),
        cost_per_line_ms: args.cost_per_line_ms.max(0.0),
        jitter_ms: args.jitter_ms.max(0.0),
        rng: StdRng::seed_from_u64(args.seed),
    };

    let initial_quality = renderer.quality_level();
    let mut quality_changes = Vec::new();
    let (mut rendered, mut throttled, mut suspended) = (0u64, 0u64, 0u64);
    let mut paused = false;
    let mut now = start;

    for _ in 0..args.frames {
        if let Some(pause_at) = args.pause_at {
            if !paused && now.saturating_duration_since(start) >= pause_at {
                paused = true;
                renderer.set_visible(false);
                tracing::info!(?pause_at, pause_for = ?args.pause_for, "field scrolled out of view");
                if renderer.on_animation_frame(now) == FrameOutcome::Suspended {
                    suspended += 1;
                }
                now += args.pause_for;
                renderer.set_visible(true);
            }
        }

        if args.pointer {
            tracker.publish(pointer_sample(now.saturating_duration_since(start)));
        }

        let before = renderer.quality_level();
        let advance = match renderer.on_animation_frame(now) {
            FrameOutcome::Rendered { line_count } => {
                rendered += 1;
                model.advance_after_render(line_count)
            }
            FrameOutcome::Throttled => {
                throttled += 1;
                model.refresh
            }
            FrameOutcome::Suspended => {
                suspended += 1;
                model.refresh
            }
            FrameOutcome::DrawFailed => model.refresh,
        };
        let after = renderer.quality_level();
        if after != before {
            quality_changes.push(QualityStep {
                at_ms: now.saturating_duration_since(start).as_secs_f64() * 1000.0,
                from: before,
                to: after,
            });
        }
        now += advance;
    }

    let simulated = now.saturating_duration_since(start);
    let visible_secs = simulated
        .saturating_sub(if paused { args.pause_for } else { Duration::ZERO })
        .as_secs_f64();
    let backing = renderer.backing_size();
    let report = SimulationReport {
        profile,
        callbacks: args.frames,
        rendered_frames: rendered,
        throttled_frames: throttled,
        suspended_frames: suspended,
        simulated_ms: simulated.as_secs_f64() * 1000.0,
        average_fps: if visible_secs > 0.0 {
            rendered as f64 / visible_secs
        } else {
            0.0
        },
        initial_quality,
        final_quality: renderer.quality_level(),
        quality_changes,
        backing_width: backing.width,
        backing_height: backing.height,
    };

    let surface = renderer.teardown();
    tracing::info!(
        frames = surface.frames_drawn,
        disposed = surface.disposed,
        subscribers = tracker.subscriber_count(),
        final_quality = report.final_quality,
        "simulation finished"
    );
    Ok(report)
}

pub fn run_simulate(args: SimulateArgs) -> Result<()> {
    let report = simulate(&args)?;
    print_json(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DeviceArgs;

    fn desktop_args() -> SimulateArgs {
        SimulateArgs {
            device: DeviceArgs {
                cores: Some(16),
                memory_gb: Some(32.0),
                gpu_renderer: Some("NVIDIA GeForce RTX 4080".into()),
                probe: false,
                mobile: false,
                touch: false,
                viewport_width: 2560,
                laptop: false,
            },
            config: None,
            frames: 400,
            callback_ms: 16.667,
            cost_per_line_ms: 0.1,
            jitter_ms: 0.0,
            seed: 1,
            viewport_height: 1440,
            device_pixel_ratio: 1.0,
            pointer: false,
            pause_at: None,
            pause_for: Duration::from_secs(1),
        }
    }

    #[test]
    fn cheap_frames_keep_full_quality() {
        let report = simulate(&desktop_args()).unwrap();
        assert_eq!(report.initial_quality, 40);
        assert_eq!(report.final_quality, 40);
        assert!(report.quality_changes.is_empty());
        assert_eq!(report.rendered_frames, 400);
    }

    #[test]
    fn expensive_frames_step_quality_down() {
        let args = SimulateArgs {
            cost_per_line_ms: 2.0,
            ..desktop_args()
        };
        let report = simulate(&args).unwrap();
        assert_eq!(
            report.quality_changes.first().map(|step| (step.from, step.to)),
            Some((40, 35))
        );
        assert!(report
            .quality_changes
            .iter()
            .all(|step| step.to + 5 == step.from || step.to == 10));
        assert!(report.final_quality < report.initial_quality);
    }

    #[test]
    fn pause_suspends_and_resumes() {
        let args = SimulateArgs {
            pause_at: Some(Duration::from_secs(1)),
            pointer: true,
            ..desktop_args()
        };
        let report = simulate(&args).unwrap();
        assert_eq!(report.suspended_frames, 1);
        assert_eq!(report.rendered_frames, 400);
        assert!(report.simulated_ms > 1000.0 * 400.0 / 60.0);
    }

    #[test]
    fn jitter_is_deterministic_per_seed() {
        let args = SimulateArgs {
            jitter_ms: 5.0,
            cost_per_line_ms: 0.4,
            ..desktop_args()
        };
        let first = simulate(&args).unwrap();
        let second = simulate(&args).unwrap();
        assert_eq!(first.simulated_ms, second.simulated_ms);
        assert_eq!(first.quality_changes, second.quality_changes);
    }

    #[test]
    fn zero_height_viewport_is_rejected() {
        let args = SimulateArgs {
            viewport_height: 0,
            ..desktop_args()
        };
        assert!(simulate(&args).is_err());
    }
}
