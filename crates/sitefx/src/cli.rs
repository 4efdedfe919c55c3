use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sitefx",
    author,
    version,
    about = "Headless harness for the landing page's line field and dome gallery"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a device and print the line-field profile it would get.
    Profile(ProfileArgs),
    /// Print the dome tile assignment for a configuration file.
    Layout(LayoutArgs),
    /// Run the line field headless against a synthetic frame-cost model.
    Simulate(SimulateArgs),
}

/// Platform signals, supplied by hand or partly probed from this machine.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Logical CPU cores (defaults to this machine's available parallelism).
    #[arg(long, value_name = "N")]
    pub cores: Option<u32>,

    /// Reported device memory in GiB; omitted means unknown.
    #[arg(long, value_name = "GB")]
    pub memory_gb: Option<f32>,

    /// GPU renderer string (e.g. "ANGLE (Intel, Iris Xe)").
    #[arg(long, value_name = "STRING", conflicts_with = "probe")]
    pub gpu_renderer: Option<String>,

    /// Probe this machine's high-performance GPU adapter for the renderer string.
    #[arg(long)]
    pub probe: bool,

    /// Treat the user agent as a phone or tablet.
    #[arg(long)]
    pub mobile: bool,

    /// Device has a touch screen.
    #[arg(long)]
    pub touch: bool,

    /// Viewport width in CSS pixels.
    #[arg(long, value_name = "PX", default_value_t = 1920)]
    pub viewport_width: u32,

    /// Device is known to be a laptop (skips the viewport heuristic).
    #[arg(long)]
    pub laptop: bool,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Site configuration whose `render.max_fps` caps the target frame rate.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Site configuration with a `[dome]` section.
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Override `dome.segments`.
    #[arg(long, value_name = "N")]
    pub segments: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Site configuration for the line field (defaults apply when omitted).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of animation callbacks to simulate.
    #[arg(long, value_name = "N", default_value_t = 600)]
    pub frames: u32,

    /// Display refresh period in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 16.667, value_parser = parse_positive_ms)]
    pub callback_ms: f32,

    /// Simulated GPU cost per rendered line in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 0.2)]
    pub cost_per_line_ms: f32,

    /// Maximum random deviation added to each frame's cost, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 1.0)]
    pub jitter_ms: f32,

    /// Seed for the cost jitter.
    #[arg(long, value_name = "SEED", default_value_t = 7)]
    pub seed: u64,

    /// Viewport height in CSS pixels.
    #[arg(long, value_name = "PX", default_value_t = 1080)]
    pub viewport_height: u32,

    /// Physical pixels per CSS pixel.
    #[arg(long, value_name = "RATIO", default_value_t = 1.0)]
    pub device_pixel_ratio: f32,

    /// Feed a circling pointer through the pointer tracker.
    #[arg(long)]
    pub pointer: bool,

    /// Simulated time at which the field scrolls out of view (e.g. `3s`).
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub pause_at: Option<Duration>,

    /// How long the field stays out of view.
    #[arg(
        long,
        value_name = "DURATION",
        value_parser = humantime::parse_duration,
        default_value = "1s"
    )]
    pub pause_for: Duration,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_positive_ms(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid millisecond value '{value}'"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(format!("millisecond value must be positive (got {parsed})"));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_milliseconds() {
        assert_eq!(parse_positive_ms("16.5").unwrap(), 16.5);
        assert_eq!(parse_positive_ms(" 8 ").unwrap(), 8.0);
        assert!(parse_positive_ms("0").is_err());
        assert!(parse_positive_ms("-3").is_err());
        assert!(parse_positive_ms("fast").is_err());
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::try_parse_from(["sitefx", "simulate", "--pause-at", "2s"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.frames, 600);
        assert_eq!(args.pause_at, Some(Duration::from_secs(2)));
        assert_eq!(args.pause_for, Duration::from_secs(1));
        assert_eq!(args.device.viewport_width, 1920);
        assert!(!args.device.probe);
    }

    #[test]
    fn probe_conflicts_with_explicit_renderer() {
        let result = Cli::try_parse_from([
            "sitefx",
            "profile",
            "--probe",
            "--gpu-renderer",
            "Mali-G78",
        ]);
        assert!(result.is_err());
    }
}
