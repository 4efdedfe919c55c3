use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dome::{ContentKind, ContentRef, DomeConfig, DomeEngine, DomeTile, NoFeedback};
use linefield::{classify, DeviceProfile, DeviceSignals, LineFieldConfig};
use serde::Serialize;
use siteconfig::{DomeSection, ItemKind, RenderSection, SiteConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{DeviceArgs, LayoutArgs, ProfileArgs};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    let Some(path) = path else {
        return Ok(SiteConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = SiteConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::debug!(path = %path.display(), items = config.dome.items.len(), "loaded site config");
    Ok(config)
}

pub fn device_signals(args: &DeviceArgs) -> DeviceSignals {
    let core_count = args.cores.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|cores| cores.get() as u32)
            .unwrap_or(1)
    });
    DeviceSignals {
        core_count,
        memory_gb: args.memory_gb,
        gpu_renderer: gpu_renderer(args),
        is_mobile_ua: args.mobile,
        viewport_width: args.viewport_width,
        is_touch_capable: args.touch,
        confirmed_laptop: args.laptop.then_some(true),
    }
}

#[cfg(feature = "gpu-probe")]
fn gpu_renderer(args: &DeviceArgs) -> Option<String> {
    if args.probe {
        linefield::probe_gpu_renderer_or_none()
    } else {
        args.gpu_renderer.clone()
    }
}

#[cfg(not(feature = "gpu-probe"))]
fn gpu_renderer(args: &DeviceArgs) -> Option<String> {
    if args.probe {
        tracing::warn!("built without GPU probe support; treating GPU as unknown");
        None
    } else {
        args.gpu_renderer.clone()
    }
}

pub fn line_field_config(render: &RenderSection) -> LineFieldConfig {
    LineFieldConfig {
        base_color: render.base_color,
        amplitude: render.amplitude,
        distance: render.distance,
        pointer_enabled: render.pointer,
        resize_debounce: render.resize_debounce,
        ..LineFieldConfig::default()
    }
}

pub fn dome_config(section: &DomeSection) -> DomeConfig {
    DomeConfig {
        segments: section.segments,
        max_vertical_rotation_deg: section.max_vertical_rotation_deg,
        drag_sensitivity: section.drag_sensitivity,
        hold_duration: section.hold_duration,
        scroll_threshold_sq: section.scroll_threshold_sq,
        click_guard: section.click_guard,
        ..DomeConfig::default()
    }
}

pub fn content_pool(section: &DomeSection) -> Vec<ContentRef> {
    section
        .items
        .iter()
        .map(|item| ContentRef {
            preview_uri: item.preview.clone(),
            target_uri: item.target_uri().to_string(),
            alt_text: item.alt.clone(),
            kind: match item.kind {
                ItemKind::Image => ContentKind::Image,
                ItemKind::EmbeddedDocument => ContentKind::EmbeddedDocument,
            },
        })
        .collect()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode JSON output")?;
    println!("{rendered}");
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProfileReport {
    cores: u32,
    memory_gb: Option<f32>,
    gpu_renderer: Option<String>,
    target_frame_interval_ms: f32,
    profile: DeviceProfile,
}

pub fn run_profile(args: ProfileArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let signals = device_signals(&args.device);
    let profile = classify(&signals).with_fps_cap(config.render.max_fps);
    tracing::info!(tier = %profile.tier, lines = profile.line_count, "device profile ready");
    print_json(&ProfileReport {
        cores: signals.core_count,
        memory_gb: signals.memory_gb,
        gpu_renderer: signals.gpu_renderer,
        target_frame_interval_ms: profile.target_frame_interval_ms(),
        profile,
    })
}

#[derive(Debug, Serialize)]
struct LayoutReport<'a> {
    segments: u32,
    pool_size: usize,
    quota: usize,
    tiles: &'a [DomeTile],
}

pub fn run_layout(args: LayoutArgs) -> Result<()> {
    let config = load_config(Some(&args.config))?;
    let mut dome = dome_config(&config.dome);
    if let Some(segments) = args.segments {
        dome.segments = segments;
    }
    let pool = content_pool(&config.dome);
    let pool_size = pool.len();
    let engine =
        DomeEngine::new(dome, pool, NoFeedback).context("failed to build the dome layout")?;
    let layout = engine.layout();
    if layout.is_empty() {
        tracing::warn!("dome has no items; layout is empty");
    }
    print_json(&LayoutReport {
        segments: engine.config().segments,
        pool_size,
        quota: dome::usage_quota(layout.len(), pool_size),
        tiles: &layout.tiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r##"
version = 1

[render]
base_color = "#ff8000"
amplitude = 1.5
pointer = false

[dome]
segments = 6

[[dome.items]]
preview = "thumbs/a.webp"
target = "full/a.webp"
alt = "First"

[[dome.items]]
preview = "thumbs/deck.webp"
target = "embeds/deck.html"
kind = "embedded-document"
"##;

    fn device(cores: u32) -> DeviceArgs {
        DeviceArgs {
            cores: Some(cores),
            memory_gb: Some(16.0),
            gpu_renderer: Some("NVIDIA GeForce RTX 3070".into()),
            probe: false,
            mobile: false,
            touch: false,
            viewport_width: 2560,
            laptop: false,
        }
    }

    #[test]
    fn maps_render_section() {
        let config = SiteConfig::from_toml_str(CONFIG).unwrap();
        let render = line_field_config(&config.render);
        assert_eq!(render.amplitude, 1.5);
        assert!(!render.pointer_enabled);
        assert!((render.base_color[0] - 1.0).abs() < 1e-6);
        assert!((render.base_color[1] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn maps_dome_items_to_content() {
        let config = SiteConfig::from_toml_str(CONFIG).unwrap();
        let pool = content_pool(&config.dome);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].target_uri, "full/a.webp");
        assert_eq!(pool[0].alt_text, "First");
        assert_eq!(pool[1].kind, ContentKind::EmbeddedDocument);
        assert_eq!(dome_config(&config.dome).segments, 6);
    }

    #[test]
    fn explicit_signals_pass_through() {
        let mut args = device(12);
        args.laptop = true;
        let signals = device_signals(&args);
        assert_eq!(signals.core_count, 12);
        assert_eq!(signals.confirmed_laptop, Some(true));
        assert_eq!(
            signals.gpu_renderer.as_deref(),
            Some("NVIDIA GeForce RTX 3070")
        );
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.version, 1);
        assert!(config.dome.items.is_empty());
    }
}
