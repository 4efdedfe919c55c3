use std::time::Duration;

use serde::Serialize;

/// Coarse GPU capability bucket derived from the adapter/renderer string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GpuTier {
    Low,
    Mid,
    High,
}

/// Rendering quality bucket chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceTier {
    UltraLow,
    Low,
    Mobile,
    Laptop,
    Desktop,
}

impl std::fmt::Display for DeviceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceTier::UltraLow => f.write_str("ultra-low"),
            DeviceTier::Low => f.write_str("low"),
            DeviceTier::Mobile => f.write_str("mobile"),
            DeviceTier::Laptop => f.write_str("laptop"),
            DeviceTier::Desktop => f.write_str("desktop"),
        }
    }
}

/// Platform signals the classifier consumes. Every field is supplied by the
/// host so classification stays a pure function.
#[derive(Debug, Clone, Default)]
pub struct DeviceSignals {
    pub core_count: u32,
    /// Reported device memory in GiB; `None` when the platform hides it.
    pub memory_gb: Option<f32>,
    /// Renderer string from a throw-away high-performance context; `None`
    /// when that context could not be created.
    pub gpu_renderer: Option<String>,
    pub is_mobile_ua: bool,
    pub viewport_width: u32,
    pub is_touch_capable: bool,
    /// Explicit laptop confirmation (battery API and the like). `None` falls
    /// back to the viewport/CPU heuristic.
    pub confirmed_laptop: Option<bool>,
}

/// Viewports narrower than this are treated as phones.
pub const MOBILE_VIEWPORT_MAX: u32 = 768;

/// Bundle of quality parameters fixed at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviceProfile {
    pub tier: DeviceTier,
    pub gpu_tier: GpuTier,
    /// Maximum (and initial) number of rendered lines.
    pub line_count: u32,
    pub target_fps: f32,
    pub amplitude_scale: f32,
    /// Pointer-lag constant; smaller values trail the pointer more.
    pub smoothing_factor: f32,
    /// Backing-store resolution relative to the element's physical size.
    pub render_scale: f32,
}

impl DeviceProfile {
    pub fn for_tier(tier: DeviceTier, gpu_tier: GpuTier) -> Self {
        let (line_count, target_fps, amplitude_scale, smoothing_factor, render_scale) = match tier
        {
            DeviceTier::UltraLow => (15, 45.0, 0.6, 0.05, 0.6),
            DeviceTier::Low => (20, 45.0, 0.75, 0.06, 0.7),
            DeviceTier::Mobile => (25, 60.0, 0.8, 0.08, 0.75),
            DeviceTier::Laptop => (28, 45.0, 0.9, 0.09, 0.85),
            DeviceTier::Desktop => (40, 60.0, 1.0, 0.1, 1.0),
        };
        Self {
            tier,
            gpu_tier,
            line_count,
            target_fps,
            amplitude_scale,
            smoothing_factor,
            render_scale,
        }
    }

    /// Lowers the target FPS to `cap` when it is below the tier's own target.
    pub fn with_fps_cap(self, cap: Option<f32>) -> Self {
        match cap {
            Some(cap) if cap > 0.0 && cap < self.target_fps => Self {
                target_fps: cap,
                ..self
            },
            _ => self,
        }
    }

    pub fn target_frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.target_fps.max(1.0))
    }

    pub fn target_frame_interval_ms(&self) -> f32 {
        1000.0 / self.target_fps.max(1.0)
    }
}

const LOW_GPU_MARKERS: &[&str] = &[
    "swiftshader",
    "llvmpipe",
    "softpipe",
    "software",
    "microsoft basic",
    "mali",
    "adreno",
    "powervr",
    "videocore",
];

const MID_GPU_MARKERS: &[&str] = &[
    "integrated",
    "intel",
    "iris",
    "uhd graphics",
    "hd graphics",
    "radeon graphics",
    "radeon(tm) graphics",
    "vega 8",
];

/// Buckets a renderer string. A missing string means the probe context could
/// not be created, which is treated as low-end hardware.
pub fn gpu_tier_from_renderer(renderer: Option<&str>) -> GpuTier {
    let Some(renderer) = renderer else {
        return GpuTier::Low;
    };
    let lowered = renderer.to_ascii_lowercase();
    if LOW_GPU_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        GpuTier::Low
    } else if MID_GPU_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        GpuTier::Mid
    } else {
        GpuTier::High
    }
}

fn looks_like_laptop(signals: &DeviceSignals) -> bool {
    if let Some(confirmed) = signals.confirmed_laptop {
        return confirmed;
    }
    if signals.is_mobile_ua {
        return false;
    }
    let laptop_viewport = (MOBILE_VIEWPORT_MAX..=1680).contains(&signals.viewport_width);
    let modest_cpu =
        signals.core_count <= 8 && signals.memory_gb.map_or(true, |memory| memory <= 8.0);
    laptop_viewport && (modest_cpu || signals.is_touch_capable)
}

/// Picks the device tier; the first matching rule wins.
pub fn classify(signals: &DeviceSignals) -> DeviceProfile {
    let gpu_tier = gpu_tier_from_renderer(signals.gpu_renderer.as_deref());
    // Unknown memory is assumed to be adequate.
    let memory_gb = signals.memory_gb.unwrap_or(4.0);
    let constrained = signals.core_count < 4 || memory_gb < 4.0;

    let tier = if constrained && gpu_tier == GpuTier::Low {
        DeviceTier::UltraLow
    } else if signals.core_count == 4 || gpu_tier == GpuTier::Low {
        DeviceTier::Low
    } else if signals.is_mobile_ua || signals.viewport_width < MOBILE_VIEWPORT_MAX {
        DeviceTier::Mobile
    } else if looks_like_laptop(signals) || gpu_tier == GpuTier::Mid {
        DeviceTier::Laptop
    } else {
        DeviceTier::Desktop
    };

    let profile = DeviceProfile::for_tier(tier, gpu_tier);
    tracing::debug!(
        %tier,
        ?gpu_tier,
        lines = profile.line_count,
        fps = profile.target_fps,
        cores = signals.core_count,
        memory_gb = ?signals.memory_gb,
        "classified device"
    );
    profile
}

/// Requests a throw-away high-performance adapter and reports its name with
/// a device-class suffix the tier matcher understands.
#[cfg(feature = "gpu-probe")]
pub fn probe_gpu_renderer() -> anyhow::Result<String> {
    use anyhow::Context;

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        flags: wgpu::InstanceFlags::default(),
        memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        backend_options: wgpu::BackendOptions::default(),
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .context("failed to acquire a high-performance GPU adapter")?;

    let info = adapter.get_info();
    let renderer = match info.device_type {
        wgpu::DeviceType::Cpu => format!("{} (software)", info.name),
        wgpu::DeviceType::IntegratedGpu => format!("{} (integrated)", info.name),
        _ => info.name.clone(),
    };
    tracing::debug!(
        name = %info.name,
        backend = ?info.backend,
        device_type = ?info.device_type,
        "probed GPU adapter"
    );
    Ok(renderer)
}

/// Runs the probe and degrades silently to `None` when it fails.
#[cfg(feature = "gpu-probe")]
pub fn probe_gpu_renderer_or_none() -> Option<String> {
    match probe_gpu_renderer() {
        Ok(renderer) => Some(renderer),
        Err(err) => {
            tracing::debug!(error = %err, "GPU probe failed; assuming low-tier GPU");
            None
        }
    }
}
