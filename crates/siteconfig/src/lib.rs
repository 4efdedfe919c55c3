use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub version: u32,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub dome: DomeSection,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            version: 1,
            render: RenderSection::default(),
            dome: DomeSection::default(),
        }
    }
}

/// Inputs for the generative line-field background.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderSection {
    #[serde(default = "default_color", deserialize_with = "deserialize_color")]
    pub base_color: [f32; 3],
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default)]
    pub distance: f32,
    /// Whether the field follows the pointer or idles around the centre.
    #[serde(default = "default_true")]
    pub pointer: bool,
    #[serde(
        default = "default_resize_debounce",
        deserialize_with = "deserialize_duration"
    )]
    pub resize_debounce: Duration,
    /// Caps the device tier's target FPS when set.
    #[serde(default)]
    pub max_fps: Option<f32>,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            base_color: default_color(),
            amplitude: default_amplitude(),
            distance: 0.0,
            pointer: true,
            resize_debounce: default_resize_debounce(),
            max_fps: None,
        }
    }
}

/// Grid, gesture, and content settings for the dome gallery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomeSection {
    #[serde(default = "default_segments")]
    pub segments: u32,
    #[serde(default = "default_max_vertical_rotation")]
    pub max_vertical_rotation_deg: f32,
    /// Screen pixels of drag per degree of rotation.
    #[serde(default = "default_drag_sensitivity")]
    pub drag_sensitivity: f32,
    #[serde(
        default = "default_hold_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub hold_duration: Duration,
    /// Squared displacement (px²) that turns a press into a swipe.
    #[serde(default = "default_scroll_threshold_sq")]
    pub scroll_threshold_sq: f32,
    #[serde(
        default = "default_click_guard",
        deserialize_with = "deserialize_duration"
    )]
    pub click_guard: Duration,
    #[serde(default)]
    pub items: Vec<DomeItem>,
}

impl Default for DomeSection {
    fn default() -> Self {
        Self {
            segments: default_segments(),
            max_vertical_rotation_deg: default_max_vertical_rotation(),
            drag_sensitivity: default_drag_sensitivity(),
            hold_duration: default_hold_duration(),
            scroll_threshold_sq: default_scroll_threshold_sq(),
            click_guard: default_click_guard(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomeItem {
    pub preview: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub kind: ItemKind,
}

impl DomeItem {
    /// URI opened when the tile is activated; falls back to the preview.
    pub fn target_uri(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.preview)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    #[default]
    Image,
    EmbeddedDocument,
}

fn default_true() -> bool {
    true
}

fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_amplitude() -> f32 {
    1.0
}

fn default_resize_debounce() -> Duration {
    Duration::from_millis(150)
}

fn default_segments() -> u32 {
    35
}

fn default_max_vertical_rotation() -> f32 {
    5.0
}

fn default_drag_sensitivity() -> f32 {
    20.0
}

fn default_hold_duration() -> Duration {
    Duration::from_millis(400)
}

fn default_scroll_threshold_sq() -> f32 {
    100.0
}

fn default_click_guard() -> Duration {
    Duration::from_millis(100)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer)?
        .ok_or_else(|| de::Error::custom("duration may not be empty"))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<[f32; 3], D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Hex(String),
        Rgb([f32; 3]),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Hex(raw) => parse_hex_color(&raw).map_err(de::Error::custom),
        Helper::Rgb(rgb) => Ok(rgb),
    }
}

/// Parses `#rrggbb` or `#rgb` (leading `#` optional) into normalised floats.
pub fn parse_hex_color(raw: &str) -> Result<[f32; 3], String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.is_ascii() {
        return Err(format!("invalid colour '{trimmed}'; expected hex digits"));
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|ch| [ch, ch]).collect(),
        6 => digits.to_string(),
        _ => return Err(format!("invalid colour '{trimmed}'; expected #rgb or #rrggbb")),
    };

    let mut rgb = [0.0_f32; 3];
    for (index, slot) in rgb.iter_mut().enumerate() {
        let pair = &expanded[index * 2..index * 2 + 2];
        let value = u8::from_str_radix(pair, 16)
            .map_err(|_| format!("invalid colour '{trimmed}'; '{pair}' is not hex"))?;
        *slot = f32::from(value) / 255.0;
    }
    Ok(rgb)
}

impl SiteConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SiteConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let render = &self.render;
        if render
            .base_color
            .iter()
            .any(|component| !(0.0..=1.0).contains(component))
        {
            return Err(ConfigError::Invalid(
                "render.base_color components must be within [0, 1]".into(),
            ));
        }

        if !render.amplitude.is_finite() || render.amplitude < 0.0 {
            return Err(ConfigError::Invalid(
                "render.amplitude must be a non-negative number".into(),
            ));
        }

        if let Some(fps) = render.max_fps {
            if fps <= 0.0 {
                return Err(ConfigError::Invalid("render.max_fps must be > 0".into()));
            }
        }

        let dome = &self.dome;
        if dome.segments == 0 {
            return Err(ConfigError::Invalid(
                "dome.segments must be greater than zero".into(),
            ));
        }

        if dome.drag_sensitivity <= 0.0 {
            return Err(ConfigError::Invalid(
                "dome.drag_sensitivity must be greater than zero".into(),
            ));
        }

        if dome.max_vertical_rotation_deg < 0.0 {
            return Err(ConfigError::Invalid(
                "dome.max_vertical_rotation_deg must be non-negative".into(),
            ));
        }

        if dome.scroll_threshold_sq < 0.0 {
            return Err(ConfigError::Invalid(
                "dome.scroll_threshold_sq must be non-negative".into(),
            ));
        }

        for (index, item) in dome.items.iter().enumerate() {
            if item.preview.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "dome item {index} has an empty preview URI"
                )));
            }
        }

        Ok(())
    }
}
