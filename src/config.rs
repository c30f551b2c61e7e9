use serde::{Deserialize, Serialize};

/// What a gesture draws: brush stamps or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawMode {
    #[default]
    Shape,
    Text,
}

/// Stylization applied to a loaded image before it reaches the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    Normal,
    Halftone,
    Tracing,
}

impl FilterMode {
    /// Filtered loads are flagged so the host can warn about heavy
    /// processing.
    pub fn is_heavy(self) -> bool {
        !matches!(self, FilterMode::Normal)
    }
}

/// The active tool selection. Pure configuration: every field takes effect
/// on the next stroke or stamp. Persisted by the app shell across
/// sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Index into the brush catalog.
    pub brush: usize,
    /// Index into the tone catalog.
    pub tone: usize,
    /// Index into the font catalog.
    pub font: usize,
    /// Current color as a `#rrggbb` hex string.
    pub color: String,
    /// Tone-jitter multiplier; zero disables perturbation.
    pub fuzziness: f32,
    pub mode: DrawMode,
    /// Literal text stamped in text mode.
    pub text: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            brush: 0,
            tone: 0,
            font: 0,
            color: "#000000".to_owned(),
            fuzziness: 0.0,
            mode: DrawMode::Shape,
            text: String::new(),
        }
    }
}
