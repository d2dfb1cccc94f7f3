//! Shared configuration for inkpage
//!
//! This crate provides the single source of truth for the fixed canvas
//! dimensions and the caller-supplied render parameters (page orientation,
//! background template, brush palette, asset location) shared by the
//! raster engine, the page compositor and the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canvas width in pixels
pub const CANVAS_WIDTH: u32 = 1404;

/// Canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 1872;

/// Pixel density of the tablet screen, used to size PDF pages
pub const DEFAULT_DPI: f32 = 226.0;

/// Default opacity a highlighter stroke is composited at
pub const DEFAULT_HIGHLIGHTER_OPACITY: f32 = 0.35;

/// Environment variable overriding [`RenderConfig::asset_dir`]
pub const ASSETS_ENV: &str = "INKPAGE_ASSETS";

/// Environment variable overriding [`PageParams::template`]
pub const TEMPLATE_ENV: &str = "INKPAGE_TEMPLATE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// An 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Convert to a straight-alpha float color with full alpha
    pub fn to_rgba_f32(self) -> [f32; 4] {
        let [r, g, b] = self.0;
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            1.0,
        ]
    }
}

/// Concrete colors for each brush color, allowing caller-supplied themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub black: Rgb,
    pub gray: Rgb,
    pub white: Rgb,
    /// Tint used for highlighter strokes regardless of their brush color
    pub highlighter: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            black: Rgb([0, 0, 0]),
            gray: Rgb([125, 125, 125]),
            white: Rgb([255, 255, 255]),
            highlighter: Rgb([255, 237, 117]),
        }
    }
}

/// Parameters for rendering a single page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub orientation: Orientation,
    /// Background template name, `None` for a transparent background
    pub template: Option<String>,
}

impl PageParams {
    pub fn new(orientation: Orientation, template: Option<String>) -> Self {
        Self {
            orientation,
            template,
        }
    }

    /// Page parameters without a background, used for PDF overlays
    pub fn transparent(orientation: Orientation) -> Self {
        Self {
            orientation,
            template: None,
        }
    }
}

/// Render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Root of a directory asset store (`brushes/`, `templates/`)
    pub asset_dir: Option<PathBuf>,
    pub palette: Palette,
    pub highlighter_opacity: f32,
    /// Defaults applied to pages that don't specify their own parameters
    pub page: PageParams,
    /// Pixel density used to size rasterize-only PDF pages
    pub pdf_dpi: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            asset_dir: None,
            palette: Palette::default(),
            highlighter_opacity: DEFAULT_HIGHLIGHTER_OPACITY,
            page: PageParams::default(),
            pdf_dpi: DEFAULT_DPI,
        }
    }
}

impl RenderConfig {
    /// Parse a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `INKPAGE_ASSETS` and `INKPAGE_TEMPLATE` overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var_os(ASSETS_ENV).map(PathBuf::from),
            std::env::var(TEMPLATE_ENV).ok(),
        )
    }

    fn with_overrides(mut self, asset_dir: Option<PathBuf>, template: Option<String>) -> Self {
        if let Some(dir) = asset_dir {
            self.asset_dir = Some(dir);
        }
        if let Some(template) = template.filter(|t| !t.is_empty()) {
            self.page.template = Some(template);
        }
        self
    }

    /// Highlighter opacity clamped to 0..=1
    pub fn highlighter_opacity(&self) -> f32 {
        self.highlighter_opacity.clamp(0.0, 1.0)
    }

    /// Size of a canvas-sized PDF page in points
    pub fn page_size_points(&self) -> (f32, f32) {
        let dpi = if self.pdf_dpi > 0.0 { self.pdf_dpi } else { DEFAULT_DPI };
        (
            CANVAS_WIDTH as f32 * 72.0 / dpi,
            CANVAS_HEIGHT as f32 * 72.0 / dpi,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.asset_dir, None);
        assert_eq!(config.page.orientation, Orientation::Portrait);
        assert_eq!(config.page.template, None);
        assert_eq!(config.highlighter_opacity, DEFAULT_HIGHLIGHTER_OPACITY);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RenderConfig::from_toml_str(
            r#"
            asset_dir = "/opt/assets"

            [page]
            orientation = "landscape"
            template = "P Grid medium"

            [palette]
            gray = [100, 100, 100]
            "#,
        )
        .unwrap();

        assert_eq!(config.asset_dir, Some(PathBuf::from("/opt/assets")));
        assert_eq!(config.page.orientation, Orientation::Landscape);
        assert_eq!(config.page.template.as_deref(), Some("P Grid medium"));
        assert_eq!(config.palette.gray, Rgb([100, 100, 100]));
        assert_eq!(config.palette.black, Rgb([0, 0, 0]));
        assert_eq!(config.pdf_dpi, DEFAULT_DPI);
    }

    #[test]
    fn test_invalid_toml() {
        let result = RenderConfig::from_toml_str("page = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides() {
        let config = RenderConfig::default()
            .with_overrides(Some(PathBuf::from("assets")), Some("Blank".to_string()));
        assert_eq!(config.asset_dir, Some(PathBuf::from("assets")));
        assert_eq!(config.page.template.as_deref(), Some("Blank"));

        // An empty template override is ignored
        let config = RenderConfig::default().with_overrides(None, Some(String::new()));
        assert_eq!(config.page.template, None);
    }

    #[test]
    fn test_page_size_points() {
        let config = RenderConfig::default();
        let (w, h) = config.page_size_points();
        assert!((w - 447.29).abs() < 0.01);
        assert!((h - 596.39).abs() < 0.01);
    }

    #[test]
    fn test_rgb_to_float() {
        assert_eq!(Rgb([255, 0, 0]).to_rgba_f32(), [1.0, 0.0, 0.0, 1.0]);
    }
}
