//! Named image assets: brush stamps and page-background templates
//!
//! The raster engine only sees the [`AssetSource`] contract; where the bytes
//! come from (a directory, memory, procedural generation) is up to the
//! caller. Loaded assets are kept in an [`AssetCache`].

mod builtin;
mod cache;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use crate::error::RenderError;

pub use builtin::{BLANK_TEMPLATE, BuiltinAssets};
pub use cache::AssetCache;

/// Asset namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Brushes,
    Templates,
}

impl AssetCategory {
    /// Directory name used by [`DirectoryAssets`]
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetCategory::Brushes => "brushes",
            AssetCategory::Templates => "templates",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Something that can produce an image for a (category, name) pair.
///
/// Implementations must be shareable across threads; each name is loaded at
/// most once per [`AssetCache`].
pub trait AssetSource: Send + Sync {
    fn load(&self, category: AssetCategory, name: &str) -> Result<DynamicImage, RenderError>;
}

fn missing(category: AssetCategory, name: &str) -> RenderError {
    RenderError::MissingAsset {
        category,
        name: name.to_string(),
    }
}

/// Assets stored as `<root>/<category>/<name>.png`
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, category: AssetCategory, name: &str) -> Option<PathBuf> {
        // Names never address anything outside their category directory
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(
            self.root
                .join(category.dir_name())
                .join(format!("{name}.png")),
        )
    }
}

impl AssetSource for DirectoryAssets {
    fn load(&self, category: AssetCategory, name: &str) -> Result<DynamicImage, RenderError> {
        let path = self
            .path_for(category, name)
            .filter(|p| p.is_file())
            .ok_or_else(|| missing(category, name))?;

        debug!("DirectoryAssets::load: {}", path.display());
        image::open(&path).map_err(|source| RenderError::AssetDecode {
            category,
            name: name.to_string(),
            source,
        })
    }
}

/// In-memory assets, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<(AssetCategory, String), DynamicImage>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        category: AssetCategory,
        name: impl Into<String>,
        image: DynamicImage,
    ) {
        self.entries.insert((category, name.into()), image);
    }

    pub fn with(
        mut self,
        category: AssetCategory,
        name: impl Into<String>,
        image: DynamicImage,
    ) -> Self {
        self.insert(category, name, image);
        self
    }
}

impl AssetSource for MemoryAssets {
    fn load(&self, category: AssetCategory, name: &str) -> Result<DynamicImage, RenderError> {
        self.entries
            .get(&(category, name.to_string()))
            .cloned()
            .ok_or_else(|| missing(category, name))
    }
}

/// Try `primary`, falling back to `fallback` only when the asset is missing.
/// Decode failures in `primary` are reported, not masked.
pub struct LayeredAssets<P, F> {
    primary: P,
    fallback: F,
}

impl<P: AssetSource, F: AssetSource> LayeredAssets<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: AssetSource, F: AssetSource> AssetSource for LayeredAssets<P, F> {
    fn load(&self, category: AssetCategory, name: &str) -> Result<DynamicImage, RenderError> {
        match self.primary.load(category, name) {
            Err(RenderError::MissingAsset { .. }) => self.fallback.load(category, name),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gray(value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([value])))
    }

    #[test]
    fn test_memory_assets() {
        let assets = MemoryAssets::new().with(AssetCategory::Brushes, "pen", gray(255));

        assert!(assets.load(AssetCategory::Brushes, "pen").is_ok());
        assert!(matches!(
            assets.load(AssetCategory::Templates, "pen"),
            Err(RenderError::MissingAsset {
                category: AssetCategory::Templates,
                ..
            })
        ));
    }

    #[test]
    fn test_layered_assets_prefers_primary() {
        let primary = MemoryAssets::new().with(AssetCategory::Brushes, "pen", gray(10));
        let fallback = MemoryAssets::new()
            .with(AssetCategory::Brushes, "pen", gray(20))
            .with(AssetCategory::Brushes, "marker", gray(30));
        let assets = LayeredAssets::new(primary, fallback);

        let pen = assets.load(AssetCategory::Brushes, "pen").unwrap();
        assert_eq!(pen.to_luma8().get_pixel(0, 0).0, [10]);
        let marker = assets.load(AssetCategory::Brushes, "marker").unwrap();
        assert_eq!(marker.to_luma8().get_pixel(0, 0).0, [30]);
        assert!(assets.load(AssetCategory::Brushes, "quill").is_err());
    }

    #[test]
    fn test_directory_assets_rejects_traversal() {
        let assets = DirectoryAssets::new("/nonexistent");
        assert!(assets.path_for(AssetCategory::Templates, "../secret").is_none());
        assert!(assets.path_for(AssetCategory::Templates, "").is_none());
        assert_eq!(
            assets.path_for(AssetCategory::Templates, "P Grid small"),
            Some(PathBuf::from("/nonexistent/templates/P Grid small.png"))
        );
        assert!(matches!(
            assets.load(AssetCategory::Brushes, "pencil"),
            Err(RenderError::MissingAsset { .. })
        ));
    }
}
