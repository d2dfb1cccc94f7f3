//! Load-once cache for brush masks and templates

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;
use parking_lot::Mutex;
use tracing::debug;

use super::{AssetCategory, AssetSource};
use crate::error::RenderError;
use crate::mask::AlphaMask;

/// One key's slot. The slot mutex is the load-once gate: the first caller
/// loads while later callers for the same key wait, other keys are unaffected.
type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

struct KeyedCache<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> Default for KeyedCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> KeyedCache<T> {
    fn get_or_load(
        &self,
        key: &str,
        load: impl FnOnce() -> Result<T, RenderError>,
    ) -> Result<Arc<T>, RenderError> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        let mut value = slot.lock();
        if let Some(loaded) = value.as_ref() {
            return Ok(Arc::clone(loaded));
        }

        // Failures are not cached; the next caller retries
        let loaded = Arc::new(load()?);
        *value = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    fn loaded_count(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }
}

/// Shared, read-only cache of decoded assets.
///
/// Owned by a [`crate::RasterEngine`]; concurrent page renders read the same
/// `Arc`s without further synchronization.
pub struct AssetCache {
    source: Box<dyn AssetSource>,
    masks: KeyedCache<AlphaMask>,
    templates: KeyedCache<RgbaImage>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("masks", &self.masks.loaded_count())
            .field("templates", &self.templates.loaded_count())
            .finish()
    }
}

impl AssetCache {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            masks: KeyedCache::default(),
            templates: KeyedCache::default(),
        }
    }

    /// Brush stamp `name` converted to an alpha mask
    pub fn mask(&self, name: &str) -> Result<Arc<AlphaMask>, RenderError> {
        self.masks.get_or_load(name, || {
            debug!("AssetCache: loading brush mask {}", name);
            let image = self.source.load(AssetCategory::Brushes, name)?;
            Ok(AlphaMask::from_image(&image))
        })
    }

    /// Background template `name` as RGBA
    pub fn template(&self, name: &str) -> Result<Arc<RgbaImage>, RenderError> {
        self.templates.get_or_load(name, || {
            debug!("AssetCache: loading template {}", name);
            let image = self.source.load(AssetCategory::Templates, name)?;
            Ok(image.to_rgba8())
        })
    }

    /// Number of masks and templates currently loaded
    pub fn loaded_count(&self) -> usize {
        self.masks.loaded_count() + self.templates.loaded_count()
    }
}
