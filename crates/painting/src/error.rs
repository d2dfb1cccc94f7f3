use inkpage_drawing::ValidationError;
use thiserror::Error;

use crate::assets::AssetCategory;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Missing {category} asset: {name}")]
    MissingAsset {
        category: AssetCategory,
        name: String,
    },

    #[error("Failed to decode {category} asset {name}: {source}")]
    AssetDecode {
        category: AssetCategory,
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid drawing: {0}")]
    Validation(#[from] ValidationError),
}
