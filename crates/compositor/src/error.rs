use inkpage_painting::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write PDF: {0}")]
    Save(String),

    #[error("Failed to import page {page}: {reason}")]
    PageImport { page: u32, reason: String },

    #[error("Page {page} is backed by a source PDF, but none was attached")]
    MissingSourcePdf { page: u32 },
}
