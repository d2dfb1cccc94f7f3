//! inkpage compositor - page output
//!
//! Turns rendered drawings into deliverables:
//! - [`PageCompositor::render_png`] - background + drawing as a PNG page
//! - [`PageCompositor::compose_pdf`] - multi-page PDF mixing rasterized
//!   pages and pages imported from a source PDF with the drawing on top
//! - [`pdf`] - PDF assembly (page import, image XObjects, page tree)

pub mod compositor;
pub mod error;
pub mod job;
pub mod pdf;

pub use compositor::PageCompositor;
pub use error::CompositeError;
pub use job::{CompositeReport, DocumentJob, PageJob, PageOutcome};
pub use pdf::PdfAssembler;
