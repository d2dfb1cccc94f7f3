//! Page compositor: PNG pages and PDF documents

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use inkpage_config::{CANVAS_HEIGHT, CANVAS_WIDTH, Orientation, PageParams, RenderConfig};
use inkpage_drawing::Drawing;
use inkpage_painting::{Canvas, RasterEngine, RenderError};
use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::error::CompositeError;
use crate::job::{CompositeReport, DocumentJob, PageJob, PageOutcome};
use crate::pdf::PdfAssembler;

/// Assembles rendered drawings into output pages
pub struct PageCompositor {
    engine: RasterEngine,
    /// Paper color under rasterize-only pages
    paper: [f32; 4],
    /// Rasterize-only PDF page size in points
    page_size: (f32, f32),
}

impl PageCompositor {
    pub fn new(engine: RasterEngine, config: &RenderConfig) -> Self {
        Self {
            engine,
            paper: config.palette.white.to_rgba_f32(),
            page_size: config.page_size_points(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(RasterEngine::from_config(config), config)
    }

    pub fn engine(&self) -> &RasterEngine {
        &self.engine
    }

    /// Background and drawing on paper, as an RGBA image. The drawing is
    /// validated first.
    pub fn render_image(
        &self,
        drawing: &Drawing,
        page: &PageParams,
    ) -> Result<RgbaImage, CompositeError> {
        drawing.validate().map_err(RenderError::from)?;
        let mut canvas = Canvas::filled(CANVAS_WIDTH, CANVAS_HEIGHT, self.paper);
        self.engine.render_page(&mut canvas, drawing, page)?;
        Ok(canvas.to_rgba_image())
    }

    /// Background and drawing on paper, PNG encoded
    pub fn render_png(
        &self,
        drawing: &Drawing,
        page: &PageParams,
    ) -> Result<Vec<u8>, CompositeError> {
        let image = self.render_image(drawing, page)?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// The validated drawing alone on a transparent canvas, for placing over
    /// a PDF page
    pub fn render_overlay(
        &self,
        drawing: &Drawing,
        orientation: Orientation,
    ) -> Result<RgbaImage, CompositeError> {
        let canvas = self
            .engine
            .render_checked(drawing, &PageParams::transparent(orientation))?;
        Ok(canvas.to_rgba_image())
    }

    /// Build a PDF from `job`. Pages are rasterized in parallel and written in
    /// job order. A page that fails to render or import is left out and
    /// reported; the other pages are still written.
    ///
    /// A source PDF that cannot be loaded fails only the pages taken from
    /// it. The document as a whole fails only when it cannot be serialized.
    pub fn compose_pdf(
        &self,
        job: &DocumentJob,
    ) -> Result<(Vec<u8>, CompositeReport), CompositeError> {
        let assembler = match &job.source_pdf {
            Some(bytes) => PdfAssembler::from_source(bytes).unwrap_or_else(|err| {
                error!("Source PDF unreadable, its pages are left out: {}", err);
                PdfAssembler::with_unreadable_source(err.to_string())
            }),
            None => PdfAssembler::new(),
        };
        self.compose_into(assembler, &job.pages)
    }

    /// Like [`compose_pdf`](Self::compose_pdf), onto an assembler the caller
    /// already loaded
    pub fn compose_into(
        &self,
        mut assembler: PdfAssembler,
        pages: &[PageJob],
    ) -> Result<(Vec<u8>, CompositeReport), CompositeError> {
        // Overlays are not rendered for source pages that cannot be imported
        let importable: Vec<bool> = pages
            .iter()
            .map(|page| {
                page.source_page
                    .is_none_or(|number| assembler.check_source_page(number).is_ok())
            })
            .collect();
        let rasters: Vec<Result<Option<RgbaImage>, CompositeError>> = pages
            .par_iter()
            .zip(importable)
            .map(|(page, importable)| self.rasterize(page, importable))
            .collect();

        let mut report = CompositeReport::default();
        for (index, (page, raster)) in pages.iter().zip(rasters).enumerate() {
            let outcome = match raster.and_then(|image| self.place(&mut assembler, page, image)) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!("Page {} left out: {}", index + 1, err);
                    PageOutcome::Failed(err)
                }
            };
            report.pages.push(outcome);
        }

        let bytes = assembler.finish()?;
        info!(
            "Composed PDF: {} of {} pages, {} bytes",
            report.written(),
            report.pages.len(),
            bytes.len()
        );
        Ok((bytes, report))
    }

    fn rasterize(
        &self,
        job: &PageJob,
        importable: bool,
    ) -> Result<Option<RgbaImage>, CompositeError> {
        if !importable {
            return Ok(None);
        }
        match (job.source_page, &job.drawing) {
            (None, Some(drawing)) => self.render_image(drawing, &job.page).map(Some),
            (None, None) => self.render_image(&Drawing::new(), &job.page).map(Some),
            (Some(_), Some(drawing)) => {
                self.render_overlay(drawing, job.page.orientation).map(Some)
            }
            (Some(page), None) => {
                debug!("MissingDrawing: source page {} imported without overlay", page);
                Ok(None)
            }
        }
    }

    fn place(
        &self,
        assembler: &mut PdfAssembler,
        job: &PageJob,
        image: Option<RgbaImage>,
    ) -> Result<PageOutcome, CompositeError> {
        match (job.source_page, image) {
            (None, Some(image)) => {
                assembler.add_raster_page(&image, self.page_size, job.page.orientation)?;
                Ok(PageOutcome::Rasterized)
            }
            (Some(page), image) => {
                let overlaid = image.is_some();
                assembler.add_source_page(page, image.as_ref())?;
                Ok(if overlaid {
                    PageOutcome::Overlaid
                } else {
                    PageOutcome::ImportedOnly
                })
            }
            // Rasterize-only jobs always produce an image
            (None, None) => Ok(PageOutcome::Rasterized),
        }
    }
}
