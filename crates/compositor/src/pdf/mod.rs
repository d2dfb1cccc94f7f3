//! PDF document assembly
//!
//! Output pages are collected under a fresh page tree. When a source PDF is
//! attached it is loaded in place: imported pages keep their original
//! content streams and resources, and source pages that are not used are
//! pruned when the document is finished.

mod import;
mod xobject;

use std::collections::BTreeMap;

use image::RgbaImage;
use inkpage_config::{CANVAS_HEIGHT, CANVAS_WIDTH, Orientation};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::error::CompositeError;

pub use import::{ImportedPage, OVERLAY_NAME, add_overlay, import_page, overlay_rect};
pub use xobject::{add_image_xobject, draw_xobject};

/// XObject name of the page image on rasterize-only pages
const PAGE_IMAGE_NAME: &str = "Page";

/// Catalog entries pointing into the replaced page tree
const STALE_CATALOG_KEYS: [&[u8]; 3] = [b"Outlines", b"Dests", b"PageLabels"];

pub struct PdfAssembler {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    /// 1-based page number -> page object of the source document
    source_pages: BTreeMap<u32, ObjectId>,
    has_source: bool,
    /// Why the source document could not be loaded
    source_error: Option<String>,
}

impl PdfAssembler {
    /// A new, empty document
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            source_pages: BTreeMap::new(),
            has_source: false,
            source_error: None,
        }
    }

    /// A new document standing in for a source that failed to load.
    /// Every source page requested from it fails with `reason`.
    pub fn with_unreadable_source(reason: String) -> Self {
        Self {
            source_error: Some(reason),
            ..Self::new()
        }
    }

    /// Load `bytes` as the source document for imported pages
    pub fn from_source(bytes: &[u8]) -> Result<Self, CompositeError> {
        let mut doc = Document::load_mem(bytes)?;
        let source_pages = doc.get_pages();
        let pages_id = doc.new_object_id();
        debug!("PdfAssembler: source PDF with {} pages", source_pages.len());
        Ok(Self {
            doc,
            pages_id,
            kids: Vec::new(),
            source_pages,
            has_source: true,
            source_error: None,
        })
    }

    pub fn has_source(&self) -> bool {
        self.has_source
    }

    pub fn source_page_count(&self) -> usize {
        self.source_pages.len()
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page showing `image` full-size. Landscape pages keep the
    /// portrait media box and are marked for display rotated.
    pub fn add_raster_page(
        &mut self,
        image: &RgbaImage,
        size: (f32, f32),
        orientation: Orientation,
    ) -> Result<(), CompositeError> {
        let (width, height) = size;
        let image_id = add_image_xobject(&mut self.doc, image);
        let content = Content {
            operations: draw_xobject(PAGE_IMAGE_NAME, 0.0, 0.0, width, height),
        };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! { PAGE_IMAGE_NAME => image_id },
            },
            "Contents" => content_id,
        };
        if orientation == Orientation::Landscape {
            page.set("Rotate", 90);
        }

        let page_id = self.doc.add_object(page);
        self.kids.push(page_id.into());
        Ok(())
    }

    /// The source page object for `page_number` (1-based), or why it cannot
    /// be imported
    pub fn check_source_page(&self, page_number: u32) -> Result<ObjectId, CompositeError> {
        if let Some(reason) = &self.source_error {
            return Err(CompositeError::PageImport {
                page: page_number,
                reason: reason.clone(),
            });
        }
        if !self.has_source {
            return Err(CompositeError::MissingSourcePdf { page: page_number });
        }
        self.source_pages
            .get(&page_number)
            .copied()
            .ok_or_else(|| CompositeError::PageImport {
                page: page_number,
                reason: format!("source PDF has {} pages", self.source_pages.len()),
            })
    }

    /// Append page `page_number` (1-based) of the source document, with
    /// `overlay` drawn over it when given.
    ///
    /// Errors are reported as [`CompositeError::PageImport`] and leave the
    /// output pages unchanged.
    pub fn add_source_page(
        &mut self,
        page_number: u32,
        overlay: Option<&RgbaImage>,
    ) -> Result<(), CompositeError> {
        let source = self.check_source_page(page_number)?;
        let import_error = |err: lopdf::Error| CompositeError::PageImport {
            page: page_number,
            reason: err.to_string(),
        };

        let page =
            import_page(&mut self.doc, source, self.pages_id).map_err(import_error)?;
        if let Some(image) = overlay {
            let image_id = add_image_xobject(&mut self.doc, image);
            let rect = overlay_rect(page.media_box, CANVAS_WIDTH, CANVAS_HEIGHT);
            add_overlay(&mut self.doc, &page, image_id, rect).map_err(import_error)?;
        }

        self.kids.push(page.id.into());
        Ok(())
    }

    /// Write the page tree and serialize the document
    pub fn finish(mut self) -> Result<Vec<u8>, CompositeError> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );

        let root = self
            .doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .ok();
        match root {
            Some(root) if self.has_source => {
                let catalog = self.doc.get_object_mut(root)?.as_dict_mut()?;
                catalog.set("Pages", self.pages_id);
                for key in STALE_CATALOG_KEYS {
                    catalog.remove(key);
                }
            }
            _ => {
                let catalog_id = self.doc.add_object(dictionary! {
                    "Type" => "Catalog",
                    "Pages" => self.pages_id,
                });
                self.doc.trailer.set("Root", catalog_id);
            }
        }

        self.doc.prune_objects();
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|err| CompositeError::Save(err.to_string()))?;
        debug!(
            "PdfAssembler::finish: {} pages, {} bytes",
            count,
            bytes.len()
        );
        Ok(bytes)
    }
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}
