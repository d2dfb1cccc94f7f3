//! Page and document jobs, and the per-page report of a composition

use inkpage_config::PageParams;
use inkpage_drawing::Drawing;

use crate::error::CompositeError;

/// One output page
#[derive(Debug, Clone, Default)]
pub struct PageJob {
    /// Handwriting for this page, if any
    pub drawing: Option<Drawing>,
    pub page: PageParams,
    /// 1-based page of the document's source PDF to use as base content.
    /// `None` produces a rasterize-only page.
    pub source_page: Option<u32>,
}

impl PageJob {
    /// A rasterize-only page: background template plus drawing
    pub fn raster(drawing: Drawing, page: PageParams) -> Self {
        Self {
            drawing: Some(drawing),
            page,
            source_page: None,
        }
    }

    /// A page of the source PDF, with an optional drawing on top
    pub fn overlay(source_page: u32, drawing: Option<Drawing>, page: PageParams) -> Self {
        Self {
            drawing,
            page,
            source_page: Some(source_page),
        }
    }
}

/// A multi-page document, optionally backed by a source PDF
#[derive(Debug, Clone, Default)]
pub struct DocumentJob {
    pub source_pdf: Option<Vec<u8>>,
    /// Output pages, in order
    pub pages: Vec<PageJob>,
}

impl DocumentJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_pdf(mut self, bytes: Vec<u8>) -> Self {
        self.source_pdf = Some(bytes);
        self
    }

    pub fn push(&mut self, page: PageJob) {
        self.pages.push(page);
    }

    pub fn with_page(mut self, page: PageJob) -> Self {
        self.push(page);
        self
    }
}

/// What happened to one requested page
#[derive(Debug)]
pub enum PageOutcome {
    /// Background and drawing rasterized into an image page
    Rasterized,
    /// Source page imported with the drawing on top
    Overlaid,
    /// Source page imported without a drawing
    ImportedOnly,
    /// Page left out of the output
    Failed(CompositeError),
}

impl PageOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PageOutcome::Failed(_))
    }
}

/// Per-page outcomes of [`crate::PageCompositor::compose_pdf`], in job order
#[derive(Debug, Default)]
pub struct CompositeReport {
    pub pages: Vec<PageOutcome>,
}

impl CompositeReport {
    /// Pages that made it into the document
    pub fn written(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_failure()).count()
    }

    /// Failed pages as (1-based job index, error)
    pub fn failures(&self) -> impl Iterator<Item = (usize, &CompositeError)> {
        self.pages.iter().enumerate().filter_map(|(i, outcome)| match outcome {
            PageOutcome::Failed(err) => Some((i + 1, err)),
            _ => None,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.pages.iter().all(|p| !p.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let report = CompositeReport {
            pages: vec![
                PageOutcome::Rasterized,
                PageOutcome::Failed(CompositeError::MissingSourcePdf { page: 2 }),
                PageOutcome::ImportedOnly,
            ],
        };

        assert_eq!(report.written(), 2);
        assert!(!report.is_complete());
        let failures: Vec<_> = report.failures().map(|(index, _)| index).collect();
        assert_eq!(failures, vec![2]);
    }

    #[test]
    fn test_job_builders() {
        let job = DocumentJob::new()
            .with_page(PageJob::raster(Drawing::new(), PageParams::default()))
            .with_page(PageJob::overlay(3, None, PageParams::default()));

        assert!(job.source_pdf.is_none());
        assert_eq!(job.pages[0].source_page, None);
        assert_eq!(job.pages[1].source_page, Some(3));
        assert!(job.pages[1].drawing.is_none());
    }
}
