//! Raster engine
//!
//! Paints a [`Drawing`] onto a [`Canvas`] with the painter's algorithm:
//! background template first, then every layer bottom to top and every
//! stroke in order. A page render moves through
//! `Init -> BackgroundPainted -> LayersPainted -> Done`; all assets are
//! resolved during `Init`, so a failed render leaves the canvas untouched.

mod background;
mod stroke;

use std::sync::Arc;

use image::RgbaImage;
use inkpage_config::{CANVAS_HEIGHT, CANVAS_WIDTH, PageParams, Palette, RenderConfig, Rgb};
use inkpage_drawing::{BrushColor, Drawing, Stroke};
use tracing::{debug, warn};

use crate::assets::{AssetCache, AssetSource, BuiltinAssets, DirectoryAssets, LayeredAssets};
use crate::brush::{Brush, BrushFamily, BrushKind};
use crate::error::RenderError;
use crate::surface::Canvas;

pub use background::{paint_template, template_angle};
pub use stroke::paint_stroke;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderState {
    Init,
    BackgroundPainted,
    LayersPainted,
    Done,
}

impl RenderState {
    fn advance(self) -> Self {
        let next = match self {
            RenderState::Init => RenderState::BackgroundPainted,
            RenderState::BackgroundPainted => RenderState::LayersPainted,
            RenderState::LayersPainted | RenderState::Done => RenderState::Done,
        };
        debug!("RasterEngine: {:?} -> {:?}", self, next);
        next
    }
}

/// A stroke with its brush resolved, ready to paint
struct PlannedStroke<'a> {
    stroke: &'a Stroke,
    brush: Brush,
}

/// Everything a page render needs, resolved before the first pixel is written
struct RenderPlan<'a> {
    template: Option<Arc<RgbaImage>>,
    strokes: Vec<PlannedStroke<'a>>,
    skipped_erasers: usize,
}

/// Rasterizes drawings. Owns the asset cache; shareable across threads for
/// page-level parallel rendering.
#[derive(Debug)]
pub struct RasterEngine {
    assets: AssetCache,
    palette: Palette,
    highlighter_opacity: f32,
}

impl RasterEngine {
    pub fn new(source: impl AssetSource + 'static, config: &RenderConfig) -> Self {
        Self {
            assets: AssetCache::new(source),
            palette: config.palette,
            highlighter_opacity: config.highlighter_opacity(),
        }
    }

    /// Engine reading assets from `config.asset_dir` when set, with the
    /// built-in stamps and blank template as fallback
    pub fn from_config(config: &RenderConfig) -> Self {
        match &config.asset_dir {
            Some(dir) => {
                debug!("RasterEngine: assets from {}", dir.display());
                Self::new(
                    LayeredAssets::new(DirectoryAssets::new(dir), BuiltinAssets),
                    config,
                )
            }
            None => Self::new(BuiltinAssets, config),
        }
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// A transparent page-sized canvas
    pub fn new_canvas() -> Canvas {
        Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Render onto a fresh transparent canvas
    pub fn render(&self, drawing: &Drawing, page: &PageParams) -> Result<Canvas, RenderError> {
        let mut canvas = Self::new_canvas();
        self.render_page(&mut canvas, drawing, page)?;
        Ok(canvas)
    }

    /// Validate the drawing, then render it
    pub fn render_checked(
        &self,
        drawing: &Drawing,
        page: &PageParams,
    ) -> Result<Canvas, RenderError> {
        drawing.validate()?;
        self.render(drawing, page)
    }

    /// Paint the page background and every non-eraser stroke onto `canvas`.
    ///
    /// Fails only when an asset is missing or cannot be decoded, in which case
    /// nothing has been painted yet.
    pub fn render_page(
        &self,
        canvas: &mut Canvas,
        drawing: &Drawing,
        page: &PageParams,
    ) -> Result<(), RenderError> {
        let mut state = RenderState::Init;
        let plan = self.plan(drawing, page)?;

        if let Some(template) = &plan.template {
            paint_template(canvas, template, page.orientation);
        }
        state = state.advance();

        let mut stamps = 0;
        for planned in &plan.strokes {
            stamps += paint_stroke(
                canvas,
                &planned.brush,
                planned.stroke,
                self.highlighter_opacity,
            );
        }
        state = state.advance();

        debug!(
            "RasterEngine::render_page: {} strokes, {} erasers skipped, {} stamps",
            plan.strokes.len(),
            plan.skipped_erasers,
            stamps
        );
        state = state.advance();
        debug_assert_eq!(state, RenderState::Done);
        Ok(())
    }

    fn plan<'a>(
        &self,
        drawing: &'a Drawing,
        page: &PageParams,
    ) -> Result<RenderPlan<'a>, RenderError> {
        let template = page
            .template
            .as_deref()
            .map(|name| self.assets.template(name))
            .transpose()?;

        let mut strokes = Vec::with_capacity(drawing.stroke_count());
        let mut skipped_erasers = 0;
        for (layer_index, layer) in drawing.layers.iter().enumerate() {
            for (stroke_index, stroke) in layer.strokes.iter().enumerate() {
                let kind = BrushKind::resolve(stroke.brush_type);
                let Some(family) = kind.family() else {
                    skipped_erasers += 1;
                    continue;
                };
                if let BrushKind::Unsupported(brush_type) = kind {
                    warn!(
                        "UnsupportedBrush: {:?} (layer {}, stroke {}), drawing with base pen",
                        brush_type, layer_index, stroke_index
                    );
                }

                debug!(
                    "RasterEngine: stroke {}/{} {} with {} dots",
                    layer_index,
                    stroke_index,
                    family.name(),
                    stroke.dots.len()
                );
                let mask = self.assets.mask(family.asset_name())?;
                let color = self.color_for(family, stroke.brush_color);
                strokes.push(PlannedStroke {
                    stroke,
                    brush: Brush::new(family, mask, color),
                });
            }
        }

        Ok(RenderPlan {
            template,
            strokes,
            skipped_erasers,
        })
    }

    fn color_for(&self, family: BrushFamily, color: BrushColor) -> [f32; 4] {
        let rgb: Rgb = match (family, color) {
            (BrushFamily::Highlighter, _) => self.palette.highlighter,
            (_, BrushColor::Black) => self.palette.black,
            (_, BrushColor::Gray) => self.palette.gray,
            (_, BrushColor::White) => self.palette.white,
            (_, BrushColor::Unknown(raw)) => {
                warn!("Unknown brush color {}, using black", raw);
                self.palette.black
            }
        };
        rgb.to_rgba_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetCategory, MemoryAssets};
    use image::{DynamicImage, GrayImage, Luma};
    use inkpage_config::Orientation;
    use inkpage_drawing::{BrushSize, BrushType, Dot};

    fn stroke(brush_type: BrushType, dots: &[(f32, f32)]) -> Stroke {
        Stroke::new(brush_type, BrushColor::Black, BrushSize::Medium)
            .with_dots(dots.iter().map(|&(x, y)| Dot::at(x, y)).collect())
    }

    fn engine() -> RasterEngine {
        RasterEngine::from_config(&RenderConfig::default())
    }

    #[test]
    fn test_state_machine_order() {
        let state = RenderState::Init.advance();
        assert_eq!(state, RenderState::BackgroundPainted);
        assert_eq!(state.advance().advance(), RenderState::Done);
        assert_eq!(RenderState::Done.advance(), RenderState::Done);
    }

    #[test]
    fn test_empty_drawing_leaves_canvas_transparent() {
        let canvas = engine()
            .render(&Drawing::new(), &PageParams::default())
            .unwrap();
        assert_eq!((canvas.width, canvas.height), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert!(canvas.is_transparent());
    }

    #[test]
    fn test_missing_template_leaves_canvas_untouched() {
        let mut drawing = Drawing::new();
        drawing.append_stroke(stroke(BrushType::BallpointV5, &[(10.0, 10.0), (20.0, 20.0)]));
        let page = PageParams::new(Orientation::Portrait, Some("Lined".into()));

        let mut canvas = RasterEngine::new_canvas();
        let result = engine().render_page(&mut canvas, &drawing, &page);

        assert!(matches!(result, Err(RenderError::MissingAsset { .. })));
        assert!(canvas.is_transparent());
    }

    #[test]
    fn test_missing_mask_is_fatal() {
        let source = MemoryAssets::new().with(
            AssetCategory::Brushes,
            "ballpoint",
            DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([255]))),
        );
        let engine = RasterEngine::new(source, &RenderConfig::default());

        let mut drawing = Drawing::new();
        drawing.append_stroke(stroke(BrushType::BallpointV5, &[(10.0, 10.0), (20.0, 20.0)]));
        assert!(engine.render(&drawing, &PageParams::default()).is_ok());

        drawing.append_stroke(stroke(BrushType::MarkerV5, &[(10.0, 10.0), (20.0, 20.0)]));
        assert!(matches!(
            engine.render(&drawing, &PageParams::default()),
            Err(RenderError::MissingAsset {
                category: AssetCategory::Brushes,
                ..
            })
        ));
    }

    #[test]
    fn test_unsupported_brush_falls_back_to_base_pen() {
        let mut drawing = Drawing::new();
        drawing.append_stroke(stroke(BrushType::Unknown(42), &[(50.0, 50.0), (80.0, 50.0)]));

        let canvas = engine().render(&drawing, &PageParams::default()).unwrap();
        assert!(canvas.get_pixel(60, 50).unwrap()[3] > 0.0);
    }

    #[test]
    fn test_render_checked_rejects_invalid_drawing() {
        let mut drawing = Drawing::new();
        drawing.append_stroke(stroke(BrushType::BallpointV5, &[(1500.0, 10.0)]));
        assert!(matches!(
            engine().render_checked(&drawing, &PageParams::default()),
            Err(RenderError::Validation(_))
        ));
    }

    #[test]
    fn test_palette_colors() {
        let engine = engine();
        let black = engine.color_for(BrushFamily::Ballpoint, BrushColor::Black);
        assert_eq!(black, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            engine.color_for(BrushFamily::Pencil, BrushColor::Unknown(9)),
            black
        );
        assert_eq!(
            engine.color_for(BrushFamily::Highlighter, BrushColor::Black),
            engine.palette().highlighter.to_rgba_f32()
        );
    }
}
