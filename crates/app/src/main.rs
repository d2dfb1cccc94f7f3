//! inkpage - render tablet drawings to PNG pages and PDF documents

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use inkpage_compositor::{PageCompositor, PageJob, PdfAssembler};
use inkpage_config::{Orientation, PageParams, RenderConfig};
use inkpage_drawing::Drawing;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "inkpage", about = "Render tablet drawings to PNG and PDF")]
struct Cli {
    /// Render configuration file (TOML)
    #[arg(long, env = "INKPAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render drawings into a PNG page or a PDF document
    Render(RenderArgs),
    /// Decode and validate a drawing
    Inspect {
        drawing: PathBuf,
        /// Print the decoded drawing as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Drawing files, one per page in order
    #[arg(required = true)]
    drawings: Vec<PathBuf>,

    /// Source PDF; drawings are placed over its pages in order
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Background template for rasterized pages
    #[arg(long)]
    template: Option<String>,

    #[arg(long)]
    landscape: bool,

    /// Output file; `.png` renders a single page, `.pdf` a document
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RenderConfig::default(),
    }
    .with_env_overrides();

    match cli.command {
        Command::Render(args) => render(&config, &args),
        Command::Inspect { drawing, json } => inspect(&drawing, json),
    }
}

fn read_drawing(path: &Path) -> Result<Drawing> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Drawing::from_bytes(&bytes).with_context(|| format!("decoding {}", path.display()))
}

fn render(config: &RenderConfig, args: &RenderArgs) -> Result<()> {
    let orientation = if args.landscape {
        Orientation::Landscape
    } else {
        config.page.orientation
    };
    let page = PageParams::new(
        orientation,
        args.template.clone().or_else(|| config.page.template.clone()),
    );

    let drawings = args
        .drawings
        .iter()
        .map(|path| read_drawing(path))
        .collect::<Result<Vec<_>>>()?;
    let compositor = PageCompositor::from_config(config);

    let extension = args
        .output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let bytes = match extension.as_deref() {
        Some("png") => {
            if drawings.len() != 1 || args.pdf.is_some() {
                bail!("PNG output takes exactly one drawing and no source PDF");
            }
            compositor.render_png(&drawings[0], &page)?
        }
        Some("pdf") => {
            let (assembler, pages) = document_pages(drawings, args.pdf.as_deref(), &page)?;
            let (bytes, report) = compositor.compose_into(assembler, &pages)?;
            for (index, err) in report.failures() {
                warn!("Page {} skipped: {}", index, err);
            }
            if report.written() == 0 {
                bail!("no pages could be written");
            }
            bytes
        }
        _ => bail!(
            "unsupported output {}, expected .png or .pdf",
            args.output.display()
        ),
    };

    fs::write(&args.output, &bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("Wrote {} ({} bytes)", args.output.display(), bytes.len());
    Ok(())
}

/// Drawings go over the source pages in order. Source pages past the last
/// drawing are imported as they are; drawings past the last source page
/// become rasterized pages.
fn document_pages(
    drawings: Vec<Drawing>,
    pdf: Option<&Path>,
    page: &PageParams,
) -> Result<(PdfAssembler, Vec<PageJob>)> {
    let Some(pdf) = pdf else {
        let pages = drawings
            .into_iter()
            .map(|drawing| PageJob::raster(drawing, page.clone()))
            .collect();
        return Ok((PdfAssembler::new(), pages));
    };

    let source = fs::read(pdf).with_context(|| format!("reading {}", pdf.display()))?;
    let assembler = PdfAssembler::from_source(&source)
        .with_context(|| format!("loading {}", pdf.display()))?;

    let mut drawings = drawings.into_iter();
    let mut pages: Vec<PageJob> = (1..=assembler.source_page_count() as u32)
        .map(|number| PageJob::overlay(number, drawings.next(), page.clone()))
        .collect();
    pages.extend(drawings.map(|drawing| PageJob::raster(drawing, page.clone())));
    Ok((assembler, pages))
}

fn inspect(path: &Path, json: bool) -> Result<()> {
    let drawing = read_drawing(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&drawing)?);
    } else {
        println!(
            "{}: {:?}, {} layers, {} strokes",
            path.display(),
            drawing.version,
            drawing.layers.len(),
            drawing.stroke_count()
        );
        if let Some((min_x, min_y, max_x, max_y)) = drawing.bounding_box() {
            println!("bounds: ({min_x:.1}, {min_y:.1}) - ({max_x:.1}, {max_y:.1})");
        }
    }

    match drawing.validate() {
        Ok(()) => info!("{} is valid", path.display()),
        Err(err) => bail!("{} is invalid: {}", path.display(), err),
    }
    Ok(())
}
