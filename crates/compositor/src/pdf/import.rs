//! Importing pages of a source PDF

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use super::xobject::draw_xobject;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page tree ancestors followed before giving up
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, the default media box
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// XObject name used for the drawing overlay
pub const OVERLAY_NAME: &str = "InkOverlay";

/// A source page copied into a new page object
#[derive(Debug, Clone, Copy)]
pub struct ImportedPage {
    pub id: ObjectId,
    pub media_box: [f32; 4],
}

/// Copy the page object of `source` under `parent`, with every inherited
/// attribute made explicit. The content streams are shared, not copied.
pub fn import_page(
    doc: &mut Document,
    source: ObjectId,
    parent: ObjectId,
) -> lopdf::Result<ImportedPage> {
    let mut page = doc.get_dictionary(source)?.clone();

    for key in INHERITABLE {
        if page.has(key) {
            continue;
        }
        if let Some(value) = inherited(doc, &page, key) {
            page.set(key.to_vec(), value);
        }
    }
    page.set("Parent", parent);

    let media_box = page
        .get(b"MediaBox")
        .ok()
        .and_then(|value| rectangle(doc, value))
        .unwrap_or(DEFAULT_MEDIA_BOX);

    let id = doc.add_object(page);
    Ok(ImportedPage { id, media_box })
}

/// Draw image XObject `image` over an imported page. The page's own content
/// is wrapped in `q`/`Q` so its graphics state cannot leak into the overlay.
pub fn add_overlay(
    doc: &mut Document,
    page: &ImportedPage,
    image: ObjectId,
    rect: (f32, f32, f32, f32),
) -> lopdf::Result<()> {
    let mut dict = doc.get_dictionary(page.id)?.clone();

    let mut resources = resolve_dictionary(doc, dict.get(b"Resources").ok())?;
    let mut xobjects = resolve_dictionary(doc, resources.get(b"XObject").ok())?;
    let name = unused_name(&xobjects, OVERLAY_NAME);
    xobjects.set(name.clone(), image);
    resources.set("XObject", xobjects);
    dict.set("Resources", resources);

    let (x, y, width, height) = rect;
    let overlay: Content<Vec<Operation>> = Content {
        operations: std::iter::once(Operation::new("Q", vec![]))
            .chain(draw_xobject(&name, x, y, width, height))
            .collect(),
    };
    let open = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let close = doc.add_object(Stream::new(dictionary! {}, overlay.encode()?));

    let mut contents = vec![Object::Reference(open)];
    contents.extend(content_refs(doc, dict.get(b"Contents").ok()));
    contents.push(Object::Reference(close));
    dict.set("Contents", contents);

    doc.objects.insert(page.id, Object::Dictionary(dict));
    Ok(())
}

fn inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn rectangle(doc: &Document, value: &Object) -> Option<[f32; 4]> {
    let value = match value {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let items = value.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = item.as_float().ok()?;
    }
    // Normalize so (0, 1) is the lower-left corner
    Some([
        rect[0].min(rect[2]),
        rect[1].min(rect[3]),
        rect[0].max(rect[2]),
        rect[1].max(rect[3]),
    ])
}

/// A direct copy of a dictionary that may be stored by reference
fn resolve_dictionary(doc: &Document, value: Option<&Object>) -> lopdf::Result<Dictionary> {
    match value {
        None => Ok(Dictionary::new()),
        Some(Object::Reference(id)) => Ok(doc.get_dictionary(*id)?.clone()),
        Some(other) => Ok(other.as_dict()?.clone()),
    }
}

/// Content stream references of a page, in order
fn content_refs(doc: &Document, contents: Option<&Object>) -> Vec<Object> {
    match contents {
        None => Vec::new(),
        Some(Object::Array(items)) => items.clone(),
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Some(other) => vec![other.clone()],
    }
}

fn unused_name(dict: &Dictionary, base: &str) -> String {
    let mut name = base.to_string();
    let mut suffix = 1;
    while dict.has(name.as_bytes()) {
        name = format!("{base}{suffix}");
        suffix += 1;
    }
    name
}

/// Rectangle in page space the canvas covers.
///
/// The tablet shows a PDF page fitted inside its screen, centered
/// horizontally and aligned to the top, and ink is recorded in screen
/// coordinates. Mapping the canvas back the same way keeps every stroke over
/// the page content it was written on. The rectangle always covers the whole
/// media box; where the aspect ratios differ it extends past the page and the
/// media box clips the margin ink, as on the device.
pub fn overlay_rect(
    media_box: [f32; 4],
    canvas_width: u32,
    canvas_height: u32,
) -> (f32, f32, f32, f32) {
    let [llx, lly, urx, ury] = media_box;
    let page_width = (urx - llx).max(f32::EPSILON);
    let page_height = (ury - lly).max(f32::EPSILON);

    let scale = (canvas_width as f32 / page_width).min(canvas_height as f32 / page_height);
    let width = canvas_width as f32 / scale;
    let height = canvas_height as f32 / scale;
    (llx - (width - page_width) / 2.0, ury - height, width, height)
}
