//! Document-level watermark assembly.
//!
//! Loads a PDF from bytes, stamps the tile pattern onto every page, and
//! serializes the result. The operation is all-or-nothing: any page failure
//! aborts the run and no partially stamped output is produced.

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::logo::WatermarkImage;
use super::geometry::plan_tiles;
use super::stamp::WatermarkStamp;

/// Watermark every page of a PDF document.
///
/// Returns the serialized output bytes. Page count and order are preserved;
/// only the watermark objects and per-page content are added.
pub fn watermark_document(
    pdf_bytes: &[u8],
    image: &WatermarkImage,
    config: &WatermarkConfig,
) -> Result<Vec<u8>> {
    watermark_document_with_progress(pdf_bytes, image, config, |_, _| {})
}

/// Watermark every page, reporting `(stamped, total)` after each page.
pub fn watermark_document_with_progress(
    pdf_bytes: &[u8],
    image: &WatermarkImage,
    config: &WatermarkConfig,
    mut progress: impl FnMut(u32, u32),
) -> Result<Vec<u8>> {
    if pdf_bytes.is_empty() {
        return Err(Error::MissingInput("document"));
    }
    config.validate()?;

    let mut doc =
        Document::load_mem(pdf_bytes).map_err(|e| Error::DocumentLoad(e.to_string()))?;

    if doc.is_encrypted() {
        if !config.ignore_encryption {
            return Err(Error::DocumentEncrypted);
        }
        warn!("document declares encryption; proceeding with permissive load");
    }

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(Error::DocumentLoad("document has no pages".to_string()));
    }

    #[allow(clippy::cast_possible_truncation)]
    let total = pages.len() as u32;
    debug!(pages = total, tiles_per_page = config.grid.tile_count(), "stamping document");

    let stamp = WatermarkStamp::embed(&mut doc, image, config);

    for (count, (page_number, page_id)) in pages.into_iter().enumerate() {
        let [x0, y0, x1, y1] = page_media_box(&doc, page_id);
        let positions = plan_tiles(x1 - x0, y1 - y0, &config.grid);

        stamp
            .stamp_page(&mut doc, page_id, &positions)
            .map_err(|e| Error::PageStamp {
                page: page_number,
                reason: e.to_string(),
            })?;

        #[allow(clippy::cast_possible_truncation)]
        progress(count as u32 + 1, total);
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| Error::DocumentSave(e.to_string()))?;

    Ok(output)
}

/// Resolve a page's media box, walking up the page tree for inherited
/// values. Falls back to US Letter when no media box is declared.
fn page_media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    match doc.get_object(page_id) {
        Ok(obj) => media_box_of(doc, obj),
        Err(_) => [0.0, 0.0, 612.0, 792.0],
    }
}

fn media_box_of(doc: &Document, obj: &Object) -> [f32; 4] {
    if let Object::Dictionary(dict) = obj {
        if let Ok(Object::Array(arr)) = dict.get(b"MediaBox")
            && arr.len() == 4
        {
            let values: Vec<f32> = arr
                .iter()
                .filter_map(|o| match o {
                    #[allow(clippy::cast_precision_loss)]
                    Object::Integer(i) => Some(*i as f32),
                    Object::Real(r) => Some(*r),
                    _ => None,
                })
                .collect();

            if values.len() == 4 {
                return [values[0], values[1], values[2], values[3]];
            }
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent")
            && let Ok(parent) = doc.get_object(*parent_id)
        {
            return media_box_of(doc, parent);
        }
    }

    // Default to US Letter size
    [0.0, 0.0, 612.0, 792.0]
}
