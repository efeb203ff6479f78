//! Watermark tile stamping.
//!
//! # Embedding Strategy
//!
//! The watermark raster is embedded once per document as an image XObject
//! with a DeviceGray soft mask carrying the alpha channel, plus one
//! ExtGState that sets the blend opacity. Each page then only needs:
//! 1. Resource entries pointing at the shared objects
//! 2. An appended content stream drawing the tile at every planned anchor
//!
//! # Transform
//!
//! Each tile is drawn with a single `cm` matrix combining translation to the
//! anchor, counter-clockwise rotation about it, and scaling from the unit
//! square to the rendered tile size:
//! ```text
//! [ w*cos(t)  w*sin(t)  -h*sin(t)  h*cos(t)  x  y ]
//! ```

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::fmt::Write;

use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::logo::WatermarkImage;
use super::geometry::TilePosition;

/// Resource name for the watermark image XObject.
const XOBJECT_NAME: &str = "AqWm";

/// Resource name for the opacity graphics state.
const GSTATE_NAME: &str = "AqGs";

/// Shared watermark objects embedded in a document, plus the per-tile
/// transform parameters.
///
/// Created once per document, then applied to every page.
pub struct WatermarkStamp {
    image_id: ObjectId,
    gstate_id: ObjectId,
    render_width: f32,
    render_height: f32,
    rotation_degrees: f32,
}

impl WatermarkStamp {
    /// Embed the watermark image, its soft mask, and the opacity graphics
    /// state into the document.
    pub fn embed(doc: &mut Document, image: &WatermarkImage, config: &WatermarkConfig) -> Self {
        let smask_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width()),
                "Height" => i64::from(image.height()),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            image.alpha_samples().to_vec(),
        );
        let smask_id = doc.add_object(smask_stream);

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width()),
                "Height" => i64::from(image.height()),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "SMask" => smask_id,
            },
            image.rgb_samples().to_vec(),
        );
        let image_id = doc.add_object(image_stream);

        let gstate_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => config.opacity,
            "CA" => config.opacity,
        });

        Self {
            image_id,
            gstate_id,
            render_width: config.tile_width,
            render_height: image.scaled_height(config.tile_width),
            rotation_degrees: config.rotation_degrees,
        }
    }

    /// Stamp one page: register the shared resources and append a content
    /// stream drawing a tile at every anchor.
    pub fn stamp_page(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        positions: &[TilePosition],
    ) -> Result<()> {
        self.register_resources(doc, page_id)?;
        let content = self.tile_content(positions);
        append_content_to_page(doc, page_id, &content)
    }

    /// Add the watermark XObject and ExtGState to the page's resource
    /// dictionary, following references where the dictionary is shared.
    fn register_resources(&self, doc: &mut Document, page_id: ObjectId) -> Result<()> {
        let mut resources_obj = {
            let page_dict = doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| Error::DocumentLoad(format!("page has no dictionary: {e}")))?;
            page_dict
                .remove(b"Resources")
                .unwrap_or_else(|| Object::Dictionary(dictionary! {}))
        };

        match &mut resources_obj {
            Object::Reference(id) => {
                let res_dict = doc
                    .get_object_mut(*id)
                    .and_then(Object::as_dict_mut)
                    .map_err(|e| Error::DocumentLoad(format!("invalid resources: {e}")))?;
                self.set_resource_entries(res_dict);
            }
            Object::Dictionary(dict) => {
                self.set_resource_entries(dict);
            }
            _ => {
                return Err(Error::DocumentLoad(
                    "page resources are neither a dictionary nor a reference".to_string(),
                ));
            }
        }

        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| Error::DocumentLoad(format!("page has no dictionary: {e}")))?;
        page_dict.set("Resources", resources_obj);

        Ok(())
    }

    fn set_resource_entries(&self, resources: &mut Dictionary) {
        let xobjects = ensure_subdict(resources, "XObject");
        xobjects.set(XOBJECT_NAME, self.image_id);

        let gstates = ensure_subdict(resources, "ExtGState");
        gstates.set(GSTATE_NAME, self.gstate_id);
    }

    /// Build the content stream fragment drawing one tile per anchor.
    fn tile_content(&self, positions: &[TilePosition]) -> String {
        let theta = self.rotation_degrees.to_radians();
        let (sin, cos) = theta.sin_cos();

        // Translate * rotate * scale, folded into one matrix per tile
        let a = self.render_width * cos;
        let b = self.render_width * sin;
        let c = -self.render_height * sin;
        let d = self.render_height * cos;

        let mut content = String::new();
        for pos in positions {
            let _ = writeln!(
                content,
                "q\n/{GSTATE_NAME} gs\n{a} {b} {c} {d} {x} {y} cm\n/{XOBJECT_NAME} Do\nQ",
                x = pos.x,
                y = pos.y,
            );
        }

        content
    }
}

/// Get or create a direct sub-dictionary entry, replacing any
/// non-dictionary value.
fn ensure_subdict<'a>(resources: &'a mut Dictionary, key: &str) -> &'a mut Dictionary {
    let needs_reset = !matches!(resources.get(key.as_bytes()), Ok(Object::Dictionary(_)));
    if needs_reset {
        resources.set(key, Object::Dictionary(Dictionary::new()));
    }

    match resources.get_mut(key.as_bytes()) {
        Ok(Object::Dictionary(dict)) => dict,
        _ => unreachable!("entry was just set to a dictionary"),
    }
}

/// Append a content stream to a page, preserving existing content.
fn append_content_to_page(doc: &mut Document, page_id: ObjectId, content: &str) -> Result<()> {
    let content_stream = Stream::new(Dictionary::new(), content.as_bytes().to_vec());
    let content_id = doc.add_object(Object::Stream(content_stream));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| Error::DocumentLoad(format!("page has no dictionary: {e}")))?;

    let existing_contents = page.get(b"Contents").ok().cloned();
    match existing_contents {
        Some(Object::Reference(existing_id)) => {
            page.set(
                "Contents",
                Object::Array(vec![
                    Object::Reference(existing_id),
                    Object::Reference(content_id),
                ]),
            );
        }
        Some(Object::Array(mut arr)) => {
            arr.push(Object::Reference(content_id));
            page.set("Contents", Object::Array(arr));
        }
        _ => {
            page.set("Contents", Object::Reference(content_id));
        }
    }

    Ok(())
}
