mod document;
mod geometry;
mod stamp;

pub use document::{watermark_document, watermark_document_with_progress};
pub use geometry::{TilePosition, plan_tiles};
pub use stamp::WatermarkStamp;
