//! Document building
//!
//! The converter only talks to [`DocumentBackend`]; how pages and images
//! are encoded is up to the implementation. [`LopdfBackend`] writes real
//! PDF files.

mod pdf;

pub use pdf::{LopdfBackend, PdfBuild};

use crate::decode::DecodedImage;
use crate::layout::{PageGeometry, PlacementRect};
use crate::types::{CompressionLevel, Result};

/// Builds one document page by page.
///
/// A freshly created document already has its first page. Images are
/// drawn on the most recently added page.
pub trait DocumentBackend {
    type Document;

    /// Start a document whose pages all have `geometry`'s size
    fn create_document(&self, geometry: &PageGeometry) -> Result<Self::Document>;

    fn add_page(&self, doc: &mut Self::Document) -> Result<()>;

    fn add_image(
        &self,
        doc: &mut Self::Document,
        image: &DecodedImage,
        rect: &PlacementRect,
        compression: CompressionLevel,
    ) -> Result<()>;

    /// Page width in millimeters
    fn page_width(&self, doc: &Self::Document) -> f32;

    /// Page height in millimeters
    fn page_height(&self, doc: &Self::Document) -> f32;

    fn page_count(&self, doc: &Self::Document) -> usize;

    /// Serialize the finished document
    fn finalize(&self, doc: Self::Document, file_name: &str) -> Result<Vec<u8>>;
}
