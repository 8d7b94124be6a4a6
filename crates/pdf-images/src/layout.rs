//! Page geometry and image placement
//!
//! All values are millimeters with the origin at the top-left corner of
//! the page. Backends convert to their own coordinate system.

use crate::constants::PAGE_MARGIN_MM;
use crate::types::{Orientation, PaperSize};

/// Physical page size for a whole document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageGeometry {
    /// Resolve the page size from the lookup table and orientation
    pub fn resolve(paper_size: PaperSize, orientation: Orientation) -> Self {
        let (width_mm, height_mm) = paper_size.dimensions_with_orientation(orientation);
        Self {
            width_mm,
            height_mm,
            margin_mm: PAGE_MARGIN_MM,
        }
    }

    pub fn available_width(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn available_height(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }

    /// Aspect ratio of the area inside the margins
    pub fn available_ratio(&self) -> f32 {
        self.available_width() / self.available_height()
    }
}

/// Where an image lands on its page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlacementRect {
    /// Distance from the bottom page edge to the bottom of the rect
    pub fn bottom_offset(&self, page_height: f32) -> f32 {
        page_height - self.y - self.height
    }
}

/// Scale an image of `pixel_width` × `pixel_height` to fit inside the
/// page margins and center it.
///
/// Aspect ratio is preserved exactly; the bound axis touches the margin.
/// Callers must pass non-zero dimensions.
pub fn fit_image(geometry: &PageGeometry, pixel_width: u32, pixel_height: u32) -> PlacementRect {
    let available_width = geometry.available_width();
    let available_height = geometry.available_height();

    let img_ratio = pixel_width as f32 / pixel_height as f32;

    let (width, height) = if img_ratio > geometry.available_ratio() {
        // Wider than the page: bound by width
        (available_width, available_width / img_ratio)
    } else {
        (available_height * img_ratio, available_height)
    };

    PlacementRect {
        x: (geometry.width_mm - width) / 2.0,
        y: (geometry.height_mm - height) / 2.0,
        width,
        height,
    }
}
