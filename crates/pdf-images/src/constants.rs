//! Shared constants for image-to-PDF conversion
//!
//! This module centralizes the limits and magic numbers used by the
//! validator, the layout math and the PDF backend.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Layout
// =============================================================================

/// Blank border kept around every image (millimeters, all four sides)
pub const PAGE_MARGIN_MM: f32 = 10.0;

// =============================================================================
// Validation
// =============================================================================

/// Largest accepted input file (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME type of PNG images, the only type accepted by default
pub const MIME_PNG: &str = "image/png";

/// MIME type reported for files whose extension is not recognised
pub const MIME_UNKNOWN: &str = "application/octet-stream";

// =============================================================================
// Output
// =============================================================================

/// File name prefix used when the settings don't provide one
pub const DEFAULT_FILE_PREFIX: &str = "images";

/// `strftime` pattern for the timestamp embedded in output file names.
/// ISO-8601 with ':' replaced by '-' so the name is valid on every platform.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// PDF version written by the lopdf backend
pub const PDF_VERSION: &str = "1.5";
