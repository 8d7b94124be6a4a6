//! Batch conversion: one image per page
//!
//! Images are processed strictly in order. Each one is read, decoded,
//! placed and reported before the next is touched, so at most one decoded
//! image is alive at a time and progress values come out monotonic.

use crate::backend::{DocumentBackend, LopdfBackend};
use crate::constants::FILE_TIMESTAMP_FORMAT;
use crate::decode::load_image;
use crate::layout::{PageGeometry, fit_image};
use crate::options::ConversionSettings;
use crate::types::*;
use crate::validate::{ValidationRules, validate_files};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// A finished document, ready to be written out
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub file_name: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

/// Lays images onto pages through a [`DocumentBackend`].
///
/// Holds no state between runs; one converter can serve any number of
/// independent conversions.
#[derive(Debug, Clone, Default)]
pub struct Converter<B> {
    backend: B,
}

impl<B: DocumentBackend> Converter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Convert `images` into a single document.
    ///
    /// `on_progress` receives a percentage once per image, after the image
    /// is on its page; the last call is always 100. Any failure aborts the
    /// run before the document is finalized.
    pub async fn convert<F>(
        &self,
        images: &[ImageFile],
        settings: &ConversionSettings,
        mut on_progress: F,
    ) -> Result<ConversionResult>
    where
        F: FnMut(u8),
    {
        if images.is_empty() {
            return Err(ConvertError::NoFiles);
        }
        settings.validate()?;

        let requested = PageGeometry::resolve(settings.paper_size, settings.orientation);
        let compression = settings.quality.compression();
        let mut doc = self.backend.create_document(&requested)?;
        let total = images.len();

        // Lay out against the page size the backend actually produced
        let geometry = PageGeometry {
            width_mm: self.backend.page_width(&doc),
            height_mm: self.backend.page_height(&doc),
            ..requested
        };

        for (index, file) in images.iter().enumerate() {
            let image = load_image(file).await?;

            if index > 0 {
                self.backend.add_page(&mut doc)?;
            }

            let rect = fit_image(&geometry, image.width, image.height);
            self.backend.add_image(&mut doc, &image, &rect, compression)?;
            log::debug!(
                "Placed {} ({}x{} px) at {:.1},{:.1} size {:.1}x{:.1} mm",
                file.name,
                image.width,
                image.height,
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );

            on_progress(progress_percent(index + 1, total));
        }

        let file_name = file_name_at(&settings.file_prefix, Utc::now());
        let page_count = self.backend.page_count(&doc);
        let bytes = self.backend.finalize(doc, &file_name)?;
        log::info!("Converted {} image(s) into {}", page_count, file_name);

        Ok(ConversionResult {
            file_name,
            page_count,
            bytes,
        })
    }
}

/// Validate `files` and convert what survives with the lopdf backend.
///
/// Rejected files are logged and skipped. Fails with
/// [`ConvertError::NoValidFiles`] when nothing is left.
pub async fn convert_files<F>(
    files: &[ImageFile],
    settings: &ConversionSettings,
    rules: &ValidationRules,
    on_progress: F,
) -> Result<ConversionResult>
where
    F: FnMut(u8),
{
    if files.is_empty() {
        return Err(ConvertError::NoFiles);
    }

    let validation = validate_files(files, rules);
    if validation.is_empty() {
        return Err(ConvertError::NoValidFiles);
    }

    Converter::new(LopdfBackend)
        .convert(&validation.accepted, settings, on_progress)
        .await
}

/// Write the document into `dir` under its generated name
pub async fn save_result(result: &ConversionResult, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(&result.file_name);
    tokio::fs::write(&path, &result.bytes).await?;
    Ok(path)
}

/// `<prefix>_<timestamp>.pdf`, timestamp as ISO-8601 with ':' → '-'
pub fn file_name_at(prefix: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}_{}.pdf", prefix, timestamp.format(FILE_TIMESTAMP_FORMAT))
}

/// Percentage after `done` of `total` images. Rounds up, so the first image
/// never reports 0, and holds at 99 until the last one.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if done >= total {
        return 100;
    }
    (done * 100).div_ceil(total).min(99) as u8
}
