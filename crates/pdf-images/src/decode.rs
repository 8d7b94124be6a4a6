//! Image decoding into raw samples the PDF backend can embed

use crate::types::*;
use image::{DynamicImage, GenericImageView};

/// 8-bit RGB pixels plus an optional separate alpha plane
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row-major
    pub rgb: Vec<u8>,
    /// `width * height` bytes when the source has transparency
    pub alpha: Option<Vec<u8>>,
}

impl DecodedImage {
    fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height) = img.dimensions();

        if img.color().has_alpha() {
            let rgba = img.into_rgba8();
            let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
            let mut alpha = Vec::with_capacity(rgba.len() / 4);
            for px in rgba.pixels() {
                rgb.extend_from_slice(&px.0[..3]);
                alpha.push(px.0[3]);
            }
            // Fully opaque images don't need a soft mask
            let alpha = if alpha.iter().all(|&a| a == u8::MAX) {
                None
            } else {
                Some(alpha)
            };
            Self {
                width,
                height,
                rgb,
                alpha,
            }
        } else {
            Self {
                width,
                height,
                rgb: img.into_rgb8().into_raw(),
                alpha: None,
            }
        }
    }
}

/// Read and decode one file. Decoding runs on the blocking pool.
pub async fn load_image(file: &ImageFile) -> Result<DecodedImage> {
    let bytes = file.read().await?;
    let name = file.name.clone();
    let hint = file.kind();
    tokio::task::spawn_blocking(move || decode_image(&name, &bytes, hint)).await?
}

/// Decode `bytes`, sniffing the format from content first and falling back
/// to `hint` (usually derived from the declared MIME type).
pub fn decode_image(name: &str, bytes: &[u8], hint: Option<ImageKind>) -> Result<DecodedImage> {
    let decode_error = |reason: String| ConvertError::Decode {
        name: name.to_string(),
        reason,
    };

    let format = image::guess_format(bytes)
        .ok()
        .or_else(|| hint.map(ImageKind::image_format))
        .ok_or_else(|| decode_error("unrecognised image format".to_string()))?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| decode_error(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(decode_error("image has zero width or height".to_string()));
    }

    Ok(DecodedImage::from_dynamic(img))
}
