use crate::constants::{MIME_PNG, MIME_UNKNOWN};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{name}: unsupported file type {mime_type}")]
    UnsupportedType { name: String, mime_type: String },
    #[error("{name}: file is too large ({size_bytes} bytes, limit {limit} bytes)")]
    FileTooLarge {
        name: String,
        size_bytes: u64,
        limit: u64,
    },
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("PDF encoding error: {0}")]
    Encoding(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No files to convert")]
    NoFiles,
    #[error("No valid image files selected")]
    NoValidFiles,
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Supported output page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// Every size in the lookup table
    pub const ALL: [PaperSize; 3] = [PaperSize::A4, PaperSize::Letter, PaperSize::Legal];

    /// Base dimensions in millimeters (portrait)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (216.0, 279.0),
            PaperSize::Legal => (216.0, 356.0),
        }
    }

    /// Dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Lowercase key used in settings files
    pub fn key(self) -> &'static str {
        match self {
            PaperSize::A4 => "a4",
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
        }
    }

    /// Look up a size by key. Unknown keys fall back to A4.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "letter" => PaperSize::Letter,
            "legal" => PaperSize::Legal,
            "a4" => PaperSize::A4,
            other => {
                log::debug!("Unknown paper size '{}', using a4", other);
                PaperSize::A4
            }
        }
    }
}

/// Output quality, traded against encoding speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    pub fn compression(self) -> CompressionLevel {
        match self {
            Quality::Low => CompressionLevel::Fast,
            Quality::Medium => CompressionLevel::Balanced,
            Quality::High => CompressionLevel::Best,
        }
    }
}

/// Compression effort handed to the document backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    Fast,
    Balanced,
    Best,
}

/// Image container formats recognised by declared MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Webp,
    Bmp,
    Gif,
}

impl ImageKind {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type {
            "image/png" => Some(ImageKind::Png),
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/webp" => Some(ImageKind::Webp),
            "image/bmp" => Some(ImageKind::Bmp),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "webp" => Some(ImageKind::Webp),
            "bmp" => Some(ImageKind::Bmp),
            "gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => MIME_PNG,
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Webp => "image/webp",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Gif => "image/gif",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            ImageKind::Png => image::ImageFormat::Png,
            ImageKind::Jpeg => image::ImageFormat::Jpeg,
            ImageKind::Webp => image::ImageFormat::WebP,
            ImageKind::Bmp => image::ImageFormat::Bmp,
            ImageKind::Gif => image::ImageFormat::Gif,
        }
    }
}

/// Where the bytes of an [`ImageFile`] live
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A candidate input image.
///
/// Holds only metadata plus a handle to the data; the bytes are read when
/// the converter reaches this file.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub source: ImageSource,
}

impl ImageFile {
    /// Describe a file on disk. The MIME type comes from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let metadata = tokio::fs::metadata(&path).await.map_err(|source| ConvertError::Read {
            name: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageKind::from_extension)
            .map(ImageKind::mime_type)
            .unwrap_or(MIME_UNKNOWN)
            .to_string();

        Ok(Self {
            name,
            size_bytes: metadata.len(),
            mime_type,
            source: ImageSource::Path(path),
        })
    }

    /// Wrap in-memory bytes with an explicit MIME type
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: ImageSource::Memory(bytes),
        }
    }

    pub fn kind(&self) -> Option<ImageKind> {
        ImageKind::from_mime(&self.mime_type)
    }

    /// Read the full contents of the file
    pub async fn read(&self) -> Result<Arc<[u8]>> {
        match &self.source {
            ImageSource::Memory(bytes) => Ok(bytes.clone()),
            ImageSource::Path(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|source| ConvertError::Read {
                    name: self.name.clone(),
                    source,
                })?;
                Ok(bytes.into())
            }
        }
    }
}

/// Load metadata for several files, in order
pub async fn load_images(paths: &[impl AsRef<Path>]) -> Result<Vec<ImageFile>> {
    let mut files = Vec::new();
    for path in paths {
        files.push(ImageFile::from_path(path).await?);
    }
    Ok(files)
}
