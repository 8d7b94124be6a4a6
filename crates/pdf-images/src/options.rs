use crate::constants::DEFAULT_FILE_PREFIX;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for a single conversion run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ConversionSettings {
    pub orientation: Orientation,
    pub paper_size: PaperSize,
    pub quality: Quality,

    /// Leading part of the generated file name
    pub file_prefix: String,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            paper_size: PaperSize::A4,
            quality: Quality::Medium,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl ConversionSettings {
    /// Load settings from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings = serde_json::from_slice(&bytes)
            .map_err(|e| ConvertError::Config(format!("Failed to parse settings: {}", e)))?;
        Ok(settings)
    }

    /// Save settings to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::Config(format!("Failed to serialize settings: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.trim().is_empty() {
            return Err(ConvertError::Config(
                "File name prefix must not be empty".to_string(),
            ));
        }

        if self
            .file_prefix
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
        {
            return Err(ConvertError::Config(format!(
                "File name prefix '{}' contains characters not allowed in file names",
                self.file_prefix
            )));
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    // Paper sizes are stored by key; unknown keys load as A4 instead of failing
    impl Serialize for PaperSize {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.key())
        }
    }

    impl<'de> Deserialize<'de> for PaperSize {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Ok(PaperSize::from_key(&s))
        }
    }
}
