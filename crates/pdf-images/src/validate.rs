//! Input filtering by declared type and size

use crate::constants::{MAX_FILE_SIZE, MIME_PNG};
use crate::types::{ConvertError, ImageFile};
use std::fmt;

/// Which files a batch accepts
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRules {
    /// Accepted MIME types, compared exactly
    pub accepted_types: Vec<String>,
    /// Largest accepted file in bytes (inclusive)
    pub max_file_size: u64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            accepted_types: vec![MIME_PNG.to_string()],
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl ValidationRules {
    pub fn accepts_type(&self, mime_type: &str) -> bool {
        self.accepted_types.iter().any(|t| t == mime_type)
    }

    /// First reason `file` is rejected, if any. Type is checked before size.
    pub fn check(&self, file: &ImageFile) -> Option<RejectReason> {
        if !self.accepts_type(&file.mime_type) {
            Some(RejectReason::UnsupportedType)
        } else if file.size_bytes > self.max_file_size {
            Some(RejectReason::TooLarge)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType,
    TooLarge,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::UnsupportedType => "unsupported-type",
            RejectReason::TooLarge => "too-large",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file dropped by validation. Not fatal to the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub file_name: String,
    pub reason: RejectReason,
}

impl ValidationWarning {
    fn new(file: &ImageFile, reason: RejectReason) -> Self {
        Self {
            file_name: file.name.clone(),
            reason,
        }
    }

    /// Describe the rejection as an error value, with the offending details
    pub fn to_error(&self, file: &ImageFile, rules: &ValidationRules) -> ConvertError {
        match self.reason {
            RejectReason::UnsupportedType => ConvertError::UnsupportedType {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            },
            RejectReason::TooLarge => ConvertError::FileTooLarge {
                name: file.name.clone(),
                size_bytes: file.size_bytes,
                limit: rules.max_file_size,
            },
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped ({})", self.file_name, self.reason)
    }
}

/// Outcome of [`validate_files`]
#[derive(Debug, Clone, Default)]
pub struct Validation {
    /// Accepted files, in input order
    pub accepted: Vec<ImageFile>,
    pub warnings: Vec<ValidationWarning>,
}

impl Validation {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Keep the files `rules` accept, preserving order, and record why the
/// others were dropped.
pub fn validate_files(files: &[ImageFile], rules: &ValidationRules) -> Validation {
    let mut validation = Validation::default();

    for file in files {
        match rules.check(file) {
            None => validation.accepted.push(file.clone()),
            Some(reason) => {
                let warning = ValidationWarning::new(file, reason);
                log::warn!("{}", warning.to_error(file, rules));
                validation.warnings.push(warning);
            }
        }
    }

    validation
}
