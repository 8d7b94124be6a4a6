use crate::backend::LopdfBackend;
use crate::convert::{ConversionResult, Converter};
use crate::options::ConversionSettings;
use crate::types::*;
use crate::validate::{ValidationRules, ValidationWarning, validate_files};

/// What [`FileSelection::add`] did with a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub warnings: Vec<ValidationWarning>,
}

/// An ordered list of files queued for conversion, owned by the caller
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    files: Vec<ImageFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `files` and append the accepted ones.
    ///
    /// Fails with [`ConvertError::NoValidFiles`] when the whole batch is
    /// rejected; the selection is left unchanged in that case.
    pub fn add(&mut self, files: &[ImageFile], rules: &ValidationRules) -> Result<AddOutcome> {
        let validation = validate_files(files, rules);
        if validation.is_empty() {
            return Err(ConvertError::NoValidFiles);
        }

        let added = validation.accepted.len();
        self.files.extend(validation.accepted);
        log::info!("Added {} file(s), {} selected", added, self.files.len());

        Ok(AddOutcome {
            added,
            warnings: validation.warnings,
        })
    }

    pub fn remove(&mut self, index: usize) -> Option<ImageFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// Convert the current selection, which must not be empty.
    /// The selection itself is not consumed.
    pub async fn convert<F>(
        &self,
        settings: &ConversionSettings,
        on_progress: F,
    ) -> Result<ConversionResult>
    where
        F: FnMut(u8),
    {
        Converter::new(LopdfBackend)
            .convert(&self.files, settings, on_progress)
            .await
    }
}
