use std::path::PathBuf;

mod worker;

pub use worker::worker_task;

// Re-export types from library crates
pub use pdf_images::{ConversionSettings, ValidationRules, ValidationWarning};

/// Commands sent from a front end to the worker
#[derive(Debug)]
pub enum ConvertCommand {
    /// Check files without converting them
    Validate {
        paths: Vec<PathBuf>,
        rules: ValidationRules,
    },
    /// Validate, convert and write the PDF into `output_dir`
    Convert {
        paths: Vec<PathBuf>,
        settings: ConversionSettings,
        rules: ValidationRules,
        output_dir: PathBuf,
    },
}

/// Updates sent from the worker to the front end
#[derive(Debug, Clone)]
pub enum ConvertUpdate {
    Validated {
        accepted: Vec<AcceptedFile>,
        warnings: Vec<ValidationWarning>,
    },
    Progress {
        percent: u8,
    },
    Complete {
        path: PathBuf,
        page_count: usize,
    },
    Error {
        message: String,
    },
}

/// Summary of a file that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    pub name: String,
    pub size_bytes: u64,
}
