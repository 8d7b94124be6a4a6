pub mod backend;
pub mod constants;
mod convert;
mod decode;
pub mod layout;
mod options;
mod selection;
mod size;
mod types;
mod validate;

pub use backend::{DocumentBackend, LopdfBackend};
pub use convert::{
    ConversionResult, Converter, convert_files, file_name_at, progress_percent, save_result,
};
pub use decode::{DecodedImage, decode_image, load_image};
pub use layout::{PageGeometry, PlacementRect, fit_image};
pub use options::*;
pub use selection::{AddOutcome, FileSelection};
pub use size::format_file_size;
pub use types::*;
pub use validate::{RejectReason, Validation, ValidationRules, ValidationWarning, validate_files};
