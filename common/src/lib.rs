//! Vocab Crop Common Library
//!
//! CLIとライブラリ利用者で共有される型とユーティリティ

pub mod types;
pub mod geometry;
pub mod error;
pub mod naming;
pub mod parser;
pub mod prompts;
pub mod export;

pub use types::{CroppedImage, DetectedItem, VocabResult};
pub use geometry::{CropRegion, NormalizedBox, PixelRect, NORMALIZED_SCALE};
pub use error::{Error, Result};
pub use naming::{archive_entry_name, normalize_word, sanitize_file_stem, IMAGE_EXTENSION};
pub use parser::{extract_json, parse_recognition_response, ParsedItems};
pub use prompts::{recognition_response_schema, RECOGNITION_PROMPT};

#[cfg(feature = "excel")]
pub use export::excel_core::{generate_excel_buffer, HeaderLanguage, WordEntry};
