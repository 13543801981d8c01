// ⚠️ Pipeline Errors
//
// The only fatal condition inside the pipeline is an input it cannot read.
// Malformed values never surface here - they just leave a field absent.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// File extension not handled by any extractor
    #[error("unsupported file format: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Known binary format whose text/rows must be extracted upstream
    #[error("{format} input {path:?} must be supplied as extracted text or rows")]
    ExtractionRequired { path: PathBuf, format: &'static str },

    /// An extractor was handed another format's input
    #[error("{extractor} extractor cannot read {input} input")]
    FormatMismatch {
        extractor: &'static str,
        input: &'static str,
    },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed delimited input: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed sheet document: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn unsupported(extension: &str) -> Self {
        PipelineError::UnsupportedFormat {
            extension: extension.to_string(),
        }
    }
}
