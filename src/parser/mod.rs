// 🏗️ Extraction Framework
// One FieldExtractor per input format, all producing the same field dictionary

pub mod address;
pub mod delimited;
pub mod document;
pub mod fields;
pub mod message;
pub mod patterns;
pub mod spreadsheet;

pub use address::AddressResolver;
pub use delimited::DelimitedExtractor;
pub use document::DocumentExtractor;
pub use fields::{canonical_equipment, parse_amount, parse_date, ExtractedFields, Field, FieldValue};
pub use message::MessageExtractor;
pub use spreadsheet::{Sheet, SpreadsheetExtractor, Workbook};

use crate::entities::DataSource;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// CORE TYPES
// ============================================================================

/// InputFormat - the four shapes raw booking data arrives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Delimited text rows (CSV)
    Delimited,
    /// Named sheets of rows
    Spreadsheet,
    /// Text already extracted from a document
    Document,
    /// Free-text message (email subject + body)
    Message,
}

impl InputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Delimited => "delimited",
            InputFormat::Spreadsheet => "spreadsheet",
            InputFormat::Document => "document",
            InputFormat::Message => "message",
        }
    }

    /// Provenance tag stamped on entities built from this format
    pub fn data_source(&self) -> DataSource {
        match self {
            InputFormat::Delimited => DataSource::Csv,
            InputFormat::Spreadsheet => DataSource::Excel,
            InputFormat::Document => DataSource::Pdf,
            InputFormat::Message => DataSource::Email,
        }
    }

    /// Detect the format from a file extension
    ///
    /// ```text
    /// bookings.csv → Delimited
    /// confirmation.pdf → Document
    /// notes.docx → UnsupportedFormat { extension: "docx" }
    /// ```
    pub fn detect(path: &Path) -> Result<InputFormat, PipelineError> {
        match extension_of(path).as_str() {
            "csv" => Ok(InputFormat::Delimited),
            "json" | "xlsx" | "xls" => Ok(InputFormat::Spreadsheet),
            "txt" | "pdf" => Ok(InputFormat::Document),
            "eml" => Ok(InputFormat::Message),
            other => Err(PipelineError::unsupported(other)),
        }
    }
}

/// RawInput - one input file (or API payload) before extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum RawInput {
    Delimited {
        name: String,
        content: String,
    },
    Spreadsheet {
        name: String,
        sheets: Vec<Sheet>,
    },
    Document {
        name: String,
        text: String,
    },
    Message {
        name: String,
        #[serde(default)]
        subject: Option<String>,
        body: String,
    },
}

impl RawInput {
    pub fn name(&self) -> &str {
        match self {
            RawInput::Delimited { name, .. }
            | RawInput::Spreadsheet { name, .. }
            | RawInput::Document { name, .. }
            | RawInput::Message { name, .. } => name,
        }
    }

    pub fn format(&self) -> InputFormat {
        match self {
            RawInput::Delimited { .. } => InputFormat::Delimited,
            RawInput::Spreadsheet { .. } => InputFormat::Spreadsheet,
            RawInput::Document { .. } => InputFormat::Document,
            RawInput::Message { .. } => InputFormat::Message,
        }
    }

    /// Read an input file from disk
    ///
    /// `.pdf`/`.xlsx`/`.xls` are recognized but their decoding happens
    /// upstream; pass the extracted text (`.txt`) or rows (`.json`) instead.
    pub fn from_path(path: &Path) -> Result<RawInput, PipelineError> {
        let format = InputFormat::detect(path)?;
        let extension = extension_of(path);
        if matches!(extension.as_str(), "pdf" | "xlsx" | "xls") {
            return Err(PipelineError::ExtractionRequired {
                path: path.to_path_buf(),
                format: format.name(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let content = fs::read_to_string(path)?;

        let input = match format {
            InputFormat::Delimited => RawInput::Delimited { name, content },
            InputFormat::Document => RawInput::Document {
                name,
                text: content,
            },
            InputFormat::Message => {
                let (subject, body) = split_subject(&content);
                RawInput::Message {
                    name,
                    subject,
                    body,
                }
            }
            InputFormat::Spreadsheet => {
                let workbook: Workbook = serde_json::from_str(&content)?;
                RawInput::Spreadsheet {
                    name,
                    sheets: workbook.sheets,
                }
            }
        };
        Ok(input)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Pull the first "Subject:" header out of a saved message
fn split_subject(text: &str) -> (Option<String>, String) {
    let mut subject = None;
    let mut body = Vec::new();
    for line in text.lines() {
        if subject.is_none() && line.trim_start().to_lowercase().starts_with("subject:") {
            let value = line.trim_start()["subject:".len()..].trim();
            subject = Some(value.to_string());
        } else {
            body.push(line);
        }
    }
    (subject, body.join("\n"))
}

// ============================================================================
// EXTRACTION CONTRACT
// ============================================================================

/// FieldExtractor - turns one raw input into per-unit field dictionaries
///
/// A unit is a row for delimited/spreadsheet inputs and the whole text for
/// documents and messages. Malformed values never fail extraction; they are
/// left out of the dictionary.
pub trait FieldExtractor: Send + Sync {
    /// Format this extractor reads
    fn format(&self) -> InputFormat;

    /// Extract every unit of `input`
    ///
    /// Fails only when handed another format's input or when the container
    /// itself is unreadable.
    fn extract(&self, input: &RawInput) -> Result<Vec<ExtractedFields>, PipelineError>;

    /// Extractor version (for provenance in logs)
    fn version(&self) -> &str {
        "1.0.0"
    }

    fn mismatch(&self, input: &RawInput) -> PipelineError {
        PipelineError::FormatMismatch {
            extractor: self.format().name(),
            input: input.format().name(),
        }
    }
}

/// Get the extractor for a format
pub fn get_extractor(format: InputFormat) -> Box<dyn FieldExtractor> {
    match format {
        InputFormat::Delimited => Box::new(DelimitedExtractor::new()),
        InputFormat::Spreadsheet => Box::new(SpreadsheetExtractor::new()),
        InputFormat::Document => Box::new(DocumentExtractor::new()),
        InputFormat::Message => Box::new(MessageExtractor::new()),
    }
}

/// Extract an input with the extractor matching its format
pub fn extract_input(input: &RawInput) -> Result<Vec<ExtractedFields>, PipelineError> {
    get_extractor(input.format()).extract(input)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_formats() {
        assert_eq!(InputFormat::detect(Path::new("a.CSV")).unwrap(), InputFormat::Delimited);
        assert_eq!(InputFormat::detect(Path::new("a.pdf")).unwrap(), InputFormat::Document);
        assert_eq!(InputFormat::detect(Path::new("a.xlsx")).unwrap(), InputFormat::Spreadsheet);
        assert_eq!(InputFormat::detect(Path::new("a.eml")).unwrap(), InputFormat::Message);
    }

    #[test]
    fn test_unsupported_extension_is_typed() {
        let err = InputFormat::detect(Path::new("notes.docx")).unwrap_err();
        match err {
            PipelineError::UnsupportedFormat { extension } => assert_eq!(extension, "docx"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = RawInput::from_path(Path::new("README")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { extension } if extension.is_empty()));
    }

    #[test]
    fn test_pdf_requires_extracted_text() {
        let err = RawInput::from_path(Path::new("confirmation.pdf")).unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionRequired { format: "document", .. }));
    }

    #[test]
    fn test_from_path_reads_message() {
        let mut file = tempfile::Builder::new().suffix(".eml").tempfile().unwrap();
        writeln!(file, "Subject: Load L77 confirmed").unwrap();
        writeln!(file, "MC#: 123456").unwrap();

        let input = RawInput::from_path(file.path()).unwrap();
        match input {
            RawInput::Message { subject, body, .. } => {
                assert_eq!(subject.as_deref(), Some("Load L77 confirmed"));
                assert_eq!(body, "MC#: 123456");
            }
            other => panic!("unexpected input: {:?}", other),
        }
    }

    #[test]
    fn test_get_extractor_matches_format() {
        for format in [
            InputFormat::Delimited,
            InputFormat::Spreadsheet,
            InputFormat::Document,
            InputFormat::Message,
        ] {
            assert_eq!(get_extractor(format).format(), format);
        }
    }

    #[test]
    fn test_extractor_rejects_other_format() {
        let input = RawInput::Document {
            name: "doc".to_string(),
            text: "Load #: 1".to_string(),
        };
        let err = get_extractor(InputFormat::Delimited).extract(&input).unwrap_err();
        assert!(matches!(err, PipelineError::FormatMismatch { .. }));
    }

    #[test]
    fn test_raw_input_json_tag() {
        let json = r#"{"format":"message","name":"m1","body":"Load #: X1"}"#;
        let input: RawInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.format(), InputFormat::Message);
        assert_eq!(input.name(), "m1");
    }
}
