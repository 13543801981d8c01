// Extracted document text (PDF rate confirmations)

use super::fields::ExtractedFields;
use super::patterns::{apply_cascades, DOCUMENT_CASCADES};
use super::{FieldExtractor, InputFormat, RawInput};
use crate::error::PipelineError;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        DocumentExtractor
    }

    /// The whole document is one unit; a bare "Date:" line is the booking date
    pub fn extract_text(&self, name: &str, text: &str) -> ExtractedFields {
        let text = text.replace("\r\n", "\n");
        let mut fields = ExtractedFields::new(self.format().data_source(), name);
        let stored = apply_cascades(&text, &DOCUMENT_CASCADES, &mut fields);
        debug!(document = name, fields = stored, "extracted document");
        fields
    }
}

impl FieldExtractor for DocumentExtractor {
    fn format(&self) -> InputFormat {
        InputFormat::Document
    }

    fn extract(&self, input: &RawInput) -> Result<Vec<ExtractedFields>, PipelineError> {
        match input {
            RawInput::Document { name, text } => Ok(vec![self.extract_text(name, text)]),
            other => Err(self.mismatch(other)),
        }
    }
}
