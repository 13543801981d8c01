// Free-text messages (booking confirmation emails)

use super::fields::ExtractedFields;
use super::patterns::{apply_cascades, MESSAGE_CASCADES};
use super::{FieldExtractor, InputFormat, RawInput};
use crate::error::PipelineError;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageExtractor;

impl MessageExtractor {
    pub fn new() -> Self {
        MessageExtractor
    }

    /// Subject and body are read as one text ("subject\nbody")
    pub fn extract_message(&self, name: &str, subject: Option<&str>, body: &str) -> ExtractedFields {
        let text = format!("{}\n{}", subject.unwrap_or(""), body).replace("\r\n", "\n");
        let mut fields = ExtractedFields::new(self.format().data_source(), name);
        let stored = apply_cascades(&text, &MESSAGE_CASCADES, &mut fields);
        debug!(message = name, fields = stored, "extracted message");
        fields
    }
}

impl FieldExtractor for MessageExtractor {
    fn format(&self) -> InputFormat {
        InputFormat::Message
    }

    fn extract(&self, input: &RawInput) -> Result<Vec<ExtractedFields>, PipelineError> {
        match input {
            RawInput::Message {
                name,
                subject,
                body,
            } => Ok(vec![self.extract_message(name, subject.as_deref(), body)]),
            other => Err(self.mismatch(other)),
        }
    }
}
