// Delimited rows (CSV) - column-name driven extraction

use super::fields::{ExtractedFields, Field};
use super::patterns::{apply_cascades, NOTES_RATE_CASCADE};
use super::{FieldExtractor, InputFormat, RawInput};
use crate::entities::DataSource;
use crate::error::PipelineError;
use tracing::{debug, warn};

/// Column header (lowercase, trimmed) → field
///
/// When two columns map to the same field the leftmost non-empty one wins.
pub const COLUMN_MAP: &[(&str, Field)] = &[
    ("name", Field::BrokerName),
    ("contact", Field::BrokerName),
    ("broker", Field::CompanyName),
    ("company", Field::CompanyName),
    ("mc#", Field::McId),
    ("mc", Field::McId),
    ("mc number", Field::McId),
    ("phone number", Field::Phone),
    ("phone", Field::Phone),
    ("email", Field::Email),
    ("address", Field::Address),
    ("date", Field::BookingDate),
    ("booking date", Field::BookingDate),
    ("load #", Field::LoadId),
    ("load", Field::LoadId),
    ("load id", Field::LoadId),
    ("trip", Field::Trip),
    ("origin", Field::Origin),
    ("destination", Field::Destination),
    ("pickup date", Field::PickupDate),
    ("delivery date", Field::DeliveryDate),
    ("equipment", Field::EquipmentType),
    ("equipment type", Field::EquipmentType),
    ("rate", Field::RateAmount),
    ("weight", Field::Weight),
    ("pallets", Field::Pallets),
    ("pieces", Field::Pieces),
    ("notes", Field::Notes),
    ("load board", Field::LoadBoard),
];

/// Cell values that mean "not provided"
const SENTINELS: &[&str] = &["N/L", "N/A"];

pub fn field_for_header(header: &str) -> Option<Field> {
    let header = header.trim().to_lowercase();
    COLUMN_MAP
        .iter()
        .find(|(column, _)| *column == header)
        .map(|(_, field)| *field)
}

/// Build the field dictionary for one row of (header, cell) pairs
///
/// A rate column wins; otherwise a rate is looked for inside the notes.
pub fn extract_row<'a, I>(cells: I, source: DataSource, unit: String) -> ExtractedFields
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut fields = ExtractedFields::new(source, unit);

    for (header, value) in cells {
        let Some(field) = field_for_header(header) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() || SENTINELS.iter().any(|s| value.eq_ignore_ascii_case(s)) {
            continue;
        }
        match field {
            Field::BrokerName | Field::CompanyName => {
                fields.set_if_absent(field, &value.replace("**", ""));
            }
            _ => {
                fields.set_if_absent(field, value);
            }
        }
    }

    if !fields.contains(Field::RateAmount) {
        if let Some(notes) = fields.text(Field::Notes).map(str::to_string) {
            apply_cascades(&notes, &NOTES_RATE_CASCADE, &mut fields);
        }
    }

    fields
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedExtractor;

impl DelimitedExtractor {
    pub fn new() -> Self {
        DelimitedExtractor
    }

    /// Extract every data row of CSV text (header row first)
    ///
    /// Unreadable rows are logged and skipped; blank rows are ignored.
    pub fn extract_content(&self, name: &str, content: &str) -> Result<Vec<ExtractedFields>, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.trim().as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        debug!(file = name, columns = ?headers, "reading delimited rows");

        let mut units = Vec::new();
        for (index, record) in reader.records().enumerate() {
            // header is line 1
            let row_number = index + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(file = name, row = row_number, error = %e, "skipping unreadable row");
                    continue;
                }
            };
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let cells = headers.iter().map(String::as_str).zip(record.iter());
            units.push(extract_row(
                cells,
                self.format().data_source(),
                format!("{}:{}", name, row_number),
            ));
        }

        Ok(units)
    }
}

impl FieldExtractor for DelimitedExtractor {
    fn format(&self) -> InputFormat {
        InputFormat::Delimited
    }

    fn extract(&self, input: &RawInput) -> Result<Vec<ExtractedFields>, PipelineError> {
        match input {
            RawInput::Delimited { name, content } => self.extract_content(name, content),
            other => Err(self.mismatch(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const BOOKINGS: &str = "Name,Broker,MC#,Phone Number,Email,Address,Date,Load #,Trip,Notes,Load Board\n\
**Jane Doe**,**ABC Logistics LLC**,MC-123456,555-010-0100,jane@abc.com,\"100 Bay St, Miami, FL 33101\",10/28/24,L100,Miami FL to Tampa FL,\"paid $1,850.00 quick pay\",DAT\n\
John Roe,XYZ Freight,N/L,N/A,,,10/30/24,L101,Orlando FL - Jacksonville FL,,\n\
,,,,,,,,,,\n";

    #[test]
    fn test_extracts_each_data_row() {
        let units = DelimitedExtractor::new().extract_content("bookings.csv", BOOKINGS).unwrap();
        assert_eq!(units.len(), 2);

        let first = &units[0];
        assert_eq!(first.unit, "bookings.csv:2");
        assert_eq!(first.text(Field::BrokerName), Some("Jane Doe"));
        assert_eq!(first.text(Field::CompanyName), Some("ABC Logistics LLC"));
        assert_eq!(first.text(Field::McId), Some("123456"));
        assert_eq!(first.text(Field::Address), Some("100 Bay St, Miami, FL 33101"));
        assert_eq!(first.date(Field::BookingDate), NaiveDate::from_ymd_opt(2024, 10, 28));
        assert_eq!(first.text(Field::Trip), Some("Miami FL to Tampa FL"));
        assert_eq!(first.text(Field::LoadBoard), Some("DAT"));
        assert_eq!(first.number(Field::RateAmount), Some(1850.0));
    }

    #[test]
    fn test_sentinels_are_absent() {
        let units = DelimitedExtractor::new().extract_content("bookings.csv", BOOKINGS).unwrap();
        let second = &units[1];
        assert!(!second.contains(Field::McId));
        assert!(!second.contains(Field::Phone));
        assert!(!second.contains(Field::Email));
        assert!(!second.contains(Field::RateAmount));
    }

    #[test]
    fn test_rate_column_wins_over_notes() {
        let csv = "Load #,Rate,Notes\nL1,2000,was $1500 last week\n";
        let units = DelimitedExtractor::new().extract_content("r.csv", csv).unwrap();
        assert_eq!(units[0].number(Field::RateAmount), Some(2000.0));
    }

    #[test]
    fn test_headers_ignore_case_and_space() {
        assert_eq!(field_for_header("  LOAD #  "), Some(Field::LoadId));
        assert_eq!(field_for_header("Mc#"), Some(Field::McId));
        assert_eq!(field_for_header("State"), None);
    }

    #[test]
    fn test_empty_content() {
        let units = DelimitedExtractor::new().extract_content("empty.csv", "").unwrap();
        assert!(units.is_empty());
    }
}
