// Spreadsheet rows - named sheets of header → cell maps
//
// Cells arrive as JSON scalars. Whole numbers rendered as floats
// ("123456.0") are read back as integers, and "nan"/"None" mean empty.

use super::delimited::extract_row;
use super::fields::ExtractedFields;
use super::{FieldExtractor, InputFormat, RawInput};
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// One named sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<BTreeMap<String, Value>>,
}

/// Workbook file layout: `{"sheets": [{"name": ..., "rows": [...]}]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        SpreadsheetExtractor
    }

    /// Extract every sheet separately, keeping sheet order
    pub fn extract_sheets(&self, workbook: &str, sheets: &[Sheet]) -> Vec<(String, Vec<ExtractedFields>)> {
        sheets
            .iter()
            .map(|sheet| (sheet.name.clone(), self.extract_sheet(workbook, sheet)))
            .collect()
    }

    fn extract_sheet(&self, workbook: &str, sheet: &Sheet) -> Vec<ExtractedFields> {
        let mut units = Vec::new();
        for (index, row) in sheet.rows.iter().enumerate() {
            let cells: Vec<(&str, String)> = row
                .iter()
                .filter_map(|(header, value)| cell_text(value).map(|text| (header.as_str(), text)))
                .collect();
            if cells.is_empty() {
                continue;
            }

            let unit = format!("{}:{}:{}", workbook, sheet.name, index + 2);
            units.push(extract_row(
                cells.iter().map(|(header, text)| (*header, text.as_str())),
                self.format().data_source(),
                unit,
            ));
        }
        debug!(workbook, sheet = %sheet.name, units = units.len(), "extracted sheet");
        units
    }
}

impl FieldExtractor for SpreadsheetExtractor {
    fn format(&self) -> InputFormat {
        InputFormat::Spreadsheet
    }

    fn extract(&self, input: &RawInput) -> Result<Vec<ExtractedFields>, PipelineError> {
        match input {
            RawInput::Spreadsheet { name, sheets } => Ok(self
                .extract_sheets(name, sheets)
                .into_iter()
                .flat_map(|(_, units)| units)
                .collect()),
            other => Err(self.mismatch(other)),
        }
    }
}

/// Render a cell as text; `None` for empty or non-scalar cells
fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::String(s) => s.trim().to_string(),
    };

    if text.is_empty() || text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(strip_float_suffix(&text))
}

/// "123456.0" → "123456"
fn strip_float_suffix(text: &str) -> String {
    match text.strip_suffix(".0") {
        Some(whole) if !whole.is_empty() && whole.chars().all(|c| c.is_ascii_digit()) => whole.to_string(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DataSource;
    use crate::parser::Field;
    use serde_json::json;

    fn sheet(name: &str, rows: Value) -> Sheet {
        Sheet {
            name: name.to_string(),
            rows: serde_json::from_value(rows).unwrap(),
        }
    }

    #[test]
    fn test_cell_normalization() {
        assert_eq!(cell_text(&json!(123456.0)).as_deref(), Some("123456"));
        assert_eq!(cell_text(&json!("123456.0")).as_deref(), Some("123456"));
        assert_eq!(cell_text(&json!("1850.50")).as_deref(), Some("1850.50"));
        assert_eq!(cell_text(&json!("nan")), None);
        assert_eq!(cell_text(&json!("None")), None);
        assert_eq!(cell_text(&json!(null)), None);
    }

    #[test]
    fn test_extract_sheets_keeps_order() {
        let sheets = vec![
            sheet(
                "October",
                json!([{"Load #": "L1", "MC#": 123456.0, "Broker": "ABC Logistics"}]),
            ),
            sheet("Empty", json!([{"Load #": "nan"}])),
            sheet("November", json!([{"Load #": "L2", "Rate": "1,200"}])),
        ];

        let results = SpreadsheetExtractor::new().extract_sheets("book.json", &sheets);
        let names: Vec<_> = results.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["October", "Empty", "November"]);

        let october = &results[0].1;
        assert_eq!(october.len(), 1);
        assert_eq!(october[0].text(Field::McId), Some("123456"));
        assert_eq!(october[0].source, DataSource::Excel);
        assert!(results[1].1.is_empty());
        assert_eq!(results[2].1[0].number(Field::RateAmount), Some(1200.0));
    }

    #[test]
    fn test_extract_flattens_sheets() {
        let input = RawInput::Spreadsheet {
            name: "book.json".to_string(),
            sheets: vec![
                sheet("A", json!([{"Load #": "L1"}])),
                sheet("B", json!([{"Load #": "L2"}, {"Load #": "L3"}])),
            ],
        };
        let units = SpreadsheetExtractor::new().extract(&input).unwrap();
        let ids: Vec<_> = units.iter().filter_map(|u| u.text(Field::LoadId)).collect();
        assert_eq!(ids, vec!["L1", "L2", "L3"]);
    }
}
