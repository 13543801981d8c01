// Field dictionary - what an extractor produces for one input unit
//
// Values are converted as they are set: dates parse, amounts drop "$" and
// thousands separators, MC ids keep digits, equipment is canonicalized.
// Anything that fails to convert is simply not stored.

use crate::entities::DataSource;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Recognized field keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    BrokerName,
    CompanyName,
    McId,
    Phone,
    Email,
    Address,
    LoadId,
    Origin,
    Destination,
    Trip,
    PickupDate,
    DeliveryDate,
    BookingDate,
    EquipmentType,
    RateAmount,
    Weight,
    Pallets,
    Pieces,
    Notes,
    LoadBoard,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::BrokerName => "broker_name",
            Field::CompanyName => "company_name",
            Field::McId => "mc_id",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Address => "address",
            Field::LoadId => "load_id",
            Field::Origin => "origin",
            Field::Destination => "destination",
            Field::Trip => "trip",
            Field::PickupDate => "pickup_date",
            Field::DeliveryDate => "delivery_date",
            Field::BookingDate => "booking_date",
            Field::EquipmentType => "equipment_type",
            Field::RateAmount => "rate_amount",
            Field::Weight => "weight",
            Field::Pallets => "pallets",
            Field::Pieces => "pieces",
            Field::Notes => "notes",
            Field::LoadBoard => "load_board",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Field::McId => FieldKind::Digits,
            Field::PickupDate | Field::DeliveryDate | Field::BookingDate => FieldKind::Date,
            Field::RateAmount | Field::Weight => FieldKind::Amount,
            Field::Pallets | Field::Pieces => FieldKind::Count,
            Field::EquipmentType => FieldKind::Equipment,
            _ => FieldKind::Text,
        }
    }
}

enum FieldKind {
    Text,
    Digits,
    Date,
    Amount,
    Count,
    Equipment,
}

/// A converted field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Number(f64),
}

impl FieldValue {
    fn render(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            FieldValue::Number(n) => n.to_string(),
        }
    }
}

/// ExtractedFields - field dictionary for one row, document or message
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub source: DataSource,
    /// Human label for logs, e.g. "bookings.csv:3"
    pub unit: String,
    values: BTreeMap<Field, FieldValue>,
}

impl ExtractedFields {
    pub fn new(source: DataSource, unit: impl Into<String>) -> Self {
        ExtractedFields {
            source,
            unit: unit.into(),
            values: BTreeMap::new(),
        }
    }

    /// Convert and store a raw value; returns false if it was discarded
    pub fn set(&mut self, field: Field, raw: &str) -> bool {
        match convert(field, raw) {
            Some(value) => {
                self.values.insert(field, value);
                true
            }
            None => false,
        }
    }

    /// Like `set`, but an existing value wins
    pub fn set_if_absent(&mut self, field: Field, raw: &str) -> bool {
        if self.contains(field) {
            return false;
        }
        self.set(field, raw)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn remove(&mut self, field: Field) {
        self.values.remove(&field);
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, field: Field) -> Option<NaiveDate> {
        match self.values.get(&field) {
            Some(FieldValue::Date(date)) => Some(*date),
            _ => None,
        }
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        match self.values.get(&field) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn count(&self, field: Field) -> Option<u32> {
        self.number(field).map(|n| n as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Plain key → text mapping (dates ISO-8601)
    pub fn to_record(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), value.render()))
            .collect()
    }
}

fn convert(field: Field, raw: &str) -> Option<FieldValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match field.kind() {
        FieldKind::Text => Some(FieldValue::Text(trimmed.to_string())),
        FieldKind::Digits => {
            let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
            (!digits.is_empty()).then_some(FieldValue::Text(digits))
        }
        FieldKind::Date => parse_date(trimmed).map(FieldValue::Date),
        FieldKind::Amount => parse_amount(trimmed).map(FieldValue::Number),
        FieldKind::Count => parse_amount(trimmed)
            .filter(|n| n.fract() == 0.0 && *n <= u32::MAX as f64)
            .map(FieldValue::Number),
        FieldKind::Equipment => Some(FieldValue::Text(canonical_equipment(trimmed))),
    }
}

// ============================================================================
// VALUE PARSERS
// ============================================================================

static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+\d{1,2}:\d{2}\s*(AM|PM)?").expect("valid time regex"));

/// Date formats tried in order; first successful parse wins
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",  // 10/28/24
    "%m/%d/%Y",  // 10/28/2024
    "%Y-%m-%d",  // 2024-10-28
    "%m-%d-%Y",  // 10-28-2024
    "%B %d, %Y", // October 28, 2024
    "%b %d, %Y", // Oct 28, 2024
    "%d %B %Y",  // 28 October 2024
    "%d %b %Y",  // 28 Oct 2024
];

const DATE_TIME_FORMAT: &str = "%m/%d/%Y %I:%M %p";

/// Parse a date from free text
///
/// Only the first line is considered and a trailing time of day is dropped.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let first_line = text.trim().lines().next()?.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(first_line, DATE_TIME_FORMAT) {
        return Some(datetime.date());
    }

    let cleaned = TIME_OF_DAY.replace_all(first_line, "");
    let cleaned = cleaned.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cleaned, format).ok())
}

/// Parse a currency-like number: "$1,500.00" → 1500.0
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Canonical equipment name
///
/// Keyword checks in fixed priority: dry/van, then reefer/refrigerated,
/// then flat/flatbed; anything else is title-cased.
pub fn canonical_equipment(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    if lower.contains("dry") || lower.contains("van") {
        "Dry Van".to_string()
    } else if lower.contains("reefer") || lower.contains("refrigerated") {
        "Refrigerated".to_string()
    } else if lower.contains("flat") {
        "Flatbed".to_string()
    } else {
        title_case(&lower)
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
