// Pattern tables for free-text extraction
//
// Each field owns an ordered cascade of (pattern, transform) rules.
// The first rule whose pattern matches anywhere in the text decides the field;
// later rules are never consulted, even if the converted value is discarded.
// Adding a pattern means adding a row here - the control flow never changes.
//
// Labels are word-bounded and values never cross a line break.

use super::fields::{ExtractedFields, Field};
use once_cell::sync::Lazy;
use regex::Regex;

/// Post-processing applied to a captured value; `None` discards it
pub type Transform = fn(&str) -> Option<String>;

pub struct PatternRule {
    pub regex: Regex,
    pub transform: Transform,
}

/// Ordered rules for one field
pub struct FieldCascade {
    pub field: Field,
    pub rules: Vec<PatternRule>,
    /// Only fill the field when nothing set it earlier
    pub fill_only: bool,
}

fn rule(pattern: &str, transform: Transform) -> PatternRule {
    PatternRule {
        regex: Regex::new(pattern).expect("valid extraction pattern"),
        transform,
    }
}

fn cascade(field: Field, rules: Vec<PatternRule>) -> FieldCascade {
    FieldCascade {
        field,
        rules,
        fill_only: false,
    }
}

fn fallback(field: Field, rules: Vec<PatternRule>) -> FieldCascade {
    FieldCascade {
        field,
        rules,
        fill_only: true,
    }
}

/// Run every cascade over `text`, storing the winners in `fields`
///
/// Returns the number of fields stored.
pub fn apply_cascades(text: &str, cascades: &[FieldCascade], fields: &mut ExtractedFields) -> usize {
    let mut stored = 0;
    for cascade in cascades {
        if cascade.fill_only && fields.contains(cascade.field) {
            continue;
        }
        for rule in &cascade.rules {
            let Some(captures) = rule.regex.captures(text) else {
                continue;
            };
            let value = captures
                .get(1)
                .and_then(|m| (rule.transform)(m.as_str()));
            if let Some(value) = value {
                if fields.set(cascade.field, &value) {
                    stored += 1;
                }
            }
            break;
        }
    }
    stored
}

// ============================================================================
// TRANSFORMS
// ============================================================================

fn keep(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Company names lose trailing separators ("ABC Logistics, " → "ABC Logistics")
fn company(value: &str) -> Option<String> {
    keep(value.trim_end_matches(|c: char| c == ',' || c.is_whitespace()))
}

static LOCATION_LABEL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\b(?:city|state|zip)(?:\s*code)?\s*[:#].*$").expect("valid suffix regex")
});

/// Locations drop trailing "Zip: ..." style labels; email addresses are rejected
fn location(value: &str) -> Option<String> {
    if value.contains('@') {
        return None;
    }
    let cleaned = LOCATION_LABEL_SUFFIX.replace(value, "");
    keep(cleaned.trim_end_matches(|c: char| c == ',' || c == ';' || c.is_whitespace()))
}

// ============================================================================
// SHARED RULE SETS
// ============================================================================

const AMOUNT: &str = r"\$?[ \t]*([\d,]+(?:\.\d+)?)";

fn mc_rules() -> Vec<PatternRule> {
    vec![
        rule(r"(?i)\bMC[ \t]*(?:#|number|no\.?)?[ \t]*[:#-]?[ \t]*(\d+)", keep),
        rule(r"(?i)\bmotor[ \t]*carrier(?:[ \t]*(?:#|number|no\.?))?[ \t]*[:#]?[ \t]*(\d+)", keep),
    ]
}

fn id_rule(label: &str) -> PatternRule {
    rule(
        &format!(
            r"(?i)\b{}[ \t]*(?:id|number|no\.?)?[ \t]*(?:#[ \t]*:?|:)[ \t]*([A-Z0-9][A-Z0-9-]*)",
            label
        ),
        keep,
    )
}

fn line_value(label: &str) -> String {
    format!(r"(?im)\b{}[ \t]*:[ \t]*([^\n]+)", label)
}

fn origin_rules(with_from: bool) -> Vec<PatternRule> {
    let terminator = r"(?:[ \t]+(?:destination|delivery|to)\b|$)";
    let mut rules = vec![
        rule(&format!(r"(?im)\borigin[ \t]*:[ \t]*(.+?){}", terminator), location),
        rule(&format!(r"(?im)\bpickup[ \t]+location[ \t]*:[ \t]*(.+?){}", terminator), location),
        rule(&format!(r"(?im)\bpickup[ \t]*:[ \t]*(.+?){}", terminator), location),
    ];
    if with_from {
        rules.push(rule(&format!(r"(?im)^[ \t]*from[ \t]*:[ \t]*(.+?){}", terminator), location));
    }
    rules
}

fn destination_rules() -> Vec<PatternRule> {
    let terminator = r"(?:[ \t]+(?:origin|from)\b|$)";
    vec![
        rule(&format!(r"(?im)\bdestination[ \t]*:[ \t]*(.+?){}", terminator), location),
        rule(&format!(r"(?im)\bdelivery[ \t]+location[ \t]*:[ \t]*(.+?){}", terminator), location),
        rule(&format!(r"(?im)\bdelivery[ \t]*:[ \t]*(.+?){}", terminator), location),
        rule(&format!(r"(?im)^[ \t]*to[ \t]*:[ \t]*(.+?){}", terminator), location),
    ]
}

fn rate_rules(with_payment: bool) -> Vec<PatternRule> {
    let mut rules = vec![
        rule(&format!(r"(?i)\brate[ \t]*:?[ \t]*{}", AMOUNT), keep),
        rule(&format!(r"(?i)\bamount[ \t]*:?[ \t]*{}", AMOUNT), keep),
        rule(&format!(r"(?i)\btotal[ \t]*:?[ \t]*{}", AMOUNT), keep),
        rule(r"(?i)\$([\d,]+(?:\.\d+)?)[ \t]*(?:total|rate|amount|payment)\b", keep),
    ];
    if with_payment {
        rules.push(rule(&format!(r"(?i)\bpayment[ \t]*:?[ \t]*{}", AMOUNT), keep));
    }
    rules
}

fn equipment_rules() -> Vec<PatternRule> {
    vec![
        rule(&line_value(r"equipment(?:[ \t]+type)?"), keep),
        rule(&line_value(r"trailer(?:[ \t]*type)?"), keep),
        rule(r"(?im)^[ \t]*type[ \t]*:[ \t]*([^\n]+)", keep),
    ]
}

fn cargo_rules() -> Vec<FieldCascade> {
    vec![
        cascade(
            Field::Weight,
            vec![rule(r"(?i)\bweight[ \t]*:?[ \t]*([\d,]+(?:\.\d+)?)", keep)],
        ),
        cascade(
            Field::Pallets,
            vec![rule(r"(?i)\bpallets?[ \t]*:?[ \t]*(\d+)", keep)],
        ),
        cascade(
            Field::Pieces,
            vec![rule(r"(?i)\b(?:pieces|pcs)[ \t]*:?[ \t]*(\d+)", keep)],
        ),
    ]
}

const EMAIL: &str = r"([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})";
const LABELED_PHONE: &str =
    r"(?i)\bphone(?:[ \t]*(?:#|number|no\.?))?[ \t]*:?[ \t]*(\(?\d{3}\)?[-. \t]?\d{3}[-. \t]?\d{4})";

// ============================================================================
// MESSAGE (email body) CASCADES
// ============================================================================

pub static MESSAGE_CASCADES: Lazy<Vec<FieldCascade>> = Lazy::new(|| {
    let mut cascades = vec![
        cascade(
            Field::CompanyName,
            vec![
                rule(r"(?im)\b(?:broker|company)(?:[ \t]+name)?[ \t]*:[ \t]*([A-Za-z][A-Za-z0-9 &,.'-]*)", company),
                rule(r"(?m)([A-Z][A-Za-z&.' -]*[ \t](?:LLC|Inc|Corp|Ltd)\b\.?)", company),
            ],
        ),
        cascade(
            Field::BrokerName,
            vec![rule(&line_value(r"(?:contact|agent|dispatcher)(?:[ \t]+name)?"), keep)],
        ),
        cascade(Field::McId, mc_rules()),
        cascade(Field::Phone, vec![rule(LABELED_PHONE, keep)]),
        cascade(Field::Email, vec![rule(EMAIL, keep)]),
        cascade(
            Field::LoadId,
            vec![
                id_rule("load"),
                id_rule("booking"),
                id_rule("pro"),
                id_rule("(?:reference|ref)"),
                id_rule("order"),
            ],
        ),
        cascade(Field::Origin, origin_rules(true)),
        cascade(Field::Destination, destination_rules()),
        cascade(Field::RateAmount, rate_rules(true)),
        cascade(Field::PickupDate, vec![rule(&line_value(r"pickup[ \t]*date"), keep)]),
        cascade(Field::DeliveryDate, vec![rule(&line_value(r"delivery[ \t]*date"), keep)]),
        cascade(Field::BookingDate, vec![rule(&line_value(r"booking[ \t]*date"), keep)]),
        // A bare "Date:" line only stands in for a missing pickup date
        fallback(
            Field::PickupDate,
            vec![rule(r"(?im)^[ \t]*date[ \t]*:[ \t]*([^\n]+)", keep)],
        ),
        cascade(Field::EquipmentType, equipment_rules()),
        cascade(Field::Address, vec![rule(&line_value("address"), keep)]),
        cascade(Field::Notes, vec![rule(&line_value("notes?"), keep)]),
    ];
    cascades.extend(cargo_rules());
    cascades
});

// ============================================================================
// DOCUMENT (extracted PDF text) CASCADES
// ============================================================================

pub static DOCUMENT_CASCADES: Lazy<Vec<FieldCascade>> = Lazy::new(|| {
    let mut cascades = vec![
        cascade(
            Field::CompanyName,
            vec![
                rule(r"(?im)\b(?:broker|company)(?:[ \t]+name)?[ \t]*:[ \t]*([A-Za-z][A-Za-z0-9 &,.'-]*)", company),
                rule(r"(?m)([A-Z][A-Za-z&.' -]*)[ \t]+(?:LLC|Inc|Corp|Ltd)\b", company),
            ],
        ),
        cascade(Field::McId, mc_rules()),
        cascade(
            Field::Phone,
            vec![
                rule(LABELED_PHONE, keep),
                rule(r"\b(\d{3}[-.]\d{3}[-.]\d{4})\b", keep),
            ],
        ),
        cascade(Field::Email, vec![rule(EMAIL, keep)]),
        cascade(
            Field::LoadId,
            vec![id_rule("load"), id_rule("booking"), id_rule("pro")],
        ),
        cascade(Field::Origin, origin_rules(false)),
        cascade(Field::Destination, destination_rules()),
        cascade(Field::RateAmount, rate_rules(false)),
        cascade(Field::PickupDate, vec![rule(&line_value(r"pickup[ \t]*date"), keep)]),
        cascade(Field::DeliveryDate, vec![rule(&line_value(r"delivery[ \t]*date"), keep)]),
        cascade(
            Field::BookingDate,
            vec![
                rule(&line_value(r"booking[ \t]*date"), keep),
                rule(r"(?im)^[ \t]*date[ \t]*:[ \t]*([^\n]+)", keep),
            ],
        ),
        cascade(Field::EquipmentType, equipment_rules()),
        cascade(Field::Address, vec![rule(&line_value("address"), keep)]),
    ];
    cascades.extend(cargo_rules());
    cascades
});

// ============================================================================
// RATES INSIDE NOTES (row-based inputs)
// ============================================================================

pub static NOTES_RATE_CASCADE: Lazy<Vec<FieldCascade>> = Lazy::new(|| {
    vec![cascade(
        Field::RateAmount,
        vec![
            rule(r"\$(\d+(?:,\d{3})*(?:\.\d{2})?)", keep),
            rule(r"(?i)(\d+(?:,\d{3})*(?:\.\d{2})?)[ \t]*dollars?\b", keep),
            rule(&format!(r"(?i)\brate[ \t]*:?[ \t]*{}", AMOUNT), keep),
            rule(&format!(r"(?i)\bamount[ \t]*:?[ \t]*{}", AMOUNT), keep),
            rule(&format!(r"(?i)\btotal[ \t]*:?[ \t]*{}", AMOUNT), keep),
        ],
    )]
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DataSource;
    use chrono::NaiveDate;

    fn message(text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::new(DataSource::Email, "test");
        apply_cascades(text, &MESSAGE_CASCADES, &mut fields);
        fields
    }

    fn document(text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::new(DataSource::Pdf, "test");
        apply_cascades(text, &DOCUMENT_CASCADES, &mut fields);
        fields
    }

    #[test]
    fn test_all_patterns_compile() {
        assert!(!MESSAGE_CASCADES.is_empty());
        assert!(!DOCUMENT_CASCADES.is_empty());
        assert_eq!(NOTES_RATE_CASCADE.len(), 1);
    }

    #[test]
    fn test_message_core_fields() {
        let fields = message(
            "Load Confirmation\nMC#: 123456\nLoad #: L77\nOrigin: Miami, FL\nDestination: Tampa, FL\nRate: $1,500.00\n",
        );
        assert_eq!(fields.text(Field::McId), Some("123456"));
        assert_eq!(fields.text(Field::LoadId), Some("L77"));
        assert_eq!(fields.text(Field::Origin), Some("Miami, FL"));
        assert_eq!(fields.text(Field::Destination), Some("Tampa, FL"));
        assert_eq!(fields.number(Field::RateAmount), Some(1500.0));
    }

    #[test]
    fn test_earlier_pattern_wins_regardless_of_position() {
        // "Booking #" appears first in the text, but the load pattern has priority
        let fields = message("Booking #: B-1\nLoad #: L-2\n");
        assert_eq!(fields.text(Field::LoadId), Some("L-2"));
    }

    #[test]
    fn test_origin_stops_at_destination_label() {
        let fields = message("Origin: Houston, TX Destination: Dallas, TX\n");
        assert_eq!(fields.text(Field::Origin), Some("Houston, TX"));
        assert_eq!(fields.text(Field::Destination), Some("Dallas, TX"));
    }

    #[test]
    fn test_location_suffix_and_email_header() {
        let fields = message("From: dispatch@broker.com\nPickup: Atlanta, GA Zip: 30301\n");
        assert_eq!(fields.text(Field::Origin), Some("Atlanta, GA"));
    }

    #[test]
    fn test_pickup_date_label_is_not_an_origin() {
        let fields = message("Pickup Date: 10/28/24\n");
        assert!(!fields.contains(Field::Origin));
        assert_eq!(fields.date(Field::PickupDate), NaiveDate::from_ymd_opt(2024, 10, 28));
    }

    #[test]
    fn test_generic_date_only_fills_missing_pickup() {
        let fields = message("Date: 10/01/2024\n");
        assert_eq!(fields.date(Field::PickupDate), NaiveDate::from_ymd_opt(2024, 10, 1));

        let fields = message("Date: 10/01/2024\nPickup Date: 10/05/2024\n");
        assert_eq!(fields.date(Field::PickupDate), NaiveDate::from_ymd_opt(2024, 10, 5));
    }

    #[test]
    fn test_document_generic_date_is_booking() {
        let fields = document("Date: 2024-03-01\nCompany: Acme Freight\n");
        assert_eq!(fields.date(Field::BookingDate), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(!fields.contains(Field::PickupDate));
        assert_eq!(fields.text(Field::CompanyName), Some("Acme Freight"));
    }

    #[test]
    fn test_unparsable_rate_stays_absent() {
        let fields = message("Rate: , to be confirmed\n");
        assert!(!fields.contains(Field::RateAmount));
    }

    #[test]
    fn test_equipment_and_cargo() {
        let fields = message("Equipment: 53ft reefer\nWeight: 42,000 lbs\nPallets: 26\n");
        assert_eq!(fields.text(Field::EquipmentType), Some("Refrigerated"));
        assert_eq!(fields.number(Field::Weight), Some(42000.0));
        assert_eq!(fields.count(Field::Pallets), Some(26));
    }

    #[test]
    fn test_notes_rate_patterns() {
        let mut fields = ExtractedFields::new(DataSource::Csv, "row");
        apply_cascades("paid 2,300 dollars after detention", &NOTES_RATE_CASCADE, &mut fields);
        assert_eq!(fields.number(Field::RateAmount), Some(2300.0));
    }
}
