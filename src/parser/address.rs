// 📍 AddressResolver - best-effort structure for free-form location text
//
// Not a geocoder: it only spots a state code, a zip and the city in front of
// the state. Text without a state code keeps just its raw form.

use crate::entities::Address;
use once_cell::sync::Lazy;
use regex::Regex;

static STATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{2})\b").expect("valid state regex"));

static ZIP_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5}(?:-\d{4})?|\d{9})\b").expect("valid zip regex"));

/// USPS state, district and territory codes
const STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "PR", "GU", "VI", "AS", "MP",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AddressResolver;

impl AddressResolver {
    pub fn new() -> Self {
        AddressResolver
    }

    /// Parse location text into an Address
    ///
    /// "123 Main St, Miami, FL 33101" → street "123 Main St", city "Miami",
    /// state "FL", zip "33101".
    pub fn resolve(&self, text: &str) -> Address {
        let raw = text.trim();
        let mut address = Address::from_raw(raw);

        let Some((state, state_start)) = find_state(raw) else {
            return address;
        };
        address.state = Some(state);
        address.zip_code = find_zip(raw, state_start);

        let before_state = raw[..state_start]
            .trim_end_matches(|c: char| c == ',' || c.is_whitespace());
        let segments: Vec<&str> = before_state
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        address.city = segments.last().map(|city| city.to_string());
        if segments.len() >= 2 && segments[0].starts_with(|c: char| c.is_ascii_digit()) {
            address.street = Some(segments[0].to_string());
        }

        address
    }

    /// Fill missing components of `address` from its raw text
    ///
    /// Returns true when at least one component was added.
    pub fn fill(&self, address: &mut Address) -> bool {
        if !address.is_unresolved() {
            return false;
        }
        let Some(raw) = address.raw_address.clone() else {
            return false;
        };
        let resolved = self.resolve(&raw);
        if resolved.is_unresolved() {
            return false;
        }
        address.fill_from(&resolved);
        true
    }
}

/// Last known state code, else the first two-letter uppercase token
fn find_state(text: &str) -> Option<(String, usize)> {
    let tokens: Vec<(String, usize)> = STATE_TOKEN
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| (m.as_str().to_string(), m.start()))
        .collect();

    tokens
        .iter()
        .rev()
        .find(|(token, _)| STATE_CODES.contains(&token.as_str()))
        .or_else(|| tokens.first())
        .cloned()
}

/// The zip follows the state; a leading street number is never one
fn find_zip(text: &str, state_start: usize) -> Option<String> {
    let zips: Vec<_> = ZIP_TOKEN
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .collect();
    zips.iter()
        .find(|m| m.start() > state_start)
        .or_else(|| zips.last())
        .map(|m| m.as_str().to_string())
}
