use super::{Address, DataSource};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Legal suffixes ignored when comparing company names
const LEGAL_SUFFIXES: &[&str] = &["LLC", "INC", "CORP", "LTD", "LP", "LLP", "CO", "CORPORATION"];

/// Broker - the counterparty that tendered a load
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Broker {
    pub broker_id: Option<String>,
    /// Point-of-contact name
    pub broker_name: Option<String>,
    pub company_name: Option<String>,
    /// Motor-carrier registration number, digits only
    pub mc_id: Option<String>,
    pub broker_phone_number: Option<String>,
    pub broker_email: Option<String>,
    pub company_address: Option<Address>,
    pub date_of_contract: Option<NaiveDate>,
    pub load_board: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub source: DataSource,
}

impl Broker {
    pub fn new(source: DataSource) -> Self {
        Broker {
            source,
            ..Broker::default()
        }
    }

    /// Normalized MC id, if it has any digits
    pub fn normalized_mc(&self) -> Option<String> {
        self.mc_id
            .as_deref()
            .map(normalize_mc_id)
            .filter(|mc| !mc.is_empty())
    }

    /// Dedup key: `mc:<digits>` when an MC id exists, else `name:<normalized company>`
    pub fn dedup_key(&self) -> Option<String> {
        if let Some(mc) = self.normalized_mc() {
            return Some(format!("mc:{}", mc));
        }
        self.company_name
            .as_deref()
            .map(normalize_company_name)
            .filter(|name| !name.is_empty())
            .map(|name| format!("name:{}", name))
    }

    /// Best label for display (company, then contact, then MC)
    pub fn display_name(&self) -> String {
        self.company_name
            .clone()
            .or_else(|| self.broker_name.clone())
            .or_else(|| self.mc_id.as_ref().map(|mc| format!("MC {}", mc)))
            .unwrap_or_else(|| "unknown broker".to_string())
    }

    /// Merge a duplicate into this broker
    ///
    /// Empty fields are filled from `other`; populated fields never change.
    /// Notes are appended with "; " unless already contained.
    pub fn merge_from(&mut self, other: &Broker) {
        fill(&mut self.broker_id, &other.broker_id);
        fill(&mut self.broker_name, &other.broker_name);
        fill(&mut self.company_name, &other.company_name);
        fill(&mut self.mc_id, &other.mc_id);
        fill(&mut self.broker_phone_number, &other.broker_phone_number);
        fill(&mut self.broker_email, &other.broker_email);
        fill(&mut self.load_board, &other.load_board);
        if self.company_address.is_none() {
            self.company_address = other.company_address.clone();
        }
        if self.date_of_contract.is_none() {
            self.date_of_contract = other.date_of_contract;
        }

        match (&self.notes, &other.notes) {
            (None, Some(new)) if !new.is_empty() => self.notes = Some(new.clone()),
            (Some(existing), Some(new)) if !new.is_empty() && !existing.contains(new.as_str()) => {
                self.notes = Some(format!("{}; {}", existing, new));
            }
            _ => {}
        }
    }
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.is_none() {
        if let Some(value) = source {
            *target = Some(value.clone());
        }
    }
}

/// Strip every non-digit character
///
/// "MC-123456" → "123456", "123456 " → "123456"
pub fn normalize_mc_id(mc_id: &str) -> String {
    mc_id.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a company name for comparison
///
/// Uppercase, punctuation removed, whitespace collapsed, trailing legal suffixes dropped.
/// "ABC Logistics, L.L.C." → "ABC LOGISTICS"
pub fn normalize_company_name(name: &str) -> String {
    let cleaned: String = name
        .to_uppercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    while tokens.len() > 1 {
        match tokens.last() {
            Some(last) if LEGAL_SUFFIXES.contains(last) => {
                tokens.pop();
            }
            _ => break,
        }
    }

    tokens.join(" ")
}
