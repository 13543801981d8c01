// Entity Models - the canonical carrier profile
//
// Every entity is a plain value:
// - Optional fields are `None`, never empty strings
// - Identity keys are derived from normalized content (MC id, lane pair, load id)
// - Each entity flattens to a field mapping for the persistence/API collaborators

pub mod address;
pub mod broker;
pub mod lane;
pub mod load;
pub mod market;
pub mod profile;

pub use address::Address;
pub use broker::{normalize_company_name, normalize_mc_id, Broker};
pub use lane::{lane_key, normalize_city_state, Lane};
pub use load::{Load, LoadStatus, Rate, RateType};
pub use market::{EnrichedData, EnrichmentSource};
pub use profile::CarrierProfile;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

// ============================================================================
// DATA SOURCE
// ============================================================================

/// DataSource - which input format produced an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Delimited text (CSV)
    Csv,
    /// Tabular sheet rows
    Excel,
    /// Text extracted from a document
    Pdf,
    /// Free-text message body
    Email,
    /// Entered by hand / supplied by an API caller
    #[default]
    Manual,
    /// Filled in by the enrichment estimator
    Enriched,
}

impl DataSource {
    /// String tag used in flattened records
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Csv => "csv",
            DataSource::Excel => "excel",
            DataSource::Pdf => "pdf",
            DataSource::Email => "email",
            DataSource::Manual => "manual",
            DataSource::Enriched => "enriched",
        }
    }
}

// ============================================================================
// FLATTENING
// ============================================================================

/// Flatten - expose an entity as a plain field mapping
///
/// Enums serialize to their string tag, dates to ISO-8601 text.
pub trait Flatten: Serialize {
    fn to_record(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl Flatten for Address {}
impl Flatten for Broker {}
impl Flatten for Lane {}
impl Flatten for Rate {}
impl Flatten for Load {}
impl Flatten for CarrierProfile {}
impl Flatten for EnrichedData {}

// ============================================================================
// STABLE IDENTIFIERS
// ============================================================================

/// Deterministic identifier derived from a normalized key
///
/// Same key → same id, across runs and processes.
/// Example: `stable_id("lane", "Miami, FL→Tampa, FL")` → `"lane_3f0c…"` (16 hex chars)
pub fn stable_id(prefix: &str, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}_{}", prefix, &digest[..16])
}

/// Treat blank strings as absent
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
