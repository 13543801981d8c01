use super::{Broker, Lane, Load};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CarrierProfile - everything learned about one carrier
///
/// Owns its brokers, lanes and loads. Preference lists are mined by the
/// normalizer and read by the match scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierProfile {
    pub carrier_id: Option<String>,
    pub carrier_name: Option<String>,
    pub mc_number: Option<String>,

    #[serde(default)]
    pub brokers: Vec<Broker>,
    #[serde(default)]
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub loads: Vec<Load>,

    /// Lane keys, most frequent first
    #[serde(default)]
    pub preferred_lanes: Vec<String>,
    #[serde(default)]
    pub preferred_equipment: Vec<String>,
    /// Broker MC ids, most frequent first
    #[serde(default)]
    pub preferred_brokers: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CarrierProfile {
    pub fn new() -> Self {
        let now = Utc::now();
        CarrierProfile {
            carrier_id: None,
            carrier_name: None,
            mc_number: None,
            brokers: Vec::new(),
            lanes: Vec::new(),
            loads: Vec::new(),
            preferred_lanes: Vec::new(),
            preferred_equipment: Vec::new(),
            preferred_brokers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append another profile's collections (no dedup - that is the normalizer's job)
    pub fn absorb(&mut self, other: CarrierProfile) {
        self.brokers.extend(other.brokers);
        self.lanes.extend(other.lanes);
        self.loads.extend(other.loads);
    }

    pub fn is_empty(&self) -> bool {
        self.brokers.is_empty() && self.lanes.is_empty() && self.loads.is_empty()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for CarrierProfile {
    fn default() -> Self {
        Self::new()
    }
}
