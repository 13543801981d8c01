use super::{normalize_mc_id, Broker, DataSource, EnrichmentSource, Lane};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// RATE
// ============================================================================

/// How a rate amount is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Flat,
    PerMile,
    PerHour,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Flat => "flat",
            RateType::PerMile => "per_mile",
            RateType::PerHour => "per_hour",
        }
    }
}

/// Rate - what a load paid
///
/// Invariant: when amount and distance are both known,
/// `rate_per_mile == rate_amount / distance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub rate_id: Option<String>,
    pub load_id: Option<String>,
    pub rate_amount: Option<f64>,
    pub rate_per_mile: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub rate_type: Option<RateType>,
    #[serde(default)]
    pub source: DataSource,
    /// Set when a figure was derived rather than extracted
    pub enrichment_source: Option<EnrichmentSource>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Rate {
    fn default() -> Self {
        Rate {
            rate_id: None,
            load_id: None,
            rate_amount: None,
            rate_per_mile: None,
            currency: default_currency(),
            rate_type: None,
            source: DataSource::default(),
            enrichment_source: None,
        }
    }
}

impl Rate {
    pub fn new(source: DataSource) -> Self {
        Rate {
            source,
            ..Rate::default()
        }
    }

    /// Flat rate for a known amount
    pub fn flat(amount: f64, source: DataSource) -> Self {
        Rate {
            rate_amount: Some(amount),
            rate_type: Some(RateType::Flat),
            source,
            ..Rate::default()
        }
    }

    /// Fill missing amount/per-mile figures from a distance
    ///
    /// Returns true when a figure was derived.
    pub fn derive_from_distance(&mut self, distance: f64) -> bool {
        if distance <= 0.0 {
            return false;
        }
        match (self.rate_amount, self.rate_per_mile) {
            (Some(amount), None) => {
                self.rate_per_mile = Some(amount / distance);
                true
            }
            (None, Some(per_mile)) => {
                self.rate_amount = Some(per_mile * distance);
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// LOAD
// ============================================================================

/// Booking status of a historical load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Booked,
    Completed,
    Cancelled,
}

/// Load - one booked shipment
///
/// Embeds copies of its broker, lane and rate so a load can be scored
/// or serialized on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Load {
    pub load_id: Option<String>,
    pub broker: Option<Broker>,
    /// MC id as stated on the booking, kept even when no broker was built
    pub broker_mc_id: Option<String>,
    pub lane: Option<Lane>,
    pub rate: Option<Rate>,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub booking_date: Option<NaiveDate>,
    pub equipment_type: Option<String>,
    pub weight: Option<f64>,
    pub pallets: Option<u32>,
    pub pieces: Option<u32>,
    #[serde(default)]
    pub status: LoadStatus,
    pub notes: Option<String>,
    pub load_board: Option<String>,
    #[serde(default)]
    pub source: DataSource,
    /// Field dictionary of the input unit this load came from
    #[serde(default)]
    pub raw_data: BTreeMap<String, String>,
}

impl Load {
    pub fn new(load_id: &str, source: DataSource) -> Self {
        Load {
            load_id: Some(load_id.to_string()),
            source,
            ..Load::default()
        }
    }

    /// Dedup key: trimmed, uppercased load id
    pub fn dedup_key(&self) -> Option<String> {
        self.load_id
            .as_deref()
            .map(|id| id.trim().to_uppercase())
            .filter(|id| !id.is_empty())
    }

    /// Digit-normalized MC id of the owning broker, else the stated one
    pub fn broker_mc(&self) -> Option<String> {
        self.broker.as_ref().and_then(Broker::normalized_mc).or_else(|| {
            self.broker_mc_id
                .as_deref()
                .map(normalize_mc_id)
                .filter(|mc| !mc.is_empty())
        })
    }

    /// Normalized lane key
    pub fn lane_key(&self) -> Option<String> {
        self.lane.as_ref().and_then(Lane::key)
    }

    pub fn rate_amount(&self) -> Option<f64> {
        self.rate.as_ref().and_then(|r| r.rate_amount)
    }

    /// Per-mile rate: stored figure, else amount / lane distance
    pub fn rate_per_mile(&self) -> Option<f64> {
        let rate = self.rate.as_ref()?;
        if let Some(per_mile) = rate.rate_per_mile {
            return Some(per_mile);
        }
        let distance = self.lane.as_ref().and_then(Lane::distance)?;
        rate.rate_amount.map(|amount| amount / distance)
    }

    /// Fill dates, rate and equipment from a duplicate (never overwrites)
    pub fn merge_from(&mut self, other: &Load) {
        if self.pickup_date.is_none() {
            self.pickup_date = other.pickup_date;
        }
        if self.delivery_date.is_none() {
            self.delivery_date = other.delivery_date;
        }
        if self.rate.is_none() {
            self.rate = other.rate.clone();
        }
        if self.broker_mc_id.is_none() {
            self.broker_mc_id = other.broker_mc_id.clone();
        }
        if self.equipment_type.is_none() {
            self.equipment_type = other.equipment_type.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_with_lane(amount: Option<f64>, distance: Option<f64>) -> Load {
        let mut lane = Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv);
        lane.distance_miles = distance;
        Load {
            load_id: Some("L1".to_string()),
            lane: Some(lane),
            rate: Some(Rate {
                rate_amount: amount,
                ..Rate::default()
            }),
            ..Load::default()
        }
    }

    #[test]
    fn test_dedup_key_normalizes_case_and_space() {
        let load = Load::new("  ab-12 ", DataSource::Csv);
        assert_eq!(load.dedup_key().as_deref(), Some("AB-12"));
        assert_eq!(Load::new("   ", DataSource::Csv).dedup_key(), None);
    }

    #[test]
    fn test_rate_per_mile_computed_from_distance() {
        let load = load_with_lane(Some(1000.0), Some(250.0));
        assert_eq!(load.rate_per_mile(), Some(4.0));

        let no_distance = load_with_lane(Some(1000.0), None);
        assert_eq!(no_distance.rate_per_mile(), None);
    }

    #[test]
    fn test_derive_from_distance_both_directions() {
        let mut rate = Rate::flat(900.0, DataSource::Csv);
        assert!(rate.derive_from_distance(300.0));
        assert_eq!(rate.rate_per_mile, Some(3.0));

        let mut per_mile = Rate {
            rate_per_mile: Some(2.5),
            ..Rate::default()
        };
        assert!(per_mile.derive_from_distance(100.0));
        assert_eq!(per_mile.rate_amount, Some(250.0));

        // Nothing to derive once both are present
        assert!(!per_mile.derive_from_distance(100.0));
        assert!(!Rate::flat(10.0, DataSource::Csv).derive_from_distance(0.0));
    }

    #[test]
    fn test_merge_fills_missing_only() {
        let mut first = Load::new("L1", DataSource::Csv);
        first.equipment_type = Some("Flatbed".to_string());

        let mut second = Load::new("l1", DataSource::Pdf);
        second.equipment_type = Some("Dry Van".to_string());
        second.pickup_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        second.rate = Some(Rate::flat(1200.0, DataSource::Pdf));

        first.merge_from(&second);

        assert_eq!(first.equipment_type.as_deref(), Some("Flatbed"));
        assert_eq!(first.pickup_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(first.rate_amount(), Some(1200.0));
    }

    #[test]
    fn test_broker_mc_falls_back_to_stated_mc() {
        let mut load = Load::new("L77", DataSource::Email);
        assert_eq!(load.broker_mc(), None);

        load.broker_mc_id = Some("MC# 123456".to_string());
        assert_eq!(load.broker_mc().as_deref(), Some("123456"));

        load.broker = Some(Broker {
            mc_id: Some("778899".to_string()),
            ..Broker::new(DataSource::Email)
        });
        assert_eq!(load.broker_mc().as_deref(), Some("778899"));
    }

    #[test]
    fn test_rate_type_tags() {
        assert_eq!(serde_json::to_string(&RateType::PerMile).unwrap(), "\"per_mile\"");
        assert_eq!(serde_json::to_string(&LoadStatus::Booked).unwrap(), "\"booked\"");
        assert_eq!(Rate::default().currency, "USD");
    }
}
