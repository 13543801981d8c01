// 🧹 Normalizer - dedup, merge and preference mining over a whole profile
//
// Steps run in a fixed order:
// 1. Broker dedup (MC id, else normalized company name)
// 2. Address resolution for brokers and lane endpoints
// 3. Lane dedup (directional origin→destination key)
// 4. Load dedup (load id, else synthesized `{mc}-{YYYYMMDD}`)
// 5. Stable ids, then refresh each load's broker/lane copy from the canonical one
// 6. Rate back-fill (per-mile ⇄ amount via lane distance)
// 7. Preference mining (top lanes, brokers, equipment)
//
// Merges only fill empty fields. Running it twice changes nothing.

use crate::entities::{stable_id, Broker, CarrierProfile, Lane, Load};
use crate::parser::AddressResolver;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Counters returned by one normalization run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationStats {
    /// Input broker count minus output broker count
    pub brokers_deduplicated: usize,
    /// Input load count minus output load count
    pub loads_deduplicated: usize,
    /// Lane key collisions merged away
    pub lanes_merged: usize,
    pub addresses_normalized: usize,
    pub rates_calculated: usize,
}

pub struct Normalizer {
    resolver: AddressResolver,
    top_lanes: usize,
    top_brokers: usize,
    top_equipment: usize,
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer {
            resolver: AddressResolver::new(),
            top_lanes: 10,
            top_brokers: 10,
            top_equipment: 5,
        }
    }

    /// Normalize a profile in place
    pub fn normalize(&self, profile: &mut CarrierProfile) -> NormalizationStats {
        let mut stats = NormalizationStats {
            brokers_deduplicated: dedup_brokers(&mut profile.brokers),
            ..NormalizationStats::default()
        };
        stats.addresses_normalized = self.normalize_addresses(profile);

        let (lanes_merged, lanes_dropped) = dedup_lanes(&mut profile.lanes);
        stats.lanes_merged = lanes_merged;
        stats.loads_deduplicated = dedup_loads(&mut profile.loads);

        assign_ids(profile);
        refresh_links(profile);
        stats.rates_calculated = backfill_rates(&mut profile.loads);
        self.mine_preferences(profile);

        info!(
            brokers_deduplicated = stats.brokers_deduplicated,
            loads_deduplicated = stats.loads_deduplicated,
            lanes_merged = stats.lanes_merged,
            lanes_dropped,
            addresses_normalized = stats.addresses_normalized,
            rates_calculated = stats.rates_calculated,
            "normalized profile"
        );
        stats
    }

    fn normalize_addresses(&self, profile: &mut CarrierProfile) -> usize {
        let mut normalized = 0;

        for broker in &mut profile.brokers {
            if let Some(address) = broker.company_address.as_mut() {
                if self.resolver.fill(address) {
                    normalized += 1;
                }
            }
        }

        for lane in &mut profile.lanes {
            for (address, city_state) in [
                (&mut lane.origin, &lane.origin_city_state),
                (&mut lane.destination, &lane.destination_city_state),
            ] {
                match address {
                    Some(address) => {
                        if self.resolver.fill(address) {
                            normalized += 1;
                        }
                    }
                    None => {
                        if let Some(text) = city_state {
                            *address = Some(self.resolver.resolve(text));
                            normalized += 1;
                        }
                    }
                }
            }
        }

        normalized
    }

    fn mine_preferences(&self, profile: &mut CarrierProfile) {
        profile.preferred_lanes = top_n(profile.loads.iter().filter_map(Load::lane_key), self.top_lanes);
        profile.preferred_brokers = top_n(profile.loads.iter().filter_map(Load::broker_mc), self.top_brokers);
        profile.preferred_equipment = top_n(
            profile
                .loads
                .iter()
                .filter_map(|l| l.equipment_type.as_deref())
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            self.top_equipment,
        );
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DEDUPLICATION
// ============================================================================

/// Merge brokers sharing a key into the first-seen one; keyless brokers are kept
fn dedup_brokers(brokers: &mut Vec<Broker>) -> usize {
    let before = brokers.len();
    let mut kept: Vec<Broker> = Vec::with_capacity(before);
    let mut index: HashMap<String, usize> = HashMap::new();

    for broker in brokers.drain(..) {
        match broker.dedup_key() {
            Some(key) => match index.get(&key) {
                Some(&i) => kept[i].merge_from(&broker),
                None => {
                    index.insert(key, kept.len());
                    kept.push(broker);
                }
            },
            None => kept.push(broker),
        }
    }

    *brokers = kept;
    before - brokers.len()
}

/// Merge lanes by key; lanes missing an endpoint are dropped
///
/// Returns (collisions merged, lanes dropped).
fn dedup_lanes(lanes: &mut Vec<Lane>) -> (usize, usize) {
    let mut kept: Vec<Lane> = Vec::with_capacity(lanes.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged = 0;
    let mut dropped = 0;

    for lane in lanes.drain(..) {
        let Some(key) = lane.key() else {
            dropped += 1;
            continue;
        };
        match index.get(&key) {
            Some(&i) => {
                kept[i].merge_from(&lane);
                merged += 1;
            }
            None => {
                index.insert(key, kept.len());
                kept.push(lane);
            }
        }
    }

    *lanes = kept;
    (merged, dropped)
}

/// Synthesized id for a load without one: `{mc}-{YYYYMMDD}`
pub fn synthesize_load_id(load: &Load) -> Option<String> {
    let mc = load.broker_mc()?;
    let pickup = load.pickup_date?;
    Some(format!("{}-{}", mc, pickup.format("%Y%m%d")))
}

fn dedup_loads(loads: &mut Vec<Load>) -> usize {
    let before = loads.len();
    let mut kept: Vec<Load> = Vec::with_capacity(before);
    let mut index: HashMap<String, usize> = HashMap::new();

    for mut load in loads.drain(..) {
        if load.dedup_key().is_none() {
            if let Some(id) = synthesize_load_id(&load) {
                load.load_id = Some(id);
            }
        }
        match load.dedup_key() {
            Some(key) => match index.get(&key) {
                Some(&i) => kept[i].merge_from(&load),
                None => {
                    index.insert(key, kept.len());
                    kept.push(load);
                }
            },
            None => kept.push(load),
        }
    }

    *loads = kept;
    before - loads.len()
}

// ============================================================================
// IDENTIFIERS & LINKS
// ============================================================================

fn assign_ids(profile: &mut CarrierProfile) {
    for broker in &mut profile.brokers {
        assign_broker_id(broker);
    }
    for lane in &mut profile.lanes {
        assign_lane_id(lane);
    }
    for load in &mut profile.loads {
        let key = load.dedup_key();
        let load_id = load.load_id.clone();
        if let Some(rate) = load.rate.as_mut() {
            if rate.load_id.is_none() {
                rate.load_id = load_id;
            }
            if rate.rate_id.is_none() {
                rate.rate_id = key.map(|k| stable_id("rate", &k));
            }
        }
    }
}

fn assign_broker_id(broker: &mut Broker) {
    if broker.broker_id.is_none() {
        broker.broker_id = broker.dedup_key().map(|k| stable_id("broker", &k));
    }
}

fn assign_lane_id(lane: &mut Lane) {
    if lane.lane_id.is_none() {
        lane.lane_id = lane.key().map(|k| stable_id("lane", &k));
    }
}

/// Back-fill each load's embedded broker/lane from the canonical entity
fn refresh_links(profile: &mut CarrierProfile) {
    let brokers: HashMap<String, &Broker> = profile
        .brokers
        .iter()
        .filter_map(|b| b.dedup_key().map(|k| (k, b)))
        .collect();
    let lanes: HashMap<String, &Lane> = profile
        .lanes
        .iter()
        .filter_map(|l| l.key().map(|k| (k, l)))
        .collect();

    for load in &mut profile.loads {
        if let Some(broker) = load.broker.as_mut() {
            if let Some(canonical) = broker.dedup_key().and_then(|k| brokers.get(&k)) {
                // canonical notes already carry this copy's notes
                if let (Some(mine), Some(theirs)) = (&broker.notes, &canonical.notes) {
                    if theirs.contains(mine.as_str()) {
                        broker.notes = None;
                    }
                }
                broker.merge_from(canonical);
            }
            assign_broker_id(broker);
        }
        if let Some(lane) = load.lane.as_mut() {
            if let Some(canonical) = lane.key().and_then(|k| lanes.get(&k)) {
                lane.fill_from(canonical);
            }
            assign_lane_id(lane);
        }
    }
}

// ============================================================================
// RATES
// ============================================================================

/// Keep amount and per-mile consistent through the lane distance
fn backfill_rates(loads: &mut [Load]) -> usize {
    let mut calculated = 0;
    for load in loads.iter_mut() {
        let Some(distance) = load.lane.as_ref().and_then(Lane::distance) else {
            continue;
        };
        if let Some(rate) = load.rate.as_mut() {
            if rate.derive_from_distance(distance) {
                calculated += 1;
            }
        }
    }
    calculated
}

// ============================================================================
// PREFERENCES
// ============================================================================

/// Most frequent values first; equal counts keep first-seen order
fn top_n(values: impl Iterator<Item = String>, n: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(n).map(|(value, _)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Address, DataSource, Rate};
    use chrono::NaiveDate;

    fn broker(mc: Option<&str>, company: Option<&str>) -> Broker {
        Broker {
            mc_id: mc.map(str::to_string),
            company_name: company.map(str::to_string),
            ..Broker::new(DataSource::Csv)
        }
    }

    fn load(id: Option<&str>, mc: &str, origin: &str, destination: &str) -> Load {
        Load {
            load_id: id.map(str::to_string),
            broker: Some(broker(Some(mc), Some("ABC Logistics"))),
            lane: Some(Lane::between(origin, destination, DataSource::Csv)),
            rate: Some(Rate::flat(1000.0, DataSource::Csv)),
            equipment_type: Some("Dry Van".to_string()),
            ..Load::default()
        }
    }

    #[test]
    fn test_broker_dedup_by_mc() {
        let mut profile = CarrierProfile::new();
        let mut first = broker(Some("MC-123456"), Some("ABC Logistics"));
        first.broker_phone_number = None;
        let mut second = broker(Some("123456 "), None);
        second.broker_phone_number = Some("555-0100".to_string());
        profile.brokers = vec![first, second, broker(None, None)];

        let stats = Normalizer::new().normalize(&mut profile);

        assert_eq!(stats.brokers_deduplicated, 1);
        assert_eq!(profile.brokers.len(), 2);
        assert_eq!(profile.brokers[0].broker_phone_number.as_deref(), Some("555-0100"));
        assert_eq!(profile.brokers[0].company_name.as_deref(), Some("ABC Logistics"));
        // keyless broker survives without an id
        assert_eq!(profile.brokers[1].broker_id, None);
    }

    #[test]
    fn test_broker_dedup_by_company_name() {
        let mut profile = CarrierProfile::new();
        profile.brokers = vec![
            broker(None, Some("Acme Freight, Inc.")),
            broker(None, Some("ACME FREIGHT")),
        ];
        let stats = Normalizer::new().normalize(&mut profile);
        assert_eq!(stats.brokers_deduplicated, 1);
        assert_eq!(profile.brokers[0].company_name.as_deref(), Some("Acme Freight, Inc."));
    }

    #[test]
    fn test_lane_dedup_and_drop() {
        let mut profile = CarrierProfile::new();
        let mut with_distance = Lane::between("Miami ,  FL", "Tampa, fl", DataSource::Pdf);
        with_distance.distance_miles = Some(280.0);
        let incomplete = Lane {
            origin_city_state: Some("Miami, FL".to_string()),
            ..Lane::default()
        };
        profile.lanes = vec![
            Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv),
            with_distance,
            Lane::between("Tampa, FL", "Miami, FL", DataSource::Csv),
            incomplete,
        ];

        let stats = Normalizer::new().normalize(&mut profile);

        assert_eq!(stats.lanes_merged, 1);
        assert_eq!(profile.lanes.len(), 2);
        assert_eq!(profile.lanes[0].distance_miles, Some(280.0));
        assert_eq!(profile.lanes[0].source, DataSource::Csv);
        assert!(profile.lanes[0].lane_id.as_deref().unwrap().starts_with("lane_"));
    }

    #[test]
    fn test_load_dedup_and_synthesized_id() {
        let mut profile = CarrierProfile::new();
        let first = load(Some("L1"), "111", "Miami, FL", "Tampa, FL");
        let mut duplicate = load(Some(" l1 "), "111", "Miami, FL", "Tampa, FL");
        duplicate.pickup_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut anonymous = load(None, "MC-222", "Miami, FL", "Tampa, FL");
        anonymous.pickup_date = NaiveDate::from_ymd_opt(2024, 3, 2);
        let mut orphan = load(None, "333", "Miami, FL", "Tampa, FL");
        orphan.pickup_date = None;
        profile.loads = vec![first, duplicate, anonymous, orphan];

        let stats = Normalizer::new().normalize(&mut profile);

        assert_eq!(stats.loads_deduplicated, 1);
        assert_eq!(profile.loads.len(), 3);
        assert_eq!(profile.loads[0].pickup_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(profile.loads[1].load_id.as_deref(), Some("222-20240302"));
        assert_eq!(profile.loads[2].load_id, None);
    }

    #[test]
    fn test_distance_reaches_loads_and_rates_backfill() {
        let mut profile = CarrierProfile::new();
        let mut canonical = Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv);
        canonical.distance_miles = Some(250.0);
        profile.lanes = vec![canonical];

        let mut per_mile_only = load(Some("L2"), "111", "Miami, FL", "Tampa, FL");
        per_mile_only.rate = Some(Rate {
            rate_per_mile: Some(3.0),
            ..Rate::default()
        });
        profile.loads = vec![load(Some("L1"), "111", "Miami, FL", "Tampa, FL"), per_mile_only];

        let stats = Normalizer::new().normalize(&mut profile);

        assert_eq!(stats.rates_calculated, 2);
        let first = profile.loads[0].rate.as_ref().unwrap();
        assert!((first.rate_per_mile.unwrap() - 4.0).abs() < 1e-9);
        let second = profile.loads[1].rate.as_ref().unwrap();
        assert!((second.rate_amount.unwrap() - 750.0).abs() < 1e-9);
        assert_eq!(second.load_id.as_deref(), Some("L2"));
        assert!(second.rate_id.is_some());
    }

    #[test]
    fn test_addresses_resolved() {
        let mut profile = CarrierProfile::new();
        let mut b = broker(Some("1"), Some("ABC"));
        b.company_address = Some(Address::from_raw("100 Bay St, Miami, FL 33101"));
        profile.brokers = vec![b];
        profile.lanes = vec![Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv)];

        let stats = Normalizer::new().normalize(&mut profile);

        assert_eq!(stats.addresses_normalized, 3);
        let address = profile.brokers[0].company_address.as_ref().unwrap();
        assert_eq!(address.city.as_deref(), Some("Miami"));
        assert_eq!(address.zip_code.as_deref(), Some("33101"));
        assert_eq!(
            profile.lanes[0].destination.as_ref().and_then(|a| a.state.as_deref()),
            Some("FL")
        );
    }

    #[test]
    fn test_preferences_ranked_by_frequency_then_first_seen() {
        let mut profile = CarrierProfile::new();
        profile.loads = vec![
            load(Some("1"), "900", "Austin, TX", "Dallas, TX"),
            load(Some("2"), "100", "Miami, FL", "Tampa, FL"),
            load(Some("3"), "100", "Miami, FL", "Tampa, FL"),
            load(Some("4"), "900", "Austin, TX", "Dallas, TX"),
            load(Some("5"), "500", "Reno, NV", "Boise, ID"),
        ];
        profile.loads[4].equipment_type = Some("Flatbed".to_string());

        Normalizer::new().normalize(&mut profile);

        assert_eq!(
            profile.preferred_lanes,
            vec!["Austin, TX→Dallas, TX", "Miami, FL→Tampa, FL", "Reno, NV→Boise, ID"]
        );
        assert_eq!(profile.preferred_brokers, vec!["900", "100", "500"]);
        assert_eq!(profile.preferred_equipment, vec!["Dry Van", "Flatbed"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let values = (0..15).map(|i| format!("v{}", i));
        assert_eq!(top_n(values, 10).len(), 10);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut profile = CarrierProfile::new();
        profile.brokers = vec![
            broker(Some("MC-1"), Some("ABC Logistics")),
            broker(Some("1"), Some("ABC Logistics LLC")),
        ];
        profile.lanes = vec![
            Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv),
            Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv),
        ];
        let mut anonymous = load(None, "1", "Miami, FL", "Tampa, FL");
        anonymous.pickup_date = NaiveDate::from_ymd_opt(2024, 1, 5);
        profile.loads = vec![
            load(Some("A"), "1", "Miami, FL", "Tampa, FL"),
            load(Some("a"), "1", "Miami, FL", "Tampa, FL"),
            anonymous,
        ];

        let normalizer = Normalizer::new();
        normalizer.normalize(&mut profile);
        let once = profile.clone();
        let stats = normalizer.normalize(&mut profile);

        assert_eq!(profile, once);
        assert_eq!(stats, NormalizationStats::default());
    }
}
