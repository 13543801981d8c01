// 📈 Enrichment - market benchmarks for lanes, estimated when nothing better exists
//
// Sources are consulted in registration order. The estimator always answers,
// so enrichment never fails.

use crate::entities::{
    lane_key, stable_id, DataSource, EnrichedData, EnrichmentSource, Lane, Load, Rate, RateType,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Placeholder distance when both endpoints are known but no distance is
pub const ASSUMED_DISTANCE_MILES: f64 = 500.0;
/// Assumed average speed for transit estimates
pub const AVERAGE_SPEED_MPH: f64 = 50.0;
pub const ESTIMATE_CONFIDENCE: f64 = 0.6;
pub const ESTIMATE_VOLUME_INDEX: f64 = 0.5;

// ============================================================================
// MARKET SOURCES
// ============================================================================

/// MarketSource - a provider of lane benchmarks (load board, rate index, cache)
pub trait MarketSource: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> EnrichmentSource;

    /// `None` when the source knows nothing about the lane
    fn lookup(&self, lane: &Lane) -> Option<EnrichedData>;
}

/// Previously stored snapshots, keyed by lane
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshotCache {
    snapshots: HashMap<String, EnrichedData>,
}

impl MarketSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later snapshots for the same lane replace earlier ones
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = EnrichedData>) -> Self {
        let mut cache = Self::new();
        for snapshot in snapshots {
            cache.insert(snapshot);
        }
        cache
    }

    /// Returns false for a snapshot without both endpoints
    pub fn insert(&mut self, snapshot: EnrichedData) -> bool {
        let key = match (&snapshot.origin_city_state, &snapshot.destination_city_state) {
            (Some(origin), Some(destination)) => lane_key(origin, destination),
            _ => None,
        };
        match key {
            Some(key) => {
                self.snapshots.insert(key, snapshot);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl MarketSource for MarketSnapshotCache {
    fn name(&self) -> &str {
        "snapshot-cache"
    }

    fn source(&self) -> EnrichmentSource {
        EnrichmentSource::Internal
    }

    fn lookup(&self, lane: &Lane) -> Option<EnrichedData> {
        self.snapshots.get(&lane.key()?).cloned()
    }
}

// ============================================================================
// ESTIMATOR
// ============================================================================

pub struct EnrichmentEstimator {
    sources: Vec<Box<dyn MarketSource>>,
    rng: Mutex<StdRng>,
}

impl EnrichmentEstimator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Reproducible variation
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        EnrichmentEstimator {
            sources: Vec::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Register a source ahead of the estimator fallback
    pub fn with_source(mut self, source: Box<dyn MarketSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Benchmarks for a lane: first source that answers, else the estimate
    pub fn enrich(&self, lane: &Lane) -> EnrichedData {
        for source in &self.sources {
            if let Some(data) = source.lookup(lane) {
                debug!(
                    source = source.name(),
                    kind = source.source().as_str(),
                    lane = ?lane.key(),
                    "market source hit"
                );
                return data;
            }
        }
        self.estimate(lane)
    }

    /// Distance-bracket estimate with ±20% variation
    pub fn estimate(&self, lane: &Lane) -> EnrichedData {
        let both_endpoints = lane.origin_city_state.is_some() && lane.destination_city_state.is_some();
        let distance = lane
            .distance()
            .or(both_endpoints.then_some(ASSUMED_DISTANCE_MILES));

        let base = base_rate_per_mile(distance);
        let variation: f64 = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(0.8..1.2)
        };
        let per_mile = base * variation;
        let amount = distance.map(|d| per_mile * d);

        let mut data = EnrichedData::new(EnrichmentSource::Estimated);
        data.lane_id = lane
            .lane_id
            .clone()
            .or_else(|| lane.key().map(|k| stable_id("lane", &k)));
        data.origin_city_state = lane.origin_city_state.clone();
        data.destination_city_state = lane.destination_city_state.clone();
        data.average_rate_per_mile = Some(per_mile);
        data.average_rate = amount;
        data.market_range_low = amount.map(|a| a * 0.85);
        data.market_range_high = amount.map(|a| a * 1.15);
        data.average_distance = distance;
        data.average_transit_time_hours = distance.map(|d| d / AVERAGE_SPEED_MPH);
        data.volume_index = Some(ESTIMATE_VOLUME_INDEX);
        data.confidence_score = ESTIMATE_CONFIDENCE;
        data
    }

    /// Derive the missing half of a rate from the lane distance
    ///
    /// Returns true when a figure was derived; the rate is then marked estimated.
    pub fn enrich_rate(&self, rate: &mut Rate, lane: Option<&Lane>) -> bool {
        let Some(distance) = lane.and_then(Lane::distance) else {
            return false;
        };
        if rate.derive_from_distance(distance) {
            rate.enrichment_source = Some(EnrichmentSource::Estimated);
            return true;
        }
        false
    }

    /// Give every load without a rate amount one from its lane's benchmark
    ///
    /// The canonical lane (same key) is preferred over the load's own copy.
    /// Loads on the same lane share one benchmark.
    /// Returns the number of loads that gained an amount.
    pub fn fill_missing_rates(&self, loads: &mut [Load], lanes: &[Lane]) -> usize {
        self.fill_rates_from(loads, lanes, &MarketSnapshotCache::new())
    }

    /// Like `fill_missing_rates`, but benchmarks already in `snapshots` are
    /// used as-is so filled amounts agree with them
    pub fn fill_rates_from(
        &self,
        loads: &mut [Load],
        lanes: &[Lane],
        snapshots: &MarketSnapshotCache,
    ) -> usize {
        let by_key: HashMap<String, &Lane> = lanes
            .iter()
            .filter_map(|lane| lane.key().map(|k| (k, lane)))
            .collect();
        let mut benchmarks = snapshots.clone();

        let mut filled = 0;
        for load in loads.iter_mut() {
            if load.rate_amount().is_some() {
                continue;
            }
            let lane = load
                .lane_key()
                .and_then(|k| by_key.get(&k).copied())
                .or(load.lane.as_ref())
                .cloned();
            let Some(lane) = lane else {
                continue;
            };

            if let Some(rate) = load.rate.as_mut() {
                if self.enrich_rate(rate, Some(&lane)) {
                    filled += 1;
                    continue;
                }
            }

            let enriched = match benchmarks.lookup(&lane) {
                Some(data) => data,
                None => {
                    let data = self.enrich(&lane);
                    benchmarks.insert(data.clone());
                    data
                }
            };
            let Some(amount) = enriched.average_rate else {
                continue;
            };

            let rate = load.rate.get_or_insert_with(Rate::default);
            rate.rate_amount = Some(amount);
            // both figures describe the benchmark trip
            rate.rate_per_mile = enriched.average_rate_per_mile.or_else(|| {
                enriched
                    .average_distance
                    .filter(|d| *d > 0.0)
                    .map(|d| amount / d)
            });
            if rate.rate_type.is_none() {
                rate.rate_type = Some(RateType::Flat);
            }
            if rate.load_id.is_none() {
                rate.load_id = load.load_id.clone();
            }
            rate.source = DataSource::Enriched;
            rate.enrichment_source = Some(enriched.enrichment_source);
            filled += 1;
        }
        filled
    }

    /// One benchmark per lane, in lane order
    pub fn enrich_lanes(&self, lanes: &[Lane]) -> Vec<EnrichedData> {
        lanes.iter().map(|lane| self.enrich(lane)).collect()
    }
}

impl Default for EnrichmentEstimator {
    fn default() -> Self {
        Self::new()
    }
}

fn base_rate_per_mile(distance: Option<f64>) -> f64 {
    match distance {
        Some(d) if d < 100.0 => 2.50,
        Some(d) if d < 500.0 => 2.00,
        Some(_) => 1.75,
        None => 2.00,
    }
}
