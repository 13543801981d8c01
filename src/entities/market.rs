use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a market figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentSource {
    Dat,
    Truckstop,
    Fmcsa,
    DoeIndex,
    Internal,
    /// Produced by the fallback estimator
    Estimated,
}

impl EnrichmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentSource::Dat => "dat",
            EnrichmentSource::Truckstop => "truckstop",
            EnrichmentSource::Fmcsa => "fmcsa",
            EnrichmentSource::DoeIndex => "doe_index",
            EnrichmentSource::Internal => "internal",
            EnrichmentSource::Estimated => "estimated",
        }
    }
}

/// Market snapshot for one directional lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedData {
    pub lane_id: Option<String>,
    pub origin_city_state: Option<String>,
    pub destination_city_state: Option<String>,
    pub average_rate: Option<f64>,
    pub average_rate_per_mile: Option<f64>,
    pub market_range_low: Option<f64>,
    pub market_range_high: Option<f64>,
    pub average_distance: Option<f64>,
    pub average_transit_time_hours: Option<f64>,
    /// 0 - 1, relative booking volume on the lane
    pub volume_index: Option<f64>,
    pub enrichment_source: EnrichmentSource,
    /// 0 - 1
    pub confidence_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl EnrichedData {
    pub fn new(enrichment_source: EnrichmentSource) -> Self {
        EnrichedData {
            lane_id: None,
            origin_city_state: None,
            destination_city_state: None,
            average_rate: None,
            average_rate_per_mile: None,
            market_range_low: None,
            market_range_high: None,
            average_distance: None,
            average_transit_time_hours: None,
            volume_index: None,
            enrichment_source,
            confidence_score: 0.0,
            last_updated: Utc::now(),
        }
    }
}
