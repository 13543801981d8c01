// 🎯 Load Matching - rank candidate loads against a carrier's history
//
// Score = weighted sum of independent signals, evaluated in order:
// broker → lane → equipment → rate quality. Clamped to 1.0.
// Carriers with almost no history get a flat base score instead of ~0.

use crate::entities::{lane_key, normalize_mc_id, CarrierProfile, Flatten, Load};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reason given when a sparse history gets the base score
pub const BASE_MATCH_REASON: &str = "new carrier — base match score";
pub const BASE_MATCH_SCORE: f64 = 0.3;
/// Below this score a sparse history falls back to the base score
const FALLBACK_THRESHOLD: f64 = 0.1;
/// Histories shorter than this count as sparse
const SPARSE_HISTORY_LOADS: usize = 5;
const REVERSE_LANE_FACTOR: f64 = 0.7;
const HISTORICAL_BROKER_FACTOR: f64 = 0.5;
/// Maximum relative distance from the historical average that still scores
const RATE_TOLERANCE: f64 = 0.2;
pub const HIGH_CONFIDENCE_SCORE: f64 = 0.7;

/// Signal weights; they sum above 1.0 and the final score is clamped
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchWeights {
    pub past_broker: f64,
    pub past_lane: f64,
    pub preferred_lane: f64,
    pub preferred_equipment: f64,
    pub rate_quality: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        MatchWeights {
            past_broker: 0.30,
            past_lane: 0.40,
            preferred_lane: 0.20,
            preferred_equipment: 0.10,
            rate_quality: 0.10,
        }
    }
}

/// A scored candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadMatch {
    pub load: Load,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl Flatten for LoadMatch {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSummary {
    pub total_matches: usize,
    pub average_score: f64,
    /// Matches scoring at least 0.7
    pub high_confidence_matches: usize,
    /// Reason prefix (text before the first ':') → count
    pub match_distribution: BTreeMap<String, usize>,
}

pub struct MatchScorer<'a> {
    profile: &'a CarrierProfile,
    weights: MatchWeights,
    preferred_brokers: Vec<String>,
    preferred_lanes: Vec<String>,
    historical_brokers: Vec<String>,
    historical_rate_avg: Option<f64>,
}

impl<'a> MatchScorer<'a> {
    pub fn new(profile: &'a CarrierProfile) -> Self {
        Self::with_weights(profile, MatchWeights::default())
    }

    pub fn with_weights(profile: &'a CarrierProfile, weights: MatchWeights) -> Self {
        let preferred_brokers = profile
            .preferred_brokers
            .iter()
            .map(|mc| normalize_mc_id(mc))
            .collect();
        let preferred_lanes = profile
            .preferred_lanes
            .iter()
            .map(|key| normalize_lane_key(key))
            .collect();
        let historical_brokers = profile.loads.iter().filter_map(Load::broker_mc).collect();

        let rates: Vec<f64> = profile.loads.iter().filter_map(Load::rate_per_mile).collect();
        let historical_rate_avg = if rates.is_empty() {
            None
        } else {
            Some(rates.iter().sum::<f64>() / rates.len() as f64)
        };

        MatchScorer {
            profile,
            weights,
            preferred_brokers,
            preferred_lanes,
            historical_brokers,
            historical_rate_avg,
        }
    }

    /// Score one candidate; reasons follow signal order
    pub fn score(&self, load: &Load) -> (f64, Vec<String>) {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        self.score_broker(load, &mut score, &mut reasons);
        self.score_lane(load, &mut score, &mut reasons);
        self.score_equipment(load, &mut score, &mut reasons);
        self.score_rate(load, &mut score, &mut reasons);

        let score = f64::min(score, 1.0);

        if score < FALLBACK_THRESHOLD && self.profile.loads.len() < SPARSE_HISTORY_LOADS {
            return (BASE_MATCH_SCORE, vec![BASE_MATCH_REASON.to_string()]);
        }
        (score, reasons)
    }

    fn score_broker(&self, load: &Load, score: &mut f64, reasons: &mut Vec<String>) {
        let Some(mc) = load.broker_mc() else {
            return;
        };
        let name = load
            .broker
            .as_ref()
            .map(|b| b.display_name())
            .unwrap_or_else(|| format!("MC {}", mc));

        if let Some(fraction) = rank_fraction(&self.preferred_brokers, &mc) {
            *score += self.weights.past_broker * fraction;
            reasons.push(format!("Past broker match: {}", name));
        }
        if self.historical_brokers.contains(&mc) {
            *score += self.weights.past_broker * HISTORICAL_BROKER_FACTOR;
            reasons.push(format!("Historical broker: {}", name));
        }
    }

    fn score_lane(&self, load: &Load, score: &mut f64, reasons: &mut Vec<String>) {
        let Some(lane) = load.lane.as_ref() else {
            return;
        };
        let (Some(key), Some(reverse)) = (lane.key(), lane.reverse_key()) else {
            return;
        };

        if let Some(fraction) = rank_fraction(&self.preferred_lanes, &key) {
            *score += self.weights.preferred_lane * fraction;
            reasons.push(format!("Preferred lane: {}", key));
        }
        if self.profile.lanes.iter().any(|past| past.key().as_ref() == Some(&key)) {
            *score += self.weights.past_lane;
            reasons.push(format!("Exact lane match: {}", key));
        }
        if self.profile.lanes.iter().any(|past| past.key().as_ref() == Some(&reverse)) {
            *score += self.weights.past_lane * REVERSE_LANE_FACTOR;
            reasons.push(format!("Reverse lane match: {}", reverse));
        }
    }

    fn score_equipment(&self, load: &Load, score: &mut f64, reasons: &mut Vec<String>) {
        let Some(equipment) = load.equipment_type.as_deref().map(str::trim) else {
            return;
        };
        if let Some(fraction) = rank_fraction(&self.profile.preferred_equipment, equipment) {
            *score += self.weights.preferred_equipment * fraction;
            reasons.push(format!("Preferred equipment: {}", equipment));
        }
    }

    fn score_rate(&self, load: &Load, score: &mut f64, reasons: &mut Vec<String>) {
        let (Some(per_mile), Some(average)) = (load.rate_per_mile(), self.historical_rate_avg) else {
            return;
        };
        if average <= 0.0 {
            return;
        }
        let difference = (per_mile - average).abs() / average;
        if difference <= RATE_TOLERANCE {
            *score += self.weights.rate_quality * (1.0 - difference / RATE_TOLERANCE);
            reasons.push(format!(
                "Rate quality: ${:.2}/mile (avg: ${:.2})",
                per_mile, average
            ));
        }
    }

    /// Score every candidate, best first (equal scores keep input order), keep `limit`
    pub fn match_loads(&self, candidates: Vec<Load>, limit: usize) -> Vec<LoadMatch> {
        let mut matches: Vec<LoadMatch> = candidates
            .into_iter()
            .map(|load| {
                let (score, reasons) = self.score(&load);
                LoadMatch { load, score, reasons }
            })
            .collect();

        // sort_by is stable
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        matches
    }
}

/// (N - rank) / N for the value's 0-based rank in `list`
fn rank_fraction<T: AsRef<str>>(list: &[T], value: &str) -> Option<f64> {
    let rank = list.iter().position(|item| item.as_ref() == value)?;
    let n = list.len() as f64;
    Some((n - rank as f64) / n)
}

/// Re-normalize both sides of a stored "origin→destination" key
fn normalize_lane_key(key: &str) -> String {
    match key.split_once('→') {
        Some((origin, destination)) => lane_key(origin, destination).unwrap_or_else(|| key.to_string()),
        None => key.to_string(),
    }
}

pub fn match_summary(matches: &[LoadMatch]) -> MatchSummary {
    if matches.is_empty() {
        return MatchSummary::default();
    }

    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    for reason in matches.iter().flat_map(|m| &m.reasons) {
        let prefix = reason.split(':').next().unwrap_or(reason);
        *distribution.entry(prefix.to_string()).or_insert(0) += 1;
    }

    let total: f64 = matches.iter().map(|m| m.score).sum();
    MatchSummary {
        total_matches: matches.len(),
        average_score: total / matches.len() as f64,
        high_confidence_matches: matches.iter().filter(|m| m.score >= HIGH_CONFIDENCE_SCORE).count(),
        match_distribution: distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Broker, DataSource, Lane, Rate};

    fn candidate(id: &str, mc: &str, origin: &str, destination: &str) -> Load {
        let mut load = Load::new(id, DataSource::Manual);
        load.broker = Some(Broker {
            mc_id: Some(mc.to_string()),
            company_name: Some(format!("Broker {}", mc)),
            ..Broker::default()
        });
        load.lane = Some(Lane::between(origin, destination, DataSource::Manual));
        load
    }

    fn history(count: usize) -> CarrierProfile {
        let mut profile = CarrierProfile::new();
        for i in 0..count {
            let mut load = candidate(&format!("H{}", i), "111", "Austin, TX", "Dallas, TX");
            if let Some(lane) = load.lane.as_mut() {
                lane.distance_miles = Some(200.0);
            }
            load.rate = Some(Rate::flat(400.0, DataSource::Csv));
            profile.loads.push(load);
        }
        profile.lanes = vec![Lane::between("Austin, TX", "Dallas, TX", DataSource::Csv)];
        profile.preferred_lanes = vec!["Austin, TX→Dallas, TX".to_string()];
        profile.preferred_brokers = vec!["111".to_string()];
        profile.preferred_equipment = vec!["Dry Van".to_string(), "Reefer".to_string()];
        profile
    }

    #[test]
    fn test_preferred_broker_and_lane() {
        let mut profile = CarrierProfile::new();
        profile.preferred_brokers = vec!["555000".to_string()];
        profile.preferred_lanes = vec!["Miami, FL→Tampa, FL".to_string()];

        let load = candidate("C1", "MC-555000", "Miami, FL", "Tampa, FL");
        let (score, reasons) = MatchScorer::new(&profile).score(&load);

        assert!(score >= 0.5, "score {}", score);
        assert!(reasons.iter().any(|r| r.starts_with("Past broker match")));
        assert!(reasons.iter().any(|r| r.starts_with("Preferred lane")));
    }

    #[test]
    fn test_sparse_history_fallback() {
        let profile = CarrierProfile::new();
        let load = candidate("C1", "999", "Reno, NV", "Boise, ID");
        let (score, reasons) = MatchScorer::new(&profile).score(&load);
        assert_eq!(score, 0.3);
        assert_eq!(reasons, vec![BASE_MATCH_REASON.to_string()]);
    }

    #[test]
    fn test_no_fallback_with_enough_history() {
        let profile = history(5);
        let load = candidate("C1", "999", "Reno, NV", "Boise, ID");
        let (score, reasons) = MatchScorer::new(&profile).score(&load);
        assert_eq!(score, 0.0);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_signals_are_additive_and_clamped() {
        let mut profile = history(2);
        profile
            .lanes
            .push(Lane::between("Dallas, TX", "Austin, TX", DataSource::Csv));

        let mut load = candidate("C1", "111", "Austin, TX", "Dallas, TX");
        load.equipment_type = Some("Dry Van".to_string());
        let (score, reasons) = MatchScorer::new(&profile).score(&load);

        // 0.3 + 0.15 + 0.2 + 0.4 + 0.28 + 0.1 is clamped
        assert_eq!(score, 1.0);
        let prefixes: Vec<&str> = reasons.iter().map(|r| r.split(':').next().unwrap()).collect();
        assert_eq!(
            prefixes,
            vec![
                "Past broker match",
                "Historical broker",
                "Preferred lane",
                "Exact lane match",
                "Reverse lane match",
                "Preferred equipment",
            ]
        );
    }

    #[test]
    fn test_reverse_lane_and_equipment_rank() {
        let profile = history(5);
        let mut load = candidate("C1", "999", "Dallas, TX", "Austin, TX");
        load.equipment_type = Some("Reefer".to_string());

        let (score, reasons) = MatchScorer::new(&profile).score(&load);

        // reverse 0.4 * 0.7 + equipment rank 1 of 2: 0.1 * 0.5
        assert!((score - 0.33).abs() < 1e-9, "score {}", score);
        assert_eq!(reasons[0], "Reverse lane match: Austin, TX→Dallas, TX");
        assert_eq!(reasons[1], "Preferred equipment: Reefer");
    }

    #[test]
    fn test_rate_quality() {
        // historical average is $2.00/mile
        let profile = history(5);
        let scorer = MatchScorer::new(&profile);

        let mut at_average = candidate("C1", "999", "Reno, NV", "Boise, ID");
        at_average.rate = Some(Rate {
            rate_per_mile: Some(2.0),
            ..Rate::default()
        });
        let (score, reasons) = scorer.score(&at_average);
        assert!((score - 0.1).abs() < 1e-9);
        assert_eq!(reasons, vec!["Rate quality: $2.00/mile (avg: $2.00)".to_string()]);

        let mut ten_percent_off = at_average.clone();
        ten_percent_off.rate = Some(Rate {
            rate_per_mile: Some(2.2),
            ..Rate::default()
        });
        let (score, _) = scorer.score(&ten_percent_off);
        assert!((score - 0.05).abs() < 1e-9);

        let mut far_off = at_average.clone();
        far_off.rate = Some(Rate {
            rate_per_mile: Some(3.0),
            ..Rate::default()
        });
        assert_eq!(scorer.score(&far_off).0, 0.0);
    }

    #[test]
    fn test_match_loads_stable_and_limited() {
        let profile = history(5);
        let scorer = MatchScorer::new(&profile);
        let candidates = vec![
            candidate("A", "999", "Reno, NV", "Boise, ID"),
            candidate("B", "111", "Austin, TX", "Dallas, TX"),
            candidate("C", "888", "Reno, NV", "Boise, ID"),
            candidate("D", "777", "Reno, NV", "Boise, ID"),
        ];

        let matches = scorer.match_loads(candidates, 3);
        let ids: Vec<_> = matches.iter().filter_map(|m| m.load.load_id.as_deref()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_match_summary() {
        let profile = history(5);
        let scorer = MatchScorer::new(&profile);
        let matches = scorer.match_loads(
            vec![
                candidate("A", "111", "Austin, TX", "Dallas, TX"),
                candidate("B", "999", "Dallas, TX", "Austin, TX"),
            ],
            10,
        );

        let summary = match_summary(&matches);
        assert_eq!(summary.total_matches, 2);
        assert_eq!(summary.high_confidence_matches, 1);
        assert_eq!(summary.match_distribution.get("Reverse lane match"), Some(&1));
        assert_eq!(summary.match_distribution.get("Exact lane match"), Some(&1));
        assert!((summary.average_score - (matches[0].score + matches[1].score) / 2.0).abs() < 1e-9);

        assert_eq!(match_summary(&[]), MatchSummary::default());
    }

    #[test]
    fn test_load_match_flattens() {
        let profile = CarrierProfile::new();
        let matches = MatchScorer::new(&profile).match_loads(vec![candidate("A", "1", "A, TX", "B, TX")], 1);
        let record = matches[0].to_record();
        assert_eq!(record["score"], serde_json::json!(0.3));
        assert_eq!(record["load"]["load_id"], serde_json::json!("A"));
    }
}
