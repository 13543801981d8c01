// 🚚 Onboarding Flow - parse → normalize → enrich → save, then match
//
// Stage problems after parsing never abort the run. They are collected
// as warnings on the report.

use crate::assembler::{parse_inputs, AssemblyStats};
use crate::config::Config;
use crate::db::ProfileStore;
use crate::enrichment::{EnrichmentEstimator, MarketSnapshotCache};
use crate::entities::{CarrierProfile, Load};
use crate::matching::{match_summary, LoadMatch, MatchScorer, MatchSummary};
use crate::normalization::{NormalizationStats, Normalizer};
use crate::parser::RawInput;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

/// Everything one upload produced
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingReport {
    pub carrier_id: String,
    pub inputs_processed: Vec<String>,
    pub assembly: AssemblyStats,
    pub normalization: Option<NormalizationStats>,
    pub lanes_enriched: usize,
    /// Loads that gained a rate amount during enrichment
    pub rates_filled: usize,
    /// Loads whose rate carries an enrichment source
    pub rates_enriched: usize,
    pub saved: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub profile: Option<CarrierProfile>,
}

impl OnboardingReport {
    fn new(carrier_id: String) -> Self {
        OnboardingReport {
            carrier_id,
            inputs_processed: Vec::new(),
            assembly: AssemblyStats::default(),
            normalization: None,
            lanes_enriched: 0,
            rates_filled: 0,
            rates_enriched: 0,
            saved: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            profile: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub carrier_id: String,
    pub matches: Vec<LoadMatch>,
    pub summary: MatchSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    /// Loads and lanes present - ready for matching
    Complete,
    /// Brokers or loads, but not enough to match on
    Partial,
    Incomplete,
    NotFound,
    /// No store to ask
    Unknown,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStatus::Complete => "complete",
            OnboardingStatus::Partial => "partial",
            OnboardingStatus::Incomplete => "incomplete",
            OnboardingStatus::NotFound => "not_found",
            OnboardingStatus::Unknown => "unknown",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            OnboardingStatus::Complete => "Onboarding complete - ready for matching",
            OnboardingStatus::Partial => "Partial data - enrichment recommended",
            OnboardingStatus::Incomplete => "Insufficient data - upload more files",
            OnboardingStatus::NotFound => "Carrier not found",
            OnboardingStatus::Unknown => "No profile store configured",
        }
    }

    fn of(profile: &CarrierProfile) -> Self {
        if !profile.loads.is_empty() && !profile.lanes.is_empty() {
            OnboardingStatus::Complete
        } else if !profile.brokers.is_empty() || !profile.loads.is_empty() {
            OnboardingStatus::Partial
        } else {
            OnboardingStatus::Incomplete
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub carrier_id: String,
    pub status: OnboardingStatus,
    pub message: String,
    pub has_brokers: bool,
    pub has_loads: bool,
    pub has_lanes: bool,
}

pub struct OnboardingFlow<'a> {
    store: Option<&'a dyn ProfileStore>,
    normalizer: Normalizer,
    estimator: EnrichmentEstimator,
    enrichment_enabled: bool,
}

impl<'a> OnboardingFlow<'a> {
    pub fn new(store: Option<&'a dyn ProfileStore>) -> Self {
        Self::from_config(store, &Config::default())
    }

    /// Estimator seeded from config, with stored snapshots consulted first
    pub fn from_config(store: Option<&'a dyn ProfileStore>, config: &Config) -> Self {
        let estimator = match config.estimator_seed {
            Some(seed) => EnrichmentEstimator::with_seed(seed),
            None => EnrichmentEstimator::new(),
        };
        let estimator = match store.map(|s| s.load_enrichments()) {
            Some(Ok(snapshots)) if !snapshots.is_empty() => {
                estimator.with_source(Box::new(MarketSnapshotCache::from_snapshots(snapshots)))
            }
            Some(Err(e)) => {
                warn!(error = %e, "could not read stored market snapshots");
                estimator
            }
            _ => estimator,
        };

        OnboardingFlow {
            store,
            normalizer: Normalizer::new(),
            estimator,
            enrichment_enabled: config.enrichment_enabled,
        }
    }

    pub fn with_estimator(mut self, estimator: EnrichmentEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Run an upload through the whole pipeline
    pub fn process_upload(
        &self,
        inputs: &[RawInput],
        carrier_name: Option<&str>,
        carrier_mc: Option<&str>,
    ) -> OnboardingReport {
        let mut report = OnboardingReport::new(uuid::Uuid::new_v4().to_string());

        // Step 1: Parse
        let outcome = parse_inputs(inputs);
        report.assembly = outcome.stats;
        report.errors = outcome
            .failures
            .iter()
            .map(|f| format!("Parsing error in {}: {}", f.input, f.error))
            .collect();
        report.inputs_processed = inputs
            .iter()
            .map(|input| input.name().to_string())
            .filter(|name| !outcome.failures.iter().any(|f| &f.input == name))
            .collect();
        if !inputs.is_empty() && report.assembly.inputs_parsed == 0 {
            return report;
        }

        let mut profile = outcome.profile;
        profile.carrier_id = Some(report.carrier_id.clone());
        profile.carrier_name = carrier_name.map(str::to_string);
        profile.mc_number = carrier_mc.map(str::to_string);

        // Step 2: Normalize
        report.normalization = Some(self.normalizer.normalize(&mut profile));

        // Step 3: Enrich
        if self.enrichment_enabled {
            self.enrich(&mut profile, &mut report);
        }

        // Step 4: Save
        profile.touch();
        if let Some(store) = self.store {
            match store.save_profile(&profile) {
                Ok(_) => report.saved = true,
                Err(e) => {
                    warn!(carrier_id = %report.carrier_id, error = %e, "profile not saved");
                    report.warnings.push(format!("Database save warning: {}", e));
                }
            }
        }

        info!(
            carrier_id = %report.carrier_id,
            brokers = profile.brokers.len(),
            lanes = profile.lanes.len(),
            loads = profile.loads.len(),
            saved = report.saved,
            "onboarding finished"
        );
        report.profile = Some(profile);
        report
    }

    fn enrich(&self, profile: &mut CarrierProfile, report: &mut OnboardingReport) {
        let snapshots = self.estimator.enrich_lanes(&profile.lanes);
        report.lanes_enriched = snapshots.len();

        // filled amounts come from the same benchmarks that get stored
        let benchmarks = MarketSnapshotCache::from_snapshots(snapshots.iter().cloned());
        report.rates_filled = self
            .estimator
            .fill_rates_from(&mut profile.loads, &profile.lanes, &benchmarks);
        for load in &mut profile.loads {
            if let (Some(rate), Some(lane)) = (load.rate.as_mut(), load.lane.as_ref()) {
                self.estimator.enrich_rate(rate, Some(lane));
            }
        }
        report.rates_enriched = profile
            .loads
            .iter()
            .filter(|l| l.rate.as_ref().is_some_and(|r| r.enrichment_source.is_some()))
            .count();

        if let Some(store) = self.store {
            if let Err(e) = store.save_enrichments(&snapshots) {
                warn!(error = %e, "market snapshots not saved");
                report.warnings.push(format!("Enrichment warning: {}", e));
            }
        }
    }

    /// Rank candidate loads for a stored carrier
    pub fn generate_matches(
        &self,
        carrier_id: &str,
        candidates: Vec<Load>,
        limit: usize,
    ) -> Result<MatchReport> {
        let profile = self.stored_profile(carrier_id)?.ok_or_else(|| {
            anyhow!("Carrier profile not found: {}", carrier_id)
        })?;

        let scorer = MatchScorer::new(&profile);
        let matches = scorer.match_loads(candidates, limit);
        let summary = match_summary(&matches);
        info!(
            carrier_id,
            matches = summary.total_matches,
            high_confidence = summary.high_confidence_matches,
            "generated matches"
        );

        Ok(MatchReport {
            carrier_id: carrier_id.to_string(),
            matches,
            summary,
        })
    }

    pub fn onboarding_status(&self, carrier_id: &str) -> Result<StatusReport> {
        let profile = match self.store {
            Some(_) => self.stored_profile(carrier_id)?,
            None => None,
        };
        let status = match (&profile, self.store) {
            (_, None) => OnboardingStatus::Unknown,
            (None, Some(_)) => OnboardingStatus::NotFound,
            (Some(profile), Some(_)) => OnboardingStatus::of(profile),
        };

        Ok(StatusReport {
            carrier_id: carrier_id.to_string(),
            status,
            message: status.message().to_string(),
            has_brokers: profile.as_ref().is_some_and(|p| !p.brokers.is_empty()),
            has_loads: profile.as_ref().is_some_and(|p| !p.loads.is_empty()),
            has_lanes: profile.as_ref().is_some_and(|p| !p.lanes.is_empty()),
        })
    }

    fn stored_profile(&self, carrier_id: &str) -> Result<Option<CarrierProfile>> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("A profile store is required for this operation"))?;
        store
            .load_profile(carrier_id)
            .with_context(|| format!("Failed to load carrier profile {}", carrier_id))
    }
}
