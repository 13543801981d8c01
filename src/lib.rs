// Carrier Profile Pipeline - Core Library
// Booking records → carrier profile → ranked load matches.
// Exposes all modules for use in CLI, API server, and tests

pub mod assembler;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod entities;
pub mod error;
pub mod matching;
pub mod normalization;
pub mod onboarding;
pub mod parser;

// Re-export commonly used types
pub use assembler::{parse_inputs, AssemblyOutcome, AssemblyStats, InputFailure, ProfileAssembler};
pub use config::Config;
pub use db::{
    get_carrier_profile, get_enrichments, get_events_for_entity, insert_event, open_database,
    save_carrier_profile, save_enrichment, setup_database, Event, ProfileStore,
};
pub use enrichment::{EnrichmentEstimator, MarketSnapshotCache, MarketSource};
pub use entities::{
    Address, Broker, CarrierProfile, DataSource, EnrichedData, EnrichmentSource, Flatten, Lane,
    Load, LoadStatus, Rate, RateType,
};
pub use error::PipelineError;
pub use matching::{match_summary, LoadMatch, MatchScorer, MatchSummary, MatchWeights};
pub use normalization::{NormalizationStats, Normalizer};
pub use onboarding::{MatchReport, OnboardingFlow, OnboardingReport, OnboardingStatus, StatusReport};
pub use parser::{
    extract_input, get_extractor, AddressResolver, ExtractedFields, Field, FieldExtractor,
    InputFormat, RawInput,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
