// 🧩 Profile Assembler - field dictionaries → linked entities
//
// One input unit (row, document, message) becomes at most one broker, lane,
// load and rate. Units are accumulated in order; nothing is deduplicated
// here - that is the normalizer's job.

use crate::entities::{Address, Broker, CarrierProfile, DataSource, Lane, Load, LoadStatus, Rate, RateType};
use crate::parser::{extract_input, ExtractedFields, Field, RawInput};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Trip separators, tried in priority order
const TRIP_SEPARATORS: &[&str] = &[" to ", "→", " - "];

/// Counters for one assembly run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssemblyStats {
    pub inputs_parsed: usize,
    pub inputs_failed: usize,
    pub units: usize,
    pub brokers: usize,
    pub lanes: usize,
    pub loads: usize,
    pub rates: usize,
}

/// An input that could not be read at all
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputFailure {
    pub input: String,
    pub error: String,
}

/// Result of assembling many inputs into one profile
#[derive(Debug, Clone)]
pub struct AssemblyOutcome {
    pub profile: CarrierProfile,
    pub stats: AssemblyStats,
    pub failures: Vec<InputFailure>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileAssembler;

impl ProfileAssembler {
    pub fn new() -> Self {
        ProfileAssembler
    }

    /// Build the entities of one unit as a partial profile
    pub fn assemble_unit(&self, fields: &ExtractedFields) -> CarrierProfile {
        let row_based = matches!(fields.source, DataSource::Csv | DataSource::Excel);
        let mut profile = CarrierProfile::new();

        let broker = self.build_broker(fields, row_based);
        let lane = self.build_lane(fields);
        let mut load = self.build_load(fields, broker.as_ref(), lane.as_ref(), row_based);

        if let Some(rate) = self.build_rate(fields, load.as_ref()) {
            // a rate without a load has nothing to attach to
            if let Some(load) = load.as_mut() {
                load.rate = Some(rate);
            }
        }

        profile.brokers.extend(broker);
        profile.lanes.extend(lane);
        profile.loads.extend(load);
        profile
    }

    /// Accumulate many units into one profile, in order
    pub fn assemble(&self, units: &[ExtractedFields]) -> CarrierProfile {
        let mut profile = CarrierProfile::new();
        for unit in units {
            profile.absorb(self.assemble_unit(unit));
        }
        profile
    }

    fn build_broker(&self, fields: &ExtractedFields, row_based: bool) -> Option<Broker> {
        let broker_name = fields.text(Field::BrokerName).map(str::to_string);
        let company_name = fields.text(Field::CompanyName).map(str::to_string);
        if broker_name.is_none() && company_name.is_none() {
            return None;
        }

        let mut broker = Broker::new(fields.source);
        broker.broker_name = broker_name;
        broker.company_name = company_name;
        broker.mc_id = fields.text(Field::McId).map(str::to_string);
        broker.broker_phone_number = fields.text(Field::Phone).map(str::to_string);
        broker.broker_email = fields.text(Field::Email).map(str::to_string);
        broker.company_address = fields.text(Field::Address).map(Address::from_raw);
        broker.load_board = fields.text(Field::LoadBoard).map(str::to_string);
        if row_based {
            broker.date_of_contract = fields.date(Field::BookingDate);
            broker.notes = fields.text(Field::Notes).map(str::to_string);
        }
        Some(broker)
    }

    fn build_lane(&self, fields: &ExtractedFields) -> Option<Lane> {
        let explicit = fields
            .text(Field::Origin)
            .zip(fields.text(Field::Destination))
            .map(|(o, d)| (o.to_string(), d.to_string()));
        let (origin, destination) = explicit.or_else(|| fields.text(Field::Trip).and_then(split_trip))?;
        Some(Lane::between(&origin, &destination, fields.source))
    }

    fn build_load(
        &self,
        fields: &ExtractedFields,
        broker: Option<&Broker>,
        lane: Option<&Lane>,
        row_based: bool,
    ) -> Option<Load> {
        let load_id = fields.text(Field::LoadId)?;
        let mut load = Load::new(load_id, fields.source);

        load.broker = broker.cloned();
        load.broker_mc_id = fields.text(Field::McId).map(str::to_string);
        load.lane = lane.cloned();
        load.booking_date = fields.date(Field::BookingDate);
        load.pickup_date = fields.date(Field::PickupDate);
        if row_based && load.pickup_date.is_none() {
            load.pickup_date = load.booking_date;
        }
        load.delivery_date = fields.date(Field::DeliveryDate);
        load.equipment_type = fields.text(Field::EquipmentType).map(str::to_string);
        load.weight = fields.number(Field::Weight);
        load.pallets = fields.count(Field::Pallets);
        load.pieces = fields.count(Field::Pieces);
        load.notes = fields.text(Field::Notes).map(str::to_string);
        load.load_board = fields.text(Field::LoadBoard).map(str::to_string);
        load.status = LoadStatus::Booked;
        load.raw_data = fields.to_record();
        Some(load)
    }

    fn build_rate(&self, fields: &ExtractedFields, load: Option<&Load>) -> Option<Rate> {
        let amount = fields.number(Field::RateAmount);
        if amount.is_none() && load.is_none() {
            return None;
        }

        let mut rate = Rate::new(fields.source);
        rate.load_id = load.and_then(|l| l.load_id.clone());
        if let Some(amount) = amount {
            rate.rate_amount = Some(amount);
            rate.rate_type = Some(RateType::Flat);
        }
        Some(rate)
    }
}

/// Split "Miami FL to Tampa FL" into its two endpoints
///
/// The first separator present wins; both parts must be non-empty.
pub fn split_trip(trip: &str) -> Option<(String, String)> {
    // ASCII lowercasing keeps byte offsets aligned with `trip`
    let lower = trip.to_ascii_lowercase();
    for separator in TRIP_SEPARATORS {
        let Some(at) = lower.find(separator) else {
            continue;
        };
        let origin = trip[..at].trim();
        let destination = trip[at + separator.len()..].trim();
        if origin.is_empty() || destination.is_empty() {
            return None;
        }
        return Some((origin.to_string(), destination.to_string()));
    }
    None
}

// ============================================================================
// MULTI-INPUT ASSEMBLY
// ============================================================================

/// Parse many inputs into one profile
///
/// Inputs are extracted in parallel, then merged in input order. An input that
/// fails to extract is logged and skipped; the rest still merge.
pub fn parse_inputs(inputs: &[RawInput]) -> AssemblyOutcome {
    let extracted: Vec<_> = inputs
        .par_iter()
        .map(|input| (input.name().to_string(), extract_input(input)))
        .collect();

    let assembler = ProfileAssembler::new();
    let mut profile = CarrierProfile::new();
    let mut stats = AssemblyStats::default();
    let mut failures = Vec::new();

    for (name, result) in extracted {
        match result {
            Ok(units) => {
                debug!(input = %name, units = units.len(), "assembling input");
                stats.inputs_parsed += 1;
                stats.units += units.len();
                for unit in &units {
                    let partial = assembler.assemble_unit(unit);
                    stats.rates += partial.loads.iter().filter(|l| l.rate.is_some()).count();
                    profile.absorb(partial);
                }
            }
            Err(e) => {
                warn!(input = %name, error = %e, "skipping input");
                stats.inputs_failed += 1;
                failures.push(InputFailure {
                    input: name,
                    error: e.to_string(),
                });
            }
        }
    }

    stats.brokers = profile.brokers.len();
    stats.lanes = profile.lanes.len();
    stats.loads = profile.loads.len();
    info!(
        inputs = stats.inputs_parsed,
        failed = stats.inputs_failed,
        brokers = stats.brokers,
        lanes = stats.lanes,
        loads = stats.loads,
        "assembled profile"
    );

    AssemblyOutcome {
        profile,
        stats,
        failures,
    }
}
