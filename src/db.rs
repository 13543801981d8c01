// 🗄️ Profile Store - SQLite persistence for carrier profiles
//
// Every entity row keeps a few queryable columns plus its full JSON record.
// Rates live in their own table and are re-attached to their load on read,
// so a saved profile loads back equal to what was saved.

use crate::entities::{Broker, CarrierProfile, EnrichedData, Lane, Load, Rate};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Actor recorded on events written by the pipeline itself
pub const PIPELINE_ACTOR: &str = "carrier_pipeline";

/// Event for the audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

/// ProfileStore - where onboarding persists profiles and market snapshots
pub trait ProfileStore {
    /// Save (or replace) a profile; returns its carrier id
    fn save_profile(&self, profile: &CarrierProfile) -> Result<String>;

    /// Full reconstruction, including every load's rate
    fn load_profile(&self, carrier_id: &str) -> Result<Option<CarrierProfile>>;

    fn save_enrichments(&self, snapshots: &[EnrichedData]) -> Result<usize>;

    fn load_enrichments(&self) -> Result<Vec<EnrichedData>>;
}

impl ProfileStore for Connection {
    fn save_profile(&self, profile: &CarrierProfile) -> Result<String> {
        save_carrier_profile(self, profile)
    }

    fn load_profile(&self, carrier_id: &str) -> Result<Option<CarrierProfile>> {
        get_carrier_profile(self, carrier_id)
    }

    fn save_enrichments(&self, snapshots: &[EnrichedData]) -> Result<usize> {
        snapshots.iter().try_for_each(|s| save_enrichment(self, s))?;
        Ok(snapshots.len())
    }

    fn load_enrichments(&self) -> Result<Vec<EnrichedData>> {
        get_enrichments(self)
    }
}

/// Open (creating if needed) a database file with the schema in place
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Carriers (profile header + mined preferences)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS carriers (
            carrier_id TEXT PRIMARY KEY,
            carrier_name TEXT,
            mc_number TEXT,
            preferred_lanes TEXT NOT NULL,
            preferred_equipment TEXT NOT NULL,
            preferred_brokers TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Profile collections (position keeps the profile's order)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS brokers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            carrier_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            broker_id TEXT,
            company_name TEXT,
            mc_id TEXT,
            record TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lanes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            carrier_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            lane_id TEXT,
            origin_city_state TEXT,
            destination_city_state TEXT,
            distance_miles REAL,
            record TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS loads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            carrier_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            load_id TEXT,
            broker_mc TEXT,
            lane_key TEXT,
            pickup_date TEXT,
            equipment_type TEXT,
            status TEXT NOT NULL,
            record TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS rates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            carrier_id TEXT NOT NULL,
            load_position INTEGER NOT NULL,
            rate_id TEXT,
            load_id TEXT,
            rate_amount REAL,
            rate_per_mile REAL,
            rate_type TEXT,
            enrichment_source TEXT,
            record TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Market snapshots (one current row per lane)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS enriched_data (
            lane_id TEXT PRIMARY KEY,
            origin_city_state TEXT,
            destination_city_state TEXT,
            average_rate REAL,
            average_rate_per_mile REAL,
            enrichment_source TEXT NOT NULL,
            confidence_score REAL NOT NULL,
            last_updated TEXT NOT NULL,
            record TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_brokers_carrier ON brokers(carrier_id, position)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_brokers_mc ON brokers(mc_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lanes_carrier ON lanes(carrier_id, position)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_loads_carrier ON loads(carrier_id, position)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_rates_carrier ON rates(carrier_id, load_position)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// PROFILES
// ============================================================================

/// Save a profile, replacing any stored profile with the same carrier id
pub fn save_carrier_profile(conn: &Connection, profile: &CarrierProfile) -> Result<String> {
    let Some(carrier_id) = profile.carrier_id.clone() else {
        bail!("Cannot save a carrier profile without a carrier_id");
    };

    let tx = conn
        .unchecked_transaction()
        .context("Failed to start profile transaction")?;

    delete_carrier_rows(&tx, &carrier_id)?;

    tx.execute(
        "INSERT INTO carriers (
            carrier_id, carrier_name, mc_number,
            preferred_lanes, preferred_equipment, preferred_brokers,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            carrier_id,
            profile.carrier_name,
            profile.mc_number,
            serde_json::to_string(&profile.preferred_lanes)?,
            serde_json::to_string(&profile.preferred_equipment)?,
            serde_json::to_string(&profile.preferred_brokers)?,
            profile.created_at.to_rfc3339(),
            profile.updated_at.to_rfc3339(),
        ],
    )?;

    for (position, broker) in profile.brokers.iter().enumerate() {
        tx.execute(
            "INSERT INTO brokers (carrier_id, position, broker_id, company_name, mc_id, record)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                carrier_id,
                position as i64,
                broker.broker_id,
                broker.company_name,
                broker.normalized_mc(),
                serde_json::to_string(broker)?,
            ],
        )?;
    }

    for (position, lane) in profile.lanes.iter().enumerate() {
        tx.execute(
            "INSERT INTO lanes (
                carrier_id, position, lane_id, origin_city_state,
                destination_city_state, distance_miles, record
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                carrier_id,
                position as i64,
                lane.lane_id,
                lane.origin_city_state,
                lane.destination_city_state,
                lane.distance_miles,
                serde_json::to_string(lane)?,
            ],
        )?;
    }

    let mut rates = 0;
    for (position, load) in profile.loads.iter().enumerate() {
        // the rate is stored in its own table
        let mut record = load.clone();
        let rate = record.rate.take();

        tx.execute(
            "INSERT INTO loads (
                carrier_id, position, load_id, broker_mc, lane_key,
                pickup_date, equipment_type, status, record
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                carrier_id,
                position as i64,
                load.load_id,
                load.broker_mc(),
                load.lane_key(),
                load.pickup_date.map(|d| d.to_string()),
                load.equipment_type,
                serde_json::to_value(load.status)?.as_str().unwrap_or_default(),
                serde_json::to_string(&record)?,
            ],
        )?;

        if let Some(rate) = rate {
            tx.execute(
                "INSERT INTO rates (
                    carrier_id, load_position, rate_id, load_id, rate_amount,
                    rate_per_mile, rate_type, enrichment_source, record
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    carrier_id,
                    position as i64,
                    rate.rate_id,
                    rate.load_id,
                    rate.rate_amount,
                    rate.rate_per_mile,
                    rate.rate_type.map(|t| t.as_str()),
                    rate.enrichment_source.map(|s| s.as_str()),
                    serde_json::to_string(&rate)?,
                ],
            )?;
            rates += 1;
        }
    }

    let event = Event::new(
        "profile_saved",
        "carrier",
        &carrier_id,
        serde_json::json!({
            "brokers": profile.brokers.len(),
            "lanes": profile.lanes.len(),
            "loads": profile.loads.len(),
            "rates": rates,
        }),
        PIPELINE_ACTOR,
    );
    insert_event(&tx, &event)?;

    tx.commit().context("Failed to commit carrier profile")?;

    info!(
        carrier_id = %carrier_id,
        brokers = profile.brokers.len(),
        lanes = profile.lanes.len(),
        loads = profile.loads.len(),
        rates,
        "saved carrier profile"
    );
    Ok(carrier_id)
}

fn delete_carrier_rows(conn: &Connection, carrier_id: &str) -> Result<()> {
    for table in ["rates", "loads", "lanes", "brokers", "carriers"] {
        conn.execute(
            &format!("DELETE FROM {} WHERE carrier_id = ?1", table),
            params![carrier_id],
        )?;
    }
    Ok(())
}

/// Rebuild a stored profile; `None` when the carrier id is unknown
pub fn get_carrier_profile(conn: &Connection, carrier_id: &str) -> Result<Option<CarrierProfile>> {
    let header = conn
        .query_row(
            "SELECT carrier_name, mc_number, preferred_lanes, preferred_equipment,
                    preferred_brokers, created_at, updated_at
             FROM carriers WHERE carrier_id = ?1",
            params![carrier_id],
            |row| {
                Ok(CarrierProfile {
                    carrier_id: Some(carrier_id.to_string()),
                    carrier_name: row.get(0)?,
                    mc_number: row.get(1)?,
                    preferred_lanes: json_column(row, 2)?,
                    preferred_equipment: json_column(row, 3)?,
                    preferred_brokers: json_column(row, 4)?,
                    created_at: timestamp_column(row, 5)?,
                    updated_at: timestamp_column(row, 6)?,
                    ..CarrierProfile::new()
                })
            },
        )
        .optional()
        .context("Failed to read carrier")?;

    let Some(mut profile) = header else {
        debug!(carrier_id, "no stored profile");
        return Ok(None);
    };

    profile.brokers = records::<Broker>(
        conn,
        "SELECT record FROM brokers WHERE carrier_id = ?1 ORDER BY position",
        carrier_id,
    )?;
    profile.lanes = records::<Lane>(
        conn,
        "SELECT record FROM lanes WHERE carrier_id = ?1 ORDER BY position",
        carrier_id,
    )?;

    let mut rates: HashMap<i64, Rate> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT load_position, record FROM rates WHERE carrier_id = ?1 ORDER BY load_position",
        )?;
        let rows = stmt.query_map(params![carrier_id], |row| {
            Ok((row.get::<_, i64>(0)?, json_column::<Rate>(row, 1)?))
        })?;
        for row in rows {
            let (position, rate) = row?;
            rates.insert(position, rate);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT position, record FROM loads WHERE carrier_id = ?1 ORDER BY position",
    )?;
    profile.loads = stmt
        .query_map(params![carrier_id], |row| {
            let position: i64 = row.get(0)?;
            let mut load: Load = json_column(row, 1)?;
            load.rate = rates.remove(&position);
            Ok(load)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(profile))
}

fn records<T: DeserializeOwned>(conn: &Connection, sql: &str, carrier_id: &str) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![carrier_id], |row| json_column(row, 0))?
        .collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

fn json_column<T: DeserializeOwned>(row: &Row, index: usize) -> rusqlite::Result<T> {
    let text: String = row.get(index)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

// ============================================================================
// MARKET SNAPSHOTS
// ============================================================================

/// Upsert a snapshot by lane id
pub fn save_enrichment(conn: &Connection, snapshot: &EnrichedData) -> Result<()> {
    let Some(lane_id) = snapshot.lane_id.as_deref() else {
        bail!("Cannot save enrichment without a lane_id");
    };

    conn.execute(
        "INSERT OR REPLACE INTO enriched_data (
            lane_id, origin_city_state, destination_city_state, average_rate,
            average_rate_per_mile, enrichment_source, confidence_score, last_updated, record
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            lane_id,
            snapshot.origin_city_state,
            snapshot.destination_city_state,
            snapshot.average_rate,
            snapshot.average_rate_per_mile,
            snapshot.enrichment_source.as_str(),
            snapshot.confidence_score,
            snapshot.last_updated.to_rfc3339(),
            serde_json::to_string(snapshot)?,
        ],
    )?;
    Ok(())
}

pub fn get_enrichments(conn: &Connection) -> Result<Vec<EnrichedData>> {
    let mut stmt = conn.prepare("SELECT record FROM enriched_data ORDER BY last_updated")?;
    let snapshots = stmt
        .query_map([], |row| json_column(row, 0))?
        .collect::<Result<Vec<EnrichedData>, _>>()?;
    Ok(snapshots)
}

// ============================================================================
// EVENTS
// ============================================================================

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            Ok(Event {
                event_id: row.get(0)?,
                timestamp: timestamp_column(row, 1)?,
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: json_column(row, 5)?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Address, DataSource, EnrichmentSource, RateType};
    use chrono::NaiveDate;

    fn sample_profile(carrier_id: &str) -> CarrierProfile {
        let broker = Broker {
            broker_id: Some("broker_1".to_string()),
            company_name: Some("ABC Logistics".to_string()),
            mc_id: Some("123456".to_string()),
            company_address: Some(Address::from_raw("100 Bay St, Miami, FL 33101")),
            date_of_contract: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..Broker::new(DataSource::Csv)
        };
        let mut lane = Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv);
        lane.distance_miles = Some(250.0);

        let mut priced = Load::new("L1", DataSource::Csv);
        priced.broker = Some(broker.clone());
        priced.lane = Some(lane.clone());
        priced.pickup_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        priced.rate = Some(Rate {
            rate_id: Some("rate_1".to_string()),
            load_id: Some("L1".to_string()),
            rate_amount: Some(1000.0),
            rate_per_mile: Some(4.0),
            rate_type: Some(RateType::Flat),
            enrichment_source: Some(EnrichmentSource::Estimated),
            ..Rate::new(DataSource::Csv)
        });
        priced.raw_data.insert("load_id".to_string(), "L1".to_string());

        let unpriced = Load::new("L2", DataSource::Email);

        let mut profile = CarrierProfile::new();
        profile.carrier_id = Some(carrier_id.to_string());
        profile.carrier_name = Some("Sunrise Trucking".to_string());
        profile.mc_number = Some("999001".to_string());
        profile.brokers = vec![broker];
        profile.lanes = vec![lane];
        profile.loads = vec![unpriced, priced];
        profile.preferred_lanes = vec!["Miami, FL→Tampa, FL".to_string()];
        profile.preferred_brokers = vec!["123456".to_string()];
        profile.preferred_equipment = vec!["Dry Van".to_string()];
        profile
    }

    #[test]
    fn test_profile_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let profile = sample_profile("carrier-1");
        let id = conn.save_profile(&profile).unwrap();
        let loaded = conn.load_profile(&id).unwrap().unwrap();

        assert_eq!(loaded, profile);
        assert!(loaded.loads[0].rate.is_none());
        assert_eq!(loaded.loads[1].rate_amount(), Some(1000.0));

        println!("✅ Profile round trip test PASSED");
    }

    #[test]
    fn test_save_replaces_existing_profile() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let mut profile = sample_profile("carrier-1");
        save_carrier_profile(&conn, &profile).unwrap();
        profile.loads.truncate(1);
        profile.carrier_name = Some("Renamed".to_string());
        save_carrier_profile(&conn, &profile).unwrap();

        let loaded = get_carrier_profile(&conn, "carrier-1").unwrap().unwrap();
        assert_eq!(loaded.loads.len(), 1);
        assert_eq!(loaded.carrier_name.as_deref(), Some("Renamed"));

        let rate_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM rates", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rate_rows, 0);

        let events = get_events_for_entity(&conn, "carrier", "carrier-1").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "profile_saved");
    }

    #[test]
    fn test_missing_profile() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        assert!(get_carrier_profile(&conn, "nope").unwrap().is_none());

        let mut anonymous = sample_profile("x");
        anonymous.carrier_id = None;
        assert!(save_carrier_profile(&conn, &anonymous).is_err());
    }

    #[test]
    fn test_profile_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carriers.db");

        let profile = sample_profile("carrier-disk");
        {
            let conn = open_database(&path).unwrap();
            conn.save_profile(&profile).unwrap();
        }

        let conn = open_database(&path).unwrap();
        let loaded = conn.load_profile("carrier-disk").unwrap().unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_enrichment_upsert() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let mut snapshot = EnrichedData::new(EnrichmentSource::Estimated);
        snapshot.lane_id = Some("lane_abc".to_string());
        snapshot.origin_city_state = Some("Miami, FL".to_string());
        snapshot.destination_city_state = Some("Tampa, FL".to_string());
        snapshot.average_rate = Some(500.0);

        assert_eq!(conn.save_enrichments(&[snapshot.clone()]).unwrap(), 1);
        snapshot.average_rate = Some(650.0);
        save_enrichment(&conn, &snapshot).unwrap();

        let stored = conn.load_enrichments().unwrap();
        assert_eq!(stored, vec![snapshot]);

        assert!(save_enrichment(&conn, &EnrichedData::new(EnrichmentSource::Dat)).is_err());
    }

    #[test]
    fn test_event_log() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let event = Event::new(
            "matches_generated",
            "carrier",
            "carrier_abc",
            serde_json::json!({"candidates": 12, "returned": 5}),
            "dispatcher",
        );

        insert_event(&conn, &event).unwrap();
        assert!(get_events_for_entity(&conn, "carrier", "carrier_other").unwrap().is_empty());

        let events = get_events_for_entity(&conn, "carrier", "carrier_abc").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "matches_generated");
        assert_eq!(events[0].actor, "dispatcher");
        assert_eq!(events[0].data["returned"], 5);

        println!("✅ Event log test PASSED");
    }
}
