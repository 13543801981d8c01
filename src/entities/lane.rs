use super::{Address, DataSource};
use serde::{Deserialize, Serialize};

/// Lane - a directional origin→destination relationship
///
/// A→B and B→A are different lanes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Lane {
    pub lane_id: Option<String>,
    pub origin: Option<Address>,
    pub destination: Option<Address>,
    /// e.g. "Miami, FL"
    pub origin_city_state: Option<String>,
    /// e.g. "Tampa, FL"
    pub destination_city_state: Option<String>,
    pub distance_miles: Option<f64>,
    pub estimated_duration_hours: Option<f64>,
    #[serde(default)]
    pub source: DataSource,
}

impl Lane {
    /// Lane between two city/state strings, with raw endpoint addresses
    pub fn between(origin: &str, destination: &str, source: DataSource) -> Self {
        Lane {
            origin: Some(Address::from_raw(origin)),
            destination: Some(Address::from_raw(destination)),
            origin_city_state: Some(origin.to_string()),
            destination_city_state: Some(destination.to_string()),
            source,
            ..Lane::default()
        }
    }

    /// Normalized "origin→destination" key; `None` when an endpoint is missing
    pub fn key(&self) -> Option<String> {
        lane_key(
            self.origin_city_state.as_deref()?,
            self.destination_city_state.as_deref()?,
        )
    }

    /// Key of the return trip
    pub fn reverse_key(&self) -> Option<String> {
        lane_key(
            self.destination_city_state.as_deref()?,
            self.origin_city_state.as_deref()?,
        )
    }

    /// Usable (positive) distance
    pub fn distance(&self) -> Option<f64> {
        self.distance_miles.filter(|d| *d > 0.0)
    }

    /// Back-fill distance/duration from a duplicate of the same lane
    pub fn merge_from(&mut self, other: &Lane) {
        if self.distance_miles.is_none() {
            self.distance_miles = other.distance_miles;
        }
        if self.estimated_duration_hours.is_none() {
            self.estimated_duration_hours = other.estimated_duration_hours;
        }
    }

    /// Fill every empty field from `other` (used to refresh a load's lane copy)
    pub fn fill_from(&mut self, other: &Lane) {
        self.merge_from(other);
        if self.lane_id.is_none() {
            self.lane_id = other.lane_id.clone();
        }
        match (&mut self.origin, &other.origin) {
            (Some(mine), Some(theirs)) => mine.fill_from(theirs),
            (None, Some(theirs)) => self.origin = Some(theirs.clone()),
            _ => {}
        }
        match (&mut self.destination, &other.destination) {
            (Some(mine), Some(theirs)) => mine.fill_from(theirs),
            (None, Some(theirs)) => self.destination = Some(theirs.clone()),
            _ => {}
        }
    }
}

/// Normalize a "City, ST" string
///
/// Whitespace collapsed; when the text has exactly one comma the state part is
/// uppercased and re-joined as "City, ST". City case is preserved.
pub fn normalize_city_state(city_state: &str) -> String {
    let collapsed = city_state.split_whitespace().collect::<Vec<_>>().join(" ");
    let parts: Vec<&str> = collapsed.split(',').collect();
    if parts.len() == 2 {
        format!("{}, {}", parts[0].trim(), parts[1].trim().to_uppercase())
    } else {
        collapsed
    }
}

/// Directional lane key "origin→destination"; `None` if either side is blank
pub fn lane_key(origin: &str, destination: &str) -> Option<String> {
    let origin = normalize_city_state(origin);
    let destination = normalize_city_state(destination);
    if origin.is_empty() || destination.is_empty() {
        return None;
    }
    Some(format!("{}→{}", origin, destination))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_city_state() {
        assert_eq!(normalize_city_state("  Miami ,   fl "), "Miami, FL");
        assert_eq!(normalize_city_state("Miami   FL"), "Miami FL");
        assert_eq!(normalize_city_state("New  York, ny"), "New York, NY");
    }

    #[test]
    fn test_lane_key_is_directional() {
        let lane = Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv);
        assert_eq!(lane.key().as_deref(), Some("Miami, FL→Tampa, FL"));
        assert_eq!(lane.reverse_key().as_deref(), Some("Tampa, FL→Miami, FL"));
    }

    #[test]
    fn test_lane_key_missing_endpoint() {
        let lane = Lane {
            origin_city_state: Some("Miami, FL".to_string()),
            ..Lane::default()
        };
        assert_eq!(lane.key(), None);
        assert_eq!(lane_key("Miami, FL", "  "), None);
    }

    #[test]
    fn test_merge_backfills_distance_only() {
        let mut first = Lane::between("Miami, FL", "Tampa, FL", DataSource::Csv);
        let mut second = Lane::between("Miami, FL", "Tampa, FL", DataSource::Pdf);
        second.distance_miles = Some(280.0);
        second.estimated_duration_hours = Some(5.0);
        second.lane_id = Some("other".to_string());

        first.merge_from(&second);

        assert_eq!(first.distance_miles, Some(280.0));
        assert_eq!(first.estimated_duration_hours, Some(5.0));
        assert_eq!(first.lane_id, None);
        assert_eq!(first.source, DataSource::Csv);
    }
}
