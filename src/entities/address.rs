use serde::{Deserialize, Serialize};

/// Best-effort structured address
///
/// Value type - always owned by the entity that embeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Original unparsed text
    pub raw_address: Option<String>,
}

fn default_country() -> String {
    "USA".to_string()
}

impl Default for Address {
    fn default() -> Self {
        Address {
            street: None,
            city: None,
            state: None,
            zip_code: None,
            country: default_country(),
            latitude: None,
            longitude: None,
            raw_address: None,
        }
    }
}

impl Address {
    /// Address carrying only its raw text
    pub fn from_raw(raw: &str) -> Self {
        Address {
            raw_address: Some(raw.to_string()),
            ..Address::default()
        }
    }

    /// True when no structured component has been resolved yet
    pub fn is_unresolved(&self) -> bool {
        self.city.is_none() && self.state.is_none() && self.zip_code.is_none()
    }

    /// "City, ST" when both parts are known
    pub fn city_state(&self) -> Option<String> {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => Some(format!("{}, {}", city, state)),
            _ => None,
        }
    }

    /// Fill empty components from another address (never overwrites)
    pub fn fill_from(&mut self, other: &Address) {
        fill(&mut self.street, &other.street);
        fill(&mut self.city, &other.city);
        fill(&mut self.state, &other.state);
        fill(&mut self.zip_code, &other.zip_code);
        fill(&mut self.raw_address, &other.raw_address);
        if self.latitude.is_none() {
            self.latitude = other.latitude;
        }
        if self.longitude.is_none() {
            self.longitude = other.longitude;
        }
    }
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.is_none() {
        if let Some(value) = source {
            *target = Some(value.clone());
        }
    }
}
