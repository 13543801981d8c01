// ⚙️ Configuration - environment driven, with defaults for every knob
//
// An optional `.env` file is loaded first. Values that fail to parse
// fall back to their default.

use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file used by the profile store
    pub database_path: String,
    pub api_host: String,
    pub api_port: u16,
    /// Default number of matches returned per request
    pub match_limit: usize,
    /// Run the enrichment stage during onboarding
    pub enrichment_enabled: bool,
    /// Seed for the estimator's variation; entropy when unset
    pub estimator_seed: Option<u64>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Config {
            database_path: env_or_default("CARRIER_DATABASE_PATH", "carrier_data.db"),
            api_host: env_or_default("CARRIER_API_HOST", "0.0.0.0"),
            api_port: env_or_default("CARRIER_API_PORT", "5000")
                .parse()
                .unwrap_or(5000),
            match_limit: env_or_default("CARRIER_MATCH_LIMIT", "10")
                .parse()
                .unwrap_or(10),
            enrichment_enabled: parse_bool(&env_or_default("CARRIER_ENRICHMENT_ENABLED", "true"))
                .unwrap_or(true),
            estimator_seed: env::var("CARRIER_ESTIMATOR_SEED")
                .ok()
                .and_then(|seed| seed.trim().parse().ok()),
            log_level: env_or_default("CARRIER_LOG_LEVEL", "info"),
        }
    }

    /// "host:port" for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: "carrier_data.db".to_string(),
            api_host: "0.0.0.0".to_string(),
            api_port: 5000,
            match_limit: 10,
            enrichment_enabled: true,
            estimator_seed: None,
            log_level: "info".to_string(),
        }
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.match_limit, 10);
        assert!(config.enrichment_enabled);
        assert_eq!(config.estimator_seed, None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
