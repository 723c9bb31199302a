//! Server configuration read from the environment.

use waste_tracker_analytics_models::SummaryOptions;
use waste_tracker_database::{ConfigError, StoreConfig};

/// Environment variable holding the monthly limit in kilograms.
pub const LIMIT_ENV: &str = "WASTE_MONTHLY_LIMIT_KG";
/// Environment variable holding the warning fraction.
pub const WARNING_FRACTION_ENV: &str = "WASTE_WARNING_FRACTION";
/// Environment variable holding the number of recent entries to list.
pub const RECENT_LIMIT_ENV: &str = "WASTE_RECENT_LIMIT";
/// Comma-separated fixed business list.
pub const BUSINESSES_ENV: &str = "WASTE_BUSINESSES";
/// Comma-separated fixed stream list.
pub const STREAMS_ENV: &str = "WASTE_STREAMS";

/// Everything needed to start the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Record store location and calendar offset.
    pub store: StoreConfig,
    /// Limit, warning threshold and label lists for summaries.
    pub summary: SummaryOptions,
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            summary: SummaryOptions::default(),
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first malformed variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            store: StoreConfig::from_lookup(&lookup)?,
            ..Self::default()
        };

        if let Some(addr) = lookup("BIND_ADDR").filter(|a| !a.trim().is_empty()) {
            config.bind_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::new("PORT", &port, "expected a port number"))?;
        }

        config.summary = summary_options(&lookup)?;

        Ok(config)
    }
}

/// Reads the summary options from `lookup`, defaulting unset variables.
///
/// # Errors
///
/// Returns [`ConfigError`] naming the first malformed variable.
pub fn summary_options(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SummaryOptions, ConfigError> {
    let mut options = SummaryOptions::default();

    if let Some(raw) = lookup(LIMIT_ENV) {
        options.limit_kg = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| ConfigError::new(LIMIT_ENV, &raw, "expected a positive number"))?;
    }

    if let Some(raw) = lookup(WARNING_FRACTION_ENV) {
        options.warning_fraction = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| (0.0..=1.0).contains(v))
            .ok_or_else(|| {
                ConfigError::new(WARNING_FRACTION_ENV, &raw, "expected a number from 0 to 1")
            })?;
    }

    if let Some(raw) = lookup(RECENT_LIMIT_ENV) {
        options.recent_limit = raw.trim().parse().map_err(|_| {
            ConfigError::new(RECENT_LIMIT_ENV, &raw, "expected a non-negative integer")
        })?;
    }

    options.businesses = lookup(BUSINESSES_ENV).and_then(|raw| split_list(&raw));
    options.streams = lookup(STREAMS_ENV).and_then(|raw| split_list(&raw));

    Ok(options)
}

/// Splits a comma-separated list, dropping blanks. `None` if nothing is left.
fn split_list(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 8080);
        assert!(config.summary.businesses.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("WASTE_DB_PATH", "/var/lib/waste/waste.db"),
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9090"),
            (LIMIT_ENV, "2500"),
            (WARNING_FRACTION_ENV, "0.9"),
            (RECENT_LIMIT_ENV, "5"),
            (BUSINESSES_ENV, "DAB, PKP,,"),
            (STREAMS_ENV, " "),
        ]))
        .unwrap();

        assert_eq!(
            config.store.db_path,
            std::path::PathBuf::from("/var/lib/waste/waste.db")
        );
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert!((config.summary.limit_kg - 2500.0).abs() < f64::EPSILON);
        assert!((config.summary.warning_fraction - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.summary.recent_limit, 5);
        assert_eq!(
            config.summary.businesses,
            Some(vec!["DAB".to_string(), "PKP".to_string()])
        );
        assert_eq!(config.summary.streams, None);
    }

    #[test]
    fn rejects_malformed_values() {
        for (name, value) in [
            ("PORT", "eighty"),
            (LIMIT_ENV, "0"),
            (LIMIT_ENV, "-10"),
            (WARNING_FRACTION_ENV, "1.5"),
            (RECENT_LIMIT_ENV, "-1"),
            ("WASTE_UTC_OFFSET", "later"),
        ] {
            let err = ServerConfig::from_lookup(lookup(&[(name, value)])).unwrap_err();
            assert_eq!(err.name, name);
        }
    }
}
