//! Store configuration read from the environment.

use std::path::PathBuf;

use chrono::{FixedOffset, Offset as _, Utc};

/// Environment variable overriding the `SQLite` file location.
pub const DB_PATH_ENV: &str = "WASTE_DB_PATH";

/// Environment variable holding the UTC offset used for "today".
pub const UTC_OFFSET_ENV: &str = "WASTE_UTC_OFFSET";

/// Default `SQLite` file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "waste.db";

/// A malformed configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value '{value}' for {name}: {message}")]
pub struct ConfigError {
    /// The variable name.
    pub name: String,
    /// The rejected value.
    pub value: String,
    /// What was expected.
    pub message: String,
}

impl ConfigError {
    /// Creates an error for variable `name`.
    #[must_use]
    pub fn new(name: &str, value: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

/// Where the store lives and which calendar it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path of the `SQLite` database file.
    pub db_path: PathBuf,
    /// Offset that defines the local calendar day.
    pub utc_offset: FixedOffset,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            utc_offset: Utc.fix(),
        }
    }
}

impl StoreConfig {
    /// Creates a config for `db_path` using UTC.
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Reads `WASTE_DB_PATH` and `WASTE_UTC_OFFSET`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the offset is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the offset is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(offset) = lookup(UTC_OFFSET_ENV) {
            config.utc_offset = parse_utc_offset(&offset)
                .ok_or_else(|| ConfigError::new(UTC_OFFSET_ENV, &offset, "expected ±HH:MM"))?;
        }

        Ok(config)
    }
}

/// Parses `Z`, `UTC`, `+HH`, `+HHMM` or `+HH:MM` (and the `-` forms).
#[must_use]
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Some(Utc.fix());
    }

    let (sign, rest) = match s.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };

    let (hours, minutes) = if let Some(parts) = rest.split_once(':') {
        parts
    } else if rest.len() == 4 {
        rest.split_at_checked(2)?
    } else {
        (rest, "00")
    };

    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset as _;

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("Z"), Some(Utc.fix()));
        assert_eq!(parse_utc_offset("utc"), Some(Utc.fix()));
        assert_eq!(parse_utc_offset("+02:00"), FixedOffset::east_opt(7200));
        assert_eq!(parse_utc_offset("-0530"), FixedOffset::west_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("+09"), FixedOffset::east_opt(9 * 3600));
        assert_eq!(parse_utc_offset("02:00"), None);
        assert_eq!(parse_utc_offset("+25:00"), None);
        assert_eq!(parse_utc_offset("+2:00"), None);
        assert_eq!(parse_utc_offset(""), None);
    }

    #[test]
    fn defaults_without_variables() {
        let config = StoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.db_path, PathBuf::from("waste.db"));
    }

    #[test]
    fn reads_overrides() {
        let config = StoreConfig::from_lookup(|name| match name {
            DB_PATH_ENV => Some("/tmp/other.db".to_string()),
            UTC_OFFSET_ENV => Some("-05:00".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.utc_offset, FixedOffset::west_opt(5 * 3600).unwrap());
    }

    #[test]
    fn rejects_bad_offset() {
        let err = StoreConfig::from_lookup(|name| {
            (name == UTC_OFFSET_ENV).then(|| "noon".to_string())
        })
        .unwrap_err();
        assert_eq!(err.name, UTC_OFFSET_ENV);
        assert_eq!(err.value, "noon");
    }
}
