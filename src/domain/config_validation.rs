//! Configuration validation.
//!
//! Validates the application config before any data is read.

use crate::domain::error::StocktaError;
use crate::domain::exchange::Exchange;
use crate::domain::range_mode::RangeMode;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATA_SOURCES: [&str; 2] = ["csv", "sqlite"];
pub const SETTINGS_STORES: [&str; 2] = ["json", "sqlite"];

pub fn validate_app_config(config: &dyn ConfigPort) -> Result<(), StocktaError> {
    validate_data_source(config)?;
    validate_exchange(config)?;
    validate_range(config)?;
    validate_date(config, "start_date")?;
    validate_date(config, "end_date")?;
    validate_settings_store(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StocktaError {
    StocktaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn require_non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), StocktaError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StocktaError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), StocktaError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string())
        .to_ascii_lowercase();
    match source.as_str() {
        "csv" => require_non_empty(config, "data", "csv_dir"),
        "sqlite" => require_non_empty(config, "data", "sqlite_path"),
        other => Err(invalid(
            "data",
            "source",
            format!("unknown source '{}', expected one of {:?}", other, DATA_SOURCES),
        )),
    }
}

fn validate_exchange(config: &dyn ConfigPort) -> Result<(), StocktaError> {
    match config.get_string("analysis", "exchange") {
        Some(s) if !s.trim().is_empty() => s
            .parse::<Exchange>()
            .map(|_| ())
            .map_err(|e| invalid("analysis", "exchange", e.to_string())),
        _ => Ok(()),
    }
}

fn validate_range(config: &dyn ConfigPort) -> Result<(), StocktaError> {
    match config.get_string("analysis", "range") {
        Some(s) if !s.trim().is_empty() => s
            .parse::<RangeMode>()
            .map(|_| ())
            .map_err(|e| invalid("analysis", "range", e.to_string())),
        _ => Ok(()),
    }
}

fn validate_date(config: &dyn ConfigPort, key: &str) -> Result<(), StocktaError> {
    match config.get_string("analysis", key) {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| invalid("analysis", key, format!("invalid {key} format, expected YYYY-MM-DD"))),
        _ => Ok(()),
    }
}

fn validate_settings_store(config: &dyn ConfigPort) -> Result<(), StocktaError> {
    let store = config
        .get_string("settings", "store")
        .unwrap_or_else(|| "json".to_string())
        .to_ascii_lowercase();
    if SETTINGS_STORES.contains(&store.as_str()) {
        Ok(())
    } else {
        Err(invalid(
            "settings",
            "store",
            format!("unknown store '{}', expected one of {:?}", store, SETTINGS_STORES),
        ))
    }
}
