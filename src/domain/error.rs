//! Domain error types.

use chrono::NaiveDate;

/// Failures raised while reading or updating per-user chart settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown settings key: {key}")]
    UnknownKey { key: String },

    #[error("invalid value for {key}: {value} (expected true/false)")]
    InvalidValue { key: String, value: String },

    #[error("at most {limit} candle pattern highlights may be active at once; disable one first")]
    TooManyHighlights { limit: usize },

    #[error("malformed assignment '{input}' (expected KEY=VALUE)")]
    MalformedAssignment { input: String },

    #[error("settings store error: {reason}")]
    Store { reason: String },
}

/// Top-level error type for stockta.
#[derive(Debug, thiserror::Error)]
pub enum StocktaError {
    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("data query error: {reason}")]
    DataQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unsupported exchange '{code}' (supported: HSX, HOSE, HNX, UPCOM)")]
    UnknownExchange { code: String },

    #[error("unsupported range mode '{token}' (supported: short, long)")]
    UnknownRangeMode { token: String },

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("no data for {code} on {exchange}")]
    NoData { code: String, exchange: String },

    #[error("insufficient data for {code}: have {bars} bars, need {minimum}")]
    InsufficientData {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("bars for {code} are not strictly ascending by date at {date}")]
    UnorderedSeries { code: String, date: NaiveDate },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StocktaError {
    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            StocktaError::Io(_) | StocktaError::Json(_) => 1,
            StocktaError::ConfigParse { .. }
            | StocktaError::ConfigMissing { .. }
            | StocktaError::ConfigInvalid { .. } => 2,
            StocktaError::Data { .. } | StocktaError::DataQuery { .. } => 3,
            StocktaError::Settings(_) => 4,
            StocktaError::NoData { .. }
            | StocktaError::InsufficientData { .. }
            | StocktaError::UnorderedSeries { .. } => 5,
            StocktaError::UnknownExchange { .. }
            | StocktaError::UnknownRangeMode { .. }
            | StocktaError::InvalidDateRange { .. } => 6,
        }
    }
}

impl From<&StocktaError> for std::process::ExitCode {
    fn from(err: &StocktaError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_exchange_message_lists_supported_codes() {
        let err = StocktaError::UnknownExchange {
            code: "NYSE".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("NYSE"));
        assert!(msg.contains("HSX"));
        assert!(msg.contains("UPCOM"));
    }

    #[test]
    fn settings_error_converts_into_top_level() {
        let err: StocktaError = SettingsError::TooManyHighlights { limit: 4 }.into();
        assert!(matches!(err, StocktaError::Settings(_)));
        assert!(err.to_string().contains("at most 4"));
    }

    #[test]
    fn exit_codes_group_by_family() {
        let insufficient = StocktaError::InsufficientData {
            code: "VNM".into(),
            bars: 1,
            minimum: 2,
        };
        let exchange = StocktaError::UnknownExchange { code: "X".into() };
        assert_eq!(insufficient.exit_status(), 5);
        assert_eq!(exchange.exit_status(), 6);
        assert_eq!(StocktaError::Data { reason: "x".into() }.exit_status(), 3);
        let reversed = StocktaError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        };
        assert_eq!(reversed.exit_status(), 6);
    }
}
