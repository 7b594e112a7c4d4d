//! Core domain types and analysis.

pub mod candle;
pub mod chart_report;
pub mod config_validation;
pub mod error;
pub mod exchange;
pub mod frame;
pub mod indicator;
pub mod ohlcv;
pub mod prediction;
pub mod range_mode;
pub mod series;
pub mod settings;
pub mod signal;
pub mod trend;
pub mod weekly_trend;
