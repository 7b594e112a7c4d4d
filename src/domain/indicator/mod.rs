//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: one dated point; `value` is `None` until the lookback is satisfied
//! - `IndicatorValue`: enum for the different indicator output shapes
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: a time series of indicator values aligned with the bars

pub mod bollinger;
pub mod ema;
pub mod ichimoku;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use bollinger::calculate_bollinger;
pub use ichimoku::{calculate_ichimoku, calculate_ichimoku_line, IchimokuLine};
pub use levels::calculate_levels;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use volume::calculate_volume_avg;

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

/// Serialized untagged: a bare number, or an object of named lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    Levels {
        support: f64,
        resistance: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Ichimoku(IchimokuLine),
    SupportResistance,
    VolumeAvg(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn get(&self, index: usize) -> Option<&IndicatorValue> {
        self.values.get(index).and_then(|p| p.value.as_ref())
    }

    /// Scalar value at `index`, if the series is single-valued and computable there.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.get(index) {
            Some(IndicatorValue::Simple(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes any supported indicator over `bars`.
pub fn compute_indicator(bars: &[OhlcvBar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
        IndicatorType::Ichimoku(line) => calculate_ichimoku_line(bars, line),
        IndicatorType::SupportResistance => calculate_levels(bars),
        IndicatorType::VolumeAvg(period) => calculate_volume_avg(bars, period),
    }
}

/// A series with no computable values, one point per bar.
pub(crate) fn empty_series(bars: &[OhlcvBar], indicator_type: IndicatorType) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type,
        values: bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                value: None,
            })
            .collect(),
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "MA{}", period),
            IndicatorType::Rsi(period) => write!(f, "RSI{}", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BB({},{})", period, mult)
            }
            IndicatorType::Ichimoku(line) => write!(f, "{}", line),
            IndicatorType::SupportResistance => write!(f, "SR"),
            IndicatorType::VolumeAvg(period) => write!(f, "VOL_AVG{}", period),
        }
    }
}
