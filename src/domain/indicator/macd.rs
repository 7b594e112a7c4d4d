//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Every EMA starts its recursion at its first input (see `ema::ema_values`).
//! Default parameters: fast=12, slow=26, signal=9
//! A point has a value once both lines exist: index >= max(fast, slow) - 1 + signal - 1.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{
    empty_series, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if fast == 0 || slow == 0 || signal_period == 0 {
        return empty_series(bars, indicator_type);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    // The signal EMA runs over the defined stretch of the MACD line only.
    let line_start = macd_line
        .iter()
        .position(Option::is_some)
        .unwrap_or(macd_line.len());
    let defined: Vec<f64> = macd_line[line_start..].iter().flatten().copied().collect();
    let mut signal_line = vec![None; line_start];
    signal_line.extend(ema_values(&defined, signal_period));

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = match (macd_line[i], signal_line[i]) {
                (Some(line), Some(signal)) => Some(IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                }),
                _ => None,
            };
            IndicatorPoint {
                date: bar.date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
