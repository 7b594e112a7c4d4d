//! Simple Moving Average of closes.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). The first (n-1) points have no value.

use crate::domain::indicator::{
    empty_series, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return empty_series(bars, IndicatorType::Sma(period));
    }

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if i + 1 >= period {
            let window = &bars[i + 1 - period..=i];
            let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            Some(IndicatorValue::Simple(mean))
        } else {
            None
        };
        values.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
