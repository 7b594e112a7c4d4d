//! Trailing average volume.
//!
//! Mean of up to `period` most recent volumes, defined from the first bar on
//! (a shorter history averages what is available).

use crate::domain::indicator::{
    empty_series, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_volume_avg(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return empty_series(bars, IndicatorType::VolumeAvg(period));
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let start = (i + 1).saturating_sub(period);
            let window = &bars[start..=i];
            let total: f64 = window.iter().map(|b| b.volume as f64).sum();
            IndicatorPoint {
                date: bar.date,
                value: Some(IndicatorValue::Simple(total / window.len() as f64)),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeAvg(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    fn with_volumes(volumes: &[i64]) -> Vec<OhlcvBar> {
        let mut bars = make_bars(&vec![10.0; volumes.len()]);
        for (bar, v) in bars.iter_mut().zip(volumes) {
            bar.volume = *v;
        }
        bars
    }

    #[test]
    fn defined_from_first_bar() {
        let bars = with_volumes(&[100, 300]);
        let series = calculate_volume_avg(&bars, 20);
        assert_eq!(series.simple_at(0), Some(100.0));
        assert_eq!(series.simple_at(1), Some(200.0));
    }

    #[test]
    fn window_slides() {
        let bars = with_volumes(&[100, 200, 300, 400]);
        let series = calculate_volume_avg(&bars, 2);
        assert_eq!(series.simple_at(3), Some(350.0));
    }
}
