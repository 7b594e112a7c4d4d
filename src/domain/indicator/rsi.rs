//! RSI (Relative Strength Index) indicator.
//!
//! Wilder's smoothing (alpha = 1/n) of per-bar gains and losses. The first bar
//! contributes a zero gain and loss, and the recursion starts there; values
//! are reported once n bars have been seen.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: the first n-1 bars have no value.

use crate::domain::indicator::ema::smoothed;
use crate::domain::indicator::{
    empty_series, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return empty_series(bars, IndicatorType::Rsi(period));
    }

    let changes: Vec<f64> = std::iter::once(0.0)
        .chain(bars.windows(2).map(|w| w[1].close - w[0].close))
        .collect();
    let gains: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();

    let alpha = 1.0 / period as f64;
    let avg_gain = smoothed(&gains, alpha, period);
    let avg_loss = smoothed(&losses, alpha, period);

    let values = bars
        .iter()
        .zip(avg_gain.iter().zip(&avg_loss))
        .map(|(bar, (gain, loss))| IndicatorPoint {
            date: bar.date,
            value: match (gain, loss) {
                (Some(g), Some(l)) => Some(IndicatorValue::Simple(rsi_from_averages(*g, *l))),
                _ => None,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert_eq!(series.values.len(), 0);
    }

    #[test]
    fn rsi_single_bar() {
        let bars = make_bars(&[100.0]);
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.values.len(), 1);
        assert!(series.values[0].value.is_none());
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);

        assert_eq!(series.values.len(), 15);
        for i in 0..13 {
            assert!(series.values[i].value.is_none(), "bar {} should be empty", i);
        }
        assert!(series.values[13].value.is_some());
        assert!(series.values[14].value.is_some());
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        assert_eq!(series.simple_at(14), Some(100.0));
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        let rsi = series.simple_at(14).unwrap();
        assert!(rsi.abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_in_range() {
        let prices: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let series = calculate_rsi(&make_bars(&prices), 14);

        for i in 0..series.len() {
            if let Some(rsi) = series.simple_at(i) {
                assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
            }
        }
    }

    #[test]
    fn rsi_zero_period() {
        let bars = make_bars(&[100.0, 101.0]);
        let series = calculate_rsi(&bars, 0);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        // Period 2 (alpha 0.5): changes 0, +2, -1, +3.
        let bars = make_bars(&[10.0, 12.0, 11.0, 14.0]);
        let series = calculate_rsi(&bars, 2);

        // gain 1.0, loss 0.0 -> no losses yet
        assert_eq!(series.simple_at(1), Some(100.0));

        // gain 0.5, loss 0.5 -> RS 1
        let even = series.simple_at(2).unwrap();
        assert!((even - 50.0).abs() < 1e-9);

        // gain 1.75, loss 0.25 -> RS 7
        let next = series.simple_at(3).unwrap();
        assert!((next - 87.5).abs() < 1e-9);
    }

    #[test]
    fn rsi_known_calculation() {
        let prices = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let series = calculate_rsi(&make_bars(&prices), 14);
        let rsi = series.simple_at(14).unwrap();
        assert!(rsi > 50.0 && rsi < 100.0, "RSI should be in bullish territory");
    }
}
