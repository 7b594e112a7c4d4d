//! Static support/resistance: the lowest and highest close over the whole window.

use crate::domain::indicator::{
    empty_series, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_levels(bars: &[OhlcvBar]) -> IndicatorSeries {
    if bars.is_empty() {
        return empty_series(bars, IndicatorType::SupportResistance);
    }

    let support = bars.iter().map(|b| b.close).fold(f64::MAX, f64::min);
    let resistance = bars.iter().map(|b| b.close).fold(f64::MIN, f64::max);
    let level = IndicatorValue::Levels {
        support,
        resistance,
    };

    IndicatorSeries {
        indicator_type: IndicatorType::SupportResistance,
        values: bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                value: Some(level),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn levels_are_global_min_max_of_close() {
        let bars = make_bars(&[12.0, 9.5, 15.0, 11.0]);
        let series = calculate_levels(&bars);
        assert_eq!(series.len(), 4);
        for i in 0..4 {
            assert_eq!(
                series.get(i),
                Some(&IndicatorValue::Levels {
                    support: 9.5,
                    resistance: 15.0
                })
            );
        }
    }

    #[test]
    fn levels_empty() {
        assert!(calculate_levels(&[]).is_empty());
    }
}
