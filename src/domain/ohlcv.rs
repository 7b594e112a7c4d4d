//! OHLCV bar representation and single-candle geometry.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub code: String,
    pub exchange: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Body and shadow sizes of a candle as fractions of its high-low range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleShape {
    pub body_ratio: f64,
    pub upper_shadow_ratio: f64,
    pub lower_shadow_ratio: f64,
}

impl OhlcvBar {
    /// |close - open|
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// high - max(open, close)
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// min(open, close) - low
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// |close - open| / open * 100. Zero when open is zero.
    pub fn body_percentage(&self) -> f64 {
        if self.open == 0.0 {
            return 0.0;
        }
        self.body() / self.open * 100.0
    }

    /// Ratios of body and shadows to the range. `None` for a zero-range bar,
    /// whose shape is undefined.
    pub fn shape(&self) -> Option<CandleShape> {
        let range = self.range();
        if range <= 0.0 {
            return None;
        }
        Some(CandleShape {
            body_ratio: self.body() / range,
            upper_shadow_ratio: self.upper_shadow() / range,
            lower_shadow_ratio: self.lower_shadow() / range,
        })
    }

    /// Finite positive prices, open/close inside [low, high], non-negative volume.
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        if self.high < self.low {
            return false;
        }
        let inside = |p: f64| p >= self.low && p <= self.high;
        inside(self.open) && inside(self.close) && self.volume >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            code: "VNM".into(),
            exchange: "HSX".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn body_and_shadows() {
        let bar = sample_bar();
        assert_relative_eq!(bar.body(), 5.0);
        assert_relative_eq!(bar.upper_shadow(), 5.0);
        assert_relative_eq!(bar.lower_shadow(), 10.0);
        assert_relative_eq!(bar.range(), 20.0);
    }

    #[test]
    fn shape_ratios_sum_to_one() {
        let shape = sample_bar().shape().unwrap();
        assert_relative_eq!(shape.body_ratio, 0.25);
        assert_relative_eq!(shape.upper_shadow_ratio, 0.25);
        assert_relative_eq!(shape.lower_shadow_ratio, 0.5);
        assert_relative_eq!(
            shape.body_ratio + shape.upper_shadow_ratio + shape.lower_shadow_ratio,
            1.0
        );
    }

    #[test]
    fn zero_range_has_no_shape() {
        let bar = OhlcvBar {
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            ..sample_bar()
        };
        assert!(bar.shape().is_none());
    }

    #[test]
    fn body_percentage_relative_to_open() {
        let bar = sample_bar();
        assert_relative_eq!(bar.body_percentage(), 5.0);
    }

    #[test]
    fn direction() {
        let bar = sample_bar();
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());
    }

    #[test]
    fn well_formed_rejects_inverted_range() {
        let bar = OhlcvBar {
            high: 80.0,
            ..sample_bar()
        };
        assert!(!bar.is_well_formed());
        assert!(sample_bar().is_well_formed());
    }

    #[test]
    fn well_formed_rejects_nan_and_negative_volume() {
        let nan = OhlcvBar {
            close: f64::NAN,
            ..sample_bar()
        };
        let negative = OhlcvBar {
            volume: -1,
            ..sample_bar()
        };
        assert!(!nan.is_well_formed());
        assert!(!negative.is_well_formed());
    }
}
