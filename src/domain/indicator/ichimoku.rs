//! Ichimoku Kinko Hyo lines.
//!
//! - Tenkan-sen: (highest high + lowest low) / 2 over 9 bars
//! - Kijun-sen: same over 26 bars
//! - Senkou Span A: (Tenkan + Kijun) / 2, plotted 26 bars ahead
//! - Senkou Span B: 52-bar midpoint, plotted 26 bars ahead
//! - Chikou Span: close plotted 26 bars behind
//!
//! All lines stay aligned with the input bars; the forward/backward shift
//! leaves the shifted-out positions empty.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;
use std::fmt;

pub const TENKAN_PERIOD: usize = 9;
pub const KIJUN_PERIOD: usize = 26;
pub const SENKOU_B_PERIOD: usize = 52;
pub const DISPLACEMENT: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IchimokuLine {
    Tenkan,
    Kijun,
    SenkouA,
    SenkouB,
    Chikou,
}

impl IchimokuLine {
    pub const ALL: [IchimokuLine; 5] = [
        IchimokuLine::Tenkan,
        IchimokuLine::Kijun,
        IchimokuLine::SenkouA,
        IchimokuLine::SenkouB,
        IchimokuLine::Chikou,
    ];
}

impl fmt::Display for IchimokuLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IchimokuLine::Tenkan => "ICHIMOKU_TENKAN",
            IchimokuLine::Kijun => "ICHIMOKU_KIJUN",
            IchimokuLine::SenkouA => "ICHIMOKU_SPAN_A",
            IchimokuLine::SenkouB => "ICHIMOKU_SPAN_B",
            IchimokuLine::Chikou => "ICHIMOKU_CHIKOU",
        };
        f.write_str(name)
    }
}

/// All five lines, in `IchimokuLine::ALL` order.
pub fn calculate_ichimoku(bars: &[OhlcvBar]) -> Vec<IndicatorSeries> {
    IchimokuLine::ALL
        .iter()
        .map(|&line| calculate_ichimoku_line(bars, line))
        .collect()
}

pub fn calculate_ichimoku_line(bars: &[OhlcvBar], line: IchimokuLine) -> IndicatorSeries {
    let raw: Vec<Option<f64>> = match line {
        IchimokuLine::Tenkan => midpoints(bars, TENKAN_PERIOD),
        IchimokuLine::Kijun => midpoints(bars, KIJUN_PERIOD),
        IchimokuLine::SenkouA => {
            let tenkan = midpoints(bars, TENKAN_PERIOD);
            let kijun = midpoints(bars, KIJUN_PERIOD);
            let span: Vec<Option<f64>> = tenkan
                .iter()
                .zip(&kijun)
                .map(|(t, k)| Some(((*t)? + (*k)?) / 2.0))
                .collect();
            shift_forward(&span, DISPLACEMENT)
        }
        IchimokuLine::SenkouB => shift_forward(&midpoints(bars, SENKOU_B_PERIOD), DISPLACEMENT),
        IchimokuLine::Chikou => {
            let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
            shift_back(&closes, DISPLACEMENT)
        }
    };

    let values = bars
        .iter()
        .zip(raw)
        .map(|(bar, v)| IndicatorPoint {
            date: bar.date,
            value: v.map(IndicatorValue::Simple),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ichimoku(line),
        values,
    }
}

/// (max high + min low) / 2 over a trailing window.
fn midpoints(bars: &[OhlcvBar], period: usize) -> Vec<Option<f64>> {
    (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            Some((high + low) / 2.0)
        })
        .collect()
}

/// out[i] = input[i - by]
fn shift_forward(input: &[Option<f64>], by: usize) -> Vec<Option<f64>> {
    (0..input.len())
        .map(|i| if i >= by { input[i - by] } else { None })
        .collect()
}

/// out[i] = input[i + by]
fn shift_back(input: &[Option<f64>], by: usize) -> Vec<Option<f64>> {
    (0..input.len())
        .map(|i| input.get(i + by).copied().flatten())
        .collect()
}
