//! Exchange-threshold trend segmentation.
//!
//! A cursor walks the series. At each position windows of 15 down to 7 bars
//! are tried, and the first (longest) window whose close-to-close change
//! reaches the exchange threshold becomes a segment; the cursor then jumps
//! past it. Otherwise the cursor advances one bar. Bars outside every segment
//! carry no trend.

use crate::domain::exchange::Exchange;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::series::Series;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::debug;

pub const MIN_WINDOW: usize = 7;
pub const MAX_WINDOW: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Uptrend => "uptrend",
            TrendDirection::Downtrend => "downtrend",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSegment {
    pub symbol: String,
    pub exchange: Exchange,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub direction: TrendDirection,
    pub percent_change: f64,
    pub day_count: usize,
}

impl TrendSegment {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }

    /// "dd/mm/YYYY to dd/mm/YYYY"
    pub fn period_label(&self) -> String {
        format!(
            "{} to {}",
            self.period_start.format("%d/%m/%Y"),
            self.period_end.format("%d/%m/%Y")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantTrend {
    Uptrend,
    Downtrend,
    Balanced,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSummary {
    pub total_periods: usize,
    pub uptrend_periods: usize,
    pub downtrend_periods: usize,
    pub dominant_trend: DominantTrend,
}

/// Segments the whole series.
pub fn segment_trends(series: &Series, exchange: Exchange) -> Vec<TrendSegment> {
    let segments = scan(series.bars(), series.code(), exchange);
    debug!(
        code = series.code(),
        exchange = %exchange,
        bars = series.len(),
        segments = segments.len(),
        "trend segmentation done"
    );
    segments
}

fn scan(bars: &[OhlcvBar], symbol: &str, exchange: Exchange) -> Vec<TrendSegment> {
    let threshold = exchange.trend_threshold_pct();
    let n = bars.len();
    let mut segments = Vec::new();
    let mut start = 0;

    while start + MIN_WINDOW <= n {
        let longest = MAX_WINDOW.min(n - start);
        let found = (MIN_WINDOW..=longest).rev().find_map(|len| {
            let first = &bars[start];
            let last = &bars[start + len - 1];
            let pct = (last.close - first.close) / first.close * 100.0;
            let direction = if pct >= threshold {
                TrendDirection::Uptrend
            } else if pct <= -threshold {
                TrendDirection::Downtrend
            } else {
                return None;
            };
            Some(TrendSegment {
                symbol: symbol.to_string(),
                exchange,
                period_start: first.date,
                period_end: last.date,
                direction,
                percent_change: pct,
                day_count: len,
            })
        });

        match found {
            Some(segment) => {
                start += segment.day_count;
                segments.push(segment);
            }
            None => start += 1,
        }
    }
    segments
}

pub fn summarize(segments: &[TrendSegment]) -> TrendSummary {
    let up = segments
        .iter()
        .filter(|s| s.direction == TrendDirection::Uptrend)
        .count();
    let down = segments.len() - up;
    let dominant_trend = if segments.is_empty() {
        DominantTrend::None
    } else if up > down {
        DominantTrend::Uptrend
    } else if down > up {
        DominantTrend::Downtrend
    } else {
        DominantTrend::Balanced
    };
    TrendSummary {
        total_periods: segments.len(),
        uptrend_periods: up,
        downtrend_periods: down,
        dominant_trend,
    }
}

/// Index of the segment covering each bar, if any.
pub fn segment_membership(bars: &[OhlcvBar], segments: &[TrendSegment]) -> Vec<Option<usize>> {
    let mut out = Vec::with_capacity(bars.len());
    let mut seg = 0;
    for bar in bars {
        while seg < segments.len() && segments[seg].period_end < bar.date {
            seg += 1;
        }
        let hit = segments.get(seg).filter(|s| s.contains(bar.date)).map(|_| seg);
        out.push(hit);
    }
    out
}

/// Trend direction at each bar, `None` where no segment applies.
pub fn segment_context(bars: &[OhlcvBar], segments: &[TrendSegment]) -> Vec<Option<TrendDirection>> {
    segment_membership(bars, segments)
        .into_iter()
        .map(|m| m.map(|i| segments[i].direction))
        .collect()
}
