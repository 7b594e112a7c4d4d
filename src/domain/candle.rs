//! Single-candle pattern classification and gap detection.
//!
//! Each bar gets exactly one `PatternLabel`, chosen by priority:
//! Doji family, Marubozu, Spinning Top, Hammer family, inverted Hammer family,
//! then Standard. Directional variants depend on the trend context at the bar.

use crate::domain::exchange::Exchange;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::trend::TrendDirection;
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub const DOJI_BODY: f64 = 0.03;
pub const SMALL_BODY: f64 = 0.1;
pub const SMALL_SHADOW: f64 = 0.05;
pub const LARGE_SHADOW: f64 = 0.3;
pub const STAR_TOLERANCE: f64 = 0.02;
pub const LONG_LEGGED_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternLabel {
    StarDoji,
    LongLeggedDoji,
    DragonflyDoji,
    GravestoneDoji,
    Doji,
    Marubozu,
    SpinningTop,
    Hammer,
    HangingMan,
    InvertedHammer,
    ShootingStar,
    Standard,
}

impl PatternLabel {
    pub const ALL: [PatternLabel; 12] = [
        PatternLabel::StarDoji,
        PatternLabel::LongLeggedDoji,
        PatternLabel::DragonflyDoji,
        PatternLabel::GravestoneDoji,
        PatternLabel::Doji,
        PatternLabel::Marubozu,
        PatternLabel::SpinningTop,
        PatternLabel::Hammer,
        PatternLabel::HangingMan,
        PatternLabel::InvertedHammer,
        PatternLabel::ShootingStar,
        PatternLabel::Standard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternLabel::StarDoji => "Star Doji",
            PatternLabel::LongLeggedDoji => "Long Legged Doji",
            PatternLabel::DragonflyDoji => "Dragonfly Doji",
            PatternLabel::GravestoneDoji => "Gravestone Doji",
            PatternLabel::Doji => "Doji",
            PatternLabel::Marubozu => "Marubozu",
            PatternLabel::SpinningTop => "Spinning Top",
            PatternLabel::Hammer => "Hammer",
            PatternLabel::HangingMan => "Hanging Man",
            PatternLabel::InvertedHammer => "Inverted Hammer",
            PatternLabel::ShootingStar => "Shooting Star",
            PatternLabel::Standard => "Standard",
        }
    }
}

impl fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PatternLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GapType {
    NoGap,
    RisingWindow,
    FallingWindow,
}

impl GapType {
    pub fn name(self) -> &'static str {
        match self {
            GapType::NoGap => "No Gap",
            GapType::RisingWindow => "Rising Window",
            GapType::FallingWindow => "Falling Window",
        }
    }
}

impl Serialize for GapType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Labels one bar. A zero-range bar is Standard.
///
/// With ratios summing to one, a Star Doji (all three parts tiny) cannot
/// occur on a bar with a positive range; the rule is kept in first position
/// so the priority order stays explicit.
pub fn classify_bar(
    bar: &OhlcvBar,
    context: Option<TrendDirection>,
    exchange: Exchange,
) -> PatternLabel {
    use TrendDirection::{Downtrend, Uptrend};

    let Some(shape) = bar.shape() else {
        return PatternLabel::Standard;
    };
    let body = shape.body_ratio;
    let upper = shape.upper_shadow_ratio;
    let lower = shape.lower_shadow_ratio;

    if body <= DOJI_BODY {
        if upper <= SMALL_SHADOW
            && lower <= SMALL_SHADOW
            && (lower - upper).abs() <= STAR_TOLERANCE
        {
            return PatternLabel::StarDoji;
        }
        if upper >= LARGE_SHADOW
            && lower >= LARGE_SHADOW
            && (upper - lower).abs() <= LONG_LEGGED_TOLERANCE
        {
            return PatternLabel::LongLeggedDoji;
        }
        if upper <= SMALL_SHADOW && lower >= LARGE_SHADOW {
            return match context {
                Some(Uptrend) => PatternLabel::HangingMan,
                Some(Downtrend) | None => PatternLabel::DragonflyDoji,
            };
        }
        if lower <= SMALL_SHADOW && upper >= LARGE_SHADOW {
            return match context {
                Some(Downtrend) => PatternLabel::InvertedHammer,
                Some(Uptrend) | None => PatternLabel::GravestoneDoji,
            };
        }
        return PatternLabel::Doji;
    }

    if upper <= SMALL_SHADOW
        && lower <= SMALL_SHADOW
        && bar.body_percentage() >= exchange.marubozu_threshold_pct()
    {
        return PatternLabel::Marubozu;
    }

    if body <= SMALL_BODY && upper >= LARGE_SHADOW && lower >= LARGE_SHADOW {
        return PatternLabel::SpinningTop;
    }

    if body <= SMALL_BODY && lower >= LARGE_SHADOW && upper <= SMALL_SHADOW {
        return match context {
            Some(Uptrend) => PatternLabel::HangingMan,
            Some(Downtrend) | None => PatternLabel::Hammer,
        };
    }

    if body <= SMALL_BODY && upper >= LARGE_SHADOW && lower <= SMALL_SHADOW {
        return match context {
            Some(Uptrend) => PatternLabel::ShootingStar,
            Some(Downtrend) | None => PatternLabel::InvertedHammer,
        };
    }

    PatternLabel::Standard
}

/// Labels every bar; `context` is aligned with `bars` (missing entries mean no trend).
pub fn classify_bars(
    bars: &[OhlcvBar],
    context: &[Option<TrendDirection>],
    exchange: Exchange,
) -> Vec<PatternLabel> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| classify_bar(bar, context.get(i).copied().flatten(), exchange))
        .collect()
}

/// Gap between each bar's open and the previous bar's range. The first bar has none.
pub fn detect_gaps(bars: &[OhlcvBar]) -> Vec<GapType> {
    let mut gaps = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let gap = match i.checked_sub(1).map(|p| &bars[p]) {
            Some(prev) if bar.open > prev.high => GapType::RisingWindow,
            Some(prev) if bar.open < prev.low => GapType::FallingWindow,
            _ => GapType::NoGap,
        };
        gaps.push(gap);
    }
    gaps
}

/// Named counts, most frequent first. Serializes as a JSON object whose keys
/// keep that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<V>(pub Vec<(String, V)>);

impl<V> Ranked<V> {
    pub fn get(&self, name: &str) -> Option<&V> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Serialize> Serialize for Ranked<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Count descending, ties in `K` order.
fn rank<K: Ord + Copy>(items: impl IntoIterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternShare {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleStatistics {
    pub total_candles: usize,
    pub pattern_distribution: Ranked<PatternShare>,
    pub most_common_pattern: Option<PatternLabel>,
    /// Patterns present, most frequent first.
    pub pattern_types: Vec<PatternLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapStatistics {
    pub gap_distribution: Ranked<usize>,
    pub total_gaps: usize,
    pub rising_windows: usize,
    pub falling_windows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub candle_pattern: PatternLabel,
    pub gap_type: GapType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleAnalysis {
    pub candle_analysis: CandleStatistics,
    pub gap_analysis: GapStatistics,
    pub detailed_data: Vec<CandleRow>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn candle_statistics(labels: &[PatternLabel]) -> CandleStatistics {
    let total = labels.len();
    let ranked = rank(labels.iter().copied());

    let pattern_distribution = ranked
        .iter()
        .map(|(label, count)| {
            (
                label.name().to_string(),
                PatternShare {
                    count: *count,
                    percentage: round2(*count as f64 / total as f64 * 100.0),
                },
            )
        })
        .collect();
    let pattern_distribution = Ranked(pattern_distribution);

    CandleStatistics {
        total_candles: total,
        pattern_distribution,
        most_common_pattern: ranked.first().map(|(label, _)| *label),
        pattern_types: ranked.iter().map(|(label, _)| *label).collect(),
    }
}

pub fn gap_statistics(gaps: &[GapType]) -> GapStatistics {
    let distribution = rank(gaps.iter().copied())
        .into_iter()
        .map(|(gap, count)| (gap.name().to_string(), count))
        .collect();
    let rising = gaps.iter().filter(|g| **g == GapType::RisingWindow).count();
    let falling = gaps.iter().filter(|g| **g == GapType::FallingWindow).count();
    GapStatistics {
        gap_distribution: Ranked(distribution),
        total_gaps: rising + falling,
        rising_windows: rising,
        falling_windows: falling,
    }
}

/// Labels, gaps, and their statistics for a series of bars.
pub fn analyze_candle_patterns(
    bars: &[OhlcvBar],
    context: &[Option<TrendDirection>],
    exchange: Exchange,
) -> CandleAnalysis {
    let labels = classify_bars(bars, context, exchange);
    let gaps = detect_gaps(bars);
    let detailed_data = bars
        .iter()
        .zip(labels.iter().zip(&gaps))
        .map(|(bar, (label, gap))| CandleRow {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            candle_pattern: *label,
            gap_type: *gap,
        })
        .collect();

    CandleAnalysis {
        candle_analysis: candle_statistics(&labels),
        gap_analysis: gap_statistics(&gaps),
        detailed_data,
    }
}
