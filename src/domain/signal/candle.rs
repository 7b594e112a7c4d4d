//! Candle pattern signals.
//!
//! Each special pattern maps to a signed strength. Patterns falling inside a
//! trend segment are summed into one event for the whole period; Marubozu bars
//! outside any segment stand alone.

use crate::domain::candle::{classify_bars, PatternLabel};
use crate::domain::exchange::Exchange;
use crate::domain::frame::IndicatorFrame;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{frame_volume_ratio, low_volume_hold, Action, SignalDate, SignalEvent};
use crate::domain::trend::{segment_membership, TrendDirection, TrendSegment};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Patterns that carry a signal. Everything else is ignored by the detector.
pub const SPECIAL_PATTERNS: [PatternLabel; 9] = [
    PatternLabel::Hammer,
    PatternLabel::InvertedHammer,
    PatternLabel::HangingMan,
    PatternLabel::ShootingStar,
    PatternLabel::StarDoji,
    PatternLabel::LongLeggedDoji,
    PatternLabel::DragonflyDoji,
    PatternLabel::GravestoneDoji,
    PatternLabel::Marubozu,
];

/// Aggregated reasons list at most this many individual signals.
pub const REASON_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct CandleDecision {
    pub action: Action,
    pub reason: String,
    pub strength: i32,
}

impl CandleDecision {
    fn new(action: Action, reason: impl Into<String>, strength: i32) -> Self {
        Self {
            action,
            reason: reason.into(),
            strength,
        }
    }

    fn hold(reason: impl Into<String>) -> Self {
        Self::new(Action::Hold, reason, 0)
    }
}

/// Signal for one labelled bar. `next` is the following bar, used to confirm a Star Doji.
pub fn pattern_signal(
    label: PatternLabel,
    trend: Option<TrendDirection>,
    bar: &OhlcvBar,
    next: Option<&OhlcvBar>,
) -> CandleDecision {
    use TrendDirection::{Downtrend, Uptrend};

    match label {
        PatternLabel::Standard => CandleDecision::hold("Standard candle - no special signal"),
        PatternLabel::Hammer => match trend {
            Some(Downtrend) => CandleDecision::new(
                Action::Buy,
                "Hammer pattern in downtrend suggests bullish reversal",
                3,
            ),
            _ => CandleDecision::hold("Hammer needs downtrend for reversal signal"),
        },
        PatternLabel::InvertedHammer => match trend {
            Some(Downtrend) => CandleDecision::new(
                Action::Buy,
                "Inverted Hammer in downtrend suggests potential bullish reversal",
                2,
            ),
            _ => CandleDecision::hold("Inverted Hammer needs downtrend for reversal signal"),
        },
        PatternLabel::HangingMan => CandleDecision::new(
            Action::Sell,
            "Hanging Man pattern in uptrend suggests bearish reversal",
            -3,
        ),
        PatternLabel::ShootingStar => CandleDecision::new(
            Action::Sell,
            "Shooting Star pattern in uptrend suggests bearish reversal",
            -3,
        ),
        PatternLabel::StarDoji => match star_doji_confirmation(trend, next) {
            Some(confirmed) => CandleDecision {
                reason: format!("Star Doji with confirmation: {}", confirmed.reason),
                ..confirmed
            },
            None => CandleDecision::hold("Star Doji needs confirmation from next candle"),
        },
        PatternLabel::LongLeggedDoji => match trend {
            Some(Uptrend) => CandleDecision::new(
                Action::Sell,
                "Long Legged Doji in uptrend suggests potential reversal to downside",
                -2,
            ),
            Some(Downtrend) => CandleDecision::new(
                Action::Buy,
                "Long Legged Doji in downtrend suggests potential reversal to upside",
                2,
            ),
            None => CandleDecision::hold("Long Legged Doji needs clear trend for reversal signal"),
        },
        PatternLabel::DragonflyDoji => CandleDecision::new(
            Action::Buy,
            "Dragonfly Doji in downtrend suggests bullish reversal",
            3,
        ),
        PatternLabel::GravestoneDoji => CandleDecision::new(
            Action::Sell,
            "Gravestone Doji in uptrend suggests bearish reversal",
            -3,
        ),
        PatternLabel::Marubozu => {
            let movement = bar.body_percentage();
            if bar.is_bullish() {
                CandleDecision::new(
                    Action::Buy,
                    format!("Green Marubozu with {:.1}% bullish movement", movement),
                    4,
                )
            } else {
                CandleDecision::new(
                    Action::Sell,
                    format!("Red Marubozu with {:.1}% bearish movement", movement),
                    -4,
                )
            }
        }
        PatternLabel::Doji | PatternLabel::SpinningTop => {
            CandleDecision::hold(format!("{} - no special signal", label))
        }
    }
}

/// `pattern_signal` behind the thin-volume gate; a thin bar is HOLD with strength zero.
pub fn evaluate(
    label: PatternLabel,
    trend: Option<TrendDirection>,
    bar: &OhlcvBar,
    next: Option<&OhlcvBar>,
    volume_ratio: f64,
) -> CandleDecision {
    match low_volume_hold(volume_ratio, "Candle") {
        Some(hold) => CandleDecision::hold(hold.reason),
        None => pattern_signal(label, trend, bar, next),
    }
}

/// A Star Doji is confirmed by a next candle moving against the trend.
fn star_doji_confirmation(
    trend: Option<TrendDirection>,
    next: Option<&OhlcvBar>,
) -> Option<CandleDecision> {
    let next = next?;
    match trend? {
        TrendDirection::Uptrend if next.is_bearish() => Some(CandleDecision::new(
            Action::Sell,
            "Star Doji in uptrend confirmed by bearish candle",
            -3,
        )),
        TrendDirection::Downtrend if next.is_bullish() => Some(CandleDecision::new(
            Action::Buy,
            "Star Doji in downtrend confirmed by bullish candle",
            3,
        )),
        _ => None,
    }
}

/// One candle signal: a lone Marubozu day, or the sum of a trend period's patterns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSignal {
    pub date: SignalDate,
    pub pattern: String,
    pub trend: Option<TrendDirection>,
    #[serde(rename = "signal")]
    pub action: Action,
    pub reason: String,
    pub strength: i32,
    pub price: f64,
    pub individual_signals: usize,
}

impl CandleSignal {
    pub fn to_event(&self) -> SignalEvent {
        SignalEvent {
            action: self.action,
            reason: self.reason.clone(),
            date: self.date,
            strength: Some(self.strength),
        }
    }
}

#[derive(Debug, Clone)]
struct PatternHit {
    label: PatternLabel,
    bullish: bool,
    decision: CandleDecision,
    price: f64,
}

impl PatternHit {
    fn display_name(&self, trend: Option<TrendDirection>) -> String {
        match (self.label, trend) {
            (PatternLabel::Marubozu, _) if self.bullish => "Green Marubozu".to_string(),
            (PatternLabel::Marubozu, _) => "Red Marubozu".to_string(),
            (label, Some(trend)) => format!("{} in {}", label, trend),
            (label, None) => label.to_string(),
        }
    }
}

fn period_signal(segment: &TrendSegment, hits: &[PatternHit]) -> CandleSignal {
    let trend = segment.direction;
    let total: i32 = hits.iter().map(|h| h.decision.strength).sum();
    let reasons: Vec<String> = hits
        .iter()
        .take(REASON_LIMIT)
        .map(|h| format!("{} (strength = {})", h.decision.reason, h.decision.strength))
        .collect();
    let pattern: Vec<String> = hits.iter().map(|h| h.display_name(Some(trend))).collect();

    CandleSignal {
        date: SignalDate::Period {
            start: segment.period_start,
            end: segment.period_end,
        },
        pattern: pattern.join(", "),
        trend: Some(trend),
        action: Action::from_strength(total),
        reason: format!(
            "Signals in {} (strength: {}): {}",
            trend,
            total,
            reasons.join("; ")
        ),
        strength: total,
        price: hits.last().map(|h| h.price).unwrap_or_default(),
        individual_signals: hits.len(),
    }
}

/// Candle signals for the frame's bars, ordered by (start) date.
///
/// Bars traded on thin volume keep their place in a period but contribute a
/// HOLD of strength zero.
pub fn analyze(
    frame: &IndicatorFrame,
    segments: &[TrendSegment],
    exchange: Exchange,
) -> Vec<CandleSignal> {
    let bars = frame.bars();
    let membership = segment_membership(bars, segments);
    let context: Vec<Option<TrendDirection>> = membership
        .iter()
        .map(|m| m.map(|s| segments[s].direction))
        .collect();
    let labels = classify_bars(bars, &context, exchange);

    let mut periods: BTreeMap<usize, Vec<PatternHit>> = BTreeMap::new();
    let mut signals = Vec::new();

    for (i, (bar, label)) in bars.iter().zip(&labels).enumerate() {
        let label = *label;
        let trend = context[i];
        if !SPECIAL_PATTERNS.contains(&label) {
            continue;
        }
        if trend.is_none() && label != PatternLabel::Marubozu {
            continue;
        }

        let decision = evaluate(label, trend, bar, bars.get(i + 1), frame_volume_ratio(frame, i));
        let hit = PatternHit {
            label,
            bullish: bar.is_bullish(),
            decision,
            price: bar.close,
        };

        match membership[i] {
            Some(segment) => periods.entry(segment).or_default().push(hit),
            None if hit.decision.action != Action::Hold => signals.push(CandleSignal {
                date: SignalDate::Day(bar.date),
                pattern: hit.display_name(None),
                trend: None,
                action: hit.decision.action,
                reason: hit.decision.reason.clone(),
                strength: hit.decision.strength,
                price: hit.price,
                individual_signals: 1,
            }),
            None => {}
        }
    }

    signals.extend(
        periods
            .iter()
            .map(|(segment, hits)| period_signal(&segments[*segment], hits)),
    );
    signals.sort_by_key(|s| s.date.start());

    debug!(
        code = frame.series().code(),
        periods = periods.len(),
        signals = signals.len(),
        "candle detector"
    );
    signals
}

pub fn detect(
    frame: &IndicatorFrame,
    segments: &[TrendSegment],
    exchange: Exchange,
) -> Vec<SignalEvent> {
    analyze(frame, segments, exchange)
        .iter()
        .map(CandleSignal::to_event)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::test_support::prediction_frame;
    use chrono::{Duration, NaiveDate};

    const FILLER: (f64, f64, f64, f64) = (100.0, 103.0, 97.0, 101.5);
    const HAMMER: (f64, f64, f64, f64) = (100.0, 101.0, 90.0, 100.8);
    const DRAGONFLY: (f64, f64, f64, f64) = (100.0, 100.1, 90.0, 100.05);
    const LONG_LEGGED: (f64, f64, f64, f64) = (100.0, 105.0, 95.0, 100.1);
    const GREEN_MARUBOZU: (f64, f64, f64, f64) = (100.0, 105.1, 99.9, 105.0);

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64)
    }

    fn bars(shapes: &[(f64, f64, f64, f64)]) -> Vec<OhlcvBar> {
        shapes
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| OhlcvBar {
                code: "TEST".into(),
                exchange: "HSX".into(),
                date: day(i),
                open,
                high,
                low,
                close,
                volume: 10_000,
            })
            .collect()
    }

    fn segment(start: usize, end: usize, direction: TrendDirection) -> TrendSegment {
        TrendSegment {
            symbol: "TEST".into(),
            exchange: Exchange::Hsx,
            period_start: day(start),
            period_end: day(end),
            direction,
            percent_change: 0.0,
            day_count: end - start + 1,
        }
    }

    fn one_bar(shape: (f64, f64, f64, f64)) -> OhlcvBar {
        bars(&[shape]).remove(0)
    }

    #[test]
    fn hammer_needs_downtrend() {
        let bar = one_bar(HAMMER);
        let d = pattern_signal(PatternLabel::Hammer, Some(TrendDirection::Downtrend), &bar, None);
        assert_eq!((d.action, d.strength), (Action::Buy, 3));
        let d = pattern_signal(PatternLabel::Hammer, None, &bar, None);
        assert_eq!((d.action, d.strength), (Action::Hold, 0));
    }

    #[test]
    fn marubozu_follows_body_colour() {
        let green = one_bar(GREEN_MARUBOZU);
        let d = pattern_signal(PatternLabel::Marubozu, None, &green, None);
        assert_eq!((d.action, d.strength), (Action::Buy, 4));
        assert_eq!(d.reason, "Green Marubozu with 5.0% bullish movement");

        let red = one_bar((105.0, 105.1, 99.9, 100.0));
        let d = pattern_signal(PatternLabel::Marubozu, Some(TrendDirection::Uptrend), &red, None);
        assert_eq!((d.action, d.strength), (Action::Sell, -4));
    }

    #[test]
    fn long_legged_doji_reverses_the_trend() {
        let bar = one_bar(LONG_LEGGED);
        let up = pattern_signal(PatternLabel::LongLeggedDoji, Some(TrendDirection::Uptrend), &bar, None);
        let down =
            pattern_signal(PatternLabel::LongLeggedDoji, Some(TrendDirection::Downtrend), &bar, None);
        assert_eq!(up.strength, -2);
        assert_eq!(down.strength, 2);
    }

    #[test]
    fn star_doji_requires_confirmation() {
        let doji = one_bar((100.0, 100.2, 99.8, 100.0));
        let bearish = one_bar((101.0, 101.5, 98.5, 99.0));
        let up = Some(TrendDirection::Uptrend);

        let d = pattern_signal(PatternLabel::StarDoji, up, &doji, Some(&bearish));
        assert_eq!((d.action, d.strength), (Action::Sell, -3));
        assert_eq!(
            d.reason,
            "Star Doji with confirmation: Star Doji in uptrend confirmed by bearish candle"
        );

        assert_eq!(pattern_signal(PatternLabel::StarDoji, up, &doji, None).action, Action::Hold);
        let bullish = one_bar((99.0, 101.5, 98.5, 101.0));
        assert_eq!(
            pattern_signal(PatternLabel::StarDoji, up, &doji, Some(&bullish)).action,
            Action::Hold
        );
    }

    #[test]
    fn patterns_in_a_segment_are_summed_and_lone_marubozu_stands_alone() {
        let frame = prediction_frame(bars(&[
            FILLER, FILLER, HAMMER, FILLER, DRAGONFLY, FILLER, FILLER, FILLER, GREEN_MARUBOZU,
            FILLER,
        ]));
        let segments = [segment(0, 6, TrendDirection::Downtrend)];
        let signals = analyze(&frame, &segments, Exchange::Hsx);

        assert_eq!(signals.len(), 2);
        let period = &signals[0];
        assert_eq!(period.date.to_string(), "01/01/2024 to 07/01/2024");
        assert_eq!(period.action, Action::Buy);
        assert_eq!(period.strength, 6);
        assert_eq!(period.individual_signals, 2);
        assert_eq!(period.pattern, "Hammer in downtrend, Dragonfly Doji in downtrend");
        assert_eq!(
            period.reason,
            "Signals in downtrend (strength: 6): \
             Hammer pattern in downtrend suggests bullish reversal (strength = 3); \
             Dragonfly Doji in downtrend suggests bullish reversal (strength = 3)"
        );

        let lone = &signals[1];
        assert_eq!(lone.date, SignalDate::Day(day(8)));
        assert_eq!(lone.pattern, "Green Marubozu");
        assert_eq!(lone.strength, 4);
    }

    #[test]
    fn patterns_without_trend_are_ignored() {
        let frame = prediction_frame(bars(&[FILLER, HAMMER, LONG_LEGGED, FILLER]));
        assert!(analyze(&frame, &[], Exchange::Hsx).is_empty());
    }

    #[test]
    fn balanced_period_holds_and_reason_lists_three() {
        let frame = prediction_frame(bars(&[
            GREEN_MARUBOZU, LONG_LEGGED, LONG_LEGGED, FILLER, FILLER, FILLER, FILLER,
        ]));
        let segments = [segment(0, 6, TrendDirection::Uptrend)];
        let signals = analyze(&frame, &segments, Exchange::Hsx);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].action, Action::Hold);
        assert_eq!(signals[0].strength, 0);
        assert_eq!(
            signals[0].pattern,
            "Green Marubozu, Long Legged Doji in uptrend, Long Legged Doji in uptrend"
        );

        let frame = prediction_frame(bars(&[
            GREEN_MARUBOZU, LONG_LEGGED, LONG_LEGGED, GREEN_MARUBOZU, FILLER, FILLER, FILLER,
        ]));
        let signals = analyze(&frame, &segments, Exchange::Hsx);
        assert_eq!(signals[0].strength, 4);
        assert_eq!(signals[0].individual_signals, 4);
        assert_eq!(signals[0].reason.matches("(strength = ").count(), REASON_LIMIT);
    }

    #[test]
    fn thin_volume_pattern_contributes_nothing() {
        let mut series = bars(&[FILLER, FILLER, HAMMER, FILLER, FILLER, FILLER, FILLER]);
        series[2].volume = 1_000;
        let frame = prediction_frame(series);
        let segments = [segment(0, 6, TrendDirection::Downtrend)];
        let signals = analyze(&frame, &segments, Exchange::Hsx);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].action, Action::Hold);
        assert!(signals[0].reason.contains("Very low volume"));
    }

    #[test]
    fn detect_carries_strength_and_period() {
        let frame = prediction_frame(bars(&[FILLER, HAMMER, FILLER, FILLER, FILLER, FILLER, FILLER]));
        let segments = [segment(0, 6, TrendDirection::Downtrend)];
        let events = detect(&frame, &segments, Exchange::Hsx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].strength, Some(3));
        assert_eq!(events[0].date.start(), day(0));
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["date"], "01/01/2024 to 07/01/2024");
        assert_eq!(json["signal"], "BUY");
    }
}
