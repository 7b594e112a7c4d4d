//! Trading signal detectors and their shared vocabulary.
//!
//! Every detector walks an `IndicatorFrame` bar by bar and reports the bars
//! where it would act. Bars whose inputs are not yet computable are skipped,
//! and a bar traded on less than half its 20-bar average volume is always HOLD.

pub mod bollinger;
pub mod candle;
pub mod ma_cross;
pub mod macd;
pub mod rsi;

use crate::domain::frame::{IndicatorFrame, VOLUME_AVG};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

pub const LOW_VOLUME_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }

    /// BUY for positive, SELL for negative, HOLD for zero.
    pub fn from_strength(strength: i32) -> Action {
        match strength.cmp(&0) {
            Ordering::Greater => Action::Buy,
            Ordering::Less => Action::Sell,
            Ordering::Equal => Action::Hold,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a signal applies: one trading day, or a whole trend period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDate {
    Day(NaiveDate),
    Period { start: NaiveDate, end: NaiveDate },
}

impl SignalDate {
    pub fn start(&self) -> NaiveDate {
        match self {
            SignalDate::Day(d) => *d,
            SignalDate::Period { start, .. } => *start,
        }
    }
}

impl fmt::Display for SignalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDate::Day(d) => write!(f, "{}", d.format("%d/%m/%Y")),
            SignalDate::Period { start, end } => write!(
                f,
                "{} to {}",
                start.format("%d/%m/%Y"),
                end.format("%d/%m/%Y")
            ),
        }
    }
}

impl Serialize for SignalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEvent {
    #[serde(rename = "signal")]
    pub action: Action,
    pub reason: String,
    pub date: SignalDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<i32>,
}

impl SignalEvent {
    pub fn on_day(date: NaiveDate, decision: Decision) -> Self {
        Self {
            action: decision.action,
            reason: decision.reason,
            date: SignalDate::Day(date),
            strength: None,
        }
    }
}

/// A detector's verdict for one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub reason: String,
}

impl Decision {
    pub fn new(action: Action, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }

    pub fn hold(reason: impl Into<String>) -> Self {
        Self::new(Action::Hold, reason)
    }
}

/// volume / average, or 1 when there is no positive average.
pub fn volume_ratio(volume: i64, average: Option<f64>) -> f64 {
    match average {
        Some(avg) if avg > 0.0 => volume as f64 / avg,
        _ => 1.0,
    }
}

/// HOLD decision when the bar's volume is too thin to trust, naming the detector.
pub fn low_volume_hold(ratio: f64, detector: &str) -> Option<Decision> {
    (ratio < LOW_VOLUME_RATIO).then(|| {
        Decision::hold(format!(
            "Very low volume ({:.2}x avg) - {} signal may be unreliable",
            ratio, detector
        ))
    })
}

/// Volume ratio of bar `index` against the frame's trailing average.
pub fn frame_volume_ratio(frame: &IndicatorFrame, index: usize) -> f64 {
    let volume = frame.bars()[index].volume;
    volume_ratio(volume, frame.simple(&VOLUME_AVG, index))
}

/// Keeps non-HOLD decisions as dated events.
pub(crate) fn collect_actionable(
    frame: &IndicatorFrame,
    decisions: impl IntoIterator<Item = (usize, Decision)>,
) -> Vec<SignalEvent> {
    decisions
        .into_iter()
        .filter(|(_, d)| d.action != Action::Hold)
        .map(|(i, d)| SignalEvent::on_day(frame.bars()[i].date, d))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::frame::IndicatorFrame;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::series::Series;
    use chrono::{Duration, NaiveDate};

    /// Bars with the given closes; open is the previous close, range pads both sides by 1%.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                OhlcvBar {
                    code: "TEST".into(),
                    exchange: "HSX".into(),
                    date: start + Duration::days(i as i64),
                    open,
                    high: open.max(close) * 1.01,
                    low: open.min(close) * 0.99,
                    close,
                    volume: 10_000,
                }
            })
            .collect()
    }

    pub fn prediction_frame(bars: Vec<OhlcvBar>) -> IndicatorFrame {
        IndicatorFrame::for_prediction(Series::new("TEST", "HSX", bars).unwrap())
    }
}
