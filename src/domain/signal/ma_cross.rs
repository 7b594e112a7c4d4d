//! Moving-average cross detector with one-bar confirmation.
//!
//! For each (short, long) pair the sign of `short - long` is compared across
//! three bars: a flip between t-2 and t-1 is a cross, and the cross is only
//! reported if the sign still holds at t.

use crate::domain::frame::IndicatorFrame;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{
    collect_actionable, frame_volume_ratio, low_volume_hold, Action, Decision, SignalEvent,
};
use tracing::debug;

pub const MA_PAIRS: [(usize, usize); 6] = [
    (10, 50),
    (10, 100),
    (10, 200),
    (50, 100),
    (50, 200),
    (100, 200),
];

/// `short - long` at t-2, t-1 and t.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossWindow {
    pub before: f64,
    pub previous: f64,
    pub current: f64,
}

pub fn evaluate(pair: &str, diffs: CrossWindow, volume_ratio: f64) -> Decision {
    if let Some(hold) = low_volume_hold(volume_ratio, "MA cross") {
        return hold;
    }
    let CrossWindow {
        before,
        previous,
        current,
    } = diffs;

    if before <= 0.0 && previous > 0.0 {
        if current > 0.0 {
            Decision::new(
                Action::Buy,
                format!(
                    "Golden cross confirmed: {} cross with positive difference ({:.2})",
                    pair, current
                ),
            )
        } else {
            Decision::hold(format!(
                "Failed golden cross: {} cross failed confirmation ({:.2})",
                pair, current
            ))
        }
    } else if before >= 0.0 && previous < 0.0 {
        if current < 0.0 {
            Decision::new(
                Action::Sell,
                format!(
                    "Death cross confirmed: {} cross with negative difference ({:.2})",
                    pair, current
                ),
            )
        } else {
            Decision::hold(format!(
                "Failed death cross: {} cross failed confirmation ({:.2})",
                pair, current
            ))
        }
    } else {
        Decision::hold(format!(
            "No confirmed MA cross for {} (diff: {:.2})",
            pair, current
        ))
    }
}

fn diff_at(frame: &IndicatorFrame, short: &IndicatorType, long: &IndicatorType, i: usize) -> Option<f64> {
    Some(frame.simple(short, i)? - frame.simple(long, i)?)
}

fn cross_window(
    frame: &IndicatorFrame,
    short: &IndicatorType,
    long: &IndicatorType,
    i: usize,
) -> Option<CrossWindow> {
    Some(CrossWindow {
        before: diff_at(frame, short, long, i - 2)?,
        previous: diff_at(frame, short, long, i - 1)?,
        current: diff_at(frame, short, long, i)?,
    })
}

pub fn detect(frame: &IndicatorFrame) -> Vec<SignalEvent> {
    let mut decisions = Vec::new();
    for i in 2..frame.len() {
        let ratio = frame_volume_ratio(frame, i);
        for (short_period, long_period) in MA_PAIRS {
            let short = IndicatorType::Sma(short_period);
            let long = IndicatorType::Sma(long_period);
            if let Some(diffs) = cross_window(frame, &short, &long, i) {
                let pair = format!("{}/{}", short, long);
                decisions.push((i, evaluate(&pair, diffs, ratio)));
            }
        }
    }
    let events = collect_actionable(frame, decisions);
    debug!(code = frame.series().code(), events = events.len(), "MA cross detector");
    events
}
