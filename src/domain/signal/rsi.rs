//! RSI zone detector.
//!
//! Ordinary zones: entering oversold (<= 30) buys, entering overbought (>= 70)
//! sells. The extreme zones flip: touching >= 90 buys and touching <= 10 sells,
//! expecting a reversal. Leaving an extreme zone holds for confirmation.

use crate::domain::frame::{IndicatorFrame, RSI};
use crate::domain::signal::{
    collect_actionable, frame_volume_ratio, low_volume_hold, Action, Decision, SignalEvent,
};
use tracing::debug;

pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;
pub const DEEP_OVERSOLD: f64 = 25.0;
pub const DEEP_OVERBOUGHT: f64 = 75.0;
pub const EXTREME_OVERSOLD: f64 = 10.0;
pub const EXTREME_OVERBOUGHT: f64 = 90.0;

pub fn evaluate(current: f64, previous: f64, volume_ratio: f64) -> Decision {
    if let Some(hold) = low_volume_hold(volume_ratio, "RSI") {
        return hold;
    }

    if current >= EXTREME_OVERBOUGHT && previous < EXTREME_OVERBOUGHT {
        Decision::new(
            Action::Buy,
            format!(
                "RSI hit extreme overbought ({:.1}) ≥ 90 - reversal expectation signal (flip from SELL to BUY)",
                current
            ),
        )
    } else if current <= EXTREME_OVERSOLD && previous > EXTREME_OVERSOLD {
        Decision::new(
            Action::Sell,
            format!(
                "RSI hit extreme oversold ({:.1}) ≤ 10 - reversal expectation signal (flip from BUY to SELL)",
                current
            ),
        )
    } else if (OVERBOUGHT..EXTREME_OVERBOUGHT).contains(&current) && previous < OVERBOUGHT {
        Decision::new(
            Action::Sell,
            format!("RSI entered overbought zone ({:.1}) ≥ 70 - sell signal", current),
        )
    } else if current <= OVERSOLD && current > EXTREME_OVERSOLD && previous > OVERSOLD {
        Decision::new(
            Action::Buy,
            format!("RSI entered oversold zone ({:.1}) ≤ 30 - buy signal", current),
        )
    } else if current <= DEEP_OVERSOLD
        && current > EXTREME_OVERSOLD
        && previous <= OVERSOLD
        && previous > current
    {
        Decision::new(
            Action::Buy,
            format!(
                "RSI deepening in oversold zone ({:.1}) ≤ 25 - strong buy signal",
                current
            ),
        )
    } else if (DEEP_OVERBOUGHT..EXTREME_OVERBOUGHT).contains(&current)
        && previous >= OVERBOUGHT
        && previous < current
    {
        Decision::new(
            Action::Sell,
            format!(
                "RSI rising in overbought zone ({:.1}) ≥ 75 - strong sell signal",
                current
            ),
        )
    } else if previous <= EXTREME_OVERSOLD && current > EXTREME_OVERSOLD {
        Decision::hold(format!(
            "RSI exited extreme oversold zone ({:.1}) - wait for confirmation",
            current
        ))
    } else if previous >= EXTREME_OVERBOUGHT && current < EXTREME_OVERBOUGHT {
        Decision::hold(format!(
            "RSI exited extreme overbought zone ({:.1}) - wait for confirmation",
            current
        ))
    } else {
        Decision::hold(format!(
            "RSI at {:.1} - no significant level break (30/70 oversold/overbought, 10/90 extreme)",
            current
        ))
    }
}

pub fn detect(frame: &IndicatorFrame) -> Vec<SignalEvent> {
    let decisions = (1..frame.len()).filter_map(|i| {
        let current = frame.simple(&RSI, i)?;
        let previous = frame.simple(&RSI, i - 1)?;
        Some((i, evaluate(current, previous, frame_volume_ratio(frame, i))))
    });
    let events = collect_actionable(frame, decisions);
    debug!(code = frame.series().code(), events = events.len(), "RSI detector");
    events
}
