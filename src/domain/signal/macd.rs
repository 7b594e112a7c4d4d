//! MACD detector: signal-line crossovers first, then three-bar price/MACD
//! divergence, then the neutral zone.

use crate::domain::frame::{IndicatorFrame, MACD};
use crate::domain::indicator::IndicatorValue;
use crate::domain::signal::{
    collect_actionable, frame_volume_ratio, low_volume_hold, Action, Decision, SignalEvent,
};
use tracing::debug;

pub const NEUTRAL_SPREAD: f64 = 0.01;
pub const NEUTRAL_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdInputs {
    pub macd: f64,
    pub signal: f64,
    pub macd_prev: f64,
    pub signal_prev: f64,
    pub close: f64,
    pub close_prev: f64,
    pub close_prev2: f64,
}

pub fn evaluate(inputs: &MacdInputs, volume_ratio: f64) -> Decision {
    if let Some(hold) = low_volume_hold(volume_ratio, "MACD") {
        return hold;
    }
    crossover(inputs)
        .or_else(|| divergence(inputs))
        .unwrap_or_else(|| {
            if (inputs.macd - inputs.signal).abs() < NEUTRAL_SPREAD
                && inputs.macd.abs() < NEUTRAL_LEVEL
            {
                Decision::hold("MACD near signal line and close to zero axis - sideways movement")
            } else {
                Decision::hold("No clear MACD signal detected")
            }
        })
}

fn crossover(i: &MacdInputs) -> Option<Decision> {
    let above = i.macd > i.signal;
    let was_above = i.macd_prev > i.signal_prev;
    if !was_above && above && i.macd < 0.0 {
        Some(Decision::new(
            Action::Buy,
            "MACD line crossed above signal line below zero axis - bullish crossover",
        ))
    } else if was_above && !above && i.macd > 0.0 {
        Some(Decision::new(
            Action::Sell,
            "MACD line crossed below signal line above zero axis - bearish crossover",
        ))
    } else {
        None
    }
}

fn divergence(i: &MacdInputs) -> Option<Decision> {
    let price_falling = i.close < i.close_prev && i.close_prev < i.close_prev2;
    let price_rising = i.close > i.close_prev && i.close_prev > i.close_prev2;
    if price_falling && i.macd > i.macd_prev {
        Some(Decision::new(
            Action::Buy,
            "Bullish divergence - price declining but MACD rising",
        ))
    } else if price_rising && i.macd < i.macd_prev {
        Some(Decision::new(
            Action::Sell,
            "Bearish divergence - price rising but MACD declining",
        ))
    } else {
        None
    }
}

fn lines_at(frame: &IndicatorFrame, i: usize) -> Option<(f64, f64)> {
    match frame.value(&MACD, i)? {
        IndicatorValue::Macd { line, signal, .. } => Some((*line, *signal)),
        _ => None,
    }
}

fn inputs_at(frame: &IndicatorFrame, i: usize) -> Option<MacdInputs> {
    let (macd, signal) = lines_at(frame, i)?;
    let (macd_prev, signal_prev) = lines_at(frame, i - 1)?;
    let bars = frame.bars();
    Some(MacdInputs {
        macd,
        signal,
        macd_prev,
        signal_prev,
        close: bars[i].close,
        close_prev: bars[i - 1].close,
        close_prev2: bars[i - 2].close,
    })
}

pub fn detect(frame: &IndicatorFrame) -> Vec<SignalEvent> {
    let decisions = (2..frame.len()).filter_map(|i| {
        let inputs = inputs_at(frame, i)?;
        Some((i, evaluate(&inputs, frame_volume_ratio(frame, i))))
    });
    let events = collect_actionable(frame, decisions);
    debug!(code = frame.series().code(), events = events.len(), "MACD detector");
    events
}
