//! Bollinger band breakout detector.

use crate::domain::frame::{IndicatorFrame, BOLLINGER};
use crate::domain::indicator::IndicatorValue;
use crate::domain::signal::{
    collect_actionable, frame_volume_ratio, low_volume_hold, Action, Decision, SignalEvent,
};
use tracing::debug;

pub fn evaluate(close: f64, upper: f64, lower: f64, volume_ratio: f64) -> Decision {
    if let Some(hold) = low_volume_hold(volume_ratio, "BB") {
        return hold;
    }
    if close < lower {
        Decision::new(
            Action::Buy,
            format!(
                "Close price ({:.2}) below lower BB ({:.2}) - buy signal",
                close, lower
            ),
        )
    } else if close > upper {
        Decision::new(
            Action::Sell,
            format!(
                "Close price ({:.2}) above upper BB ({:.2}) - sell signal",
                close, upper
            ),
        )
    } else {
        Decision::hold(format!("Close price ({:.2}) within Bollinger Bands", close))
    }
}

fn bands_at(frame: &IndicatorFrame, i: usize) -> Option<(f64, f64)> {
    match frame.value(&BOLLINGER, i)? {
        IndicatorValue::Bollinger { upper, lower, .. } => Some((*upper, *lower)),
        _ => None,
    }
}

pub fn detect(frame: &IndicatorFrame) -> Vec<SignalEvent> {
    let decisions = (0..frame.len()).filter_map(|i| {
        let (upper, lower) = bands_at(frame, i)?;
        let close = frame.bars()[i].close;
        Some((i, evaluate(close, upper, lower, frame_volume_ratio(frame, i))))
    });
    let events = collect_actionable(frame, decisions);
    debug!(code = frame.series().code(), events = events.len(), "BB detector");
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::test_support::{bars_from_closes, prediction_frame};

    #[test]
    fn close_below_lower_band_buys() {
        let d = evaluate(94.5, 110.0, 95.0, 1.0);
        assert_eq!(d.action, Action::Buy);
        assert_eq!(d.reason, "Close price (94.50) below lower BB (95.00) - buy signal");
    }

    #[test]
    fn close_above_upper_band_sells() {
        let d = evaluate(111.0, 110.0, 95.0, 1.0);
        assert_eq!(d.action, Action::Sell);
        assert!(d.reason.contains("above upper BB (110.00)"));
    }

    #[test]
    fn touching_a_band_holds() {
        assert_eq!(evaluate(95.0, 110.0, 95.0, 1.0).action, Action::Hold);
        assert_eq!(evaluate(110.0, 110.0, 95.0, 1.0).action, Action::Hold);
    }

    #[test]
    fn low_volume_forces_hold() {
        let d = evaluate(90.0, 110.0, 95.0, 0.4);
        assert_eq!(d.action, Action::Hold);
        assert!(d.reason.contains("BB signal may be unreliable"));
    }

    #[test]
    fn detect_flags_a_collapse_after_a_quiet_stretch() {
        let mut closes: Vec<f64> = (0..25).map(|i| 100.0 + (i % 2) as f64).collect();
        closes.push(80.0);
        let events = detect(&prediction_frame(bars_from_closes(&closes)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, Action::Buy);
    }

    #[test]
    fn detect_reads_the_first_full_window() {
        // Bands first exist at bar 19; the collapse lands right there.
        let mut closes: Vec<f64> = (0..19).map(|i| 100.0 + (i % 2) as f64).collect();
        closes.push(80.0);
        let frame = prediction_frame(bars_from_closes(&closes));
        assert!(bands_at(&frame, 18).is_none());
        let (_, lower) = bands_at(&frame, 19).unwrap();
        assert!(80.0 < lower);

        let events = detect(&frame);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, Action::Buy);
        assert_eq!(events[0].date.start(), frame.bars()[19].date);
    }

    #[test]
    fn detect_ignores_bars_before_the_window_fills() {
        let mut closes: Vec<f64> = (0..18).map(|i| 100.0 + (i % 2) as f64).collect();
        closes.push(80.0);
        assert!(detect(&prediction_frame(bars_from_closes(&closes))).is_empty());
    }
}
