//! Five-detector vote.
//!
//! Each detector's events reduce to one statement by simple majority of BUY
//! over SELL. The final statement needs at least three of the five detectors
//! to agree, so 2-2-1 splits resolve to HOLD.
//!
//! Indicators are computed over the whole series handed in; only events and
//! segments dated inside the report window count.

use crate::domain::error::StocktaError;
use crate::domain::exchange::Exchange;
use crate::domain::frame::IndicatorFrame;
use crate::domain::series::{ReportWindow, Series, MIN_BARS};
use crate::domain::signal::{self, Action, SignalEvent};
use crate::domain::trend::{segment_trends, TrendSegment};
use serde::Serialize;
use tracing::info;

/// Detectors that must agree for a BUY or SELL final statement.
pub const QUORUM: usize = 3;

/// BUY if BUY events outnumber SELL, SELL if the reverse, else HOLD.
pub fn statement(actions: impl IntoIterator<Item = Action>) -> Action {
    let (mut buys, mut sells) = (0usize, 0usize);
    for action in actions {
        match action {
            Action::Buy => buys += 1,
            Action::Sell => sells += 1,
            Action::Hold => {}
        }
    }
    match buys.cmp(&sells) {
        std::cmp::Ordering::Greater => Action::Buy,
        std::cmp::Ordering::Less => Action::Sell,
        std::cmp::Ordering::Equal => Action::Hold,
    }
}

pub fn final_statement(statements: &[Action; 5]) -> Action {
    let buys = statements.iter().filter(|a| **a == Action::Buy).count();
    let sells = statements.iter().filter(|a| **a == Action::Sell).count();
    if buys >= QUORUM && buys > sells {
        Action::Buy
    } else if sells >= QUORUM && sells > buys {
        Action::Sell
    } else {
        Action::Hold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorAnalysis {
    pub analysis: Vec<SignalEvent>,
    pub statement: Action,
}

impl DetectorAnalysis {
    pub fn from_events(analysis: Vec<SignalEvent>) -> Self {
        let statement = statement(analysis.iter().map(|e| e.action));
        Self {
            analysis,
            statement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionAnalysis {
    #[serde(rename = "RSI")]
    pub rsi: DetectorAnalysis,
    #[serde(rename = "Candle")]
    pub candle: DetectorAnalysis,
    #[serde(rename = "MA")]
    pub ma: DetectorAnalysis,
    #[serde(rename = "MACD")]
    pub macd: DetectorAnalysis,
    #[serde(rename = "BB")]
    pub bb: DetectorAnalysis,
}

impl PredictionAnalysis {
    pub fn statements(&self) -> [Action; 5] {
        [
            self.rsi.statement,
            self.candle.statement,
            self.ma.statement,
            self.macd.statement,
            self.bb.statement,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub final_statement: Action,
    pub analysis: PredictionAnalysis,
}

fn within(window: &ReportWindow, events: Vec<SignalEvent>) -> DetectorAnalysis {
    DetectorAnalysis::from_events(
        events
            .into_iter()
            .filter(|e| window.contains(e.date.start()))
            .collect(),
    )
}

/// Runs every detector over a prepared frame and keeps the events inside `window`.
fn predict_frame(
    frame: &IndicatorFrame,
    segments: &[TrendSegment],
    exchange: Exchange,
    window: &ReportWindow,
) -> PredictionReport {
    let analysis = PredictionAnalysis {
        rsi: within(window, signal::rsi::detect(frame)),
        candle: within(window, signal::candle::detect(frame, segments, exchange)),
        ma: within(window, signal::ma_cross::detect(frame)),
        macd: within(window, signal::macd::detect(frame)),
        bb: within(window, signal::bollinger::detect(frame)),
    };
    let final_statement = final_statement(&analysis.statements());
    PredictionReport {
        final_statement,
        analysis,
    }
}

/// Votes over every bar of the series.
pub fn predict(series: Series, exchange: Exchange) -> Result<PredictionReport, StocktaError> {
    let window = series.window()?;
    predict_within(series, exchange, &window)
}

/// Segments trends inside `window`, computes the indicator frame over the
/// full series (earlier bars warm indicators up) and votes.
pub fn predict_within(
    series: Series,
    exchange: Exchange,
    window: &ReportWindow,
) -> Result<PredictionReport, StocktaError> {
    let reported = series.restrict_to(window);
    reported.require_min(MIN_BARS)?;
    let segments = segment_trends(&reported, exchange);
    let frame = IndicatorFrame::for_prediction(series);
    let report = predict_frame(&frame, &segments, exchange, window);

    let [rsi, candle, ma, macd, bb] = report.analysis.statements();
    info!(
        code = frame.series().code(),
        exchange = %exchange,
        bars = frame.len(),
        reported = reported.len(),
        segments = segments.len(),
        rsi = %rsi,
        candle = %candle,
        ma = %ma,
        macd = %macd,
        bb = %bb,
        final_statement = %report.final_statement,
        "prediction complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::test_support::bars_from_closes;
    use Action::{Buy, Hold, Sell};

    #[test]
    fn statement_is_simple_majority() {
        assert_eq!(statement([Buy, Buy, Sell]), Buy);
        assert_eq!(statement([Sell, Hold, Hold]), Sell);
        assert_eq!(statement([Buy, Sell]), Hold);
        assert_eq!(statement([]), Hold);
    }

    #[test]
    fn final_needs_three_of_five() {
        assert_eq!(final_statement(&[Buy, Buy, Buy, Sell, Sell]), Buy);
        assert_eq!(final_statement(&[Sell, Sell, Sell, Hold, Buy]), Sell);
        assert_eq!(final_statement(&[Buy, Buy, Sell, Sell, Hold]), Hold);
        assert_eq!(final_statement(&[Buy, Buy, Hold, Hold, Hold]), Hold);
    }

    #[test]
    fn single_bar_is_insufficient() {
        let series = Series::new("TEST", "HSX", bars_from_closes(&[10.0])).unwrap();
        let err = predict(series, Exchange::Hsx).unwrap_err();
        assert!(matches!(
            err,
            StocktaError::InsufficientData {
                bars: 1,
                minimum: 2,
                ..
            }
        ));
    }

    #[test]
    fn two_bars_predict_hold_with_empty_analyses() {
        let series = Series::new("TEST", "HSX", bars_from_closes(&[10.0, 10.5])).unwrap();
        let report = predict(series, Exchange::Hsx).unwrap();
        assert_eq!(report.final_statement, Hold);
        assert!(report.analysis.rsi.analysis.is_empty());
        assert_eq!(report.analysis.statements(), [Hold; 5]);
    }

    #[test]
    fn warmup_events_are_not_reported() {
        // Twenty quiet bars, a collapse through the lower band at bar 20,
        // then a flat tail. The window starts after the collapse.
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 2) as f64).collect();
        closes.push(80.0);
        closes.extend(vec![80.0; 10]);
        let bars = bars_from_closes(&closes);
        let series = Series::new("TEST", "HSX", bars.clone()).unwrap();

        let full = predict(series.clone(), Exchange::Hsx).unwrap();
        assert!(full
            .analysis
            .bb
            .analysis
            .iter()
            .any(|e| e.date.start() == bars[20].date));

        let window = ReportWindow::new(bars[21].date, bars[30].date).unwrap();
        let late = predict_within(series, Exchange::Hsx, &window).unwrap();
        for detector in [
            &late.analysis.rsi,
            &late.analysis.candle,
            &late.analysis.ma,
            &late.analysis.macd,
            &late.analysis.bb,
        ] {
            assert!(detector.analysis.iter().all(|e| window.contains(e.date.start())));
        }
    }

    #[test]
    fn window_with_one_bar_is_insufficient() {
        let bars = bars_from_closes(&[10.0, 10.5, 10.2]);
        let series = Series::new("TEST", "HSX", bars.clone()).unwrap();
        let window = ReportWindow::new(bars[2].date, bars[2].date).unwrap();
        assert!(matches!(
            predict_within(series, Exchange::Hsx, &window),
            Err(StocktaError::InsufficientData { bars: 1, .. })
        ));
    }

    #[test]
    fn report_serializes_with_detector_keys() {
        let series = Series::new("TEST", "HSX", bars_from_closes(&[10.0, 10.5, 10.2])).unwrap();
        let json = serde_json::to_value(predict(series, Exchange::Hsx).unwrap()).unwrap();
        assert_eq!(json["final_statement"], "HOLD");
        for key in ["RSI", "Candle", "MA", "MACD", "BB"] {
            assert_eq!(json["analysis"][key]["statement"], "HOLD", "{key}");
            assert!(json["analysis"][key]["analysis"].is_array());
        }
    }
}
