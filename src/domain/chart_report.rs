//! Chart payload handed to a rendering collaborator.
//!
//! Which indicator columns, trend segments and candle analysis appear is
//! decided by the caller's [`ChartSettings`]; the payload itself is plain data.
//! Indicator columns are computed over the whole series and cut to the
//! report window with the rows.

use crate::domain::candle::{analyze_candle_patterns, classify_bars, CandleAnalysis};
use crate::domain::error::StocktaError;
use crate::domain::exchange::Exchange;
use crate::domain::frame::IndicatorFrame;
use crate::domain::indicator::IndicatorValue;
use crate::domain::series::{ReportWindow, Series, MIN_BARS};
use crate::domain::settings::ChartSettings;
use crate::domain::trend::{segment_context, segment_trends, summarize, TrendSegment, TrendSummary};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartColumn {
    pub name: String,
    /// Aligned with the rows; `null` before the lookback is satisfied.
    pub values: Vec<Option<IndicatorValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub trends: Vec<TrendSegment>,
    pub summary: TrendSummary,
}

/// One highlighted candle. `marker` is the pattern's slot among the active highlights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightMark {
    pub date: NaiveDate,
    pub pattern: String,
    pub marker: usize,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartReport {
    pub code: String,
    pub exchange: Exchange,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rows: Vec<ChartRow>,
    pub indicators: Vec<ChartColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candle_patterns: Option<CandleAnalysis>,
    pub highlights: Vec<HighlightMark>,
}

/// Chart over every bar of the series.
pub fn build_chart(
    series: Series,
    exchange: Exchange,
    settings: &ChartSettings,
) -> Result<ChartReport, StocktaError> {
    let window = series.window()?;
    build_chart_within(series, exchange, settings, &window)
}

pub fn build_chart_within(
    series: Series,
    exchange: Exchange,
    settings: &ChartSettings,
    window: &ReportWindow,
) -> Result<ChartReport, StocktaError> {
    let reported = series.restrict_to(window);
    reported.require_min(MIN_BARS)?;
    let toggles = &settings.indicators;
    let active_highlights = settings.highlights.active();

    let segments = segment_trends(&reported, exchange);
    let context = segment_context(reported.bars(), &segments);

    let candle_patterns = toggles
        .candle_patterns
        .then(|| analyze_candle_patterns(reported.bars(), &context, exchange));

    let highlights = if active_highlights.is_empty() {
        Vec::new()
    } else {
        let labels = classify_bars(reported.bars(), &context, exchange);
        reported
            .bars()
            .iter()
            .zip(labels)
            .filter_map(|(bar, label)| {
                let marker = active_highlights.iter().position(|l| *l == label)?;
                Some(HighlightMark {
                    date: bar.date,
                    pattern: label.to_string(),
                    marker,
                    high: bar.high,
                })
            })
            .collect()
    };

    let trend = toggles.trend.then(|| TrendReport {
        summary: summarize(&segments),
        trends: segments,
    });

    let offset = series.position(window.start);
    let frame = IndicatorFrame::new(series).with_toggles(toggles);
    let indicators = frame
        .column_types()
        .into_iter()
        .filter_map(|indicator_type| {
            let column = frame.column(&indicator_type)?;
            Some(ChartColumn {
                name: indicator_type.to_string(),
                values: column.values[offset..offset + reported.len()]
                    .iter()
                    .map(|p| p.value)
                    .collect(),
            })
        })
        .collect::<Vec<_>>();

    let rows = reported
        .bars()
        .iter()
        .map(|b| ChartRow {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        })
        .collect();

    debug!(
        code = reported.code(),
        bars = frame.len(),
        reported = reported.len(),
        columns = indicators.len(),
        highlights = highlights.len(),
        "chart payload built"
    );

    Ok(ChartReport {
        code: reported.code().to_string(),
        exchange,
        start_date: reported.first_date(),
        end_date: reported.last_date(),
        rows,
        indicators,
        trend,
        candle_patterns,
        highlights,
    })
}
