//! Weekly trend labels: every ISO week gets a label, unlike the segmenter.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::trend::TrendDirection;
use chrono::{Datelike, IsoWeek, NaiveDate};
use serde::Serialize;

pub const WEEKLY_THRESHOLD_PCT: f64 = 1.0;
pub const MIN_WEEK_DAYS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklyLabel {
    Uptrend,
    Downtrend,
    Sideways,
    InsufficientData,
}

impl WeeklyLabel {
    /// Direction usable as candle context; sideways and short weeks give none.
    pub fn direction(self) -> Option<TrendDirection> {
        match self {
            WeeklyLabel::Uptrend => Some(TrendDirection::Uptrend),
            WeeklyLabel::Downtrend => Some(TrendDirection::Downtrend),
            WeeklyLabel::Sideways | WeeklyLabel::InsufficientData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTrend {
    /// ISO week, e.g. "2024-W03".
    pub week: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub label: WeeklyLabel,
    pub percent_change: f64,
    pub day_count: usize,
}

/// One label per ISO week present in `bars` (ascending by date).
pub fn weekly_trends(bars: &[OhlcvBar]) -> Vec<WeeklyTrend> {
    let mut weeks: Vec<WeeklyTrend> = Vec::new();
    let mut current: Option<(IsoWeek, usize)> = None;

    for (i, bar) in bars.iter().enumerate() {
        let week = bar.date.iso_week();
        match current {
            Some((w, _)) if w == week => {}
            Some((_, start)) => {
                weeks.push(label_week(&bars[start..i]));
                current = Some((week, i));
            }
            None => current = Some((week, i)),
        }
    }
    if let Some((_, start)) = current {
        weeks.push(label_week(&bars[start..]));
    }
    weeks
}

fn label_week(week_bars: &[OhlcvBar]) -> WeeklyTrend {
    let first = &week_bars[0];
    let last = &week_bars[week_bars.len() - 1];
    let percent_change = if first.close != 0.0 {
        (last.close - first.close) / first.close * 100.0
    } else {
        0.0
    };
    let label = if week_bars.len() < MIN_WEEK_DAYS {
        WeeklyLabel::InsufficientData
    } else if percent_change >= WEEKLY_THRESHOLD_PCT {
        WeeklyLabel::Uptrend
    } else if percent_change <= -WEEKLY_THRESHOLD_PCT {
        WeeklyLabel::Downtrend
    } else {
        WeeklyLabel::Sideways
    };
    let iso = first.date.iso_week();
    WeeklyTrend {
        week: format!("{}-W{:02}", iso.year(), iso.week()),
        period_start: first.date,
        period_end: last.date,
        label,
        percent_change,
        day_count: week_bars.len(),
    }
}

/// Weekly direction at each bar.
pub fn weekly_context(bars: &[OhlcvBar]) -> Vec<Option<TrendDirection>> {
    let weeks = weekly_trends(bars);
    let mut out = Vec::with_capacity(bars.len());
    for week in &weeks {
        out.extend(std::iter::repeat_n(week.label.direction(), week.day_count));
    }
    out
}
