//! Lookback window selection ("short" = 60 bars, "long" = 180 bars).
//!
//! The range mode only decides how much history is fetched and which of it
//! is reported. Every fetch also carries `WARMUP_BARS` of older history so
//! that the slowest indicator (MA200) is defined across the whole window.

use crate::domain::error::StocktaError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::{Duration, NaiveDate};
use std::str::FromStr;

/// Bars fetched ahead of the reported window; the longest moving average.
pub const WARMUP_BARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeMode {
    #[default]
    Short,
    Long,
}

impl RangeMode {
    pub fn lookback_bars(self) -> usize {
        match self {
            RangeMode::Short => 60,
            RangeMode::Long => 180,
        }
    }

    /// Reported bars plus warm-up.
    pub fn history_bars(self) -> usize {
        self.lookback_bars() + WARMUP_BARS
    }

    /// Calendar start date wide enough to contain the history in trading days
    /// (weekends and holidays included with margin).
    pub fn fetch_start(self, end_date: NaiveDate) -> NaiveDate {
        calendar_start(end_date, self.history_bars())
    }

    /// Keep the most recent `history_bars` bars.
    pub fn trim(self, mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
        let keep = self.history_bars();
        if bars.len() > keep {
            bars.drain(..bars.len() - keep);
        }
        bars
    }
}

/// Calendar start date covering `WARMUP_BARS` trading days before `date`.
pub fn warmup_start(date: NaiveDate) -> NaiveDate {
    calendar_start(date, WARMUP_BARS)
}

fn calendar_start(date: NaiveDate, trading_bars: usize) -> NaiveDate {
    date - Duration::days(trading_bars as i64 * 2 + 30)
}

impl FromStr for RangeMode {
    type Err = StocktaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(RangeMode::Short),
            "long" => Ok(RangeMode::Long),
            _ => Err(StocktaError::UnknownRangeMode {
                token: s.to_string(),
            }),
        }
    }
}
