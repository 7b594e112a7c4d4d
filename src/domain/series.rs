//! Series value object: the validated, date-ordered bars for one symbol.

use crate::domain::error::StocktaError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use tracing::warn;

/// Fewest bars any analysis can run on.
pub const MIN_BARS: usize = 2;

/// Inclusive dates whose results are reported. Bars before `start` only
/// warm up indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StocktaError> {
        if start > end {
            return Err(StocktaError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone)]
pub struct Series {
    code: String,
    exchange: String,
    bars: Vec<OhlcvBar>,
    skipped: usize,
}

impl Series {
    /// Builds a series from raw bars.
    ///
    /// Malformed bars are dropped (and logged); dates that are not strictly
    /// ascending are an error.
    pub fn new(
        code: impl Into<String>,
        exchange: impl Into<String>,
        raw: Vec<OhlcvBar>,
    ) -> Result<Self, StocktaError> {
        let code = code.into();
        let exchange = exchange.into();
        let mut bars = Vec::with_capacity(raw.len());
        let mut skipped = 0;

        for bar in raw {
            if !bar.is_well_formed() {
                warn!(code = %code, date = %bar.date, "skipping malformed bar");
                skipped += 1;
                continue;
            }
            let out_of_order = bars.last().is_some_and(|last: &OhlcvBar| bar.date <= last.date);
            if out_of_order {
                return Err(StocktaError::UnorderedSeries {
                    code,
                    date: bar.date,
                });
            }
            bars.push(bar);
        }

        Ok(Self {
            code,
            exchange,
            bars,
            skipped,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Number of malformed bars dropped on construction.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Index of the first bar dated on or after `date` (`len()` if none).
    pub fn position(&self, date: NaiveDate) -> usize {
        self.bars.partition_point(|b| b.date < date)
    }

    /// A new series holding only bars dated within `[start, end]`.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> Series {
        let from = self.position(start);
        let to = self.bars.partition_point(|b| b.date <= end).max(from);
        Series {
            code: self.code.clone(),
            exchange: self.exchange.clone(),
            bars: self.bars[from..to].to_vec(),
            skipped: self.skipped,
        }
    }

    pub fn restrict_to(&self, window: &ReportWindow) -> Series {
        self.restrict(window.start, window.end)
    }

    /// Window over every bar; needs at least `MIN_BARS`.
    pub fn window(&self) -> Result<ReportWindow, StocktaError> {
        self.tail_window(self.len())
    }

    /// Window over the last `count` bars (all of them if fewer); needs at
    /// least `MIN_BARS` in the window.
    pub fn tail_window(&self, count: usize) -> Result<ReportWindow, StocktaError> {
        let from = self.len().saturating_sub(count);
        let tail = &self.bars[from..];
        if tail.len() < MIN_BARS {
            return Err(self.insufficient(tail.len(), MIN_BARS));
        }
        ReportWindow::new(tail[0].date, tail[tail.len() - 1].date)
    }

    /// Fails with `InsufficientData` below `minimum` bars.
    pub fn require_min(&self, minimum: usize) -> Result<(), StocktaError> {
        if self.bars.len() < minimum {
            return Err(self.insufficient(self.bars.len(), minimum));
        }
        Ok(())
    }

    fn insufficient(&self, bars: usize, minimum: usize) -> StocktaError {
        StocktaError::InsufficientData {
            code: self.code.clone(),
            bars,
            minimum,
        }
    }
}
