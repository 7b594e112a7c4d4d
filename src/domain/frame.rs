//! Indicator frame: a series plus the indicator columns computed from it.
//!
//! Each `with_*` step consumes the frame and returns a new one carrying the
//! extra column(s); the underlying bars are never modified.

use crate::domain::indicator::bollinger::{DEFAULT_PERIOD as BB_PERIOD, DEFAULT_STDDEV_MULT_X100};
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::volume::DEFAULT_PERIOD as VOLUME_PERIOD;
use crate::domain::indicator::{
    compute_indicator, IchimokuLine, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::series::Series;
use crate::domain::settings::IndicatorToggles;
use std::collections::HashMap;
use tracing::debug;

pub const MA_PERIODS: [usize; 4] = [10, 50, 100, 200];
pub const RSI: IndicatorType = IndicatorType::Rsi(14);
pub const BOLLINGER: IndicatorType = IndicatorType::Bollinger {
    period: BB_PERIOD,
    stddev_mult_x100: DEFAULT_STDDEV_MULT_X100,
};
pub const MACD: IndicatorType = IndicatorType::Macd {
    fast: DEFAULT_FAST,
    slow: DEFAULT_SLOW,
    signal: DEFAULT_SIGNAL,
};
pub const VOLUME_AVG: IndicatorType = IndicatorType::VolumeAvg(VOLUME_PERIOD);

#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    series: Series,
    columns: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorFrame {
    pub fn new(series: Series) -> Self {
        Self {
            series,
            columns: HashMap::new(),
        }
    }

    /// Adds one column; an already present column is left as is.
    pub fn with(mut self, indicator_type: IndicatorType) -> Self {
        if !self.columns.contains_key(&indicator_type) {
            let column = compute_indicator(self.series.bars(), indicator_type);
            self.columns.insert(indicator_type, column);
        }
        self
    }

    pub fn with_moving_averages(self) -> Self {
        MA_PERIODS
            .iter()
            .fold(self, |frame, &p| frame.with(IndicatorType::Sma(p)))
    }

    pub fn with_bollinger(self) -> Self {
        self.with(BOLLINGER)
    }

    pub fn with_rsi(self) -> Self {
        self.with(RSI)
    }

    pub fn with_macd(self) -> Self {
        self.with(MACD)
    }

    pub fn with_ichimoku(self) -> Self {
        IchimokuLine::ALL
            .iter()
            .fold(self, |frame, &line| frame.with(IndicatorType::Ichimoku(line)))
    }

    pub fn with_levels(self) -> Self {
        self.with(IndicatorType::SupportResistance)
    }

    pub fn with_volume_avg(self) -> Self {
        self.with(VOLUME_AVG)
    }

    /// Columns the signal detectors read.
    pub fn for_prediction(series: Series) -> Self {
        let frame = Self::new(series)
            .with_volume_avg()
            .with_moving_averages()
            .with_bollinger()
            .with_rsi()
            .with_macd();
        debug!(
            code = frame.series.code(),
            bars = frame.len(),
            columns = frame.columns.len(),
            "indicator frame built"
        );
        frame
    }

    /// Columns enabled by a user's display toggles.
    pub fn with_toggles(self, toggles: &IndicatorToggles) -> Self {
        let mut frame = self;
        if toggles.ma {
            frame = frame.with_moving_averages();
        }
        if toggles.bb {
            frame = frame.with_bollinger();
        }
        if toggles.rsi {
            frame = frame.with_rsi();
        }
        if toggles.macd {
            frame = frame.with_macd();
        }
        if toggles.ichimoku {
            frame = frame.with_ichimoku();
        }
        if toggles.support_resistance {
            frame = frame.with_levels();
        }
        frame
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        self.series.bars()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn column(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.columns.get(indicator_type)
    }

    /// Column types present, in a stable order.
    pub fn column_types(&self) -> Vec<IndicatorType> {
        let mut types: Vec<IndicatorType> = self.columns.keys().copied().collect();
        types.sort_by_key(|t| t.to_string());
        types
    }

    pub fn value(&self, indicator_type: &IndicatorType, index: usize) -> Option<&IndicatorValue> {
        self.column(indicator_type)?.get(index)
    }

    pub fn simple(&self, indicator_type: &IndicatorType, index: usize) -> Option<f64> {
        self.column(indicator_type)?.simple_at(index)
    }
}
