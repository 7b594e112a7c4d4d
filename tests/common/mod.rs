#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use stockta::domain::error::StocktaError;
pub use stockta::domain::ohlcv::OhlcvBar;
use stockta::domain::settings::ChartSettings;
use stockta::ports::data_port::DataPort;
use stockta::ports::settings_port::SettingsPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    fn check(&self, code: &str) -> Result<(), StocktaError> {
        match self.errors.get(code) {
            Some(reason) => Err(StocktaError::Data {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        _exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocktaError> {
        self.check(code)?;
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, _exchange: &str) -> Result<Vec<String>, StocktaError> {
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }

    fn get_data_range(
        &self,
        code: &str,
        _exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StocktaError> {
        self.check(code)?;
        match self.data.get(code) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

/// Settings store that lives for one test.
#[derive(Default)]
pub struct InMemorySettings {
    pub users: RefCell<HashMap<i64, ChartSettings>>,
}

impl SettingsPort for InMemorySettings {
    fn load(&self, user_id: i64) -> Result<ChartSettings, StocktaError> {
        let mut users = self.users.borrow_mut();
        Ok(*users.entry(user_id).or_default())
    }

    fn save(&self, user_id: i64, settings: &ChartSettings) -> Result<(), StocktaError> {
        self.users.borrow_mut().insert(user_id, *settings);
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(code: &str, date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        exchange: "HSX".to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Consecutive calendar days, close rising by one per bar.
pub fn generate_bars(code: &str, start_date: &str, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| OhlcvBar {
            code: code.to_string(),
            exchange: "HSX".to_string(),
            date: start + Duration::days(i as i64),
            open: start_price + i as f64,
            high: start_price + i as f64 + 1.0,
            low: start_price + i as f64 - 1.0,
            close: start_price + i as f64,
            volume: 1000,
        })
        .collect()
}

/// Close grows 1% a bar from 100, each candle a plain half-percent green body.
pub fn steady_rally(code: &str, count: usize) -> Vec<OhlcvBar> {
    rally(code, count, 1.01)
}

/// Close compounds by `growth` a bar from 100 on consecutive days from 2023-01-02;
/// each green body covers half the day's move.
pub fn rally(code: &str, count: usize, growth: f64) -> Vec<OhlcvBar> {
    let start = date(2023, 1, 2);
    (0..count)
        .map(|i| {
            let close = 100.0 * growth.powi(i as i32);
            let open = close / (1.0 + (growth - 1.0) / 2.0);
            OhlcvBar {
                code: code.to_string(),
                exchange: "HSX".to_string(),
                date: start + Duration::days(i as i64),
                open,
                high: close * 1.002,
                low: open * 0.998,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Bars built from closes; open is the previous close.
pub fn bars_from_closes(code: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            OhlcvBar {
                code: code.to_string(),
                exchange: "HSX".to_string(),
                date: start + Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 10_000,
            }
        })
        .collect()
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Writes `bars` as `<CODE>_<EXCHANGE>.csv` under `dir`.
pub fn write_csv(dir: &std::path::Path, code: &str, exchange: &str, bars: &[OhlcvBar]) {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    std::fs::write(dir.join(format!("{}_{}.csv", code, exchange)), out).unwrap();
}
