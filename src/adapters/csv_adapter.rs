//! CSV file data adapter.
//!
//! One file per symbol, `<CODE>_<EXCHANGE>.csv`, with a header row and the
//! columns `date,open,high,low,close,volume`. Dates may be `YYYY-MM-DD` or
//! `dd/mm/YYYY`.

use crate::domain::error::StocktaError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, exchange: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, exchange))
    }

    fn read_all(&self, code: &str, exchange: &str) -> Result<Vec<OhlcvBar>, StocktaError> {
        let path = self.csv_path(code, exchange);
        let content = fs::read_to_string(&path).map_err(|e| StocktaError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StocktaError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            bars.push(parse_record(&record, code, exchange).map_err(|reason| {
                StocktaError::Data {
                    reason: format!("{} row {}: {}", path.display(), line + 2, reason),
                }
            })?);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

fn field<T: FromStr>(record: &StringRecord, index: usize, name: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(index)
        .ok_or_else(|| format!("missing {} column", name))?;
    raw.trim()
        .parse()
        .map_err(|e| format!("invalid {} value '{}': {}", name, raw, e))
}

fn parse_record(record: &StringRecord, code: &str, exchange: &str) -> Result<OhlcvBar, String> {
    let raw_date = record.get(0).ok_or("missing date column")?;
    let date = parse_date(raw_date).ok_or_else(|| format!("invalid date '{}'", raw_date))?;
    Ok(OhlcvBar {
        code: code.to_string(),
        exchange: exchange.to_string(),
        date,
        open: field(record, 1, "open")?,
        high: field(record, 2, "high")?,
        low: field(record, 3, "low")?,
        close: field(record, 4, "close")?,
        // Some exports write volume as a float.
        volume: field::<f64>(record, 5, "volume")?.round() as i64,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocktaError> {
        let mut bars = self.read_all(code, exchange)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, StocktaError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StocktaError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", exchange);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StocktaError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            if let Some(code) = name.to_string_lossy().strip_suffix(&suffix) {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StocktaError> {
        if !self.csv_path(code, exchange).exists() {
            return Ok(None);
        }
        let bars = self.read_all(code, exchange)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
