//! SQLite adapter: bar source and per-user settings store.

use crate::domain::error::{SettingsError, StocktaError};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::settings::ChartSettings;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::settings_port::SettingsPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> StocktaError {
    StocktaError::Data {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> StocktaError {
    StocktaError::DataQuery {
        reason: e.to_string(),
    }
}

fn store_error(e: impl std::fmt::Display) -> StocktaError {
    SettingsError::Store {
        reason: e.to_string(),
    }
    .into()
}

fn parse_day(raw: &str) -> Result<NaiveDate, StocktaError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| StocktaError::Data {
        reason: format!("invalid stored date '{}': {}", raw, e),
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StocktaError> {
        let db_path =
            config
                .get_string("data", "sqlite_path")
                .ok_or_else(|| StocktaError::ConfigMissing {
                    section: "data".into(),
                    key: "sqlite_path".into(),
                })?;
        let pool_size = config.get_int("data", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;
        debug!(path = %db_path, pool_size, "sqlite pool ready");

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, StocktaError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;
        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StocktaError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), StocktaError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS ohlcv (
                    code TEXT NOT NULL,
                    exchange TEXT NOT NULL,
                    date TEXT NOT NULL,
                    open REAL NOT NULL,
                    high REAL NOT NULL,
                    low REAL NOT NULL,
                    close REAL NOT NULL,
                    volume INTEGER NOT NULL,
                    PRIMARY KEY (code, exchange, date)
                );
                CREATE INDEX IF NOT EXISTS idx_ohlcv_code_exchange ON ohlcv(code, exchange);
                CREATE TABLE IF NOT EXISTS user_settings (
                    user_id INTEGER PRIMARY KEY,
                    payload TEXT NOT NULL
                );",
            )
            .map_err(query_error)
    }

    pub fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<(), StocktaError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO ohlcv (code, exchange, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    bar.code,
                    bar.exchange,
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(query_error)?;
        }
        tx.commit().map_err(query_error)
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocktaError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT code, exchange, date, open, high, low, close, volume
                 FROM ohlcv
                 WHERE code = ?1 AND exchange = ?2 AND date >= ?3 AND date <= ?4
                 ORDER BY date ASC",
            )
            .map_err(query_error)?;

        let start = start_date.format("%Y-%m-%d").to_string();
        let end = end_date.format("%Y-%m-%d").to_string();
        let rows = stmt
            .query_map(params![code, exchange, start, end], |row| {
                let date_str: String = row.get(2)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(OhlcvBar {
                    code: row.get(0)?,
                    exchange: row.get(1)?,
                    date,
                    open: row.get(3)?,
                    high: row.get(4)?,
                    low: row.get(5)?,
                    close: row.get(6)?,
                    volume: row.get(7)?,
                })
            })
            .map_err(query_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, StocktaError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT code FROM ohlcv WHERE exchange = ?1 ORDER BY code")
            .map_err(query_error)?;
        let rows = stmt
            .query_map(params![exchange], |row| row.get(0))
            .map_err(query_error)?;
        rows.collect::<Result<Vec<String>, _>>().map_err(query_error)
    }

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StocktaError> {
        let (min, max, count): (Option<String>, Option<String>, i64) = self
            .conn()?
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM ohlcv WHERE code = ?1 AND exchange = ?2",
                params![code, exchange],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => {
                Ok(Some((parse_day(&min)?, parse_day(&max)?, count as usize)))
            }
            _ => Ok(None),
        }
    }
}

impl SettingsPort for SqliteAdapter {
    fn load(&self, user_id: i64) -> Result<ChartSettings, StocktaError> {
        let payload: Option<String> = self
            .conn()?
            .query_row(
                "SELECT payload FROM user_settings WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(store_error)?;

        match payload {
            Some(json) => serde_json::from_str(&json).map_err(store_error),
            None => {
                let defaults = ChartSettings::default();
                self.save(user_id, &defaults)?;
                Ok(defaults)
            }
        }
    }

    fn save(&self, user_id: i64, settings: &ChartSettings) -> Result<(), StocktaError> {
        let payload = serde_json::to_string(settings)?;
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO user_settings (user_id, payload) VALUES (?1, ?2)",
                params![user_id, payload],
            )
            .map_err(store_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn bar(code: &str, day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            code: code.to_string(),
            exchange: "HSX".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn from_config_missing_path() {
        let result = SqliteAdapter::from_config(&FileConfigAdapter::empty());
        match result {
            Err(StocktaError::ConfigMissing { section, key }) => {
                assert_eq!(section, "data");
                assert_eq!(key, "sqlite_path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn fetch_ohlcv_returns_bars_in_range() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter
            .insert_bars(&[bar("VNM", 2, 70.0), bar("VNM", 1, 69.0), bar("VNM", 5, 71.0)])
            .unwrap();

        let fetched = adapter
            .fetch_ohlcv(
                "VNM",
                "HSX",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            )
            .unwrap();

        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].close, 69.0);
        assert_eq!(fetched[1].close, 70.0);
    }

    #[test]
    fn list_symbols_per_exchange() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter
            .insert_bars(&[bar("VNM", 1, 70.0), bar("FPT", 1, 90.0)])
            .unwrap();
        assert_eq!(adapter.list_symbols("HSX").unwrap(), vec!["FPT", "VNM"]);
        assert!(adapter.list_symbols("HNX").unwrap().is_empty());
    }

    #[test]
    fn data_range_with_and_without_bars() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter
            .insert_bars(&[bar("VNM", 1, 70.0), bar("VNM", 5, 71.0)])
            .unwrap();

        let (min, max, count) = adapter.get_data_range("VNM", "HSX").unwrap().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(count, 2);
        assert!(adapter.get_data_range("FPT", "HSX").unwrap().is_none());
    }

    #[test]
    fn settings_default_on_first_load_then_persist() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        assert_eq!(adapter.load(42).unwrap(), ChartSettings::default());

        let updated = adapter
            .update(42, &[("BB".to_string(), true), ("highlight_hammer".to_string(), true)])
            .unwrap();
        assert!(updated.indicators.bb);

        let reloaded = adapter.load(42).unwrap();
        assert_eq!(reloaded, updated);
        assert_eq!(adapter.load(7).unwrap(), ChartSettings::default());
    }
}
