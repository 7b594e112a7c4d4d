//! Bar source port trait.

use crate::domain::error::StocktaError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for one symbol dated within `[start_date, end_date]`, ascending.
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocktaError>;

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, StocktaError>;

    /// First date, last date and bar count, or `None` when the symbol has no bars.
    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StocktaError>;
}
