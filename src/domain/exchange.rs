//! Vietnamese exchange codes and the per-market thresholds derived from them.
//!
//! The exchange selects two cut-offs:
//! - trend threshold: close-to-close percent move a window must reach to form a trend segment
//! - Marubozu threshold: minimum |close - open| / open percentage for a Marubozu candle

use crate::domain::error::StocktaError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// Ho Chi Minh City Stock Exchange (also written HOSE).
    Hsx,
    /// Hanoi Stock Exchange.
    Hnx,
    /// Unlisted Public Company Market.
    Upcom,
}

impl Exchange {
    /// Percent change a window must reach (up, or down with the sign flipped).
    pub fn trend_threshold_pct(self) -> f64 {
        match self {
            Exchange::Hsx => 10.0,
            Exchange::Hnx => 15.0,
            Exchange::Upcom => 20.0,
        }
    }

    /// Minimum body percentage for a Marubozu.
    pub fn marubozu_threshold_pct(self) -> f64 {
        match self {
            Exchange::Hsx => 3.0,
            Exchange::Hnx => 5.0,
            Exchange::Upcom => 7.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Exchange::Hsx => "HSX",
            Exchange::Hnx => "HNX",
            Exchange::Upcom => "UPCOM",
        }
    }
}

impl FromStr for Exchange {
    type Err = StocktaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HSX" | "HOSE" => Ok(Exchange::Hsx),
            "HNX" => Ok(Exchange::Hnx),
            "UPCOM" => Ok(Exchange::Upcom),
            _ => Err(StocktaError::UnknownExchange {
                code: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
