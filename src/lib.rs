//! stockta: technical analysis engine for daily OHLCV bars.
//!
//! Hexagonal architecture: indicators, trend segmentation, candle patterns and
//! signal detectors in [`domain`], port traits in [`ports`], concrete
//! implementations in [`adapters`], and the command line in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
