//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_settings_adapter::JsonSettingsAdapter;
#[cfg(feature = "sqlite")]
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::candle::{analyze_candle_patterns, CandleAnalysis};
use crate::domain::chart_report::{build_chart_within, ChartReport, TrendReport};
use crate::domain::config_validation::validate_app_config;
use crate::domain::error::StocktaError;
use crate::domain::exchange::Exchange;
use crate::domain::prediction::{self, PredictionReport};
use crate::domain::range_mode::{warmup_start, RangeMode, WARMUP_BARS};
use crate::domain::series::{ReportWindow, Series, MIN_BARS};
use crate::domain::settings::{parse_assignment, ChartSettings, IndicatorToggles};
use crate::domain::trend::{segment_context, segment_trends, summarize};
use crate::domain::weekly_trend::{weekly_context, weekly_trends, WeeklyTrend};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::settings_port::SettingsPort;

const DEFAULT_EXCHANGE: &str = "HSX";
const DEFAULT_SETTINGS_DIR: &str = "./user_settings";

#[derive(Parser, Debug)]
#[command(name = "stockta", about = "Technical analysis for Vietnamese equities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Symbol and window selection shared by the analysis commands.
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    #[arg(long)]
    pub code: String,
    /// HSX (or HOSE), HNX, UPCOM. Falls back to [analysis] exchange, then HSX.
    #[arg(long)]
    pub exchange: Option<String>,
    /// short (60 bars) or long (180 bars).
    #[arg(long)]
    pub range: Option<String>,
    /// First reported day, YYYY-MM-DD. Replaces the range lookback.
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    /// Last day of the window, YYYY-MM-DD. Defaults to the latest stored bar.
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chart payload with the user's indicator selection
    Chart {
        #[command(flatten)]
        args: AnalysisArgs,
        /// Use this user's saved settings instead of showing every indicator
        #[arg(long)]
        user: Option<i64>,
    },
    /// Trend segments and summary
    Trend {
        #[command(flatten)]
        args: AnalysisArgs,
        /// Label each ISO week instead of segmenting
        #[arg(long)]
        weekly: bool,
    },
    /// Candle pattern and gap analysis
    Patterns {
        #[command(flatten)]
        args: AnalysisArgs,
        /// Take the trend context from weekly labels instead of segments
        #[arg(long)]
        weekly: bool,
    },
    /// Signal detectors and the combined prediction
    Predict {
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Per-user chart settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Validate the config and report the data source
    Check {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        exchange: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print a user's settings
    Show {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        user: i64,
    },
    /// Update flags, e.g. `MA=on highlight_hammer=true`
    Set {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        user: i64,
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

impl Command {
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Chart { args, .. }
            | Command::Trend { args, .. }
            | Command::Patterns { args, .. }
            | Command::Predict { args } => &args.config,
            Command::Settings { action } => match action {
                SettingsCommand::Show { config, .. } | SettingsCommand::Set { config, .. } => {
                    config
                }
            },
            Command::Check { config, .. } => config,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Chart { args, user } => run_analysis(&args, |config, data_port, request| {
            let settings = match user {
                Some(user_id) => open_settings_store(config)?.load(user_id)?,
                None => all_indicators(),
            };
            chart_pipeline(data_port, request, &settings)
        }),
        Command::Trend { args, weekly } => run_analysis(&args, |_, data_port, request| {
            trend_pipeline(data_port, request, weekly)
        }),
        Command::Patterns { args, weekly } => run_analysis(&args, |_, data_port, request| {
            patterns_pipeline(data_port, request, weekly)
        }),
        Command::Predict { args } => {
            run_analysis(&args, |_, data_port, request| predict_pipeline(data_port, request))
        }
        Command::Settings { action } => match action {
            SettingsCommand::Show { config, user } => emit(show_settings(&config, user)),
            SettingsCommand::Set {
                config,
                user,
                assignments,
            } => emit(set_settings(&config, user, &assignments)),
        },
        Command::Check { config, exchange } => run_check(&config, exchange.as_deref()),
    }
}

fn fail(err: &StocktaError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn emit<T: Serialize>(result: Result<T, StocktaError>) -> ExitCode {
    let rendered =
        result.and_then(|value| serde_json::to_string_pretty(&value).map_err(StocktaError::from));
    match rendered {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_analysis<T, F>(args: &AnalysisArgs, pipeline: F) -> ExitCode
where
    T: Serialize,
    F: FnOnce(&dyn ConfigPort, &dyn DataPort, &AnalysisRequest) -> Result<T, StocktaError>,
{
    let result = load_config(&args.config).and_then(|config| {
        let request = resolve_request(args, &config)?;
        let data_port = open_data_port(&config)?;
        eprintln!(
            "Analysing {} on {} ({} range)",
            request.code,
            request.exchange,
            range_name(request.range)
        );
        pipeline(&config, data_port.as_ref(), &request)
    });
    emit(result)
}

/// Loads the INI config and validates it before anything else reads it.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StocktaError> {
    let config = FileConfigAdapter::from_file(path)?;
    validate_app_config(&config)?;
    Ok(config)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub code: String,
    pub exchange: Exchange,
    pub range: RangeMode,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn range_name(range: RangeMode) -> &'static str {
    match range {
        RangeMode::Short => "short",
        RangeMode::Long => "long",
    }
}

pub fn resolve_exchange(
    exchange_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Exchange, StocktaError> {
    match exchange_override {
        Some(e) => e.parse(),
        None => config
            .get_string("analysis", "exchange")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string())
            .parse(),
    }
}

/// Command-line flags win over `[analysis]` config values.
pub fn resolve_request(
    args: &AnalysisArgs,
    config: &dyn ConfigPort,
) -> Result<AnalysisRequest, StocktaError> {
    let exchange = resolve_exchange(args.exchange.as_deref(), config)?;
    let range = match &args.range {
        Some(r) => r.parse()?,
        None => match config.get_string("analysis", "range") {
            Some(r) if !r.trim().is_empty() => r.parse()?,
            _ => RangeMode::default(),
        },
    };
    let start_date = match args.start_date {
        Some(d) => Some(d),
        None => config_date(config, "start_date")?,
    };
    let end_date = match args.end_date {
        Some(d) => Some(d),
        None => config_date(config, "end_date")?,
    };
    if let (Some(start), Some(end)) = (start_date, end_date) {
        ReportWindow::new(start, end)?;
    }

    Ok(AnalysisRequest {
        code: args.code.trim().to_uppercase(),
        exchange,
        range,
        start_date,
        end_date,
    })
}

fn config_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, StocktaError> {
    match config.get_string("analysis", key) {
        Some(raw) if !raw.trim().is_empty() => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| StocktaError::ConfigInvalid {
                section: "analysis".into(),
                key: key.into(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            }),
        _ => Ok(None),
    }
}

fn backend(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn data_source(config: &dyn ConfigPort) -> String {
    backend(config, "data", "source", "csv")
}

pub fn settings_store(config: &dyn ConfigPort) -> String {
    backend(config, "settings", "store", "json")
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_disabled(section: &str, key: &str) -> StocktaError {
    StocktaError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: "the sqlite feature is required for this backend".into(),
    }
}

pub fn open_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, StocktaError> {
    match data_source(config).as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(SqliteAdapter::from_config(config)?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(sqlite_disabled("data", "source")),
        _ => {
            let dir = config
                .get_string("data", "csv_dir")
                .ok_or_else(|| StocktaError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
    }
}

pub fn open_settings_store(config: &dyn ConfigPort) -> Result<Box<dyn SettingsPort>, StocktaError> {
    match settings_store(config).as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(SqliteAdapter::from_config(config)?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(sqlite_disabled("settings", "store")),
        _ => {
            let dir = config
                .get_string("settings", "dir")
                .unwrap_or_else(|| DEFAULT_SETTINGS_DIR.to_string());
            Ok(Box::new(JsonSettingsAdapter::new(PathBuf::from(dir))))
        }
    }
}

/// Fetches the reported window plus `WARMUP_BARS` of older history.
///
/// Without a start date the window is the range lookback ending at the
/// requested (or latest) day. Bars before the window only feed indicators.
pub fn load_series(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
) -> Result<(Series, ReportWindow), StocktaError> {
    let exchange = request.exchange.as_str();
    let no_data = || StocktaError::NoData {
        code: request.code.clone(),
        exchange: exchange.to_string(),
    };

    let end_date = match request.end_date {
        Some(d) => d,
        None => match data_port.get_data_range(&request.code, exchange)? {
            Some((_, last, _)) => last,
            None => return Err(no_data()),
        },
    };
    let requested = request
        .start_date
        .map(|start| ReportWindow::new(start, end_date))
        .transpose()?;
    let fetch_start = match requested {
        Some(window) => warmup_start(window.start),
        None => request.range.fetch_start(end_date),
    };
    let bars = data_port.fetch_ohlcv(&request.code, exchange, fetch_start, end_date)?;
    if bars.is_empty() {
        return Err(no_data());
    }

    let (series, window) = match requested {
        Some(window) => {
            let series = Series::new(request.code.as_str(), exchange, bars)?;
            let keep_from = series.position(window.start).saturating_sub(WARMUP_BARS);
            let series = match series.bars().get(keep_from) {
                Some(bar) if keep_from > 0 => series.restrict(bar.date, end_date),
                _ => series,
            };
            (series, window)
        }
        None => {
            let series = Series::new(request.code.as_str(), exchange, request.range.trim(bars))?;
            let window = series.tail_window(request.range.lookback_bars())?;
            (series, window)
        }
    };

    eprintln!(
        "  {} {}: {} bars loaded, reporting {} to {}",
        series.code(),
        series.exchange(),
        series.len(),
        window.start,
        window.end
    );
    Ok((series, window))
}

/// Every indicator on, no highlights: the chart shown without a user.
pub fn all_indicators() -> ChartSettings {
    ChartSettings {
        indicators: IndicatorToggles::all(),
        ..ChartSettings::default()
    }
}

pub fn chart_pipeline(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
    settings: &ChartSettings,
) -> Result<ChartReport, StocktaError> {
    let (series, window) = load_series(data_port, request)?;
    build_chart_within(series, request.exchange, settings, &window)
}

/// Only the reported bars; trends and candles need no warm-up.
fn load_reported(data_port: &dyn DataPort, request: &AnalysisRequest) -> Result<Series, StocktaError> {
    let (series, window) = load_series(data_port, request)?;
    let reported = series.restrict_to(&window);
    reported.require_min(MIN_BARS)?;
    Ok(reported)
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TrendOutput {
    Segments(TrendReport),
    Weekly { weekly_trends: Vec<WeeklyTrend> },
}

pub fn trend_pipeline(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
    weekly: bool,
) -> Result<TrendOutput, StocktaError> {
    let reported = load_reported(data_port, request)?;
    if weekly {
        return Ok(TrendOutput::Weekly {
            weekly_trends: weekly_trends(reported.bars()),
        });
    }
    let trends = segment_trends(&reported, request.exchange);
    Ok(TrendOutput::Segments(TrendReport {
        summary: summarize(&trends),
        trends,
    }))
}

/// Candle context comes from trend segments, or from weekly labels when `weekly` is set.
pub fn patterns_pipeline(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
    weekly: bool,
) -> Result<CandleAnalysis, StocktaError> {
    let reported = load_reported(data_port, request)?;
    let context = if weekly {
        weekly_context(reported.bars())
    } else {
        let segments = segment_trends(&reported, request.exchange);
        segment_context(reported.bars(), &segments)
    };
    Ok(analyze_candle_patterns(
        reported.bars(),
        &context,
        request.exchange,
    ))
}

pub fn predict_pipeline(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
) -> Result<PredictionReport, StocktaError> {
    let (series, window) = load_series(data_port, request)?;
    prediction::predict_within(series, request.exchange, &window)
}

fn show_settings(config_path: &Path, user_id: i64) -> Result<ChartSettings, StocktaError> {
    let config = load_config(config_path)?;
    open_settings_store(&config)?.load(user_id)
}

/// Parses every assignment before touching the store; one bad token rejects all.
pub fn set_settings(
    config_path: &Path,
    user_id: i64,
    assignments: &[String],
) -> Result<ChartSettings, StocktaError> {
    let config = load_config(config_path)?;
    let parsed = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>, _>>()?;
    let updated = open_settings_store(&config)?.update(user_id, &parsed)?;
    eprintln!("Updated {} setting(s) for user {}", parsed.len(), user_id);
    Ok(updated)
}

fn run_check(config_path: &Path, exchange: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    eprintln!("Config validated successfully");
    eprintln!("  data source:    {}", data_source(&config));
    eprintln!("  settings store: {}", settings_store(&config));

    let exchange = match resolve_exchange(exchange, &config) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };
    let data_port = match open_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    match data_port.list_symbols(exchange.as_str()) {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found for exchange {}", exchange);
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found on {}", symbols.len(), exchange);
        }
        Err(e) => return fail(&e),
    }
    ExitCode::SUCCESS
}
