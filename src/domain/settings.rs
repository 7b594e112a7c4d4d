//! Per-user chart display settings.
//!
//! Settings are plain values handed to chart building; the analysis core never
//! reads them. Stored form uses the short keys (`MA`, `BB`, ...) and
//! `highlight_<pattern>` flags.

use crate::domain::candle::PatternLabel;
use crate::domain::error::SettingsError;
use serde::{Deserialize, Serialize};

/// Highlight flags that may be active at once.
pub const MAX_HIGHLIGHTS: usize = 4;

/// Patterns a chart can highlight, in display order.
pub const HIGHLIGHTABLE: [PatternLabel; 10] = [
    PatternLabel::Marubozu,
    PatternLabel::SpinningTop,
    PatternLabel::Hammer,
    PatternLabel::HangingMan,
    PatternLabel::InvertedHammer,
    PatternLabel::ShootingStar,
    PatternLabel::StarDoji,
    PatternLabel::LongLeggedDoji,
    PatternLabel::DragonflyDoji,
    PatternLabel::GravestoneDoji,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorToggles {
    #[serde(rename = "MA")]
    pub ma: bool,
    #[serde(rename = "BB")]
    pub bb: bool,
    #[serde(rename = "RSI")]
    pub rsi: bool,
    #[serde(rename = "MACD")]
    pub macd: bool,
    #[serde(rename = "ICH")]
    pub ichimoku: bool,
    #[serde(rename = "SR")]
    pub support_resistance: bool,
    #[serde(rename = "TR")]
    pub trend: bool,
    #[serde(rename = "CP")]
    pub candle_patterns: bool,
}

impl IndicatorToggles {
    /// Everything on; used when no user is given.
    pub fn all() -> Self {
        Self {
            ma: true,
            bb: true,
            rsi: true,
            macd: true,
            ichimoku: true,
            support_resistance: true,
            trend: true,
            candle_patterns: true,
        }
    }

    /// Accepts the short key or the field name, case-insensitively.
    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        let flag = match key.to_ascii_lowercase().as_str() {
            "ma" => &mut self.ma,
            "bb" => &mut self.bb,
            "rsi" => &mut self.rsi,
            "macd" => &mut self.macd,
            "ich" | "ichimoku" => &mut self.ichimoku,
            "sr" | "support_resistance" => &mut self.support_resistance,
            "tr" | "trend" => &mut self.trend,
            "cp" | "candle_patterns" => &mut self.candle_patterns,
            _ => return None,
        };
        Some(flag)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternHighlights {
    #[serde(rename = "highlight_marubozu")]
    pub marubozu: bool,
    #[serde(rename = "highlight_spinning_top")]
    pub spinning_top: bool,
    #[serde(rename = "highlight_hammer")]
    pub hammer: bool,
    #[serde(rename = "highlight_hanging_man")]
    pub hanging_man: bool,
    #[serde(rename = "highlight_inverted_hammer")]
    pub inverted_hammer: bool,
    #[serde(rename = "highlight_shooting_star")]
    pub shooting_star: bool,
    #[serde(rename = "highlight_star_doji")]
    pub star_doji: bool,
    #[serde(rename = "highlight_long_legged_doji")]
    pub long_legged_doji: bool,
    #[serde(rename = "highlight_dragonfly_doji")]
    pub dragonfly_doji: bool,
    #[serde(rename = "highlight_gravestone_doji")]
    pub gravestone_doji: bool,
}

impl PatternHighlights {
    /// `highlight_<snake_name>` for a highlightable pattern.
    pub fn key(label: PatternLabel) -> String {
        format!(
            "highlight_{}",
            label.name().to_ascii_lowercase().replace(' ', "_")
        )
    }

    /// Flags aligned with [`HIGHLIGHTABLE`].
    fn flags(&self) -> [bool; 10] {
        [
            self.marubozu,
            self.spinning_top,
            self.hammer,
            self.hanging_man,
            self.inverted_hammer,
            self.shooting_star,
            self.star_doji,
            self.long_legged_doji,
            self.dragonfly_doji,
            self.gravestone_doji,
        ]
    }

    pub fn is_set(&self, label: PatternLabel) -> bool {
        HIGHLIGHTABLE
            .iter()
            .position(|l| *l == label)
            .is_some_and(|i| self.flags()[i])
    }

    /// Highlighted patterns in display order.
    pub fn active(&self) -> Vec<PatternLabel> {
        HIGHLIGHTABLE
            .into_iter()
            .filter(|label| self.is_set(*label))
            .collect()
    }

    fn flag_mut(&mut self, label: PatternLabel) -> Option<&mut bool> {
        let flag = match label {
            PatternLabel::Marubozu => &mut self.marubozu,
            PatternLabel::SpinningTop => &mut self.spinning_top,
            PatternLabel::Hammer => &mut self.hammer,
            PatternLabel::HangingMan => &mut self.hanging_man,
            PatternLabel::InvertedHammer => &mut self.inverted_hammer,
            PatternLabel::ShootingStar => &mut self.shooting_star,
            PatternLabel::StarDoji => &mut self.star_doji,
            PatternLabel::LongLeggedDoji => &mut self.long_legged_doji,
            PatternLabel::DragonflyDoji => &mut self.dragonfly_doji,
            PatternLabel::GravestoneDoji => &mut self.gravestone_doji,
            PatternLabel::Doji | PatternLabel::Standard => return None,
        };
        Some(flag)
    }

    fn label_for_key(key: &str) -> Option<PatternLabel> {
        let key = key.to_ascii_lowercase();
        HIGHLIGHTABLE.into_iter().find(|label| Self::key(*label) == key)
    }

    /// Sets one highlight. Turning on a fifth flag fails and changes nothing.
    pub fn set(&mut self, label: PatternLabel, on: bool) -> Result<(), SettingsError> {
        let active = self.active().len();
        let Some(flag) = self.flag_mut(label) else {
            return Err(SettingsError::UnknownKey {
                key: Self::key(label),
            });
        };
        if on && !*flag && active >= MAX_HIGHLIGHTS {
            return Err(SettingsError::TooManyHighlights {
                limit: MAX_HIGHLIGHTS,
            });
        }
        *flag = on;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSettings {
    #[serde(flatten)]
    pub indicators: IndicatorToggles,
    #[serde(flatten)]
    pub highlights: PatternHighlights,
}

impl ChartSettings {
    /// Updates one flag by key.
    pub fn apply(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        let key = key.trim();
        if let Some(flag) = self.indicators.flag_mut(key) {
            *flag = value;
            return Ok(());
        }
        match PatternHighlights::label_for_key(key) {
            Some(label) => self.highlights.set(label, value),
            None => Err(SettingsError::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    /// Applies every assignment or none of them.
    pub fn apply_all(&mut self, assignments: &[(String, bool)]) -> Result<(), SettingsError> {
        let mut updated = *self;
        for (key, value) in assignments {
            updated.apply(key, *value)?;
        }
        *self = updated;
        Ok(())
    }
}

/// Persisted form: `{"plot": {...flags}}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default)]
    pub plot: ChartSettings,
}

/// Parses `KEY=VALUE` where VALUE is true/false, on/off, yes/no or 1/0.
pub fn parse_assignment(input: &str) -> Result<(String, bool), SettingsError> {
    let Some((key, raw)) = input.split_once('=') else {
        return Err(SettingsError::MalformedAssignment {
            input: input.to_string(),
        });
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(SettingsError::MalformedAssignment {
            input: input.to_string(),
        });
    }
    let value = match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => true,
        "false" | "off" | "no" | "0" => false,
        _ => {
            return Err(SettingsError::InvalidValue {
                key: key.to_string(),
                value: raw.trim().to_string(),
            })
        }
    };
    Ok((key.to_string(), value))
}
