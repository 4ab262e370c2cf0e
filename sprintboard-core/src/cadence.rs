//! Cadence rules: declarative, serializable recurrence definitions.
//!
//! A rule answers one question, "does date D produce an occurrence?", as a
//! pure function of (rule, date). Bounds are inclusive on both ends.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Custom,
}

impl std::str::FromStr for CadenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(CadenceKind::None),
            "daily" => Ok(CadenceKind::Daily),
            "weekly" => Ok(CadenceKind::Weekly),
            "custom" => Ok(CadenceKind::Custom),
            other => Err(format!("unknown cadence: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadenceRule {
    pub cadence: CadenceKind,

    /// Weekly only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<Weekday>,

    /// Custom only. Signed so malformed imports surface as a validation
    /// error instead of a parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl CadenceRule {
    pub fn new(cadence: CadenceKind) -> Self {
        Self {
            cadence,
            ..Self::default()
        }
    }

    pub fn daily() -> Self {
        Self::new(CadenceKind::Daily)
    }

    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            cadence: CadenceKind::Weekly,
            days_of_week: days.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn every_n_days(interval: i64, anchor: NaiveDate) -> Self {
        Self {
            cadence: CadenceKind::Custom,
            interval_days: Some(interval),
            start_date: Some(anchor),
            ..Self::default()
        }
    }

    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn ending(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.cadence != CadenceKind::None
    }

    /// Reject rules that can never be answered deterministically.
    ///
    /// `none` is always valid (it simply never expands).
    pub fn validate(&self) -> EngineResult<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(EngineError::InvertedBounds { start, end });
            }
        }

        match self.cadence {
            CadenceKind::None | CadenceKind::Daily => Ok(()),
            CadenceKind::Weekly => {
                if self.days_of_week.is_empty() {
                    Err(EngineError::EmptyWeekdays)
                } else {
                    Ok(())
                }
            }
            CadenceKind::Custom => {
                let interval = self.interval_days.unwrap_or(0);
                if interval <= 0 {
                    return Err(EngineError::InvalidInterval { interval });
                }
                if self.start_date.is_none() {
                    return Err(EngineError::MissingStartDate);
                }
                Ok(())
            }
        }
    }

    pub fn within_bounds(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|s| date >= s) && self.end_date.is_none_or(|e| date <= e)
    }

    /// Does `date` produce an occurrence?
    ///
    /// Malformed rules answer `false` for every date.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        if !self.within_bounds(date) {
            return false;
        }

        match self.cadence {
            CadenceKind::None => false,
            CadenceKind::Daily => true,
            CadenceKind::Weekly => self.days_of_week.contains(&date.weekday()),
            CadenceKind::Custom => match (self.interval_days, self.start_date) {
                (Some(n), Some(anchor)) if n > 0 => {
                    (date - anchor).num_days().rem_euclid(n) == 0
                }
                _ => false,
            },
        }
    }

    /// First occurrence in `from ..= from + horizon_days - 1`. A zero horizon
    /// searches nothing.
    pub fn next_on_or_after(&self, from: NaiveDate, horizon_days: u64) -> Option<NaiveDate> {
        if self.validate().is_err() || !self.is_recurring() {
            return None;
        }
        let last = from.checked_add_days(Days::new(horizon_days.checked_sub(1)?))?;
        let from = match self.start_date {
            Some(s) if s > from => s,
            _ => from,
        };

        from.iter_days()
            .take_while(|d| *d <= last && self.end_date.is_none_or(|e| *d <= e))
            .find(|d| self.occurs_on(*d))
    }
}

/// Parse a comma-separated weekday list such as `Mon,Wed` or `monday, friday`.
pub fn parse_weekdays(s: &str) -> Result<Vec<Weekday>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            d.parse::<Weekday>()
                .map_err(|_| format!("unknown weekday: {d}"))
        })
        .collect()
}
