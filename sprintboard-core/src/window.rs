//! Inclusive date windows (a sprint, a week, an "upcoming" horizon).

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawWindow> for DateWindow {
    type Error = EngineError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        DateWindow::new(raw.start, raw.end)
    }
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// `days` consecutive dates starting at `start`. Zero days is not a window.
    pub fn days_from(start: NaiveDate, days: u64) -> EngineResult<Self> {
        let Some(last_offset) = days.checked_sub(1) else {
            return Err(EngineError::EmptyWindow);
        };
        let end = start
            .checked_add_days(Days::new(last_offset))
            .ok_or(EngineError::InvalidWindow { start, end: start })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersection with optional open-ended bounds, or `None` if disjoint.
    pub fn clamp(&self, lower: Option<NaiveDate>, upper: Option<NaiveDate>) -> Option<Self> {
        let start = lower.map_or(self.start, |l| l.max(self.start));
        let end = upper.map_or(self.end, |u| u.min(self.end));
        Self::new(start, end).ok()
    }

    /// Every calendar date, ascending, both ends included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}
