//! Per-occurrence overrides.
//!
//! Sparse: a generated date with no entry resolves to the base task's status.
//! Keys are calendar dates, so ordering and range clearing are correct across
//! month and year boundaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::TaskStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default)]
    pub modified: bool,
}

impl OccurrenceOverride {
    /// A user-edited entry; `completed` is derived from the status.
    pub fn edited(status: Option<TaskStatus>, skipped: Option<bool>) -> Self {
        Self::default().amend(status, skipped)
    }

    /// Fold a further edit into this entry. Present fields replace, absent
    /// fields keep their current value.
    pub fn amend(mut self, status: Option<TaskStatus>, skipped: Option<bool>) -> Self {
        if let Some(s) = status {
            self.status = Some(s);
            self.completed = Some(s.is_done());
        }
        if skipped.is_some() {
            self.skipped = skipped;
        }
        self.modified = true;
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideStore(BTreeMap<NaiveDate, OccurrenceOverride>);

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&OccurrenceOverride> {
        self.0.get(&date)
    }

    /// Write or overwrite the entry for `date`.
    pub fn set(&mut self, date: NaiveDate, entry: OccurrenceOverride) -> Option<OccurrenceOverride> {
        self.0.insert(date, entry)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(NaiveDate, OccurrenceOverride)> for OverrideStore {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, OccurrenceOverride)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Keep exactly the entries strictly earlier than `from`.
///
/// With no reference date there is nothing to preserve, so the result is empty.
pub fn clear_from(overrides: &OverrideStore, from: Option<NaiveDate>) -> OverrideStore {
    match from {
        Some(from) => OverrideStore(overrides.0.range(..from).map(|(d, o)| (*d, o.clone())).collect()),
        None => OverrideStore::new(),
    }
}
