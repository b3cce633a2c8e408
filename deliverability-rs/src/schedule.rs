//! Age-banded step schedules
//!
//! Warm-up limits, send pacing and engagement segments are all left-closed
//! step functions of "whole days since some timestamp". This module holds the
//! day arithmetic and the validated schedule type they share.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days elapsed from `since` to `now`, rounded down.
///
/// Timestamps in the future count as day 0.
pub fn age_in_days(since: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let seconds = now.signed_duration_since(since).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    u32::try_from(seconds / SECONDS_PER_DAY).unwrap_or(u32::MAX)
}

/// One band of a schedule: `value` applies from `from_day` (inclusive) until
/// the next band starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step<T> {
    pub from_day: u32,
    pub value: T,
}

impl<T> Step<T> {
    pub fn new(from_day: u32, value: T) -> Self {
        Self { from_day, value }
    }
}

/// Non-empty list of steps starting at day 0 with strictly increasing start days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Step<T>>", into = "Vec<Step<T>>")]
#[serde(bound(
    serialize = "T: Clone + Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct StepSchedule<T> {
    steps: Vec<Step<T>>,
}

impl<T> StepSchedule<T> {
    /// Build a schedule, rejecting gaps before day 0 and unordered bands
    pub fn new(steps: Vec<Step<T>>) -> Result<Self> {
        let first = steps.first().ok_or_else(|| invalid("schedule has no steps"))?;
        if first.from_day != 0 {
            return Err(invalid(format!(
                "first step must start at day 0, starts at day {}",
                first.from_day
            )));
        }
        if let Some(pair) = steps.windows(2).find(|w| w[1].from_day <= w[0].from_day) {
            return Err(invalid(format!(
                "step at day {} does not come after day {}",
                pair[1].from_day, pair[0].from_day
            )));
        }
        Ok(Self { steps })
    }

    /// Value of the band containing `age_days`
    pub fn value_at(&self, age_days: u32) -> &T {
        // `new` guarantees steps[0] starts at day 0, so the index is never below 1 here.
        let idx = self.steps.partition_point(|s| s.from_day <= age_days);
        &self.steps[idx.saturating_sub(1)].value
    }

    pub fn steps(&self) -> &[Step<T>] {
        &self.steps
    }

    /// Check that consecutive values satisfy `in_order`.
    pub fn ensure_monotonic<F>(&self, name: &str, mut in_order: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> bool,
    {
        match self
            .steps
            .windows(2)
            .find(|w| !in_order(&w[0].value, &w[1].value))
        {
            Some(pair) => Err(GuardError::InvalidSchedule {
                schedule: name.to_string(),
                reason: format!(
                    "band starting at day {} regresses against day {}",
                    pair[1].from_day, pair[0].from_day
                ),
            }),
            None => Ok(()),
        }
    }
}

impl<T> TryFrom<Vec<Step<T>>> for StepSchedule<T> {
    type Error = GuardError;

    fn try_from(steps: Vec<Step<T>>) -> Result<Self> {
        Self::new(steps)
    }
}

impl<T> From<StepSchedule<T>> for Vec<Step<T>> {
    fn from(schedule: StepSchedule<T>) -> Self {
        schedule.steps
    }
}

fn invalid(reason: impl Into<String>) -> GuardError {
    GuardError::InvalidSchedule {
        schedule: "step schedule".to_string(),
        reason: reason.into(),
    }
}
