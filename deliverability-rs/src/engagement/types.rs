use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::schedule::{Step, StepSchedule};

/// Engagement snapshot of one recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEngagement {
    #[serde(default, alias = "lastOpenAt")]
    pub last_open_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "lastClickAt")]
    pub last_click_at: Option<DateTime<Utc>>,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "openCount")]
    pub open_count: u32,
    #[serde(default, alias = "clickCount")]
    pub click_count: u32,
}

impl ContactEngagement {
    /// Contact that has never opened or clicked
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            last_open_at: None,
            last_click_at: None,
            created_at,
            open_count: 0,
            click_count: 0,
        }
    }

    /// Most recent open or click, if any
    pub fn last_engaged_at(&self) -> Option<DateTime<Utc>> {
        self.last_open_at.max(self.last_click_at)
    }

    /// Timestamp recency is measured from: last engagement, else signup
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.last_engaged_at().unwrap_or(self.created_at)
    }
}

/// Recency segment, from most to least engaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Active,
    Lapsing,
    AtRisk,
    Inactive,
    Dead,
}

impl Segment {
    pub fn recommended_action(&self) -> LifecycleAction {
        match self {
            Segment::Active => LifecycleAction::Keep,
            Segment::Lapsing => LifecycleAction::ReduceFrequency,
            Segment::AtRisk => LifecycleAction::ReEngage,
            Segment::Inactive | Segment::Dead => LifecycleAction::Suppress,
        }
    }
}

/// What the list-hygiene job should do with the contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Keep,
    ReduceFrequency,
    ReEngage,
    Suppress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementVerdict {
    pub segment: Segment,
    pub action: LifecycleAction,
    /// Whole days since the reference timestamp
    pub days_since_engagement: u32,
}

/// Day bands for each segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub segments: StepSchedule<Segment>,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        let steps = vec![
            Step::new(0, Segment::Active),
            Step::new(31, Segment::Lapsing),
            Step::new(91, Segment::AtRisk),
            Step::new(151, Segment::Inactive),
            Step::new(301, Segment::Dead),
        ];
        Self {
            segments: StepSchedule::new(steps).expect("built-in segment bands are ordered"),
        }
    }
}

impl EngagementConfig {
    /// Segments must only get colder as days pass
    pub fn validate(&self) -> Result<()> {
        self.segments.ensure_monotonic("engagement", |a, b| a < b)
    }
}

/// Tally of verdicts from one list-hygiene pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HygieneReport {
    pub total: usize,
    pub by_segment: BTreeMap<Segment, usize>,
    pub by_action: BTreeMap<LifecycleAction, usize>,
}

impl HygieneReport {
    pub fn count_action(&self, action: LifecycleAction) -> usize {
        self.by_action.get(&action).copied().unwrap_or(0)
    }

    pub fn count_segment(&self, segment: Segment) -> usize {
        self.by_segment.get(&segment).copied().unwrap_or(0)
    }
}
