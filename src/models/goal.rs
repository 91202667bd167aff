use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::skill_tree::SkillTreeWithNodes;
use super::sprint::SprintWithTasks;

/// A user's stated long-term objective.
///
/// A goal owns at most one skill tree and any number of sprints. It belongs
/// to exactly one user; every read path checks ownership before returning
/// goal data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    /// Planning horizon in months. Drives the generator's focus-hour budget.
    pub horizon_months: f64,
    /// Daily time budget in minutes.
    pub daily_minutes: f64,
    pub status: GoalStatus,
    pub priority: i64,
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The lifecycle state of a goal. New goals start as `Active`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Paused,
    Completed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Request body for creating a growth map.
///
/// Immutable once validated; the generator and planner only ever read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub title: String,
    pub description: String,
    pub horizon_months: f64,
    pub daily_minutes: f64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl GoalInput {
    /// Checks the request-level invariants: trimmed title and description
    /// must be non-empty, and both numeric budgets finite and positive.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Goal title and description are required");
        }
        if !self.horizon_months.is_finite() || self.horizon_months <= 0.0 {
            return Err("horizonMonths must be a positive number");
        }
        if !self.daily_minutes.is_finite() || self.daily_minutes <= 0.0 {
            return Err("dailyMinutes must be a positive number");
        }
        Ok(())
    }
}

/// Response for a created growth map: the goal plus everything the write
/// pipeline persisted for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthMap {
    pub goal: Goal,
    pub skill_tree: SkillTreeWithNodes,
    pub sprint: SprintWithTasks,
}

/// Composite view of a goal for the detail read path.
///
/// `skill_tree` and `latest_sprint` are `null` until the corresponding
/// entities exist; a goal created outside the growth-map pipeline has
/// neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDetail {
    pub goal: Goal,
    pub skill_tree: Option<SkillTreeWithNodes>,
    pub latest_sprint: Option<SprintWithTasks>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> GoalInput {
        GoalInput {
            title: "Learn Spanish".to_string(),
            description: "Conversational fluency".to_string(),
            horizon_months: 6.0,
            daily_minutes: 30.0,
            target_date: None,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut bad = input();
        bad.title = "   ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut bad = input();
        bad.description = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn non_positive_horizon_is_rejected() {
        let mut bad = input();
        bad.horizon_months = 0.0;
        assert!(bad.validate().is_err());
        bad.horizon_months = -3.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn non_finite_daily_minutes_is_rejected() {
        let mut bad = input();
        bad.daily_minutes = f64::NAN;
        assert!(bad.validate().is_err());
        bad.daily_minutes = f64::INFINITY;
        assert!(bad.validate().is_err());
    }
}
