use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed execution window containing concrete tasks for a goal.
///
/// Sprint windows are always 7 days inclusive (`to_date = from_date + 6`).
/// `sprint_number` is 1-based and monotonically increasing per goal; the
/// write pipeline only ever creates a goal's first sprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub sprint_number: i64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: SprintStatus,
    pub summary: String,
    /// Free-form planning metrics; the write pipeline records the goal's
    /// `horizonMonths` here.
    pub metrics: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// The lifecycle state of a sprint. New sprints start as `Planned`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A concrete work item within a sprint.
///
/// `skill_node_id` is a weak reference: it points at a node of the same
/// goal's tree when the planner tied the task to one, and is null otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintTask {
    pub id: Uuid,
    pub sprint_id: Uuid,
    pub skill_node_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub estimated_minutes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Coarse effort tier for a task, derived from the node's focus hours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// The execution status of a task. New tasks start as `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A task as produced by the planner, before persistence.
///
/// `node_path` back-references a draft node; the orchestrator resolves it to
/// a persisted node id when inserting the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintTaskDraft {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub due_date: NaiveDate,
    pub estimated_minutes: i64,
    pub node_path: Option<String>,
}

/// Planner output: the sprint window plus its ordered task drafts.
#[derive(Debug, Clone)]
pub struct SprintPlan {
    pub sprint_number: i64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub summary: String,
    pub tasks: Vec<SprintTaskDraft>,
}

/// A sprint with its tasks, as returned by both pipelines. Sprint fields are
/// flattened into the JSON object with a `tasks` array alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintWithTasks {
    #[serde(flatten)]
    pub sprint: Sprint,
    pub tasks: Vec<SprintTask>,
}
