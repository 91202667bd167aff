use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated hierarchical breakdown of a goal into learning nodes.
///
/// `tree_json` is the tree-level document produced by the generator (goal
/// summary plus the node list) and is stored verbatim. The relational rows in
/// `skill_tree_nodes` are the queryable projection of the same data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTree {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub tree_json: serde_json::Value,
    /// Which generation path produced this tree, see [`DraftSource`].
    pub generated_by: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// One unit of a skill tree.
///
/// `node_path` is a dot-delimited hierarchical slug, unique within the
/// owning tree. Sprint tasks may weak-reference a node by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTreeNode {
    pub id: Uuid,
    pub skill_tree_id: Uuid,
    pub node_path: String,
    pub title: String,
    /// Coarse depth indicator, 1 for top-level nodes.
    pub level: i64,
    /// Estimated focus-hour cost for this node.
    pub focus_hours: f64,
    /// Free-form generator-defined metadata, opaque to the pipeline.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A node as produced by the generator, before persistence.
///
/// The completion-service response is deserialized through this shape, so a
/// structurally invalid response fails parsing instead of reaching storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTreeNodeDraft {
    pub node_path: String,
    pub title: String,
    pub level: i64,
    pub focus_hours: f64,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Which path produced a skill tree draft.
///
/// The generator always succeeds; a completion-service failure is recorded
/// here (and logged) rather than surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSource {
    /// The completion service returned a usable node set.
    Completion,
    /// The deterministic heuristic supplied the node set.
    Heuristic,
}

impl DraftSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Generator output: the tree-level document plus the ordered node drafts.
#[derive(Debug, Clone)]
pub struct SkillTreeDraft {
    pub tree_json: serde_json::Value,
    pub nodes: Vec<SkillTreeNodeDraft>,
    pub source: DraftSource,
}

/// A skill tree with its nodes, as returned by both the write and read
/// pipelines. Tree fields are flattened into the JSON object with a `nodes`
/// array alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTreeWithNodes {
    #[serde(flatten)]
    pub tree: SkillTree,
    pub nodes: Vec<SkillTreeNode>,
}
