//! Domain models for the growth map service.
//!
//! # Core Concepts
//!
//! ## Persisted Entities
//!
//! - [`Goal`]: a user's long-term objective with a time horizon and a daily
//!   time budget. Owned by exactly one user.
//! - [`SkillTree`]: generated breakdown of a goal into learning nodes. Carries
//!   the tree-level document and a version counter.
//! - [`SkillTreeNode`]: one unit of a skill tree, identified by a
//!   dot-delimited hierarchical path unique within its tree.
//! - [`Sprint`]: a fixed 7-day execution window attached to a goal.
//! - [`SprintTask`]: a concrete work item within a sprint, optionally
//!   weak-referencing a skill tree node by id.
//!
//! ## Ephemeral Drafts
//!
//! Created per request and discarded once the write pipeline has persisted
//! them:
//!
//! - [`GoalInput`]: the validated request body.
//! - [`SkillTreeDraft`] / [`SkillTreeNodeDraft`]: generator output prior to
//!   storage, tagged with its [`DraftSource`].
//! - [`SprintPlan`] / [`SprintTaskDraft`]: planner output prior to storage.

mod goal;
mod skill_tree;
mod sprint;

pub use goal::*;
pub use skill_tree::*;
pub use sprint::*;
