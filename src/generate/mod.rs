//! Draft generation: goal input to skill tree and first sprint.
//!
//! [`generate_skill_tree`] tries the completion service when one is
//! configured and falls back to a deterministic heuristic otherwise — it
//! never fails. [`plan_initial_sprint`] is a pure function deriving the
//! first 7-day sprint from the persisted nodes.

mod completion;
mod draft;
mod sprint;

pub use completion::{ChatCompletionClient, CompletionClient};
pub use draft::{generate_skill_tree, slugify};
pub use sprint::plan_initial_sprint;
