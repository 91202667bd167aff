//! First-sprint planning over a goal's persisted skill tree nodes.

use chrono::{Days, NaiveDate};

use crate::models::{Difficulty, GoalInput, SkillTreeNode, SprintPlan, SprintTaskDraft};

/// How many nodes seed tasks in the first sprint.
const SPRINT_TASK_LIMIT: usize = 4;

/// Derives the first sprint for a goal.
///
/// Pure function of its inputs and the supplied base date. The window is
/// always `[today, today + 6]` inclusive and the sprint number is always 1;
/// later sprints are planned elsewhere.
///
/// Task `i` (0-based) is due `i*2 + 3` days out, so work is spread across
/// the window instead of front-loaded.
pub fn plan_initial_sprint(
    input: &GoalInput,
    nodes: &[SkillTreeNode],
    today: NaiveDate,
) -> SprintPlan {
    let tasks = nodes
        .iter()
        .take(SPRINT_TASK_LIMIT)
        .enumerate()
        .map(|(i, node)| {
            let due = today + Days::new(i as u64 * 2 + 3);
            SprintTaskDraft {
                title: node.title.clone(),
                description: format!(
                    "Work on {} by allocating {} focused minutes this week.",
                    node.title,
                    node.focus_hours.ceil() as i64
                ),
                difficulty: difficulty_for(node.focus_hours),
                due_date: due,
                estimated_minutes: i64::max(15, node.focus_hours.round() as i64),
                node_path: Some(node.node_path.clone()),
            }
        })
        .collect();

    SprintPlan {
        sprint_number: 1,
        from_date: today,
        to_date: today + Days::new(6),
        summary: format!(
            "Sprint 1 for \"{}\" focuses on clarifying intent and kickstarting practice.",
            input.title
        ),
        tasks,
    }
}

fn difficulty_for(focus_hours: f64) -> Difficulty {
    if focus_hours > 20.0 {
        Difficulty::High
    } else if focus_hours > 10.0 {
        Difficulty::Medium
    } else {
        Difficulty::Low
    }
}
