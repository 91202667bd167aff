use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::auth::{self, AuthError};
use crate::generate::{generate_skill_tree, plan_initial_sprint};
use crate::models::*;

/// Runs the auth gate: bearer token out of the headers, then the identity
/// exchange. Both pipelines call this before touching the store.
async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<Uuid, AuthError> {
    let token = auth::extract_bearer_token(headers)?;
    state.verifier.verify_token(&token).await
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Create growth map
// ============================================================

/// The write pipeline: validate, generate, then persist goal → skill tree →
/// nodes → sprint → tasks in order.
///
/// Each later step needs identifiers from the previous one, so the writes
/// are strictly sequential. There is no compensation on partial failure: a
/// failure at step N leaves steps 1..N-1 persisted, and the 500 response
/// names the step that failed.
pub async fn create_growth_map(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<GrowthMap>), ApiError> {
    let user_id = require_user(&state, &headers).await?;

    // Body parsing happens after the auth gate, matching the pipeline order.
    let input: GoalInput = serde_json::from_slice(&body)
        .map_err(|_| ApiError::Validation("request body must be a valid goal input"))?;
    input.validate().map_err(ApiError::Validation)?;

    let goal = state
        .db
        .insert_goal(user_id, &input)
        .map_err(|e| ApiError::persistence("insert goal", e))?;

    let draft = generate_skill_tree(&input, state.completion.as_deref()).await;
    tracing::info!(
        goal_id = %goal.id,
        source = draft.source.as_str(),
        nodes = draft.nodes.len(),
        "skill tree draft generated"
    );

    let tree = state
        .db
        .insert_skill_tree(goal.id, &draft)
        .map_err(|e| ApiError::persistence("insert skill tree", e))?;

    let nodes = state
        .db
        .insert_nodes(tree.id, &draft.nodes)
        .map_err(|e| ApiError::persistence("insert skill tree nodes", e))?;

    // Plan against the persisted nodes so task references resolve to rows
    // that actually exist in this tree.
    let plan = plan_initial_sprint(&input, &nodes, Utc::now().date_naive());
    let metrics = serde_json::json!({ "horizonMonths": input.horizon_months });
    let sprint = state
        .db
        .insert_sprint(goal.id, &plan, metrics)
        .map_err(|e| ApiError::persistence("insert sprint", e))?;

    let node_ids: HashMap<String, Uuid> =
        nodes.iter().map(|n| (n.node_path.clone(), n.id)).collect();
    let tasks = state
        .db
        .insert_tasks(sprint.id, &plan.tasks, &node_ids)
        .map_err(|e| ApiError::persistence("insert sprint tasks", e))?;

    Ok((
        StatusCode::CREATED,
        Json(GrowthMap {
            goal,
            skill_tree: SkillTreeWithNodes { tree, nodes },
            sprint: SprintWithTasks { sprint, tasks },
        }),
    ))
}

// ============================================================
// Goal detail
// ============================================================

#[derive(Debug, Deserialize)]
pub struct GoalDetailQuery {
    #[serde(default)]
    goal_id: Option<String>,
}

/// The read pipeline: fetch the goal, check ownership, then assemble the
/// optional skill tree (with nodes) and latest sprint (with tasks).
pub async fn get_goal_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GoalDetailQuery>,
) -> Result<Json<GoalDetail>, ApiError> {
    let user_id = require_user(&state, &headers).await?;

    let goal_id = query
        .goal_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::Validation("goal_id is required"))?;
    // A goal_id that is not a uuid cannot name any goal.
    let goal_id = Uuid::parse_str(goal_id).map_err(|_| ApiError::NotFound("Goal"))?;

    let goal = state
        .db
        .get_goal(goal_id)
        .map_err(|e| ApiError::persistence("load goal", e))?
        .ok_or(ApiError::NotFound("Goal"))?;

    if goal.user_id != user_id {
        return Err(AuthError::Forbidden.into());
    }

    let skill_tree = match state
        .db
        .get_skill_tree_by_goal(goal.id)
        .map_err(|e| ApiError::persistence("load skill tree", e))?
    {
        Some(tree) => {
            let nodes = state
                .db
                .get_nodes_by_tree(tree.id)
                .map_err(|e| ApiError::persistence("load skill tree nodes", e))?;
            Some(SkillTreeWithNodes { tree, nodes })
        }
        None => None,
    };

    let latest_sprint = match state
        .db
        .get_latest_sprint(goal.id)
        .map_err(|e| ApiError::persistence("load sprint", e))?
    {
        Some(sprint) => {
            let tasks = state
                .db
                .get_tasks_by_sprint(sprint.id)
                .map_err(|e| ApiError::persistence("load sprint tasks", e))?;
            Some(SprintWithTasks { sprint, tasks })
        }
        None => None,
    };

    Ok(Json(GoalDetail {
        goal,
        skill_tree,
        latest_sprint,
    }))
}

// ============================================================
// Goals list
// ============================================================

pub async fn list_goals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Goal>>, ApiError> {
    let user_id = require_user(&state, &headers).await?;

    state
        .db
        .list_goals_by_user(user_id)
        .map(Json)
        .map_err(|e| ApiError::persistence("load goals", e))
}
