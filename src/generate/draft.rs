//! Skill tree draft generation.
//!
//! The heuristic node set is computed first in every case; the completion
//! service, when configured, gets one attempt to replace it. A failed call,
//! an unparseable response, or an empty node list all keep the heuristic
//! draft — logged, never surfaced to the caller.

use serde::Deserialize;

use crate::models::{DraftSource, GoalInput, SkillTreeDraft, SkillTreeNodeDraft};

use super::completion::CompletionClient;

/// Derives a hyphenated lowercase slug from free text.
///
/// Runs of non-alphanumeric characters collapse into a single hyphen, with
/// no leading or trailing hyphens. Idempotent.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// The deterministic node set: clarify, practices, feedback, in that order.
fn heuristic_nodes(input: &GoalInput) -> Vec<SkillTreeNodeDraft> {
    let base = slugify(&input.title);
    let focus_unit = f64::max(3.0, (input.horizon_months * 4.0).round());

    vec![
        SkillTreeNodeDraft {
            node_path: format!("{base}.clarify"),
            title: format!("Clarify the vision for {}", input.title),
            level: 1,
            focus_hours: focus_unit,
            payload: serde_json::json!({ "example": "define success criteria" }),
        },
        SkillTreeNodeDraft {
            node_path: format!("{base}.practices"),
            title: "Build foundational practice habits".to_string(),
            level: 1,
            focus_hours: f64::max(2.0, (focus_unit * 0.8).round()),
            payload: serde_json::json!({ "example": "daily review, spaced repetition" }),
        },
        SkillTreeNodeDraft {
            node_path: format!("{base}.feedback"),
            title: "Capture signals and feedback".to_string(),
            level: 2,
            focus_hours: f64::max(1.0, (focus_unit * 0.6).round()),
            payload: serde_json::json!({ "example": "weekly reflection" }),
        },
    ]
}

/// The tree-level document persisted alongside the relational node rows.
fn tree_json(input: &GoalInput, nodes: &[SkillTreeNodeDraft]) -> serde_json::Value {
    serde_json::json!({
        "title": input.title,
        "description": input.description,
        "horizonMonths": input.horizon_months,
        "createdBy": "system",
        "nodes": nodes
            .iter()
            .map(|node| serde_json::json!({
                "path": node.node_path,
                "title": node.title,
                "level": node.level,
                "focusHours": node.focus_hours,
                "payload": node.payload,
            }))
            .collect::<Vec<_>>(),
    })
}

/// Expected shape of the completion response. Deserializing through the
/// typed drafts rejects structurally invalid nodes before they can be
/// persisted.
#[derive(Debug, Deserialize)]
struct CompletionNodes {
    nodes: Vec<SkillTreeNodeDraft>,
}

async fn completion_nodes(
    client: &dyn CompletionClient,
    input: &GoalInput,
) -> anyhow::Result<Vec<SkillTreeNodeDraft>> {
    let prompt = format!(
        "Create 3 skill-tree nodes for the goal titled \"{}\". Output valid JSON like \
         {{\"nodes\": [{{\"nodePath\":\"...\",\"title\":\"...\",\"level\":1,\"focusHours\":10,\"payload\":{{}}}}]}}.",
        input.title
    );
    let raw = client.complete(&prompt).await?;
    let parsed: CompletionNodes = serde_json::from_str(&raw)?;
    if parsed.nodes.is_empty() {
        anyhow::bail!("completion returned no nodes");
    }
    Ok(parsed.nodes)
}

/// Produces a skill tree draft for a validated goal input.
///
/// Never returns an error: the heuristic branch is always available, and any
/// completion-service trouble is logged and absorbed here.
pub async fn generate_skill_tree(
    input: &GoalInput,
    completion: Option<&dyn CompletionClient>,
) -> SkillTreeDraft {
    // The heuristic set is computed up front so the completion attempt has
    // nothing to invalidate if it fails midway.
    let fallback = heuristic_nodes(input);

    if let Some(client) = completion {
        match completion_nodes(client, input).await {
            Ok(nodes) => {
                return SkillTreeDraft {
                    tree_json: tree_json(input, &nodes),
                    nodes,
                    source: DraftSource::Completion,
                };
            }
            Err(err) => {
                tracing::warn!("skill tree generation fell back to heuristic: {err:#}");
            }
        }
    }

    SkillTreeDraft {
        tree_json: tree_json(input, &fallback),
        nodes: fallback,
        source: DraftSource::Heuristic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn input(title: &str, horizon_months: f64) -> GoalInput {
        GoalInput {
            title: title.to_string(),
            description: "Conversational fluency".to_string(),
            horizon_months,
            daily_minutes: 30.0,
            target_date: None,
        }
    }

    struct Canned(String);

    #[async_trait]
    impl CompletionClient for Canned {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl CompletionClient for Failing {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            anyhow::bail!("service unavailable")
        }
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("Learn  Spanish!!"), "learn-spanish");
        assert_eq!(slugify("--Run a 10k--"), "run-a-10k");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("Learn  Spanish!!");
        assert_eq!(slugify(&once), once);
    }

    #[tokio::test]
    async fn heuristic_draft_has_three_nodes_in_fixed_order() {
        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), None).await;

        assert_eq!(draft.source, DraftSource::Heuristic);
        let paths: Vec<&str> = draft.nodes.iter().map(|n| n.node_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "learn-spanish.clarify",
                "learn-spanish.practices",
                "learn-spanish.feedback",
            ]
        );
        assert_eq!(draft.nodes[0].level, 1);
        assert_eq!(draft.nodes[1].level, 1);
        assert_eq!(draft.nodes[2].level, 2);
    }

    #[tokio::test]
    async fn heuristic_focus_hours_follow_the_formulas() {
        // horizonMonths=6 -> focus_unit = max(3, round(24)) = 24,
        // practices = round(19.2) = 19, feedback = round(14.4) = 14.
        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), None).await;
        let hours: Vec<f64> = draft.nodes.iter().map(|n| n.focus_hours).collect();
        assert_eq!(hours, vec![24.0, 19.0, 14.0]);
    }

    #[tokio::test]
    async fn tiny_horizon_hits_the_focus_floors() {
        // horizonMonths=0.1 -> round(0.4) = 0, floored to 3; practices
        // round(2.4) = 2; feedback round(1.8) = 2.
        let draft = generate_skill_tree(&input("Stretch daily", 0.1), None).await;
        let hours: Vec<f64> = draft.nodes.iter().map(|n| n.focus_hours).collect();
        assert_eq!(hours, vec![3.0, 2.0, 2.0]);
    }

    #[tokio::test]
    async fn tree_json_summarizes_goal_and_nodes() {
        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), None).await;
        assert_eq!(draft.tree_json["title"], "Learn Spanish");
        assert_eq!(draft.tree_json["createdBy"], "system");
        assert_eq!(draft.tree_json["horizonMonths"], 6.0);
        assert_eq!(draft.tree_json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(draft.tree_json["nodes"][0]["path"], "learn-spanish.clarify");
    }

    #[tokio::test]
    async fn valid_completion_replaces_the_heuristic_nodes() {
        let raw = serde_json::json!({
            "nodes": [
                { "nodePath": "spanish.listening", "title": "Train listening", "level": 1, "focusHours": 12.0, "payload": {} },
                { "nodePath": "spanish.speaking", "title": "Train speaking", "level": 1, "focusHours": 18.0 },
            ]
        })
        .to_string();
        let client = Canned(raw);

        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), Some(&client)).await;

        assert_eq!(draft.source, DraftSource::Completion);
        assert_eq!(draft.nodes.len(), 2);
        assert_eq!(draft.nodes[0].node_path, "spanish.listening");
        // Omitted payload defaults to null rather than failing the parse.
        assert!(draft.nodes[1].payload.is_null());
        assert_eq!(draft.tree_json["nodes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_completion_keeps_the_heuristic_draft() {
        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), Some(&Failing)).await;
        assert_eq!(draft.source, DraftSource::Heuristic);
        assert_eq!(draft.nodes.len(), 3);
    }

    #[tokio::test]
    async fn unparseable_completion_keeps_the_heuristic_draft() {
        let client = Canned("here are your nodes!".to_string());
        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), Some(&client)).await;
        assert_eq!(draft.source, DraftSource::Heuristic);
    }

    #[tokio::test]
    async fn empty_node_list_keeps_the_heuristic_draft() {
        let client = Canned(r#"{"nodes": []}"#.to_string());
        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), Some(&client)).await;
        assert_eq!(draft.source, DraftSource::Heuristic);
        assert_eq!(draft.nodes.len(), 3);
    }

    #[tokio::test]
    async fn structurally_invalid_nodes_keep_the_heuristic_draft() {
        // Non-empty but missing focusHours: must fail the typed parse.
        let client = Canned(r#"{"nodes": [{"nodePath": "x.y", "title": "X", "level": 1}]}"#.to_string());
        let draft = generate_skill_tree(&input("Learn Spanish", 6.0), Some(&client)).await;
        assert_eq!(draft.source, DraftSource::Heuristic);
    }
}
