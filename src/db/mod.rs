mod schema;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;

/// SQLite-backed store for goals, skill trees, nodes, sprints and tasks.
///
/// The connection is shared behind a mutex; each operation acquires it for
/// its own duration only. The write pipeline's five-step chain is
/// deliberately not wrapped in one transaction — only the batch inserts
/// (nodes, tasks) are each atomic on their own.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "growth-map")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("growth-map.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Goal operations
    // ============================================================

    pub fn insert_goal(&self, user_id: Uuid, input: &GoalInput) -> Result<Goal> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO goals (id, user_id, title, description, horizon_months, daily_minutes, status, priority, target_date, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                user_id.to_string(),
                &input.title,
                &input.description,
                input.horizon_months,
                input.daily_minutes,
                GoalStatus::Active.as_str(),
                0,
                input.target_date.map(|d| d.to_string()),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Goal {
            id,
            user_id,
            title: input.title.clone(),
            description: input.description.clone(),
            horizon_months: input.horizon_months,
            daily_minutes: input.daily_minutes,
            status: GoalStatus::Active,
            priority: 0,
            target_date: input.target_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_goal(&self, id: Uuid) -> Result<Option<Goal>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, horizon_months, daily_minutes, status, priority, target_date, created_at, updated_at
             FROM goals WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(goal_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_goals_by_user(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, horizon_months, daily_minutes, status, priority, target_date, created_at, updated_at
             FROM goals WHERE user_id = ? ORDER BY created_at DESC",
        )?;

        let goals = stmt
            .query_map([user_id.to_string()], goal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    // ============================================================
    // Skill tree operations
    // ============================================================

    pub fn insert_skill_tree(&self, goal_id: Uuid, draft: &SkillTreeDraft) -> Result<SkillTree> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO skill_trees (id, goal_id, tree_json, generated_by, version, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                goal_id.to_string(),
                serde_json::to_string(&draft.tree_json)?,
                draft.source.as_str(),
                1,
                now.to_rfc3339(),
            ),
        )?;

        Ok(SkillTree {
            id,
            goal_id,
            tree_json: draft.tree_json.clone(),
            generated_by: draft.source.as_str().to_string(),
            version: 1,
            created_at: now,
        })
    }

    pub fn get_skill_tree_by_goal(&self, goal_id: Uuid) -> Result<Option<SkillTree>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, goal_id, tree_json, generated_by, version, created_at
             FROM skill_trees WHERE goal_id = ? LIMIT 1",
        )?;

        let mut rows = stmt.query([goal_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(skill_tree_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Inserts a draft's nodes as one batch. The whole batch is atomic: a
    /// duplicate path inside the draft leaves no partial node set behind.
    pub fn insert_nodes(
        &self,
        skill_tree_id: Uuid,
        drafts: &[SkillTreeNodeDraft],
    ) -> Result<Vec<SkillTreeNode>> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let now = Utc::now();

        let mut nodes = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = Uuid::new_v4();
            tx.execute(
                "INSERT INTO skill_tree_nodes (id, skill_tree_id, node_path, title, level, focus_hours, payload, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    id.to_string(),
                    skill_tree_id.to_string(),
                    &draft.node_path,
                    &draft.title,
                    draft.level,
                    draft.focus_hours,
                    serde_json::to_string(&draft.payload)?,
                    now.to_rfc3339(),
                ),
            )?;

            nodes.push(SkillTreeNode {
                id,
                skill_tree_id,
                node_path: draft.node_path.clone(),
                title: draft.title.clone(),
                level: draft.level,
                focus_hours: draft.focus_hours,
                payload: draft.payload.clone(),
                created_at: now,
            });
        }
        tx.commit()?;

        Ok(nodes)
    }

    pub fn get_nodes_by_tree(&self, skill_tree_id: Uuid) -> Result<Vec<SkillTreeNode>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, skill_tree_id, node_path, title, level, focus_hours, payload, created_at
             FROM skill_tree_nodes WHERE skill_tree_id = ? ORDER BY rowid",
        )?;

        let nodes = stmt
            .query_map([skill_tree_id.to_string()], node_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }

    // ============================================================
    // Sprint operations
    // ============================================================

    pub fn insert_sprint(
        &self,
        goal_id: Uuid,
        plan: &SprintPlan,
        metrics: serde_json::Value,
    ) -> Result<Sprint> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO sprints (id, goal_id, sprint_number, from_date, to_date, status, summary, metrics, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                goal_id.to_string(),
                plan.sprint_number,
                plan.from_date.to_string(),
                plan.to_date.to_string(),
                SprintStatus::Planned.as_str(),
                &plan.summary,
                serde_json::to_string(&metrics)?,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Sprint {
            id,
            goal_id,
            sprint_number: plan.sprint_number,
            from_date: plan.from_date,
            to_date: plan.to_date,
            status: SprintStatus::Planned,
            summary: plan.summary.clone(),
            metrics,
            created_at: now,
        })
    }

    pub fn get_latest_sprint(&self, goal_id: Uuid) -> Result<Option<Sprint>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, goal_id, sprint_number, from_date, to_date, status, summary, metrics, created_at
             FROM sprints WHERE goal_id = ? ORDER BY sprint_number DESC LIMIT 1",
        )?;

        let mut rows = stmt.query([goal_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(sprint_from_row(row)?)),
            None => Ok(None),
        }
    }

    // ============================================================
    // Sprint task operations
    // ============================================================

    /// Inserts a plan's tasks as one batch, resolving each draft's optional
    /// node path through `node_ids` (paths built from the goal's persisted
    /// nodes). An unresolved path stores a null reference.
    pub fn insert_tasks(
        &self,
        sprint_id: Uuid,
        drafts: &[SprintTaskDraft],
        node_ids: &HashMap<String, Uuid>,
    ) -> Result<Vec<SprintTask>> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let now = Utc::now();

        let mut tasks = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = Uuid::new_v4();
            let skill_node_id = draft
                .node_path
                .as_ref()
                .and_then(|path| node_ids.get(path))
                .copied();

            tx.execute(
                "INSERT INTO sprint_tasks (id, sprint_id, skill_node_id, title, description, difficulty, status, due_date, estimated_minutes, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    id.to_string(),
                    sprint_id.to_string(),
                    skill_node_id.map(|u| u.to_string()),
                    &draft.title,
                    &draft.description,
                    draft.difficulty.as_str(),
                    TaskStatus::Pending.as_str(),
                    draft.due_date.to_string(),
                    draft.estimated_minutes,
                    now.to_rfc3339(),
                ),
            )?;

            tasks.push(SprintTask {
                id,
                sprint_id,
                skill_node_id,
                title: draft.title.clone(),
                description: draft.description.clone(),
                difficulty: draft.difficulty,
                status: TaskStatus::Pending,
                due_date: Some(draft.due_date),
                estimated_minutes: Some(draft.estimated_minutes),
                created_at: now,
            });
        }
        tx.commit()?;

        Ok(tasks)
    }

    pub fn get_tasks_by_sprint(&self, sprint_id: Uuid) -> Result<Vec<SprintTask>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, sprint_id, skill_node_id, title, description, difficulty, status, due_date, estimated_minutes, created_at
             FROM sprint_tasks WHERE sprint_id = ? ORDER BY rowid",
        )?;

        let tasks = stmt
            .query_map([sprint_id.to_string()], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Row mapping
// ============================================================

fn goal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: parse_uuid(row.get::<_, String>(0)?),
        user_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        horizon_months: row.get(4)?,
        daily_minutes: row.get(5)?,
        status: GoalStatus::from_str(&row.get::<_, String>(6)?).unwrap_or(GoalStatus::Active),
        priority: row.get(7)?,
        target_date: row.get::<_, Option<String>>(8)?.map(parse_date),
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn skill_tree_from_row(row: &rusqlite::Row) -> rusqlite::Result<SkillTree> {
    Ok(SkillTree {
        id: parse_uuid(row.get::<_, String>(0)?),
        goal_id: parse_uuid(row.get::<_, String>(1)?),
        tree_json: parse_json(row.get::<_, Option<String>>(2)?),
        generated_by: row.get(3)?,
        version: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn node_from_row(row: &rusqlite::Row) -> rusqlite::Result<SkillTreeNode> {
    Ok(SkillTreeNode {
        id: parse_uuid(row.get::<_, String>(0)?),
        skill_tree_id: parse_uuid(row.get::<_, String>(1)?),
        node_path: row.get(2)?,
        title: row.get(3)?,
        level: row.get(4)?,
        focus_hours: row.get(5)?,
        payload: parse_json(row.get::<_, Option<String>>(6)?),
        created_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn sprint_from_row(row: &rusqlite::Row) -> rusqlite::Result<Sprint> {
    Ok(Sprint {
        id: parse_uuid(row.get::<_, String>(0)?),
        goal_id: parse_uuid(row.get::<_, String>(1)?),
        sprint_number: row.get(2)?,
        from_date: parse_date(row.get::<_, String>(3)?),
        to_date: parse_date(row.get::<_, String>(4)?),
        status: SprintStatus::from_str(&row.get::<_, String>(5)?).unwrap_or(SprintStatus::Planned),
        summary: row.get(6)?,
        metrics: parse_json(row.get::<_, Option<String>>(7)?),
        created_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<SprintTask> {
    Ok(SprintTask {
        id: parse_uuid(row.get::<_, String>(0)?),
        sprint_id: parse_uuid(row.get::<_, String>(1)?),
        skill_node_id: row.get::<_, Option<String>>(2)?.map(parse_uuid),
        title: row.get(3)?,
        description: row.get(4)?,
        difficulty: Difficulty::from_str(&row.get::<_, String>(5)?).unwrap_or(Difficulty::Low),
        status: TaskStatus::from_str(&row.get::<_, String>(6)?).unwrap_or(TaskStatus::Pending),
        due_date: row.get::<_, Option<String>>(7)?.map(parse_date),
        estimated_minutes: row.get(8)?,
        created_at: parse_datetime(row.get::<_, String>(9)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: String) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").unwrap_or_default()
}

fn parse_json(s: Option<String>) -> serde_json::Value {
    s.and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or(serde_json::Value::Null)
}
