//! SQLite-based storage for events, teams, members, profiles, and tasks.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::allocation::engine::Assignment;
use crate::allocation::workload::WorkloadEntry;
use crate::error::{CoreError, DatabaseError};
use crate::event::Event;
use crate::profile::UserProfile;
use crate::task::{Task, TaskPriority};
use crate::team::{Team, TeamMember};

// === Helper Functions ===

/// Parse task priority from database string
fn parse_priority(priority_str: &str) -> TaskPriority {
    match priority_str {
        "high" => TaskPriority::High,
        "low" => TaskPriority::Low,
        _ => TaskPriority::Medium,
    }
}

/// Format task priority for database storage
fn format_priority(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "high",
        TaskPriority::Medium => "medium",
        TaskPriority::Low => "low",
    }
}

/// Parse a JSON-encoded string list column
fn parse_string_list(list_str: &str) -> Vec<String> {
    serde_json::from_str(list_str).unwrap_or_default()
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse an optional datetime column
fn parse_datetime_opt(dt_str: Option<String>) -> Option<DateTime<Utc>> {
    dt_str.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Build a Task from a database row.
///
/// Column order matches `TASK_COLUMNS`.
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let required_skills_str: String = row.get(5)?;
    let priority_str: String = row.get(6)?;
    let due_at_str: Option<String> = row.get(11)?;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    Ok(Task {
        id: row.get(0)?,
        event_id: row.get(1)?,
        team_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        required_skills: parse_string_list(&required_skills_str),
        priority: parse_priority(&priority_str),
        assigned_to: row.get(7)?,
        assigned_name: row.get(8)?,
        ai_assigned: row.get::<_, i64>(9)? != 0,
        completed: row.get::<_, i64>(10)? != 0,
        due_at: parse_datetime_opt(due_at_str),
        created_at: parse_datetime_fallback(&created_at_str),
        updated_at: parse_datetime_fallback(&updated_at_str),
    })
}

const TASK_COLUMNS: &str = "id, event_id, team_id, title, description, required_skills, priority, \
                            assigned_to, assigned_name, ai_assigned, completed, due_at, \
                            created_at, updated_at";

/// SQLite database for the portal.
///
/// Stores events, teams, team members, user profiles, and tasks.
pub struct PortalDb {
    conn: Connection,
}

impl PortalDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/campushub/campushub.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("campushub.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        // Create base tables (v1 schema) first
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT,
                starts_at   TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
                id         TEXT PRIMARY KEY,
                event_id   TEXT NOT NULL,
                name       TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS team_members (
                user_id TEXT NOT NULL,
                team_id TEXT NOT NULL,
                name    TEXT NOT NULL,
                skills  TEXT NOT NULL DEFAULT '[]',
                PRIMARY KEY (user_id, team_id)
            );

            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                name    TEXT NOT NULL,
                skills  TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id              TEXT PRIMARY KEY,
                event_id        TEXT NOT NULL,
                team_id         TEXT NOT NULL,
                title           TEXT NOT NULL,
                description     TEXT,
                required_skills TEXT NOT NULL DEFAULT '[]',
                priority        TEXT NOT NULL DEFAULT 'medium',
                assigned_to     TEXT,
                completed       INTEGER NOT NULL DEFAULT 0,
                due_at          TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_tasks_event ON tasks(event_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_assigned ON tasks(assigned_to);
            CREATE INDEX IF NOT EXISTS idx_teams_event ON teams(event_id);",
        )?;

        // Run incremental migrations (v1 -> v2, etc.)
        migrations::migrate(&self.conn)?;

        Ok(())
    }

    // === Event CRUD ===

    pub fn create_event(&self, event: &Event) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO events (id, name, description, starts_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id,
                event.name,
                event.description,
                event.starts_at.map(|dt| dt.to_rfc3339()),
                event.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_event(&self, id: &str) -> Result<Option<Event>, DatabaseError> {
        let event = self
            .conn
            .query_row(
                "SELECT id, name, description, starts_at, created_at
                 FROM events WHERE id = ?1",
                params![id],
                |row| {
                    let starts_at: Option<String> = row.get(3)?;
                    let created_at: String = row.get(4)?;
                    Ok(Event {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        starts_at: parse_datetime_opt(starts_at),
                        created_at: parse_datetime_fallback(&created_at),
                    })
                },
            )
            .optional()?;
        Ok(event)
    }

    pub fn list_events(&self) -> Result<Vec<Event>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, starts_at, created_at
             FROM events ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([], |row| {
            let starts_at: Option<String> = row.get(3)?;
            let created_at: String = row.get(4)?;
            Ok(Event {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                starts_at: parse_datetime_opt(starts_at),
                created_at: parse_datetime_fallback(&created_at),
            })
        })?;
        let mut events = Vec::new();
        for event in rows {
            events.push(event?);
        }
        Ok(events)
    }

    // === Team CRUD ===

    pub fn create_team(&self, team: &Team) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO teams (id, event_id, name, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                team.id,
                team.event_id,
                team.name,
                team.created_at.to_rfc3339(),
            ],
        )?;
        for member in &team.members {
            self.add_member(member)?;
        }
        Ok(())
    }

    pub fn add_member(&self, member: &TeamMember) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO team_members (user_id, team_id, name, skills)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                member.user_id,
                member.team_id,
                member.name,
                serde_json::to_string(&member.skills).unwrap_or_else(|_| "[]".to_string()),
            ],
        )?;
        Ok(())
    }

    /// Members in insertion order, so the allocation tie-break is stable.
    fn load_members(&self, team_id: &str) -> Result<Vec<TeamMember>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, team_id, name, skills
             FROM team_members WHERE team_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![team_id], |row| {
            let skills_str: String = row.get(3)?;
            Ok(TeamMember {
                user_id: row.get(0)?,
                team_id: row.get(1)?,
                name: row.get(2)?,
                skills: parse_string_list(&skills_str),
            })
        })?;
        let mut members = Vec::new();
        for member in rows {
            members.push(member?);
        }
        Ok(members)
    }

    fn get_team(&self, id: &str) -> Result<Option<Team>, rusqlite::Error> {
        let team = self
            .conn
            .query_row(
                "SELECT id, event_id, name, created_at FROM teams WHERE id = ?1",
                params![id],
                |row| {
                    let created_at: String = row.get(3)?;
                    Ok(Team {
                        id: row.get(0)?,
                        event_id: row.get(1)?,
                        name: row.get(2)?,
                        members: Vec::new(),
                        created_at: parse_datetime_fallback(&created_at),
                    })
                },
            )
            .optional()?;
        match team {
            Some(mut team) => {
                team.members = self.load_members(&team.id)?;
                Ok(Some(team))
            }
            None => Ok(None),
        }
    }

    pub fn list_teams(&self, event_id: &str) -> Result<Vec<Team>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM teams WHERE event_id = ?1 ORDER BY created_at, id",
        )?;
        let ids = stmt.query_map(params![event_id], |row| row.get::<_, String>(0))?;
        let mut teams = Vec::new();
        for id in ids {
            if let Some(team) = self.get_team(&id?)? {
                teams.push(team);
            }
        }
        Ok(teams)
    }

    /// Fetch teams by id, members included, in the order requested.
    ///
    /// # Errors
    /// Returns `CoreError::NotFound` for the first id with no team record.
    pub fn teams_by_ids(&self, ids: &[String]) -> Result<Vec<Team>, CoreError> {
        let mut teams = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_team(id).map_err(DatabaseError::from)? {
                Some(team) => teams.push(team),
                None => {
                    return Err(CoreError::NotFound {
                        kind: "team",
                        id: id.clone(),
                    })
                }
            }
        }
        Ok(teams)
    }

    // === Profile CRUD ===

    pub fn upsert_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO profiles (user_id, name, skills)
             VALUES (?1, ?2, ?3)",
            params![
                profile.user_id,
                profile.name,
                serde_json::to_string(&profile.skills).unwrap_or_else(|_| "[]".to_string()),
            ],
        )?;
        Ok(())
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let profile = self
            .conn
            .query_row(
                "SELECT user_id, name, skills FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let skills_str: String = row.get(2)?;
                    Ok(UserProfile {
                        user_id: row.get(0)?,
                        name: row.get(1)?,
                        skills: parse_string_list(&skills_str),
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// Profile-level skills for the given users. Users without a profile
    /// are simply absent from the result.
    pub fn profile_skills_for(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, DatabaseError> {
        let mut skills = HashMap::new();
        for user_id in user_ids {
            if let Some(profile) = self.get_profile(user_id)? {
                skills.insert(profile.user_id, profile.skills);
            }
        }
        Ok(skills)
    }

    // === Task CRUD ===

    pub fn create_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO tasks (id, event_id, team_id, title, description, required_skills,
                                priority, assigned_to, assigned_name, ai_assigned, completed,
                                due_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                task.id,
                task.event_id,
                task.team_id,
                task.title,
                task.description,
                serde_json::to_string(&task.required_skills).unwrap_or_else(|_| "[]".to_string()),
                format_priority(task.priority),
                task.assigned_to,
                task.assigned_name,
                task.ai_assigned as i64,
                task.completed as i64,
                task.due_at.map(|dt| dt.to_rfc3339()),
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    pub fn list_tasks(&self, event_id: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE event_id = ?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(params![event_id], row_to_task)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// Mark a task completed. Returns false if the task does not exist.
    pub fn complete_task(&self, id: &str) -> Result<bool, DatabaseError> {
        let updated = self.conn.execute(
            "UPDATE tasks SET completed = 1, updated_at = ?2 WHERE id = ?1",
            params![id, Utc::now().to_rfc3339()],
        )?;
        Ok(updated > 0)
    }

    // === Allocation queries ===

    /// Incomplete, unassigned tasks for an event.
    ///
    /// The ORDER BY is the batch order consumed by the allocation loop;
    /// changing it changes which member sees an earlier task's load.
    pub fn unassigned_tasks(&self, event_id: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE event_id = ?1 AND completed = 0 AND assigned_to IS NULL
             ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(params![event_id], row_to_task)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// Open-task counters per assignee, across all events, restricted to
    /// the given users. Users with no open tasks are absent; the snapshot
    /// builder fills in the zeros.
    pub fn open_task_counts(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, WorkloadEntry>, DatabaseError> {
        let wanted: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
        let mut stmt = self.conn.prepare(
            "SELECT assigned_to, COUNT(*),
                    COALESCE(SUM(CASE WHEN priority = 'high' THEN 1 ELSE 0 END), 0)
             FROM tasks
             WHERE completed = 0 AND assigned_to IS NOT NULL
             GROUP BY assigned_to",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (user_id, open_tasks, open_high_priority) = row?;
            if wanted.contains(user_id.as_str()) {
                counts.insert(
                    user_id,
                    WorkloadEntry {
                        open_tasks,
                        open_high_priority,
                    },
                );
            }
        }
        Ok(counts)
    }

    /// Persist a finalized assignment batch as one transaction.
    ///
    /// Per task: set assignee id and name, flag the assignment as
    /// engine-produced, refresh updated_at. Returns the number of rows
    /// updated. No partial commit: any failure rolls the batch back.
    pub fn apply_assignments(&self, assignments: &[Assignment]) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();
        let mut updated = 0;
        for assignment in assignments {
            updated += tx.execute(
                "UPDATE tasks
                 SET assigned_to = ?1, assigned_name = ?2, ai_assigned = 1, updated_at = ?3
                 WHERE id = ?4",
                params![
                    assignment.member_id,
                    assignment.member_name,
                    now,
                    assignment.task_id,
                ],
            )?;
        }
        tx.commit()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> (PortalDb, Event, Team) {
        let db = PortalDb::open_memory().unwrap();
        let event = Event::new("Spring Fest");
        db.create_event(&event).unwrap();
        let mut team = Team::new(&event.id, "Stage Crew");
        team.members.push(TeamMember {
            user_id: "u1".to_string(),
            team_id: team.id.clone(),
            name: "Asha".to_string(),
            skills: vec!["sound".to_string()],
        });
        db.create_team(&team).unwrap();
        (db, event, team)
    }

    #[test]
    fn event_roundtrip() {
        let (db, event, _) = seeded_db();
        let loaded = db.get_event(&event.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Spring Fest");
        assert_eq!(db.list_events().unwrap().len(), 1);
    }

    #[test]
    fn team_roundtrip_includes_members() {
        let (db, _, team) = seeded_db();
        let loaded = db.teams_by_ids(&[team.id.clone()]).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].members.len(), 1);
        assert_eq!(loaded[0].members[0].skills, vec!["sound"]);
    }

    #[test]
    fn unknown_team_id_is_not_found() {
        let (db, _, team) = seeded_db();
        let err = db
            .teams_by_ids(&[team.id.clone(), "missing".to_string()])
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "team", .. }));
    }

    #[test]
    fn profile_skills_lookup_skips_missing_profiles() {
        let (db, _, _) = seeded_db();
        let mut profile = UserProfile::new("u1", "Asha");
        profile.skills = vec!["catering".to_string()];
        db.upsert_profile(&profile).unwrap();

        let skills = db
            .profile_skills_for(&["u1".to_string(), "ghost".to_string()])
            .unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills["u1"], vec!["catering"]);
    }

    #[test]
    fn unassigned_query_filters_and_orders() {
        let (db, event, team) = seeded_db();

        let mut done = Task::new(&event.id, &team.id, "Done");
        done.completed = true;
        db.create_task(&done).unwrap();

        let mut taken = Task::new(&event.id, &team.id, "Taken");
        taken.assigned_to = Some("u1".to_string());
        db.create_task(&taken).unwrap();

        // Same created_at second is possible; id breaks the tie.
        let open_a = Task::new(&event.id, &team.id, "Open A");
        let open_b = Task::new(&event.id, &team.id, "Open B");
        db.create_task(&open_a).unwrap();
        db.create_task(&open_b).unwrap();

        let batch = db.unassigned_tasks(&event.id).unwrap();
        assert_eq!(batch.len(), 2);
        let mut expected = vec![open_a.id.clone(), open_b.id.clone()];
        if open_b.created_at == open_a.created_at {
            expected.sort();
        }
        let got: Vec<_> = batch.iter().map(|t| t.id.clone()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn open_task_counts_aggregates_across_events() {
        let (db, event, team) = seeded_db();
        let other_event = Event::new("Winter Meet");
        db.create_event(&other_event).unwrap();

        for (event_id, priority) in [
            (&event.id, TaskPriority::High),
            (&other_event.id, TaskPriority::Medium),
        ] {
            let mut task = Task::new(event_id, &team.id, "Work");
            task.assigned_to = Some("u1".to_string());
            task.priority = priority;
            db.create_task(&task).unwrap();
        }

        let counts = db.open_task_counts(&["u1".to_string()]).unwrap();
        assert_eq!(counts["u1"].open_tasks, 2);
        assert_eq!(counts["u1"].open_high_priority, 1);
    }

    #[test]
    fn apply_assignments_sets_engine_fields() {
        let (db, event, team) = seeded_db();
        let task = Task::new(&event.id, &team.id, "Rig speakers");
        db.create_task(&task).unwrap();

        let updated = db
            .apply_assignments(&[Assignment {
                task_id: task.id.clone(),
                member_id: "u1".to_string(),
                member_name: "Asha".to_string(),
            }])
            .unwrap();
        assert_eq!(updated, 1);

        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(loaded.assigned_to.as_deref(), Some("u1"));
        assert_eq!(loaded.assigned_name.as_deref(), Some("Asha"));
        assert!(loaded.ai_assigned);
        assert!(loaded.updated_at >= task.updated_at);
    }

    #[test]
    fn reopen_preserves_data_and_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campushub.db");

        let event = Event::new("Persisted Fest");
        {
            let db = PortalDb::open_at(&path).unwrap();
            db.create_event(&event).unwrap();
        }

        // Second open re-runs migrate(); it must be a no-op.
        let db = PortalDb::open_at(&path).unwrap();
        let loaded = db.get_event(&event.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Persisted Fest");
    }

    #[test]
    fn complete_task_flips_flag() {
        let (db, event, team) = seeded_db();
        let task = Task::new(&event.id, &team.id, "Pack up");
        db.create_task(&task).unwrap();

        assert!(db.complete_task(&task.id).unwrap());
        assert!(!db.complete_task("missing").unwrap());
        assert!(db.get_task(&task.id).unwrap().unwrap().completed);
    }
}
