//! Integration tests for the task allocation engine.
//!
//! These tests drive a full allocation run against an in-memory database:
//! seeding events, teams, members, and tasks, invoking the engine, and
//! verifying the persisted state.

use campushub_core::allocation::{run_allocation, AllocationRun, TaskOutcome};
use campushub_core::{Event, PortalDb, Task, TaskPriority, Team, TeamMember, UserProfile};

fn member(team: &Team, user_id: &str, name: &str, skills: &[&str]) -> TeamMember {
    TeamMember {
        user_id: user_id.to_string(),
        team_id: team.id.clone(),
        name: name.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

fn seeded_event(db: &PortalDb) -> Event {
    let event = Event::new("Tech Fest");
    db.create_event(&event).unwrap();
    event
}

fn task_with(
    event: &Event,
    team: &Team,
    title: &str,
    skills: &[&str],
    priority: TaskPriority,
) -> Task {
    let mut task = Task::new(&event.id, &team.id, title);
    task.required_skills = skills.iter().map(|s| s.to_string()).collect();
    task.priority = priority;
    task
}

fn completed(run: AllocationRun) -> campushub_core::AllocationReport {
    match run {
        AllocationRun::Completed(report) => report,
        AllocationRun::NothingToAssign => panic!("expected a completed run"),
    }
}

#[test]
fn every_assignment_stays_on_the_tasks_team() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let mut stage = Team::new(&event.id, "Stage");
    stage.members.push(member(&stage, "u1", "Asha", &["sound"]));
    db.create_team(&stage).unwrap();

    let mut desk = Team::new(&event.id, "Desk");
    desk.members
        .push(member(&desk, "u2", "Ravi", &["frontdesk", "sound"]));
    db.create_team(&desk).unwrap();

    db.create_task(&task_with(&event, &stage, "Rig mics", &["sound"], TaskPriority::Medium))
        .unwrap();
    db.create_task(&task_with(
        &event,
        &desk,
        "Greet guests",
        &["frontdesk"],
        TaskPriority::Medium,
    ))
    .unwrap();

    let report = completed(run_allocation(&db, &event.id).unwrap());
    assert_eq!(report.assignments().len(), 2);

    for task in db.list_tasks(&event.id).unwrap() {
        let assignee = task.assigned_to.expect("task should be assigned");
        let teams = db.teams_by_ids(&[task.team_id.clone()]).unwrap();
        assert!(
            teams[0].members.iter().any(|m| m.user_id == assignee),
            "assignee {assignee} is not on team {}",
            task.team_id
        );
        assert!(task.ai_assigned);
    }
}

#[test]
fn skill_match_outranks_idle_load() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let mut team = Team::new(&event.id, "AV");
    team.members
        .push(member(&team, "busy", "Busy Expert", &["sound", "lighting"]));
    team.members.push(member(&team, "idle", "Idle Novice", &["sound"]));
    db.create_team(&team).unwrap();

    // Pre-existing open load on the expert.
    for i in 0..2 {
        let mut old = Task::new(&event.id, &team.id, format!("Old {i}"));
        old.assigned_to = Some("busy".to_string());
        db.create_task(&old).unwrap();
    }

    db.create_task(&task_with(
        &event,
        &team,
        "Light the stage",
        &["sound", "lighting"],
        TaskPriority::Medium,
    ))
    .unwrap();

    let report = completed(run_allocation(&db, &event.id).unwrap());
    let assignments = report.assignments();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].member_id, "busy");
}

#[test]
fn equal_skills_go_to_the_least_loaded() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let mut team = Team::new(&event.id, "AV");
    team.members.push(member(&team, "loaded", "Loaded", &["sound"]));
    team.members.push(member(&team, "free", "Free", &["sound"]));
    db.create_team(&team).unwrap();

    for i in 0..3 {
        let mut old = Task::new(&event.id, &team.id, format!("Old {i}"));
        old.assigned_to = Some("loaded".to_string());
        db.create_task(&old).unwrap();
    }

    db.create_task(&task_with(&event, &team, "Mix audio", &["sound"], TaskPriority::Medium))
        .unwrap();

    let report = completed(run_allocation(&db, &event.id).unwrap());
    assert_eq!(report.assignments()[0].member_id, "free");
}

#[test]
fn in_batch_load_is_visible_to_later_tasks() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let mut team = Team::new(&event.id, "Solo");
    team.members.push(member(&team, "only", "Only One", &[]));
    db.create_team(&team).unwrap();

    db.create_task(&task_with(&event, &team, "First", &[], TaskPriority::High))
        .unwrap();
    db.create_task(&task_with(&event, &team, "Second", &[], TaskPriority::Medium))
        .unwrap();

    let report = completed(run_allocation(&db, &event.id).unwrap());
    assert_eq!(report.assignments().len(), 2);
    // Snapshot started at zero; after the batch the sole member carries both.
    assert_eq!(report.workload.open_tasks("only"), 2);
    assert_eq!(report.workload.entry("only").open_high_priority, 1);
}

#[test]
fn memberless_team_tasks_are_skipped_not_fatal() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let empty = Team::new(&event.id, "Ghost Crew");
    db.create_team(&empty).unwrap();

    let mut staffed = Team::new(&event.id, "Real Crew");
    staffed.members.push(member(&staffed, "u1", "Asha", &[]));
    db.create_team(&staffed).unwrap();

    let orphan = task_with(&event, &empty, "Haunt", &[], TaskPriority::Medium);
    db.create_task(&orphan).unwrap();
    db.create_task(&task_with(&event, &staffed, "Work", &[], TaskPriority::Medium))
        .unwrap();

    let report = completed(run_allocation(&db, &event.id).unwrap());
    assert_eq!(report.skipped_count(), 1);
    assert!(report.outcomes.contains(&TaskOutcome::SkippedNoEligibleMember {
        task_id: orphan.id.clone()
    }));
    assert_eq!(report.assignments().len(), 1);

    // The orphan stays unassigned in the store.
    let loaded = db.get_task(&orphan.id).unwrap().unwrap();
    assert!(loaded.assigned_to.is_none());
    assert!(!loaded.ai_assigned);
}

#[test]
fn rerun_does_not_touch_assigned_tasks() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let mut team = Team::new(&event.id, "Crew");
    team.members.push(member(&team, "u1", "Asha", &[]));
    db.create_team(&team).unwrap();

    let task = task_with(&event, &team, "One-off", &[], TaskPriority::Medium);
    db.create_task(&task).unwrap();

    let first = completed(run_allocation(&db, &event.id).unwrap());
    assert_eq!(first.assignments().len(), 1);
    let first_updated_at = db.get_task(&task.id).unwrap().unwrap().updated_at;

    // Second run sees no unassigned work and issues no write.
    let second = run_allocation(&db, &event.id).unwrap();
    assert!(matches!(second, AllocationRun::NothingToAssign));
    let after = db.get_task(&task.id).unwrap().unwrap();
    assert_eq!(after.updated_at, first_updated_at);
    assert_eq!(after.assigned_to.as_deref(), Some("u1"));
}

#[test]
fn empty_batch_short_circuits() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let run = run_allocation(&db, &event.id).unwrap();
    assert!(matches!(run, AllocationRun::NothingToAssign));
}

#[test]
fn blank_event_id_is_rejected_before_store_access() {
    let db = PortalDb::open_memory().unwrap();
    let err = run_allocation(&db, "   ").unwrap_err();
    assert!(matches!(err, campushub_core::CoreError::Validation(_)));
}

#[test]
fn unknown_team_reference_fails_the_run() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    // Task referencing a team that was never created.
    let mut task = Task::new(&event.id, "no-such-team", "Stray");
    task.required_skills = vec![];
    db.create_task(&task).unwrap();

    let err = run_allocation(&db, &event.id).unwrap_err();
    assert!(matches!(
        err,
        campushub_core::CoreError::NotFound { kind: "team", .. }
    ));

    // Nothing was written.
    let loaded = db.get_task(&task.id).unwrap().unwrap();
    assert!(loaded.assigned_to.is_none());
}

#[test]
fn profile_skills_back_fill_blank_memberships() {
    let db = PortalDb::open_memory().unwrap();
    let event = seeded_event(&db);

    let mut team = Team::new(&event.id, "AV");
    // No membership skills for either member.
    team.members.push(member(&team, "plain", "Plain", &[]));
    team.members.push(member(&team, "skilled", "Skilled", &[]));
    db.create_team(&team).unwrap();

    let mut profile = UserProfile::new("skilled", "Skilled");
    profile.skills = vec!["sound".to_string()];
    db.upsert_profile(&profile).unwrap();

    db.create_task(&task_with(&event, &team, "Mix audio", &["sound"], TaskPriority::Medium))
        .unwrap();

    let report = completed(run_allocation(&db, &event.id).unwrap());
    assert_eq!(report.assignments()[0].member_id, "skilled");
}
