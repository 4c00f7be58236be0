//! Tests for domain models.

use crate::db::models::*;

#[test]
fn project_status_deserializes_from_database_format() {
    let pending: ProjectStatus = serde_json::from_str("\"pending\"").unwrap();
    assert_eq!(pending, ProjectStatus::Pending);

    let rejected: ProjectStatus = serde_json::from_str("\"rejected\"").unwrap();
    assert_eq!(rejected, ProjectStatus::Rejected);
}

#[test]
fn task_status_accepts_done_as_completed() {
    let done: TaskStatus = serde_json::from_str("\"done\"").unwrap();
    assert_eq!(done, TaskStatus::Completed);
    assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);

    // Always written back in canonical form
    assert_eq!(
        serde_json::to_string(&TaskStatus::Completed).unwrap(),
        "\"completed\""
    );
}

#[test]
fn task_status_display_matches_parse() {
    for status in [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Completed,
    ] {
        assert_eq!(status.to_string().parse::<TaskStatus>().unwrap(), status);
    }
}

#[test]
fn unknown_statuses_are_rejected() {
    assert!("archived".parse::<ProjectStatus>().is_err());
    assert!("review".parse::<TaskStatus>().is_err());
    assert!("robot".parse::<EntityKind>().is_err());
}

#[test]
fn entity_api_key_is_never_serialized() {
    let entity = Entity {
        id: 1,
        name: "Planner".to_string(),
        kind: EntityKind::Agent,
        skills: vec!["planning".to_string()],
        api_key: "kb_secret".to_string(),
        is_active: true,
        created_at: "2025-01-01 00:00:00".to_string(),
    };
    let json = serde_json::to_value(&entity).unwrap();
    assert!(json.get("api_key").is_none());
    assert_eq!(json["kind"], "agent");
}

#[test]
fn project_details_flattens_project_fields() {
    let details = ProjectDetails {
        project: Project {
            id: 3,
            name: "Board".to_string(),
            description: String::new(),
            status: ProjectStatus::Pending,
            owner_id: 1,
            reviewer_id: None,
            created_at: "2025-01-01 00:00:00".to_string(),
            updated_at: "2025-01-01 00:00:00".to_string(),
        },
        stages: vec![],
    };
    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["status"], "pending");
    assert!(json["stages"].as_array().unwrap().is_empty());
}
