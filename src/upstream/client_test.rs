//! Tests for the API client against an in-process API server

use std::time::Duration;

use tempfile::TempDir;

use crate::api::{AppState, CreateTaskRequest, create_router};
use crate::db::{
    Database, Entity, EntityKind, EntityRepository, Id, NewEntity, NewProject, ProjectRepository,
    SqliteDatabase,
};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Serves the API over a temp database. Returns the seeded entity and project.
async fn spawn_api() -> (TempDir, UpstreamClient, Entity, Id) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = SqliteDatabase::open(dir.path().join("kanban.db"))
        .await
        .expect("open");
    db.migrate().await.expect("migrate");

    let entity = db
        .entities()
        .register(&NewEntity {
            name: "worker".to_string(),
            kind: EntityKind::Agent,
            skills: vec![],
        })
        .await
        .unwrap();
    let project = db
        .projects()
        .create(&NewProject {
            name: "Board".to_string(),
            description: String::new(),
            owner_id: entity.id,
            tasks: vec![],
        })
        .await
        .unwrap()
        .project
        .id;

    let app = create_router(AppState::<SqliteDatabase>::new(db));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = UpstreamClient::new(format!("http://{}/", addr), Duration::from_secs(5)).unwrap();
    (dir, client, entity, project)
}

fn request(project_id: Id) -> CreateTaskRequest {
    CreateTaskRequest {
        project_id,
        title: "Remote task".to_string(),
        description: String::new(),
        required_skills: vec!["ops".to_string()],
        priority: 3,
    }
}

#[test]
fn test_base_url_drops_trailing_slash() {
    let client = UpstreamClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_task_returns_stored_task() {
    let (_dir, client, entity, project) = spawn_api().await;

    let task = client
        .create_task(&entity.api_key, &request(project))
        .await
        .expect("create_task should succeed");

    assert_eq!(task.project_id, project);
    assert_eq!(task.title, "Remote task");
    assert_eq!(task.required_skills, vec!["ops"]);
    assert_eq!(task.priority, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_project_is_rejected_with_not_found() {
    let (_dir, client, entity, project) = spawn_api().await;

    let err = client
        .create_task(&entity.api_key, &request(project + 1))
        .await
        .unwrap_err();

    match err {
        UpstreamError::Rejected { status, kind, .. } => {
            assert_eq!(status, 404);
            assert_eq!(kind.as_deref(), Some("not_found"));
        }
        other => panic!("Expected Rejected, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_key_is_rejected_with_unauthorized() {
    let (_dir, client, _entity, project) = spawn_api().await;

    let err = client
        .create_task("kb_not-a-key", &request(project))
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::Rejected { status: 401, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_server_is_unavailable() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = UpstreamClient::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();

    let err = client
        .create_task("kb_any", &request(1))
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::Unavailable { .. }));
}
