//! Tests for SqliteTaskRepository and SqliteCommentRepository.

use crate::db::{
    CommentRepository, Database, DbError, EntityKind, EntityRepository, Id, NewComment,
    NewEntity, NewProject, NewTask, ProjectRepository, SqliteDatabase, StageRepository,
    TaskLogKind, TaskQuery, TaskRepository, TaskStatus, TaskUpdate,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

/// Returns (agent id, project id).
async fn seed(db: &SqliteDatabase) -> (Id, Id) {
    let agent = db
        .entities()
        .register(&NewEntity {
            name: "worker".to_string(),
            kind: EntityKind::Agent,
            skills: vec!["rust".to_string()],
        })
        .await
        .expect("register");
    let project = db
        .projects()
        .create(&NewProject {
            name: "Kanban".to_string(),
            description: String::new(),
            owner_id: agent.id,
            tasks: vec![],
        })
        .await
        .expect("create project");
    (agent.id, project.project.id)
}

fn new_task(project_id: Id, title: &str, priority: i64) -> NewTask {
    NewTask {
        project_id,
        title: title.to_string(),
        description: "  details ".to_string(),
        required_skills: vec!["ai".to_string(), "design".to_string()],
        priority,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn create_lands_in_first_stage_as_pending() {
    let db = setup_db().await;
    let (_, project_id) = seed(&db).await;

    let task = db
        .tasks()
        .create(&new_task(project_id, "Write docs", 4))
        .await
        .expect("create");

    let stages = db.stages().list(project_id).await.expect("stages");
    assert_eq!(task.stage_id, stages[0].id);
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.description, "details");
    assert_eq!(task.required_skills, vec!["ai", "design"]);
    assert_eq!(task.assignee_id, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_validates_before_touching_the_store() {
    let db = setup_db().await;
    let (_, project_id) = seed(&db).await;

    let high = db.tasks().create(&new_task(project_id, "x", 11)).await;
    assert!(matches!(high, Err(DbError::Validation { .. })));

    let blank = db.tasks().create(&new_task(project_id, "   ", 1)).await;
    assert!(matches!(blank, Err(DbError::Validation { .. })));

    let orphan = db.tasks().create(&new_task(404, "x", 1)).await;
    assert!(matches!(orphan, Err(DbError::NotFound { .. })));

    let all = db.tasks().list(&TaskQuery::default()).await.expect("list");
    assert!(all.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn list_combines_filters() {
    let db = setup_db().await;
    let (_, project_id) = seed(&db).await;
    let (_, other_project) = seed(&db).await;

    let a = db
        .tasks()
        .create(&new_task(project_id, "a", 1))
        .await
        .expect("a");
    db.tasks()
        .create(&new_task(project_id, "b", 2))
        .await
        .expect("b");
    db.tasks()
        .create(&new_task(other_project, "c", 3))
        .await
        .expect("c");
    db.tasks()
        .update(
            a.id,
            &TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .expect("complete");

    let in_project = db
        .tasks()
        .list(&TaskQuery {
            project_id: Some(project_id),
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(
        in_project.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );

    let done = db
        .tasks()
        .list(&TaskQuery {
            project_id: Some(project_id),
            status: Some(TaskStatus::Completed),
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, a.id);

    let none = db
        .tasks()
        .list(&TaskQuery {
            project_id: Some(other_project),
            status: Some(TaskStatus::Completed),
            ..Default::default()
        })
        .await
        .expect("list");
    assert!(none.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_moves_assigns_and_completes() {
    let db = setup_db().await;
    let (agent, project_id) = seed(&db).await;
    let stages = db.stages().list(project_id).await.expect("stages");
    let task = db
        .tasks()
        .create(&new_task(project_id, "a", 1))
        .await
        .expect("create");

    let moved = db
        .tasks()
        .update(
            task.id,
            &TaskUpdate {
                stage_id: Some(stages[2].id),
                assignee_id: Some(Some(agent)),
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(moved.stage_id, stages[2].id);
    assert_eq!(moved.assignee_id, Some(agent));
    assert!(moved.completed_at.is_none());

    let done = db
        .tasks()
        .update(
            task.id,
            &TaskUpdate {
                status: Some(TaskStatus::Completed),
                assignee_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("complete");
    assert!(done.completed_at.is_some());
    assert_eq!(done.assignee_id, None);
    assert_eq!(done.title, "a");
}

#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_stage_from_another_project() {
    let db = setup_db().await;
    let (agent, project_id) = seed(&db).await;
    let (_, other_project) = seed(&db).await;
    let foreign = db.stages().list(other_project).await.expect("stages");
    let task = db
        .tasks()
        .create(&new_task(project_id, "a", 1))
        .await
        .expect("create");

    let result = db
        .tasks()
        .update(
            task.id,
            &TaskUpdate {
                stage_id: Some(foreign[0].id),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DbError::Validation { .. })));

    let missing_assignee = db
        .tasks()
        .update(
            task.id,
            &TaskUpdate {
                assignee_id: Some(Some(agent + 100)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(missing_assignee, Err(DbError::NotFound { .. })));

    let unchanged = db.tasks().get(task.id).await.expect("get");
    assert_eq!(unchanged.stage_id, task.stage_id);
    assert_eq!(unchanged.assignee_id, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_task() {
    let db = setup_db().await;
    let (_, project_id) = seed(&db).await;
    let task = db
        .tasks()
        .create(&new_task(project_id, "a", 1))
        .await
        .expect("create");

    db.tasks().delete(task.id).await.expect("delete");
    assert!(matches!(
        db.tasks().delete(task.id).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn comments_append_in_order() {
    let db = setup_db().await;
    let (agent, project_id) = seed(&db).await;
    let task = db
        .tasks()
        .create(&new_task(project_id, "a", 1))
        .await
        .expect("create");

    for content in ["first", "second"] {
        db.comments()
            .create(&NewComment {
                task_id: task.id,
                author_id: agent,
                content: content.to_string(),
            })
            .await
            .expect("comment");
    }

    let comments = db.comments().list(task.id).await.expect("list");
    assert_eq!(
        comments.iter().map(|c| c.content.as_str()).collect::<Vec<_>>(),
        vec!["first", "second"]
    );

    let edit = sqlx::query("UPDATE comments SET content = 'changed' WHERE id = ?")
        .bind(comments[0].id)
        .execute(db.pool())
        .await;
    assert!(edit.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn comments_need_existing_task_and_author() {
    let db = setup_db().await;
    let (agent, project_id) = seed(&db).await;
    let task = db
        .tasks()
        .create(&new_task(project_id, "a", 1))
        .await
        .expect("create");

    let no_task = db
        .comments()
        .create(&NewComment {
            task_id: 999,
            author_id: agent,
            content: "hi".to_string(),
        })
        .await;
    assert!(matches!(no_task, Err(DbError::NotFound { .. })));

    let no_author = db
        .comments()
        .create(&NewComment {
            task_id: task.id,
            author_id: 999,
            content: "hi".to_string(),
        })
        .await;
    assert!(matches!(no_author, Err(DbError::NotFound { .. })));

    assert!(matches!(
        db.comments().list(999).await,
        Err(DbError::NotFound { .. })
    ));
    assert!(db.comments().list(task.id).await.expect("list").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn available_spans_projects_by_priority() {
    let db = setup_db().await;
    let (_, first) = seed(&db).await;
    let (_, second) = seed(&db).await;

    let low = db
        .tasks()
        .create(&new_task(first, "low", 1))
        .await
        .expect("create");
    let high = db
        .tasks()
        .create(&new_task(second, "high", 9))
        .await
        .expect("create");
    let started = db
        .tasks()
        .create(&new_task(first, "started", 5))
        .await
        .expect("create");
    let blocked = db
        .tasks()
        .create(&new_task(second, "blocked", 10))
        .await
        .expect("create");
    let finished = db
        .tasks()
        .create(&new_task(first, "finished", 10))
        .await
        .expect("create");

    for (id, status) in [
        (started.id, TaskStatus::InProgress),
        (blocked.id, TaskStatus::Blocked),
        (finished.id, TaskStatus::Completed),
    ] {
        db.tasks()
            .update(
                id,
                &TaskUpdate {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
    }

    let ids: Vec<_> = db
        .tasks()
        .available()
        .await
        .expect("available")
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![high.id, started.id, low.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn logs_record_creation_and_changes_newest_first() {
    let db = setup_db().await;
    let (agent, project_id) = seed(&db).await;
    let stages = db.stages().list(project_id).await.expect("stages");
    let task = db
        .tasks()
        .create(&new_task(project_id, "a", 1))
        .await
        .expect("create");

    db.tasks()
        .update(
            task.id,
            &TaskUpdate {
                status: Some(TaskStatus::InProgress),
                stage_id: Some(stages[2].id),
                assignee_id: Some(Some(agent)),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    // Title-only edits leave no trace.
    db.tasks()
        .update(
            task.id,
            &TaskUpdate {
                title: Some("b".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("rename");

    let logs = db.tasks().logs(task.id).await.expect("logs");
    let kinds: Vec<_> = logs.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TaskLogKind::Assignment,
            TaskLogKind::Stage,
            TaskLogKind::Status,
            TaskLogKind::Created,
        ]
    );
    assert!(logs.iter().all(|l| l.task_id == task.id));
    assert_eq!(logs[2].message, "status pending -> in_progress");

    assert!(matches!(
        db.tasks().logs(task.id + 100).await,
        Err(DbError::NotFound { .. })
    ));

    db.tasks().delete(task.id).await.expect("delete");
    assert!(matches!(
        db.tasks().logs(task.id).await,
        Err(DbError::NotFound { .. })
    ));
}
