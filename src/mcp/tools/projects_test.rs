//! Tests for project MCP tools

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, JsonObject, RawContent};
use serde::Serialize;
use serde_json::{Value, json};

use crate::db::{Database, EntityKind, EntityRepository, Id, NewEntity, SqliteDatabase};
use crate::mcp::McpServer;
use crate::mcp::tools::{
    ApproveProjectParams, CreateProjectParams, GetProjectDetailsParams, GetProjectsParams,
    TaskSpec,
};

/// Returns the server and the id of a registered agent.
async fn setup() -> (McpServer<SqliteDatabase>, Id) {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    let agent = db
        .entities()
        .register(&NewEntity {
            name: "planner".to_string(),
            kind: EntityKind::Agent,
            skills: vec![],
        })
        .await
        .unwrap();
    (McpServer::new(db, None), agent.id)
}

/// Tool arguments as an MCP client sends them.
fn args<T: Serialize>(params: T) -> JsonObject {
    match serde_json::to_value(params).unwrap() {
        Value::Object(map) => map,
        _ => panic!("Expected object arguments"),
    }
}

fn json_of(result: &CallToolResult) -> Value {
    let content_text = match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    };
    serde_json::from_str(content_text).unwrap()
}

fn kind_of(err: &McpError) -> String {
    err.data.as_ref().expect("error data")["kind"]
        .as_str()
        .unwrap()
        .to_string()
}

fn task(title: &str, skills: &str, priority: i64) -> TaskSpec {
    TaskSpec {
        title: title.to_string(),
        description: String::new(),
        required_skills: skills.to_string(),
        priority,
    }
}

async fn create(
    server: &McpServer<SqliteDatabase>,
    entity_id: Id,
    name: &str,
    tasks: Vec<TaskSpec>,
) -> Result<Value, McpError> {
    server
        .create_project(args(CreateProjectParams {
            entity_id,
            name: name.to_string(),
            description: None,
            tasks,
        }))
        .await
        .map(|r| json_of(&r))
}

async fn details(server: &McpServer<SqliteDatabase>, project_id: i64) -> Result<Value, McpError> {
    server
        .get_project_details(args(GetProjectDetailsParams { project_id }))
        .await
        .map(|r| json_of(&r))
}

#[tokio::test(flavor = "multi_thread")]
async fn build_ai_agent_scenario() {
    let (server, agent) = setup().await;

    let created = create(
        &server,
        agent,
        "Build AI Agent",
        vec![task("Design agent architecture", "ai,design", 10)],
    )
    .await
    .expect("create_project should succeed");
    let project_id = created["project_id"].as_i64().unwrap();
    let task_id = created["task_ids"][0].as_i64().unwrap();
    assert_eq!(created["task_ids"].as_array().unwrap().len(), 1);

    let details = details(&server, project_id).await.expect("details");
    assert_eq!(details["status"], "pending");

    let populated: Vec<&Value> = details["stages"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| !s["tasks"].as_array().unwrap().is_empty())
        .collect();
    assert_eq!(populated.len(), 1);
    assert_eq!(populated[0]["name"], "Backlog");
    let t = &populated[0]["tasks"][0];
    assert_eq!(t["id"].as_i64().unwrap(), task_id);
    assert_eq!(t["title"], "Design agent architecture");
    assert_eq!(t["priority"], 10);
    assert_eq!(t["required_skills"], json!(["ai", "design"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn every_listed_task_lands_in_the_first_stage() {
    let (server, agent) = setup().await;
    let tasks = (0..4).map(|i| task(&format!("t{}", i), "", i)).collect();

    let created = create(&server, agent, "Many", tasks).await.unwrap();
    let details = details(&server, created["project_id"].as_i64().unwrap())
        .await
        .unwrap();

    let stages = details["stages"].as_array().unwrap();
    assert_eq!(stages[0]["tasks"].as_array().unwrap().len(), 4);
    assert!(
        stages[1..]
            .iter()
            .all(|s| s["tasks"].as_array().unwrap().is_empty())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_input_writes_nothing() {
    let (server, agent) = setup().await;

    let blank = create(&server, agent, "   ", vec![]).await.unwrap_err();
    assert_eq!(kind_of(&blank), "ValidationError");

    let high = create(&server, agent, "P", vec![task("ok", "", 5), task("bad", "", 11)])
        .await
        .unwrap_err();
    assert_eq!(kind_of(&high), "ValidationError");

    let nobody = create(&server, agent + 50, "P", vec![]).await.unwrap_err();
    assert_eq!(kind_of(&nobody), "NotFoundError");

    let listed = server
        .get_projects(args(GetProjectsParams { status: None }))
        .await
        .unwrap();
    assert!(json_of(&listed).as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn approving_twice_is_an_invalid_state() {
    let (server, agent) = setup().await;
    let created = create(&server, agent, "P", vec![]).await.unwrap();
    let project_id = created["project_id"].as_i64().unwrap();

    let approve = || {
        server.approve_project(args(ApproveProjectParams {
            entity_id: agent,
            project_id,
        }))
    };

    let first = approve().await.expect("first approval succeeds");
    assert_eq!(json_of(&first)["status"], "approved");
    assert_eq!(json_of(&first)["reviewer_id"].as_i64().unwrap(), agent);

    let second = approve().await.unwrap_err();
    assert_eq!(kind_of(&second), "InvalidStateError");

    let details = details(&server, project_id).await.unwrap();
    assert_eq!(details["status"], "approved");
}

#[tokio::test(flavor = "multi_thread")]
async fn approve_needs_existing_project_and_entity() {
    let (server, agent) = setup().await;
    let created = create(&server, agent, "P", vec![]).await.unwrap();
    let project_id = created["project_id"].as_i64().unwrap();

    let missing = server
        .approve_project(args(ApproveProjectParams {
            entity_id: agent,
            project_id: 999,
        }))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&missing), "NotFoundError");

    let stranger = server
        .approve_project(args(ApproveProjectParams {
            entity_id: 999,
            project_id,
        }))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&stranger), "NotFoundError");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_projects_filters_and_orders() {
    let (server, agent) = setup().await;
    let a = create(&server, agent, "A", vec![]).await.unwrap();
    create(&server, agent, "B", vec![]).await.unwrap();
    server
        .approve_project(args(ApproveProjectParams {
            entity_id: agent,
            project_id: a["project_id"].as_i64().unwrap(),
        }))
        .await
        .unwrap();

    let all = json_of(
        &server
            .get_projects(args(GetProjectsParams { status: None }))
            .await
            .unwrap(),
    );
    let names: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(all[0].get("stages").is_none());

    let rejected = json_of(
        &server
            .get_projects(args(GetProjectsParams {
                status: Some("rejected".to_string()),
            }))
            .await
            .unwrap(),
    );
    assert_eq!(rejected, json!([]));

    let bogus = server
        .get_projects(args(GetProjectsParams {
            status: Some("archived".to_string()),
        }))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&bogus), "ValidationError");
}

#[tokio::test(flavor = "multi_thread")]
async fn details_of_missing_project_is_not_found() {
    let (server, _) = setup().await;
    let err = details(&server, 404).await.unwrap_err();
    assert_eq!(kind_of(&err), "NotFoundError");
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_arguments_are_validation_errors() {
    let (server, agent) = setup().await;

    let missing_name = server
        .create_project(args(json!({ "entity_id": agent })))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&missing_name), "ValidationError");
    assert!(missing_name.message.contains("name"));

    let word_priority = server
        .create_project(args(json!({
            "entity_id": agent,
            "name": "P",
            "tasks": [{ "title": "t", "priority": "high" }]
        })))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&word_priority), "ValidationError");

    let missing_project = server
        .approve_project(args(json!({ "entity_id": agent })))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&missing_project), "ValidationError");

    let plan = server.plan_project(args(json!({}))).await.unwrap_err();
    assert_eq!(kind_of(&plan), "ValidationError");

    let listed = server.get_projects(args(json!({}))).await.unwrap();
    assert_eq!(json_of(&listed), json!([]));
}
