//! Tests for the planning template

use crate::mcp::error::ToolError;
use crate::mcp::tools::{PlanProjectParams, plan_project};

fn params(goal: &str, scope: Option<&str>, skills: Option<&str>) -> PlanProjectParams {
    PlanProjectParams {
        goal: goal.to_string(),
        scope: scope.map(str::to_string),
        skills_available: skills.map(str::to_string),
    }
}

#[test]
fn same_input_gives_identical_output() {
    let input = params("Ship a chat bot", Some("two weeks"), Some("python,nlp"));
    let first = serde_json::to_string(&plan_project(&input).unwrap()).unwrap();
    let second = serde_json::to_string(&plan_project(&input).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn template_has_five_tasks_in_descending_priority() {
    let plan = plan_project(&params("Ship a chat bot", None, None)).unwrap();

    let priorities: Vec<_> = plan.suggested_tasks.iter().map(|t| t.priority).collect();
    assert_eq!(priorities, vec![10, 9, 8, 7, 6]);
    assert_eq!(plan.project.name, "Project: Ship a chat bot");
    assert_eq!(plan.project.description, "AI-generated project plan");
    assert_eq!(plan.suggested_tasks[2].required_skills, "development");
}

#[test]
fn scope_and_skills_flow_into_the_plan() {
    let plan = plan_project(&params("Ship", Some("MVP only"), Some("rust,sql"))).unwrap();
    assert_eq!(plan.project.description, "MVP only");
    assert_eq!(plan.suggested_tasks[2].title, "Implementation");
    assert_eq!(plan.suggested_tasks[2].required_skills, "rust,sql");
}

#[test]
fn blank_goal_is_a_validation_error() {
    let err = plan_project(&params("   ", None, None)).unwrap_err();
    assert!(matches!(err, ToolError::Validation { .. }));
}
