// ABOUTME: End-to-end tests for the shared database state
// ABOUTME: Drives a full oversight flow against a file database and re-opens it

use pretty_assertions::assert_eq;
use serde_json::json;
use sentinel_db::DbState;
use sentinel_projects::{ProjectCreateInput, RunCreateInput};
use sentinel_reviews::{
    Decision, MessageInput, ReviewFilter, ReviewRequestCreateInput, ReviewResultCreateInput,
    ReviewStatusKind, ToolCallProposal,
};
use sentinel_storage::{StorageConfig, StorageError};
use sentinel_tools::{SupervisorCreateInput, SupervisorType, ToolCreateInput};
use tempfile::TempDir;

#[tokio::test]
async fn test_oversight_flow_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sentinel.db");

    let db = DbState::init_with_path(Some(path.clone())).await.unwrap();

    db.project_storage
        .create_project(ProjectCreateInput {
            id: "proj".to_string(),
            name: "Agent evals".to_string(),
            created_at: None,
        })
        .await
        .unwrap();
    db.project_storage
        .create_run(RunCreateInput {
            id: "run-1".to_string(),
            project_id: "proj".to_string(),
            created_at: None,
        })
        .await
        .unwrap();

    let tool_id = db
        .tool_storage
        .attach_tool_to_run(
            "run-1",
            &ToolCreateInput {
                name: "bash".to_string(),
                description: "Run a shell command".to_string(),
                attributes: json!({"cmd": "string"}),
            },
        )
        .await
        .unwrap();
    let supervisor_id = db
        .tool_storage
        .resolve_or_create_supervisor(&SupervisorCreateInput {
            code: "human review".to_string(),
            description: "Operator on call".to_string(),
            supervisor_type: SupervisorType::HumanSupervisor,
        })
        .await
        .unwrap();
    db.tool_storage
        .attach_supervisor_to_tool(&supervisor_id, &tool_id)
        .await
        .unwrap();

    let review_id = db
        .review_storage
        .create_review_request(&ReviewRequestCreateInput {
            run_id: "run-1".to_string(),
            task_state: json!({"a": 1, "b": [true, null]}),
            proposals: vec![ToolCallProposal {
                message: MessageInput {
                    role: "assistant".to_string(),
                    content: "Delete the build directory".to_string(),
                },
                tool_id: tool_id.clone(),
                arguments: json!({"cmd": "rm -rf build"}),
            }],
        })
        .await
        .unwrap();

    let tool_requests = db
        .review_storage
        .list_review_tool_requests(&review_id)
        .await
        .unwrap();
    db.review_storage
        .record_review_result(&ReviewResultCreateInput {
            review_request_id: review_id.clone(),
            tool_request_id: tool_requests[0].id.clone(),
            decision: Decision::Approve,
            reasoning: "build output only".to_string(),
        })
        .await
        .unwrap();
    db.review_storage
        .update_review(&review_id, None, ReviewStatusKind::Completed)
        .await
        .unwrap();

    db.pool.close().await;

    let db = DbState::init_with_config(&StorageConfig::file(&path))
        .await
        .unwrap();

    let review = db.review_storage.get_review(&review_id).await.unwrap().unwrap();
    assert_eq!(review.task_state, json!({"a": 1, "b": [true, null]}));
    assert_eq!(review.status.unwrap().status, ReviewStatusKind::Completed);

    let results = db.review_storage.list_review_results(&review_id).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].decision, Decision::Approve);
    assert_eq!(results[0].tool_request.tool_id, tool_id);

    let supervisors = db.tool_storage.list_tool_supervisors(&tool_id).await.unwrap();
    assert_eq!(supervisors.len(), 1);
    assert_eq!(supervisors[0].supervisor_type, SupervisorType::HumanSupervisor);

    assert_eq!(db.tool_storage.list_project_tools("proj").await.unwrap().len(), 1);
    assert_eq!(
        db.review_storage
            .count_reviews(&ReviewFilter {
                run_id: Some("run-1".to_string()),
                ..ReviewFilter::default()
            })
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_in_memory_state_starts_empty() {
    let db = DbState::init_with_config(&StorageConfig::in_memory())
        .await
        .unwrap();

    assert!(db.project_storage.list_projects().await.unwrap().is_empty());
    assert!(db.tool_storage.list_tools().await.unwrap().is_empty());
    assert!(db
        .review_storage
        .list_reviews(&ReviewFilter::default())
        .await
        .unwrap()
        .is_empty());

    let err = db.review_storage.current_status("missing").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}
