use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use client_manager_core::{FeedbackRequest, FeedbackType, ManagerError, PageRequest};
use client_manager_domain::FeedbackService;
use client_manager_testing_utils::{FeedbackBuilder, MockFeedbackRepository};

fn service_with(repo: &MockFeedbackRepository) -> FeedbackService {
    FeedbackService::new(Arc::new(repo.clone()))
}

fn request(conversation_id: &str) -> FeedbackRequest {
    FeedbackRequest {
        conversation_id: Some(conversation_id.to_string()),
        user_id: Some("user-1".to_string()),
        content: Some("fn main() {}".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_completion_requires_conversation_id() {
    let repo = MockFeedbackRepository::new();
    let service = service_with(&repo);

    let created = service.create_completion(request("conv-1")).await.unwrap();
    assert_eq!(created.feedback_type, FeedbackType::Completion);
    assert_eq!(created.content, "fn main() {}");

    match service.create_completion(FeedbackRequest::default()).await {
        Err(ManagerError::Validation { field, .. }) => assert_eq!(field, "conversation_id"),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(repo.count(), 1);
}

#[tokio::test]
async fn test_batch_skips_invalid_items() {
    let repo = MockFeedbackRepository::new();
    let service = service_with(&repo);

    let created = service
        .create_completions_batch(vec![request("conv-1"), FeedbackRequest::default(), request("conv-2")])
        .await
        .unwrap();

    assert_eq!(created, 2);
    assert_eq!(repo.count(), 2);
    assert_eq!(repo.batch_calls(), 1);
}

#[tokio::test]
async fn test_batch_with_no_valid_items_is_rejected() {
    let repo = MockFeedbackRepository::new();
    let service = service_with(&repo);

    assert!(service.create_completions_batch(vec![]).await.unwrap_err().is_validation());
    assert!(service
        .create_completions_batch(vec![FeedbackRequest::default()])
        .await
        .unwrap_err()
        .is_validation());
    assert_eq!(repo.batch_calls(), 0);
}

#[tokio::test]
async fn test_evaluate_stores_evaluation_as_content() {
    let repo = MockFeedbackRepository::new();
    let service = service_with(&repo);

    let mut like = request("conv-1");
    like.evaluation_type = Some("like".to_string());
    let created = service.create_evaluate(like).await.unwrap();
    assert_eq!(created.feedback_type, FeedbackType::Evaluate);
    assert_eq!(created.content, "like");

    let mut bad = request("conv-1");
    bad.evaluation_type = Some("meh".to_string());
    assert!(service.create_evaluate(bad).await.unwrap_err().is_validation());

    assert!(service.create_evaluate(request("conv-1")).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_use_code_requires_action_type() {
    let service = service_with(&MockFeedbackRepository::new());

    let mut accept = request("conv-1");
    accept.action_type = Some("insert".to_string());
    let created = service.create_use_code(accept).await.unwrap();
    assert_eq!(created.content, "insert");

    match service.create_use_code(request("conv-1")).await {
        Err(ManagerError::Validation { field, .. }) => assert_eq!(field, "action_type"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_issue_merges_issue_type_into_metadata() {
    let service = service_with(&MockFeedbackRepository::new());

    let issue = FeedbackRequest {
        description: Some("补全结果错误".to_string()),
        issue_type: Some("wrong_answer".to_string()),
        metadata: Some(r#"{"ide":"vscode"}"#.to_string()),
        ..Default::default()
    };
    let created = service.create_issue(issue).await.unwrap();

    assert_eq!(created.feedback_type, FeedbackType::Issue);
    assert_eq!(created.content, "补全结果错误");
    let metadata: serde_json::Value = serde_json::from_str(&created.metadata).unwrap();
    assert_eq!(metadata["ide"], "vscode");
    assert_eq!(metadata["issue_type"], "wrong_answer");

    assert!(service
        .create_issue(FeedbackRequest::default())
        .await
        .unwrap_err()
        .is_validation());
}

#[tokio::test]
async fn test_error_feedback_has_no_required_fields() {
    let service = service_with(&MockFeedbackRepository::new());

    let created = service.create_error(FeedbackRequest::default()).await.unwrap();
    assert_eq!(created.feedback_type, FeedbackType::Error);
    assert!(created.conversation_id.is_empty());
}

#[tokio::test]
async fn test_copy_code_and_conversation_listing() {
    let service = service_with(&MockFeedbackRepository::new());

    service.create_completion(request("conv-1")).await.unwrap();
    service.create_copy_code(request("conv-1")).await.unwrap();
    service.create_completion(request("conv-2")).await.unwrap();

    let conversation = service.get_by_conversation("conv-1").await.unwrap();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[1].feedback_type, FeedbackType::CopyCode);

    assert!(service.get_by_conversation("").await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_get_by_type_validates_type() {
    let repo = MockFeedbackRepository::with_feedbacks(
        (1..=3)
            .map(|i| FeedbackBuilder::new().with_id(i).build())
            .collect(),
    );
    let service = service_with(&repo);

    let page = service.get_by_type("completion", PageRequest::new(1, 2)).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 2);

    assert!(service
        .get_by_type("thumbs_up", PageRequest::default())
        .await
        .unwrap_err()
        .is_validation());
}

#[tokio::test]
async fn test_stats_end_date_covers_whole_day() {
    let day = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let repo = MockFeedbackRepository::with_feedbacks(vec![
        FeedbackBuilder::new().with_id(1).with_created_at(day).build(),
        FeedbackBuilder::new()
            .with_id(2)
            .with_type(FeedbackType::Issue)
            .with_created_at(day + Duration::hours(23))
            .build(),
        FeedbackBuilder::new()
            .with_id(3)
            .with_created_at(day + Duration::days(1))
            .build(),
    ]);
    let service = service_with(&repo);

    let stats = service.get_stats(Some("2024-03-01"), Some("2024-03-01")).await.unwrap();
    assert_eq!(stats.total_count, 2);
    assert_eq!(stats.type_counts.get("completion"), Some(&1));
    assert_eq!(stats.type_counts.get("issue"), Some(&1));

    assert!(service.get_stats(None, Some("2024-03-01")).await.unwrap_err().is_validation());
    assert!(service
        .get_stats(Some("2024-03-02"), Some("2024-03-01"))
        .await
        .unwrap_err()
        .is_validation());
}
