//! End-to-end saga tests against mock dependencies.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use workflow_orchestrator::resilience::CircuitState;
use workflow_orchestrator::workflow::LogNotifier;

mod common;
use common::*;

#[tokio::test]
async fn happy_path_records_all_five_steps() {
    let [user, submission, feedback, gamification, analytics] =
        start_healthy_dependencies().await;
    let config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    let pipeline = build_pipeline(&config, Arc::new(LogNotifier));

    let result = pipeline.orchestrator.run(code_request("s1")).await;

    assert!(result.success);
    assert_eq!(result.submission_id, "s1");
    assert!(result.error.is_none());
    for step in [
        &result.steps.validation,
        &result.steps.submission,
        &result.steps.feedback,
        &result.steps.gamification,
        &result.steps.analytics,
    ] {
        let step = step.as_ref().expect("every stage should have run");
        assert!(step.success, "step failed: {:?}", step.error);
    }
    for dependency in [&user, &submission, &feedback, &gamification, &analytics] {
        assert_eq!(dependency.hits(), 1);
    }
}

#[tokio::test]
async fn missing_source_fails_validation_without_any_calls() {
    let [user, submission, feedback, gamification, analytics] =
        start_healthy_dependencies().await;
    let config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    let pipeline = build_pipeline(&config, Arc::new(LogNotifier));

    let result = pipeline.orchestrator.run(sourceless_request("s2")).await;

    assert!(!result.success);
    let validation = result.steps.validation.as_ref().unwrap();
    assert!(!validation.success);
    assert!(validation.error.as_ref().unwrap().contains("repositoryUrl"));
    assert!(result.steps.submission.is_none());
    assert!(result.steps.feedback.is_none());
    assert!(result.steps.gamification.is_none());
    assert!(result.steps.analytics.is_none());
    for dependency in [&user, &submission, &feedback, &gamification, &analytics] {
        assert_eq!(dependency.hits(), 0);
    }
}

#[tokio::test]
async fn unknown_user_halts_before_submission() {
    let user = start_dependency(|| async { (404, json!({"error": "no such user"})) }).await;
    let [_, submission, feedback, gamification, analytics] = start_healthy_dependencies().await;
    let config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    let pipeline = build_pipeline(&config, Arc::new(LogNotifier));

    let result = pipeline.orchestrator.run(code_request("s3")).await;

    assert!(!result.success);
    assert!(result.error.as_ref().unwrap().contains("unknown user"));
    assert!(result.steps.submission.is_none());
    assert_eq!(submission.hits(), 0);
    assert_eq!(feedback.hits(), 0);
}

#[tokio::test]
async fn feedback_failure_does_not_block_gamification() {
    let feedback = start_dependency(|| async { (500, json!({"error": "model crashed"})) }).await;
    let [user, submission, _, gamification, analytics] = start_healthy_dependencies().await;
    let config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    let pipeline = build_pipeline(&config, Arc::new(LogNotifier));

    let result = pipeline.orchestrator.run(code_request("s4")).await;

    // Enrichment failures never flip the overall outcome.
    assert!(result.success);
    assert!(!result.steps.feedback.as_ref().unwrap().success);
    assert!(result.steps.gamification.as_ref().unwrap().success);
    // Analytics still ran, with a neutral default for the failed branch.
    assert!(result.steps.analytics.as_ref().unwrap().success);
    assert_eq!(gamification.hits(), 1);
    assert_eq!(analytics.hits(), 1);
}

#[tokio::test]
async fn submission_failure_halts_the_saga() {
    let submission = start_dependency(|| async { (500, json!({"error": "db down"})) }).await;
    let [user, _, feedback, gamification, analytics] = start_healthy_dependencies().await;
    let config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    let pipeline = build_pipeline(&config, Arc::new(LogNotifier));

    let result = pipeline.orchestrator.run(code_request("s5")).await;

    assert!(!result.success);
    assert!(result.steps.validation.as_ref().unwrap().success);
    assert!(!result.steps.submission.as_ref().unwrap().success);
    assert!(result.steps.feedback.is_none());
    assert!(result.steps.gamification.is_none());
    assert!(result.steps.analytics.is_none());
    assert_eq!(feedback.hits(), 0);
    assert_eq!(gamification.hits(), 0);
    assert_eq!(analytics.hits(), 0);
}

#[tokio::test]
async fn transient_feedback_errors_are_retried_to_exhaustion() {
    let feedback = start_dependency(|| async { (503, json!({"error": "overloaded"})) }).await;
    let [user, submission, _, gamification, analytics] = start_healthy_dependencies().await;
    let mut config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    config.retries.max_attempts = 3;
    let pipeline = build_pipeline(&config, Arc::new(LogNotifier));

    let result = pipeline.orchestrator.run(code_request("s6")).await;

    assert!(result.success);
    assert!(!result.steps.feedback.as_ref().unwrap().success);
    assert_eq!(feedback.hits(), 3, "transient failures should be retried");
    assert!(result.steps.gamification.as_ref().unwrap().success);
}

#[tokio::test]
async fn open_feedback_breaker_fails_fast_and_isolates() {
    let feedback = start_dependency(|| async { (503, json!({"error": "down"})) }).await;
    let [user, submission, _, gamification, analytics] = start_healthy_dependencies().await;
    let mut config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    config.circuit_breaker.failure_threshold = 1;
    let pipeline = build_pipeline(&config, Arc::new(LogNotifier));

    // First saga trips the feedback breaker.
    let first = pipeline.orchestrator.run(code_request("s7")).await;
    assert!(first.success);
    assert!(!first.steps.feedback.as_ref().unwrap().success);
    assert_eq!(feedback.hits(), 1);
    assert_eq!(
        pipeline.breakers.get("feedback").state(),
        CircuitState::Open
    );

    // Second saga: feedback fails fast without a call, gamification is
    // unaffected by the neighbouring breaker.
    let second = pipeline.orchestrator.run(code_request("s8")).await;
    assert!(second.success);
    let feedback_step = second.steps.feedback.as_ref().unwrap();
    assert!(!feedback_step.success);
    assert!(feedback_step.error.as_ref().unwrap().contains("circuit open"));
    assert_eq!(feedback.hits(), 1, "no call may reach an open circuit");
    assert!(second.steps.gamification.as_ref().unwrap().success);
    assert_eq!(gamification.hits(), 2);
}

#[tokio::test]
async fn completion_event_is_pushed_after_success() {
    let [user, submission, feedback, gamification, analytics] =
        start_healthy_dependencies().await;
    let config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    let (notifier, mut events) = ChannelNotifier::new();
    let pipeline = build_pipeline(&config, notifier);

    let result = pipeline.orchestrator.run(code_request("s9")).await;
    assert!(result.success);

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("completion event should be pushed")
        .unwrap();
    assert_eq!(event.submission_id, "s9");
    assert!(event.success);
    assert!(event.result.steps.analytics.is_some());
}

#[tokio::test]
async fn halted_saga_publishes_no_completion_event() {
    let [user, submission, feedback, gamification, analytics] =
        start_healthy_dependencies().await;
    let config = pipeline_config(&user, &submission, &feedback, &gamification, &analytics);
    let (notifier, mut events) = ChannelNotifier::new();
    let pipeline = build_pipeline(&config, notifier);

    let result = pipeline.orchestrator.run(sourceless_request("s10")).await;
    assert!(!result.success);
    assert!(events.try_recv().is_err());
}
