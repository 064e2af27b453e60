//! Saga state machine for the submission pipeline.
//!
//! # Stage order
//! ```text
//! 1. validate      (sequential, mandatory)  user exists + source present
//! 2. submit        (sequential, mandatory)  registers the submission
//! 3. feedback ∥ gamification (parallel, optional, settle-all)
//! 4. analytics     (sequential, optional)   neutral defaults for failed
//!                                           stage-3 branches
//! 5. notify        (sequential, best-effort, never in the result)
//! ```
//!
//! # Design Decisions
//! - Overall success reflects stages 1-2 only; enrichment stages are
//!   deliberately non-fatal and surface through their own StepResult
//! - A mandatory-stage failure returns immediately; stages 3-5 never run
//! - Completed early stages are never compensated; an under-enriched
//!   submission is left for out-of-band reconciliation
//! - Every stage runs inside a span carrying submission, user, and stage

use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::client::ServiceClients;
use crate::observability::metrics;
use crate::workflow::error::WorkflowError;
use crate::workflow::join::join_settled;
use crate::workflow::notifier::{Notifier, WorkflowCompleted};
use crate::workflow::types::{StepResult, StepResults, WorkflowRequest, WorkflowResult};

const STAGE_VALIDATION: &str = "validation";
const STAGE_SUBMISSION: &str = "submission";
const STAGE_FEEDBACK: &str = "feedback";
const STAGE_GAMIFICATION: &str = "gamification";
const STAGE_ANALYTICS: &str = "analytics";
const STAGE_NOTIFY: &str = "notify";

type StageOutcome = Result<Option<Value>, WorkflowError>;

/// Drives one saga per inbound submission across the five dependencies.
pub struct WorkflowOrchestrator {
    clients: ServiceClients,
    notifier: Arc<dyn Notifier>,
}

impl WorkflowOrchestrator {
    pub fn new(clients: ServiceClients, notifier: Arc<dyn Notifier>) -> Self {
        Self { clients, notifier }
    }

    /// Run the saga to completion. Never fails at the type level; every
    /// failure mode is folded into the returned [`WorkflowResult`].
    pub async fn run(&self, request: WorkflowRequest) -> WorkflowResult {
        let correlation_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "workflow",
            submission_id = %request.submission_id,
            user_id = %request.user_id,
            correlation_id = %correlation_id,
        );
        self.run_stages(request, correlation_id).instrument(span).await
    }

    async fn run_stages(&self, request: WorkflowRequest, correlation_id: String) -> WorkflowResult {
        let started = Instant::now();
        let mut steps = StepResults::default();

        // Stage 1: validate (mandatory).
        let validation = self
            .stage(STAGE_VALIDATION, &request, self.validate(&request, &correlation_id))
            .await;
        steps.validation = Some(capture(&validation));
        if let Err(err) = validation {
            metrics::record_workflow("failed", started);
            return WorkflowResult::halted(request.submission_id.clone(), steps, &err);
        }

        // Stage 2: submit (mandatory); its output feeds stage 3.
        let submission = match self
            .stage(
                STAGE_SUBMISSION,
                &request,
                self.register_submission(&request, &correlation_id),
            )
            .await
        {
            Ok(data) => {
                steps.submission = Some(StepResult::succeeded(data.clone()));
                data.unwrap_or(Value::Null)
            }
            Err(err) => {
                steps.submission = Some(StepResult::failed(&err));
                metrics::record_workflow("failed", started);
                return WorkflowResult::halted(request.submission_id.clone(), steps, &err);
            }
        };

        // Stage 3: feedback ∥ gamification (optional, settle-all).
        let (feedback, gamification) = join_settled(
            self.stage(
                STAGE_FEEDBACK,
                &request,
                self.request_feedback(&request, &submission, &correlation_id),
            ),
            self.stage(
                STAGE_GAMIFICATION,
                &request,
                self.award_points(&request, &submission, &correlation_id),
            ),
        )
        .await;
        steps.feedback = Some(capture(&feedback));
        steps.gamification = Some(capture(&gamification));

        let feedback_data = feedback.ok().flatten();
        let gamification_data = gamification.ok().flatten();

        // Stage 4: analytics (optional), with neutral defaults for any
        // stage-3 branch that is absent or failed.
        let analytics = self
            .stage(
                STAGE_ANALYTICS,
                &request,
                self.record_analytics(
                    &request,
                    &submission,
                    feedback_data.as_ref(),
                    gamification_data.as_ref(),
                    &correlation_id,
                ),
            )
            .await;
        steps.analytics = Some(capture(&analytics));

        metrics::record_workflow("succeeded", started);
        let result = WorkflowResult::completed(request.submission_id.clone(), steps);

        // Stage 5: notify (best-effort, absorbed).
        self.notify(&request, &result).await;

        result
    }

    /// Wrap one stage in its span and record its outcome.
    async fn stage<F>(
        &self,
        stage: &'static str,
        request: &WorkflowRequest,
        fut: F,
    ) -> StageOutcome
    where
        F: Future<Output = StageOutcome>,
    {
        let span = tracing::info_span!(
            "stage",
            stage,
            submission_id = %request.submission_id,
            user_id = %request.user_id,
        );
        async {
            match fut.await {
                Ok(data) => {
                    tracing::debug!(stage, "stage completed");
                    metrics::record_stage(stage, true);
                    Ok(data)
                }
                Err(err) => {
                    tracing::warn!(stage, error = %err, "stage failed");
                    metrics::record_stage(stage, false);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn validate(
        &self,
        request: &WorkflowRequest,
        correlation_id: &str,
    ) -> StageOutcome {
        if !request.has_submission_source() {
            return Err(WorkflowError::Validation(
                "either repositoryUrl or codeContent must be provided".to_string(),
            ));
        }

        let user = self
            .clients
            .user
            .get_json(&format!("users/{}", request.user_id), correlation_id)
            .await
            .map_err(|err| match err {
                WorkflowError::Permanent { status: Some(404), .. } => {
                    WorkflowError::Validation(format!("unknown user '{}'", request.user_id))
                }
                other => other,
            })?;
        Ok(Some(user))
    }

    async fn register_submission(
        &self,
        request: &WorkflowRequest,
        correlation_id: &str,
    ) -> StageOutcome {
        let body = json!({
            "submissionId": request.submission_id,
            "userId": request.user_id,
            "submissionType": request.submission_type,
            "repositoryUrl": request.repository_url,
            "codeContent": request.code_content,
            "metadata": request.metadata,
        });
        let registered = self
            .clients
            .submission
            .post_json("submissions", body, correlation_id)
            .await?;
        Ok(Some(registered))
    }

    async fn request_feedback(
        &self,
        request: &WorkflowRequest,
        submission: &Value,
        correlation_id: &str,
    ) -> StageOutcome {
        let body = json!({
            "submissionId": request.submission_id,
            "userId": request.user_id,
            "submission": submission,
            "repositoryUrl": request.repository_url,
            "codeContent": request.code_content,
        });
        let feedback = self
            .clients
            .feedback
            .post_json("feedback", body, correlation_id)
            .await?;
        Ok(Some(feedback))
    }

    async fn award_points(
        &self,
        request: &WorkflowRequest,
        submission: &Value,
        correlation_id: &str,
    ) -> StageOutcome {
        let body = json!({
            "submissionId": request.submission_id,
            "userId": request.user_id,
            "submissionType": request.submission_type,
            "submission": submission,
        });
        let score = self
            .clients
            .gamification
            .post_json("scores", body, correlation_id)
            .await?;
        Ok(Some(score))
    }

    async fn record_analytics(
        &self,
        request: &WorkflowRequest,
        submission: &Value,
        feedback: Option<&Value>,
        gamification: Option<&Value>,
        correlation_id: &str,
    ) -> StageOutcome {
        // Neutral defaults stand in for enrichment branches that failed.
        let feedback_score = feedback
            .and_then(|v| v.get("score").cloned())
            .unwrap_or(json!(0));
        let points_awarded = gamification
            .and_then(|v| v.get("points").cloned())
            .unwrap_or(json!(0));

        let body = json!({
            "submissionId": request.submission_id,
            "userId": request.user_id,
            "submissionType": request.submission_type,
            "submission": submission,
            "feedbackScore": feedback_score,
            "pointsAwarded": points_awarded,
        });
        let event = self
            .clients
            .analytics
            .post_json("events", body, correlation_id)
            .await?;
        Ok(Some(event))
    }

    async fn notify(&self, request: &WorkflowRequest, result: &WorkflowResult) {
        let event = WorkflowCompleted {
            submission_id: request.submission_id.clone(),
            user_id: request.user_id.clone(),
            success: result.success,
            result: result.clone(),
        };
        let span = tracing::info_span!(
            "stage",
            stage = STAGE_NOTIFY,
            submission_id = %request.submission_id,
            user_id = %request.user_id,
        );
        match self.notifier.publish(&event).instrument(span).await {
            Ok(()) => metrics::record_stage(STAGE_NOTIFY, true),
            Err(err) => {
                // Best-effort: never reflected in the WorkflowResult.
                tracing::warn!(
                    submission_id = %request.submission_id,
                    error = %err,
                    "completion notification failed, continuing"
                );
                metrics::record_stage(STAGE_NOTIFY, false);
            }
        }
    }
}

fn capture(outcome: &StageOutcome) -> StepResult {
    match outcome {
        Ok(data) => StepResult::succeeded(data.clone()),
        Err(err) => StepResult::failed(err),
    }
}
