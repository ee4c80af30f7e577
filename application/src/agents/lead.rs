//! Lead agent - authors change proposals.

use super::Agent;
use crate::error::{InputError, OrchestrationError};
use crate::ports::prompt_runner::{PromptRequest, PromptRunner};
use async_trait::async_trait;
use concord_domain::parsing::{parse_proposals, parse_review};
use concord_domain::util::preview;
use concord_domain::{
    AgentId, AgentResult, AgentRole, Capability, PromptTemplate, Proposal, ReviewResult,
    Specialization, Task,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The agent that produces candidate proposals for a task.
///
/// A lead accepts every task kind. Its output is whatever structured
/// proposals it can parse from the model response; a response without
/// proposals is a legitimate prose answer, not a failure.
pub struct LeadAgent {
    id: AgentId,
    capabilities: Vec<Capability>,
    runner: Arc<dyn PromptRunner>,
}

impl std::fmt::Debug for LeadAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadAgent")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

impl LeadAgent {
    pub fn new(
        id: impl Into<AgentId>,
        capabilities: Vec<Capability>,
        runner: Arc<dyn PromptRunner>,
    ) -> Self {
        Self {
            id: id.into(),
            capabilities,
            runner,
        }
    }
}

#[async_trait]
impl Agent for LeadAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn role(&self) -> AgentRole {
        AgentRole::Lead
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(&self, task: &Task) -> Result<AgentResult, OrchestrationError> {
        task.validate().map_err(InputError::from)?;

        let started = Instant::now();
        let request = PromptRequest::new(
            PromptTemplate::lead_system(),
            PromptTemplate::lead_task(task),
        )
        .with_files(task.context.files.clone())
        .with_memory(task.context.memory.clone())
        .with_metadata("agent", self.id.as_str())
        .with_metadata("task", task.id.as_str());

        let output = self.runner.run(&request).await?;
        let proposals = parse_proposals(&output.response, &self.id);

        info!(
            "Lead {} produced {} proposal(s) for task {} via {}",
            self.id,
            proposals.len(),
            task.id,
            output.model_name
        );
        debug!("Lead response: {}", preview(&output.response, 200));

        // Confidence mirrors what the model claimed for its proposals;
        // a prose-only answer gets a neutral value.
        let confidence = if proposals.is_empty() {
            0.5
        } else {
            proposals.iter().map(|p| p.confidence).sum::<f64>() / proposals.len() as f64
        };

        Ok(AgentResult::success(task.id.clone(), self.id.clone())
            .with_proposals(proposals)
            .with_reasoning(output.response)
            .with_confidence(confidence)
            .with_duration_ms(started.elapsed().as_millis() as u64))
    }

    async fn review(&self, proposal: &Proposal) -> Result<ReviewResult, OrchestrationError> {
        let request = PromptRequest::new(
            PromptTemplate::review_system(Specialization::General),
            PromptTemplate::review_proposal(proposal),
        )
        .with_metadata("agent", self.id.as_str());

        let output = self.runner.run(&request).await?;
        let parsed = parse_review(&output.response);

        let mut review = ReviewResult::new(proposal.id.clone(), self.id.clone(), parsed.decision)
            .with_score(parsed.score)
            .with_confidence(parsed.confidence)
            .with_reasoning(parsed.reasoning);
        for comment in parsed.comments {
            review = review.with_comment(comment);
        }
        for suggestion in parsed.suggestions {
            review = review.with_suggestion(suggestion);
        }
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::prompt_runner::{PromptOutput, RunnerError};
    use concord_domain::{ResultStatus, ReviewDecision, TaskKind};

    struct CannedRunner {
        response: String,
    }

    #[async_trait]
    impl PromptRunner for CannedRunner {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn run(&self, _request: &PromptRequest) -> Result<PromptOutput, RunnerError> {
            Ok(PromptOutput::new("canned", self.response.clone()))
        }
    }

    fn lead_with(response: &str) -> LeadAgent {
        LeadAgent::new(
            "lead-1",
            vec![Capability::CodeGeneration],
            Arc::new(CannedRunner {
                response: response.to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn test_execute_parses_proposals() {
        let lead = lead_with(
            r#"{"proposals": [{"kind": "file_change", "description": "fix",
                "changes": [{"kind": "update", "path": "a.rs", "new_content": "x"}],
                "confidence": 0.8}]}"#,
        );
        let task = Task::new(TaskKind::Edit, "fix the bug");

        let result = lead.execute(&task).await.unwrap();
        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.proposals.len(), 1);
        assert_eq!(result.proposals[0].author.as_str(), "lead-1");
        assert_eq!(result.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_execute_prose_answer_has_no_proposals() {
        let lead = lead_with("The code is already correct.");
        let task = Task::new(TaskKind::Analyze, "is this correct?");

        let result = lead.execute(&task).await.unwrap();
        assert!(result.is_success());
        assert!(result.proposals.is_empty());
        assert_eq!(result.reasoning, "The code is already correct.");
    }

    #[tokio::test]
    async fn test_execute_rejects_malformed_task() {
        let lead = lead_with("anything");
        let task = Task::new(TaskKind::Edit, "  ");

        let err = lead.execute(&task).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::Input(InputError::MalformedTask(_))
        ));
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        struct FailingRunner;

        #[async_trait]
        impl PromptRunner for FailingRunner {
            fn model_name(&self) -> &str {
                "failing"
            }

            async fn run(&self, _request: &PromptRequest) -> Result<PromptOutput, RunnerError> {
                Err(RunnerError::RequestFailed("connection reset".into()))
            }
        }

        let lead = LeadAgent::new("lead-1", vec![], Arc::new(FailingRunner));
        let task = Task::new(TaskKind::Edit, "fix");
        let err = lead.execute(&task).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Model(_)));
    }

    #[tokio::test]
    async fn test_review_parses_verdict() {
        let lead = lead_with(r#"{"decision": "approve", "score": 0.9, "confidence": 0.85}"#);
        let proposal = Proposal::new(
            "other-lead".into(),
            concord_domain::ProposalKind::FileChange,
            "fix",
        );

        let review = lead.review(&proposal).await.unwrap();
        assert_eq!(review.decision, ReviewDecision::Approve);
        assert_eq!(review.reviewer.as_str(), "lead-1");
        assert_eq!(review.score, 0.9);
    }
}
