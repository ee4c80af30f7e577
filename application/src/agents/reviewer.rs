//! Reviewer agent - judges proposals, optionally validating their tests.

use super::Agent;
use crate::error::{InputError, OrchestrationError};
use crate::ports::prompt_runner::{PromptRequest, PromptRunner};
use crate::ports::sandbox::{ExecutionRequest, Sandbox, ValidationStep};
use async_trait::async_trait;
use concord_domain::parsing::parse_review;
use concord_domain::review::entities::{TestCaseResult, TestReport};
use concord_domain::util::preview;
use concord_domain::{
    AgentId, AgentResult, AgentRole, Artifact, ArtifactKind, Capability, PromptTemplate, Proposal,
    ReviewResult, Specialization, Task,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// The agent that judges proposals.
///
/// Also serves the expert role: an expert is a reviewer whose specialization
/// is mandatory. Reviewers refuse mutation task kinds; they only execute
/// review, analyze, and test tasks, returning their findings as an analysis
/// artifact.
pub struct ReviewerAgent {
    id: AgentId,
    role: AgentRole,
    capabilities: Vec<Capability>,
    specialization: Specialization,
    runner: Arc<dyn PromptRunner>,
    sandbox: Option<Arc<dyn Sandbox>>,
}

impl std::fmt::Debug for ReviewerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerAgent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("capabilities", &self.capabilities)
            .field("specialization", &self.specialization)
            .finish()
    }
}

impl ReviewerAgent {
    pub fn new(
        id: impl Into<AgentId>,
        role: AgentRole,
        capabilities: Vec<Capability>,
        specialization: Specialization,
        runner: Arc<dyn PromptRunner>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            capabilities,
            specialization,
            runner,
            sandbox: None,
        }
    }

    /// Attach a sandbox so reviews can run the proposal's test cases.
    pub fn with_sandbox(mut self, sandbox: Arc<dyn Sandbox>) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Run the proposal's test cases in the sandbox.
    ///
    /// Sandbox failures are recorded per test case as `Error` outcomes and
    /// never fail the review itself.
    async fn run_proposal_tests(&self, proposal: &Proposal) -> Option<TestReport> {
        let sandbox = self.sandbox.as_ref()?;
        let runnable: Vec<_> = proposal
            .test_cases
            .iter()
            .filter_map(|tc| tc.command.as_ref().map(|cmd| (tc.name.clone(), cmd.clone())))
            .collect();
        if runnable.is_empty() {
            return None;
        }

        let started = Instant::now();
        let mut request = ExecutionRequest::new(proposal.id.as_str(), "test")
            .with_file_changes(proposal.changes.clone());
        for (name, command) in &runnable {
            request = request.with_step(
                ValidationStep::new(name.clone(), command.clone())
                    .with_description("proposal test case"),
            );
        }

        let results = match sandbox.execute_code(&request).await {
            Ok(response) => runnable
                .iter()
                .enumerate()
                .map(|(i, (name, command))| match response.results.get(i) {
                    Some(result) if result.exit_code == 0 && result.error.is_none() => {
                        TestCaseResult::passed(name, command).with_output(result.output.clone())
                    }
                    Some(result) => match &result.error {
                        Some(error) => TestCaseResult::errored(name, command, error.clone()),
                        None => TestCaseResult::failed(name, command, result.exit_code)
                            .with_output(result.output.clone()),
                    },
                    None => TestCaseResult::errored(name, command, "no result from sandbox"),
                })
                .collect(),
            Err(e) => {
                warn!("Sandbox failed for proposal {}: {}", proposal.id, e);
                runnable
                    .iter()
                    .map(|(name, command)| TestCaseResult::errored(name, command, e.to_string()))
                    .collect()
            }
        };

        Some(TestReport::from_results(
            results,
            started.elapsed().as_millis() as u64,
        ))
    }
}

#[async_trait]
impl Agent for ReviewerAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn role(&self) -> AgentRole {
        self.role
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn specialization(&self) -> Option<Specialization> {
        Some(self.specialization)
    }

    async fn execute(&self, task: &Task) -> Result<AgentResult, OrchestrationError> {
        task.validate().map_err(InputError::from)?;

        if task.kind.is_mutation() {
            return Err(InputError::TaskKindNotSupported {
                kind: task.kind,
                agent: self.id.clone(),
            }
            .into());
        }

        let started = Instant::now();
        let request = PromptRequest::new(
            PromptTemplate::analysis_system(),
            PromptTemplate::lead_task(task),
        )
        .with_files(task.context.files.clone())
        .with_metadata("agent", self.id.as_str());

        let output = self.runner.run(&request).await?;
        debug!(
            "Reviewer {} analyzed task {}: {}",
            self.id,
            task.id,
            preview(&output.response, 200)
        );

        Ok(AgentResult::success(task.id.clone(), self.id.clone())
            .with_artifact(
                Artifact::new("analysis", ArtifactKind::Analysis, output.response.clone())
                    .with_metadata("model", output.model_name),
            )
            .with_reasoning(output.response)
            .with_confidence(0.7)
            .with_duration_ms(started.elapsed().as_millis() as u64))
    }

    async fn review(&self, proposal: &Proposal) -> Result<ReviewResult, OrchestrationError> {
        let request = PromptRequest::new(
            PromptTemplate::review_system(self.specialization),
            PromptTemplate::review_proposal(proposal),
        )
        .with_metadata("agent", self.id.as_str());

        let output = self.runner.run(&request).await?;
        let parsed = parse_review(&output.response);
        debug!(
            "Reviewer {} voted {} on proposal {}",
            self.id, parsed.decision, proposal.id
        );

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

        if self.has_capability(Capability::Testing)
            && let Some(report) = self.run_proposal_tests(proposal).await
        {
            review = review.with_test_report(report);
        }

        Ok(review)
    }
}
