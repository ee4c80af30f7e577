//! Prompt templates for the lead / review / analysis flow

use crate::agent::value_objects::Specialization;
use crate::proposal::entities::Proposal;
use crate::task::entities::Task;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a lead agent producing proposals
    pub fn lead_system() -> &'static str {
        r#"You are the lead engineer on a code-change task.
Your job is to produce one or more concrete change proposals for the task below.
Respond with a JSON object of the form:

{"proposals": [{"kind": "file_change", "description": "...",
  "changes": [{"kind": "update", "path": "...", "new_content": "..."}],
  "reasoning": "...", "confidence": 0.0,
  "impact": {"scope": "local", "risk": "low",
             "benefits": [], "drawbacks": []}}],
 "reasoning": "..."}

Valid proposal kinds: file_change, file_creation, file_deletion, refactoring, architecture.
Valid change kinds: create, update, delete, move, rename.
If the task asks only for analysis, answer in prose and omit the proposals array."#
    }

    /// User prompt for a lead agent
    pub fn lead_task(task: &Task) -> String {
        let mut prompt = format!(
            "Task ({}, priority {}):\n{}\n",
            task.kind, task.priority, task.description
        );

        if let Some(project) = &task.context.project {
            prompt.push_str(&format!(
                "\nProject: {} ({})\n",
                project.name, project.language
            ));
        }

        if !task.context.requirements.is_empty() {
            prompt.push_str("\nRequirements:\n");
            for requirement in &task.context.requirements {
                prompt.push_str(&format!("- {}\n", requirement));
            }
        }

        if !task.constraints.is_empty() {
            prompt.push_str("\nConstraints:\n");
            for constraint in &task.constraints {
                prompt.push_str(&format!(
                    "- [{}/{}] {}\n",
                    constraint.kind, constraint.severity, constraint.description
                ));
            }
        }

        for file in &task.context.files {
            let tag = if file.is_target {
                "target"
            } else if file.is_reference {
                "reference"
            } else {
                "context"
            };
            prompt.push_str(&format!(
                "\n--- {} ({}, {}) ---\n{}\n",
                file.path, file.language, tag, file.content
            ));
        }

        if !task.context.memory.is_empty() {
            prompt.push_str("\nPrior notes:\n");
            for entry in &task.context.memory {
                prompt.push_str(&format!("- {}\n", entry));
            }
        }

        prompt
    }

    /// System prompt for a reviewer judging a proposal
    pub fn review_system(specialization: Specialization) -> String {
        let focus = match specialization {
            Specialization::Security => {
                "Focus on security: injection, unsafe input handling, secrets, privilege boundaries."
            }
            Specialization::Performance => {
                "Focus on performance: complexity, allocations, blocking calls, hot paths."
            }
            Specialization::Architecture => {
                "Focus on architecture: coupling, layering, API stability, long-term maintainability."
            }
            Specialization::Testing => {
                "Focus on testability: coverage of the change, edge cases, regression risk."
            }
            Specialization::General => {
                "Evaluate correctness, clarity, and completeness of the change."
            }
        };

        format!(
            r#"You are a critical code reviewer judging a change proposal.
{}
Respond with a JSON object of the form:

{{"decision": "approve", "score": 0.0, "confidence": 0.0,
  "comments": [{{"severity": "warning", "kind": "correctness",
                "message": "...", "path": "...", "line": 1}}],
  "suggestions": ["..."], "reasoning": "..."}}

Valid decisions: approve, request_changes, reject, needs_more_info.
Scores and confidence are in [0, 1]. Be fair but thorough."#,
            focus
        )
    }

    /// User prompt for reviewing a proposal
    pub fn review_proposal(proposal: &Proposal) -> String {
        let mut prompt = format!(
            "Proposal {} by {} ({:?}):\n{}\n\nAuthor reasoning:\n{}\n\nAuthor confidence: {:.2}\n",
            proposal.id,
            proposal.author,
            proposal.kind,
            proposal.description,
            proposal.reasoning,
            proposal.confidence
        );

        for change in &proposal.changes {
            prompt.push_str(&format!(
                "\n--- {:?} {} ---\n{}\n",
                change.kind, change.path, change.new_content
            ));
        }

        if !proposal.impact.benefits.is_empty() || !proposal.impact.drawbacks.is_empty() {
            prompt.push_str(&format!(
                "\nImpact: scope {:?}, risk {:?}\nBenefits: {}\nDrawbacks: {}\n",
                proposal.impact.scope,
                proposal.impact.risk,
                proposal.impact.benefits.join("; "),
                proposal.impact.drawbacks.join("; ")
            ));
        }

        prompt
    }

    /// System prompt for an analysis task handed to a reviewer
    pub fn analysis_system() -> &'static str {
        r#"You are a senior engineer asked to analyze code without changing it.
Explain what the code does, point out notable risks, and answer the question asked.
Respond in prose; do not propose changes."#
    }
}
