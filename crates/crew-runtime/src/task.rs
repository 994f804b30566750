//! Tasks and their outputs

use crate::Inputs;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A unit of work for the crew
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// What has to be done
    pub description: String,
    /// What the finished answer should look like
    pub expected_output: String,
    /// Role of the agent the task is assigned to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent: None,
        }
    }

    /// Assign the task to the agent with this role
    pub fn with_agent(mut self, role: impl Into<String>) -> Self {
        self.agent = Some(role.into());
        self
    }

    pub(crate) fn interpolated(&self, inputs: &Inputs) -> Self {
        Self {
            description: inputs.interpolate(&self.description),
            expected_output: inputs.interpolate(&self.expected_output),
            agent: self.agent.as_deref().map(|role| inputs.interpolate(role)),
        }
    }
}

/// Result of one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Task description after interpolation
    pub description: String,
    /// Role of the agent that produced the output
    pub agent: String,
    /// Final answer text
    pub raw: String,
}

/// Prompt an agent receives for a task
pub fn task_prompt(description: &str, expected_output: Option<&str>, context: &[String]) -> String {
    let mut prompt = format!("Current Task: {description}");

    if let Some(expected) = expected_output {
        let _ = write!(
            prompt,
            "\n\nThis is the expected criteria for your final answer: {expected}\n\
             You MUST return the actual complete content as the final answer, not a summary."
        );
    }

    if !context.is_empty() {
        let _ = write!(
            prompt,
            "\n\nThis is the context you're working with:\n{}",
            context.join("\n\n")
        );
    }

    prompt.push_str("\n\nBegin! This is VERY important to you, use the tools available and give your best Final Answer.");
    prompt
}
