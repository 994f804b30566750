//! Coworker tools: delegate work to, or ask a question of, another agent

use crate::agent::{CrewAgent, WorkScope};
use async_trait::async_trait;
use crew_core::{Context, Error, Result};
use crew_llm::tools::schema;
use crew_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct DelegateParams {
    task: String,
    #[serde(default)]
    context: String,
    coworker: String,
}

#[derive(Debug, Deserialize)]
struct AskParams {
    question: String,
    #[serde(default)]
    context: String,
    coworker: String,
}

/// Coworkers reachable from one agent, shared by both tools
struct Coworkers {
    agents: Vec<Arc<CrewAgent>>,
    scope: WorkScope,
}

impl Coworkers {
    fn roles(&self) -> String {
        self.agents
            .iter()
            .map(|agent| agent.role())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn find(&self, name: &str) -> Result<&Arc<CrewAgent>> {
        self.agents
            .iter()
            .find(|agent| agent.answers_to(name))
            .ok_or_else(|| {
                Error::ProcessingFailed(format!(
                    "Coworker '{name}' not found, it must be one of: {}",
                    self.roles()
                ))
            })
    }

    async fn hand_over(&self, name: &str, work: &str, context: String) -> Result<Value> {
        let coworker = self.find(name)?;
        info!(coworker = %coworker.role(), "Handing work to coworker");

        let context = if context.trim().is_empty() {
            Context::new()
        } else {
            Context::new().with_task_context(vec![context])
        };
        let answer = coworker.execute_task(work, &context, &self.scope).await?;
        Ok(Value::String(answer))
    }
}

/// Delegate a task to a coworker and return their answer
pub struct DelegateWorkTool {
    coworkers: Coworkers,
    description: String,
}

impl DelegateWorkTool {
    /// `scope` is the scope the coworker works under, normally without
    /// coworkers of its own
    pub fn new(agents: Vec<Arc<CrewAgent>>, scope: WorkScope) -> Self {
        let coworkers = Coworkers { agents, scope };
        let description = format!(
            "Delegate a specific task to one of the following coworkers: {}. \
             The input must contain the task, all necessary context (they know \
             nothing about the task otherwise), and the exact role of the coworker.",
            coworkers.roles()
        );
        Self {
            coworkers,
            description,
        }
    }
}

#[async_trait]
impl Tool for DelegateWorkTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: DelegateParams = serde_json::from_value(params)
            .map_err(|e| Error::ProcessingFailed(format!("Invalid parameters: {e}")))?;

        self.coworkers
            .hand_over(&params.coworker, &params.task, params.context)
            .await
    }

    fn name(&self) -> &str {
        "delegate_work_to_coworker"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "task": schema::string("The task to delegate"),
                "context": schema::string("The context for the task"),
                "coworker": schema::string("The role of the coworker to delegate to"),
            }),
            &["task", "context", "coworker"],
        )
    }
}

/// Ask a coworker a question and return their answer
pub struct AskQuestionTool {
    coworkers: Coworkers,
    description: String,
}

impl AskQuestionTool {
    pub fn new(agents: Vec<Arc<CrewAgent>>, scope: WorkScope) -> Self {
        let coworkers = Coworkers { agents, scope };
        let description = format!(
            "Ask a specific question to one of the following coworkers: {}. \
             The input must contain the question, all necessary context (they \
             know nothing about the question otherwise), and the exact role of \
             the coworker.",
            coworkers.roles()
        );
        Self {
            coworkers,
            description,
        }
    }
}

#[async_trait]
impl Tool for AskQuestionTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: AskParams = serde_json::from_value(params)
            .map_err(|e| Error::ProcessingFailed(format!("Invalid parameters: {e}")))?;

        self.coworkers
            .hand_over(&params.coworker, &params.question, params.context)
            .await
    }

    fn name(&self) -> &str {
        "ask_question_to_coworker"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "question": schema::string("The question to ask"),
                "context": schema::string("The context for the question"),
                "coworker": schema::string("The role of the coworker to ask"),
            }),
            &["question", "context", "coworker"],
        )
    }
}
