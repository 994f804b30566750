//! Crews: agents and tasks run under a sequential or hierarchical process

use crate::agent::{CrewAgent, WorkScope};
use crate::task::{Task, TaskOutput};
use crate::usage::UsageMeter;
use crate::Inputs;
use crew_core::{Context, Error, Result};
use crew_llm::{LLMProvider, TokenUsage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// Role of the coordinating agent in a hierarchical crew
pub const MANAGER_ROLE: &str = "Crew Manager";
const MANAGER_GOAL: &str =
    "Manage the team to complete the task in the best way possible.";
const MANAGER_BACKSTORY: &str = "You are a seasoned manager with a knack for getting the best \
     out of your team. You are known for your ability to delegate work to the right people and \
     to ask the right questions to get the best out of your team. Even though you don't perform \
     tasks by yourself, you have a lot of experience in the field, which allows you to properly \
     evaluate the work of your team members.";

/// How the crew works through its tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    /// Each task runs on its assigned agent
    #[default]
    Sequential,
    /// A manager agent runs every task and delegates to the crew
    Hierarchical,
}

/// LLM settings for the manager of a hierarchical crew
#[derive(Clone)]
pub struct ManagerLlm {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: Option<f32>,
}

impl ManagerLlm {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl fmt::Debug for ManagerLlm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerLlm")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Result of a crew run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Output of the last task
    pub raw: String,
    /// Outputs of every task, in order
    pub tasks_output: Vec<TaskOutput>,
    /// Tokens used by all agents, including delegated work
    pub token_usage: TokenUsage,
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A team of agents and the tasks they work on
#[derive(Debug)]
pub struct Crew {
    agents: Vec<Arc<CrewAgent>>,
    tasks: Vec<Task>,
    process: Process,
    manager: Option<ManagerLlm>,
    verbose: bool,
}

impl Crew {
    pub fn builder() -> CrewBuilder {
        CrewBuilder::default()
    }

    pub fn agents(&self) -> &[Arc<CrewAgent>] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn process(&self) -> Process {
        self.process
    }

    /// Run every task and return the collected outputs
    ///
    /// `{key}` placeholders in agent personas and task texts are replaced
    /// from `inputs` first.
    #[instrument(skip_all, fields(process = ?self.process))]
    pub async fn kickoff(&self, inputs: &Inputs) -> Result<CrewOutput> {
        let agents: Vec<Arc<CrewAgent>> = self
            .agents
            .iter()
            .map(|agent| Arc::new(agent.interpolated(inputs)))
            .collect();
        let tasks: Vec<Task> = self.tasks.iter().map(|task| task.interpolated(inputs)).collect();
        let usage = Arc::new(UsageMeter::default());

        info!(
            agents = agents.len(),
            tasks = tasks.len(),
            inputs = inputs.len(),
            "Crew kickoff"
        );

        let tasks_output = match self.process {
            Process::Sequential => Self::run_sequential(&agents, &tasks, &usage).await?,
            Process::Hierarchical => self.run_hierarchical(&agents, &tasks, &usage).await?,
        };

        let token_usage = usage.total();
        info!(
            total_tokens = token_usage.total(),
            tasks_completed = tasks_output.len(),
            "Crew finished"
        );

        Ok(CrewOutput {
            raw: tasks_output.last().map(|output| output.raw.clone()).unwrap_or_default(),
            tasks_output,
            token_usage,
        })
    }

    async fn run_sequential(
        agents: &[Arc<CrewAgent>],
        tasks: &[Task],
        usage: &Arc<UsageMeter>,
    ) -> Result<Vec<TaskOutput>> {
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let agent = match &task.agent {
                Some(role) => find_agent(agents, role)?,
                None => agents
                    .first()
                    .ok_or_else(|| Error::InitializationFailed("Crew has no agents".to_string()))?,
            };
            info!(task = index + 1, agent = %agent.role(), "Running task");

            let scope = WorkScope::new(usage.clone()).with_coworkers(agents.to_vec());
            let raw = agent
                .execute_task(&task.description, &task_context(task, &outputs), &scope)
                .await?;

            outputs.push(TaskOutput {
                description: task.description.clone(),
                agent: agent.role().to_string(),
                raw,
            });
        }

        Ok(outputs)
    }

    async fn run_hierarchical(
        &self,
        agents: &[Arc<CrewAgent>],
        tasks: &[Task],
        usage: &Arc<UsageMeter>,
    ) -> Result<Vec<TaskOutput>> {
        let manager = self.build_manager()?;
        let scope = WorkScope::new(usage.clone()).with_coworkers(agents.to_vec());
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            info!(
                task = index + 1,
                suggested_coworker = task.agent.as_deref().unwrap_or("-"),
                "Manager running task"
            );

            let mut context = task_context(task, &outputs);
            if let Some(role) = &task.agent {
                context = context.with_assigned_role(role.clone());
            }
            let raw = manager.execute_task(&task.description, &context, &scope).await?;

            outputs.push(TaskOutput {
                description: task.description.clone(),
                agent: manager.role().to_string(),
                raw,
            });
        }

        Ok(outputs)
    }

    fn build_manager(&self) -> Result<CrewAgent> {
        let llm = self.manager.as_ref().ok_or_else(|| {
            Error::InitializationFailed("Hierarchical process requires a manager LLM".to_string())
        })?;

        let mut builder = CrewAgent::builder(MANAGER_ROLE)
            .goal(MANAGER_GOAL)
            .backstory(MANAGER_BACKSTORY)
            .allow_delegation(true)
            .verbose(self.verbose)
            .provider(llm.provider.clone())
            .model(llm.model.clone());
        if let Some(temperature) = llm.temperature {
            builder = builder.temperature(temperature);
        }
        builder.build()
    }
}

fn find_agent<'a>(agents: &'a [Arc<CrewAgent>], role: &str) -> Result<&'a Arc<CrewAgent>> {
    agents
        .iter()
        .find(|agent| agent.answers_to(role))
        .ok_or_else(|| Error::ProcessingFailed(format!("No agent with role '{role}'")))
}

/// Expected output plus every earlier task output
fn task_context(task: &Task, outputs: &[TaskOutput]) -> Context {
    Context::new()
        .with_expected_output(task.expected_output.clone())
        .with_task_context(outputs.iter().map(|output| output.raw.clone()).collect())
}

/// Builder for Crew
#[derive(Default)]
pub struct CrewBuilder {
    agents: Vec<Arc<CrewAgent>>,
    tasks: Vec<Task>,
    process: Process,
    manager: Option<ManagerLlm>,
    verbose: bool,
}

impl CrewBuilder {
    pub fn agent(mut self, agent: CrewAgent) -> Self {
        self.agents.push(Arc::new(agent));
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = CrewAgent>) -> Self {
        self.agents.extend(agents.into_iter().map(Arc::new));
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    pub fn process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// LLM for the manager agent, required for [`Process::Hierarchical`]
    pub fn manager_llm(mut self, manager: ManagerLlm) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Result<Crew> {
        if self.agents.is_empty() {
            return Err(Error::InitializationFailed("Crew needs at least one agent".to_string()));
        }
        if self.tasks.is_empty() {
            return Err(Error::InitializationFailed("Crew needs at least one task".to_string()));
        }
        for role in self.tasks.iter().filter_map(|task| task.agent.as_deref()) {
            if !self.agents.iter().any(|agent| agent.answers_to(role)) {
                return Err(Error::InitializationFailed(format!(
                    "Task assigned to unknown agent '{role}'"
                )));
            }
        }
        if self.process == Process::Hierarchical && self.manager.is_none() {
            return Err(Error::InitializationFailed(
                "Hierarchical process requires a manager LLM".to_string(),
            ));
        }

        Ok(Crew {
            agents: self.agents,
            tasks: self.tasks,
            process: self.process,
            manager: self.manager,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, text_response, tool_call_response};
    use serde_json::json;

    fn agent(role: &str, provider: Arc<ScriptedProvider>) -> CrewAgent {
        CrewAgent::builder(role)
            .goal("Work on {stock_selection}")
            .backstory("Experienced.")
            .allow_delegation(true)
            .provider(provider)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_validation() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));

        let no_agents = Crew::builder().task(Task::new("t", "o")).build();
        assert!(matches!(no_agents, Err(Error::InitializationFailed(_))));

        let no_tasks = Crew::builder().agent(agent("Analyst", provider.clone())).build();
        assert!(matches!(no_tasks, Err(Error::InitializationFailed(_))));

        let unknown = Crew::builder()
            .agent(agent("Analyst", provider.clone()))
            .task(Task::new("t", "o").with_agent("Trader"))
            .build();
        assert!(unknown.unwrap_err().to_string().contains("'Trader'"));

        let no_manager = Crew::builder()
            .agent(agent("Analyst", provider.clone()))
            .task(Task::new("t", "o"))
            .process(Process::Hierarchical)
            .build();
        assert!(no_manager.unwrap_err().to_string().contains("manager LLM"));

        let crew = Crew::builder()
            .agent(agent("Analyst", provider.clone()))
            .task(Task::new("t", "o").with_agent("Analyst"))
            .process(Process::Hierarchical)
            .manager_llm(ManagerLlm::new(provider, "gpt-3.5-turbo"))
            .build()
            .unwrap();
        assert_eq!(crew.process(), Process::Hierarchical);
        assert_eq!(crew.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_sequential_chains_outputs() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("AAPL momentum is positive"),
            text_response("Buy on pullbacks"),
        ]));
        let crew = Crew::builder()
            .agent(agent("Data Analyst", provider.clone()))
            .agent(agent("Trading Strategy Developer", provider.clone()))
            .task(Task::new("Monitor {stock_selection}", "Insights").with_agent("Data Analyst"))
            .task(
                Task::new("Plan {stock_selection} trades", "Strategies")
                    .with_agent("Trading Strategy Developer"),
            )
            .build()
            .unwrap();

        let output = crew
            .kickoff(&Inputs::new().with("stock_selection", "AAPL"))
            .await
            .unwrap();

        assert_eq!(output.raw, "Buy on pullbacks");
        assert_eq!(output.to_string(), "Buy on pullbacks");
        assert_eq!(output.tasks_output.len(), 2);
        assert_eq!(output.tasks_output[0].description, "Monitor AAPL");
        assert_eq!(output.tasks_output[1].agent, "Trading Strategy Developer");
        assert_eq!(output.token_usage.input_tokens, 20);

        let requests = provider.requests();
        assert!(requests[0].system.as_deref().unwrap().contains("Work on AAPL"));
        assert!(requests[1].system.as_deref().unwrap().starts_with("You are Trading Strategy Developer."));
        let second_prompt = requests[1].messages[0].text().unwrap();
        assert!(second_prompt.contains("Plan AAPL trades"));
        assert!(second_prompt.contains("AAPL momentum is positive"));
    }

    #[tokio::test]
    async fn test_sequential_unassigned_task_uses_first_agent() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("done")]));
        let crew = Crew::builder()
            .agent(agent("Data Analyst", provider.clone()))
            .agent(agent("Risk Advisor", provider))
            .task(Task::new("Anything", "Something"))
            .build()
            .unwrap();

        let output = crew.kickoff(&Inputs::new()).await.unwrap();
        assert_eq!(output.tasks_output[0].agent, "Data Analyst");
    }

    #[tokio::test]
    async fn test_hierarchical_manager_delegates() {
        let worker = Arc::new(ScriptedProvider::new(vec![text_response("AAPL trending up")]));
        let manager = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(
                "call_1",
                "delegate_work_to_coworker",
                json!({
                    "task": "Monitor AAPL",
                    "context": "User wants insights",
                    "coworker": "Data Analyst"
                }),
            ),
            text_response("Final report: AAPL trending up"),
        ]));

        let crew = Crew::builder()
            .agent(agent("Data Analyst", worker.clone()))
            .task(Task::new("Monitor {stock_selection}", "Insights").with_agent("Data Analyst"))
            .process(Process::Hierarchical)
            .manager_llm(ManagerLlm::new(manager.clone(), "gpt-3.5-turbo").with_temperature(0.7))
            .build()
            .unwrap();

        let output = crew
            .kickoff(&Inputs::new().with("stock_selection", "AAPL"))
            .await
            .unwrap();

        assert_eq!(output.raw, "Final report: AAPL trending up");
        assert_eq!(output.tasks_output[0].agent, MANAGER_ROLE);
        assert_eq!(output.token_usage.output_tokens, 15);

        let manager_requests = manager.requests();
        assert_eq!(manager_requests[0].model, "gpt-3.5-turbo");
        assert_eq!(manager_requests[0].temperature, Some(0.7));
        assert!(manager_requests[0].system.as_deref().unwrap().starts_with("You are Crew Manager."));
        let first_prompt = manager_requests[0].messages[0].text().unwrap();
        assert!(first_prompt.contains("Monitor AAPL"));
        assert!(first_prompt.contains("assigned to your coworker: Data Analyst"));

        let worker_requests = worker.requests();
        assert_eq!(worker_requests.len(), 1);
        assert!(worker_requests[0].tools.is_none());
        assert!(worker_requests[0].messages[0].text().unwrap().contains("User wants insights"));
    }

    #[tokio::test]
    async fn test_engine_failure_propagates() {
        let manager = Arc::new(ScriptedProvider::new(vec![]));
        let crew = Crew::builder()
            .agent(agent("Data Analyst", manager.clone()))
            .task(Task::new("Monitor", "Insights"))
            .process(Process::Hierarchical)
            .manager_llm(ManagerLlm::new(manager, "gpt-3.5-turbo"))
            .build()
            .unwrap();

        let err = crew.kickoff(&Inputs::new()).await.unwrap_err();
        assert!(matches!(err, Error::ProcessingFailed(_)));
    }
}
