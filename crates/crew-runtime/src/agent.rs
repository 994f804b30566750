//! Crew agents: a role-playing persona bound to an LLM and a set of tools

use crate::delegation::{AskQuestionTool, DelegateWorkTool};
use crate::executor::{AgentExecutor, ExecutorConfig};
use crate::task::task_prompt;
use crate::usage::UsageMeter;
use crate::Inputs;
use crew_core::{Context, Error, Result};
use crew_llm::LLMProvider;
use crew_tools::{Tool, ToolRegistry};
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::{debug, info};

const PREVIEW_CHARS: usize = 200;

/// What an agent may reach while working on one task
///
/// Coworkers are the agents it may delegate to or question. Every executor
/// started under the same scope records into the same usage meter.
#[derive(Clone, Default)]
pub struct WorkScope {
    coworkers: Vec<Arc<CrewAgent>>,
    usage: Arc<UsageMeter>,
}

impl WorkScope {
    pub fn new(usage: Arc<UsageMeter>) -> Self {
        Self {
            coworkers: Vec::new(),
            usage,
        }
    }

    pub fn with_coworkers(mut self, coworkers: Vec<Arc<CrewAgent>>) -> Self {
        self.coworkers = coworkers;
        self
    }

    pub fn coworkers(&self) -> &[Arc<CrewAgent>] {
        &self.coworkers
    }

    pub fn usage(&self) -> &Arc<UsageMeter> {
        &self.usage
    }

    /// Same meter, nobody to delegate to
    pub fn solo(&self) -> Self {
        Self::new(self.usage.clone())
    }
}

/// An agent of the crew
///
/// The persona (role, goal, backstory) becomes the system prompt of every
/// task the agent works on.
#[derive(Clone)]
pub struct CrewAgent {
    role: String,
    goal: String,
    backstory: String,
    allow_delegation: bool,
    verbose: bool,
    tools: Vec<Arc<dyn Tool>>,
    provider: Arc<dyn LLMProvider>,
    config: ExecutorConfig,
}

impl fmt::Debug for CrewAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrewAgent")
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("allow_delegation", &self.allow_delegation)
            .field("verbose", &self.verbose)
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("provider", &self.provider.name())
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl CrewAgent {
    /// Start building an agent with the given role
    pub fn builder(role: impl Into<String>) -> CrewAgentBuilder {
        CrewAgentBuilder::new(role)
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    pub fn allow_delegation(&self) -> bool {
        self.allow_delegation
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Names of the agent's own tools
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// System prompt built from the persona
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }

    /// Whether this agent answers to `name` as a coworker
    pub(crate) fn answers_to(&self, name: &str) -> bool {
        let name = name.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        self.role.eq_ignore_ascii_case(name)
    }

    pub(crate) fn interpolated(&self, inputs: &Inputs) -> Self {
        Self {
            role: inputs.interpolate(&self.role),
            goal: inputs.interpolate(&self.goal),
            backstory: inputs.interpolate(&self.backstory),
            ..self.clone()
        }
    }

    /// Work on a task and return the final answer
    ///
    /// `context` carries the expected output, outputs of earlier tasks and,
    /// when someone else owns the task, the assigned role. When delegation is
    /// allowed and `scope` names coworkers, the agent gets the two coworker
    /// tools; delegated work itself runs without further delegation.
    pub async fn execute_task(
        &self,
        description: &str,
        context: &Context,
        scope: &WorkScope,
    ) -> Result<String> {
        let mut prompt = task_prompt(description, context.expected_output(), &context.task_context());
        if let Some(assigned) = context.assigned_role().filter(|role| !self.answers_to(role)) {
            let _ = write!(
                prompt,
                "\n\nThis task is assigned to your coworker: {assigned}. \
                 Delegate it to them or ask them questions as needed."
            );
        }

        let mut registry: ToolRegistry = self.tools.iter().cloned().collect();
        let coworkers: Vec<Arc<CrewAgent>> = scope
            .coworkers()
            .iter()
            .filter(|coworker| !coworker.answers_to(&self.role))
            .cloned()
            .collect();
        if self.allow_delegation && !coworkers.is_empty() {
            registry.register(Arc::new(DelegateWorkTool::new(coworkers.clone(), scope.solo())));
            registry.register(Arc::new(AskQuestionTool::new(coworkers, scope.solo())));
        }

        let task_preview: String = description.chars().take(PREVIEW_CHARS).collect();
        if self.verbose {
            info!(agent = %self.role, task = %task_preview, "Agent started task");
        } else {
            debug!(agent = %self.role, task = %task_preview, "Agent started task");
        }

        let executor = AgentExecutor::builder()
            .provider(self.provider.clone())
            .tool_registry(registry)
            .config(ExecutorConfig {
                system_prompt: Some(self.system_prompt()),
                ..self.config.clone()
            })
            .usage_meter(scope.usage().clone())
            .build()?;
        let answer = executor.run(prompt).await?;

        let answer_preview: String = answer.chars().take(PREVIEW_CHARS).collect();
        if self.verbose {
            info!(agent = %self.role, answer = %answer_preview, "Agent final answer");
        } else {
            debug!(agent = %self.role, answer_length = answer.len(), "Agent final answer");
        }

        Ok(answer)
    }
}

/// Builder for CrewAgent
pub struct CrewAgentBuilder {
    role: String,
    goal: String,
    backstory: String,
    allow_delegation: bool,
    verbose: bool,
    tools: Vec<Arc<dyn Tool>>,
    provider: Option<Arc<dyn LLMProvider>>,
    config: ExecutorConfig,
}

impl CrewAgentBuilder {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: String::new(),
            backstory: String::new(),
            allow_delegation: false,
            verbose: false,
            tools: Vec::new(),
            provider: None,
            config: ExecutorConfig::default(),
        }
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub fn allow_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn build(self) -> Result<CrewAgent> {
        if self.role.trim().is_empty() {
            return Err(Error::InitializationFailed(
                "Agent role must not be empty".to_string(),
            ));
        }
        let provider = self.provider.ok_or_else(|| {
            Error::InitializationFailed(format!("Provider not set for agent '{}'", self.role))
        })?;

        Ok(CrewAgent {
            role: self.role,
            goal: self.goal,
            backstory: self.backstory,
            allow_delegation: self.allow_delegation,
            verbose: self.verbose,
            tools: self.tools,
            provider,
            config: self.config,
        })
    }
}
