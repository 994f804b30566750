//! The seam between the form and the crew engine

use crate::agents::{AgentSpec, ToolHandle, build_agents};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::request::AnalysisRequest;
use crate::tasks::{TaskSpec, build_tasks};
use async_trait::async_trait;
use crew_llm::LLMProvider;
use crew_llm::providers::{OpenAIConfig, OpenAIProvider};
use crew_runtime::{Crew, CrewAgent, Inputs, ManagerLlm, Process, Task};
use crew_tools::{ScrapeWebsiteTool, SerperSearchTool, Tool};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Model settings of the coordinating manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerSettings {
    pub model: String,
    pub temperature: f32,
}

/// Everything the engine needs to run one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewPlan {
    pub agents: Vec<AgentSpec>,
    pub tasks: Vec<TaskSpec>,
    pub process: Process,
    pub manager: ManagerSettings,
}

/// Runs a crew plan to a single result text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrewEngine: Send + Sync {
    /// Run every task of `plan` and return the final output
    async fn kickoff(&self, plan: CrewPlan, inputs: Inputs) -> crew_core::Result<String>;
}

/// Build the crew for `request` and hand it to `engine` once
///
/// Waits for the whole run; there is no timeout or retry here.
#[instrument(skip_all, fields(stock = %request.stock_selection))]
pub async fn run(
    engine: &dyn CrewEngine,
    config: &AppConfig,
    request: &AnalysisRequest,
) -> Result<String> {
    let agents = build_agents();
    let tasks = build_tasks(&agents, request)?;

    let plan = CrewPlan {
        agents: agents.to_vec(),
        tasks,
        process: Process::Hierarchical,
        manager: ManagerSettings {
            model: config.manager_model.clone(),
            temperature: config.manager_temperature,
        },
    };

    info!(
        risk = %request.risk_tolerance,
        strategy = %request.trading_strategy_preference,
        news = request.news_impact_consideration,
        "Starting analysis"
    );
    engine
        .kickoff(plan, request.to_inputs())
        .await
        .map_err(AppError::Engine)
}

/// Production engine: OpenAI-compatible models and the two web tools
pub struct LlmCrewEngine {
    agent_provider: Arc<dyn LLMProvider>,
    manager_provider: Arc<dyn LLMProvider>,
    config: AppConfig,
    scrape: Arc<dyn Tool>,
    search: Arc<dyn Tool>,
}

impl LlmCrewEngine {
    /// Use one provider for analysts and manager
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        config: AppConfig,
        search: Arc<dyn Tool>,
    ) -> Result<Self> {
        let scrape = ScrapeWebsiteTool::new()
            .with_max_chars(config.scrape_max_chars)
            .with_client(tool_client(&config)?);

        Ok(Self {
            agent_provider: provider.clone(),
            manager_provider: provider,
            config,
            scrape: Arc::new(scrape),
            search,
        })
    }

    /// Use a separate provider for the manager
    pub fn with_manager_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.manager_provider = provider;
        self
    }

    /// Build from `OPENAI_*` and `SERPER_API_KEY`
    ///
    /// Missing keys are not an error here; they fail the first call that
    /// needs them.
    pub fn from_env(config: AppConfig) -> Result<Self> {
        let openai = OpenAIConfig::from_env().with_timeout(config.request_timeout.as_secs());
        let provider = OpenAIProvider::with_config(openai)
            .map_err(|e| AppError::Config(format!("Failed to create OpenAI client: {e}")))?;
        let search = SerperSearchTool::from_env().with_client(tool_client(&config)?);

        Self::new(Arc::new(provider), config, Arc::new(search))
    }

    fn tool(&self, handle: ToolHandle) -> Arc<dyn Tool> {
        match handle {
            ToolHandle::WebScrape => self.scrape.clone(),
            ToolHandle::WebSearch => self.search.clone(),
        }
    }

    fn crew_agent(&self, spec: &AgentSpec) -> crew_core::Result<CrewAgent> {
        CrewAgent::builder(spec.role.clone())
            .goal(spec.goal.clone())
            .backstory(spec.backstory.clone())
            .verbose(spec.verbose)
            .allow_delegation(spec.allow_delegation)
            .tools(spec.tools.iter().map(|handle| self.tool(*handle)))
            .provider(self.agent_provider.clone())
            .model(self.config.agent_model.clone())
            .temperature(self.config.agent_temperature)
            .max_iterations(self.config.max_iterations)
            .build()
    }
}

/// HTTP client the web tools share, bounded by the configured request timeout
fn tool_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create tool HTTP client: {e}")))
}

#[async_trait]
impl CrewEngine for LlmCrewEngine {
    async fn kickoff(&self, plan: CrewPlan, inputs: Inputs) -> crew_core::Result<String> {
        let agents = plan
            .agents
            .iter()
            .map(|spec| self.crew_agent(spec))
            .collect::<crew_core::Result<Vec<_>>>()?;
        let tasks = plan.tasks.into_iter().map(|spec| {
            Task::new(spec.description, spec.expected_output).with_agent(spec.agent.role)
        });

        let crew = Crew::builder()
            .agents(agents)
            .tasks(tasks)
            .process(plan.process)
            .manager_llm(
                ManagerLlm::new(self.manager_provider.clone(), plan.manager.model)
                    .with_temperature(plan.manager.temperature),
            )
            .verbose(true)
            .build()?;

        let output = crew.kickoff(&inputs).await?;
        info!(
            tasks = output.tasks_output.len(),
            input_tokens = output.token_usage.input_tokens,
            output_tokens = output.token_usage.output_tokens,
            "Analysis finished"
        );
        Ok(output.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_llm::{CompletionRequest, CompletionResponse, Message, StopReason, TokenUsage};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    /// Answers every request with the same text and remembers the requests
    struct FixedProvider {
        answer: String,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl FixedProvider {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn complete(&self, request: CompletionRequest) -> crew_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(CompletionResponse {
                message: Message::assistant(self.answer.clone()),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_run_sends_the_hierarchical_plan() {
        let mut engine = MockCrewEngine::new();
        engine
            .expect_kickoff()
            .withf(|plan, inputs| {
                plan.process == Process::Hierarchical
                    && plan.agents.len() == 4
                    && plan.tasks.len() == 4
                    && plan.manager.model == "gpt-3.5-turbo"
                    && (plan.manager.temperature - 0.7).abs() < f32::EPSILON
                    && inputs.get("stock_selection") == Some("AAPL")
            })
            .times(1)
            .returning(|_, _| Ok("RESULT".to_string()));

        let result = run(&engine, &AppConfig::default(), &AnalysisRequest::default()).await;
        assert_eq!(assert_ok!(result), "RESULT");
    }

    #[tokio::test]
    async fn test_run_surfaces_engine_failure() {
        let mut engine = MockCrewEngine::new();
        engine
            .expect_kickoff()
            .returning(|_, _| Err(crew_core::Error::ProcessingFailed("401 Unauthorized".to_string())));

        let err = assert_err!(run(&engine, &AppConfig::default(), &AnalysisRequest::default()).await);
        assert!(matches!(err, AppError::Engine(_)));
    }

    #[tokio::test]
    async fn test_llm_engine_runs_four_tasks_through_the_manager() {
        let analysts = Arc::new(FixedProvider::new("unused"));
        let manager = Arc::new(FixedProvider::new("Risk report for AAPL"));
        let config = AppConfig::builder().manager_model("manager-model").build().unwrap();
        let engine = LlmCrewEngine::new(
            analysts.clone(),
            config.clone(),
            Arc::new(SerperSearchTool::new(None)),
        )
        .unwrap()
        .with_manager_provider(manager.clone());

        let result = run(&engine, &config, &AnalysisRequest::default()).await.unwrap();
        assert_eq!(result, "Risk report for AAPL");

        let requests = manager.requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert!(requests.iter().all(|r| r.model == "manager-model"));
        let first_tools: Vec<_> = requests[0]
            .tools
            .as_ref()
            .unwrap()
            .iter()
            .map(|tool| tool.name.clone())
            .collect();
        assert_eq!(first_tools, vec!["ask_question_to_coworker", "delegate_work_to_coworker"]);
        assert!(analysts.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_web_tools_honour_request_timeout() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = AppConfig::builder()
            .request_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let engine = assert_ok!(LlmCrewEngine::new(
            Arc::new(FixedProvider::new("x")),
            config,
            Arc::new(SerperSearchTool::new(None)),
        ));

        let scrape = engine.tool(ToolHandle::WebScrape);
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            scrape.execute(serde_json::json!({ "website_url": format!("http://{addr}/") })),
        )
        .await
        .expect("request timeout was not applied");
        assert_err!(outcome);
    }

    #[test]
    fn test_crew_agent_gets_both_tools() {
        let engine = LlmCrewEngine::new(
            Arc::new(FixedProvider::new("x")),
            AppConfig::default(),
            Arc::new(SerperSearchTool::new(None)),
        )
        .unwrap();
        let agent = engine.crew_agent(&build_agents()[0]).unwrap();

        assert_eq!(agent.role(), "Data Analyst");
        assert_eq!(agent.tool_names(), vec!["read_website_content", "search_the_internet"]);
        assert_eq!(agent.model(), "gpt-4o-mini");
    }
}
