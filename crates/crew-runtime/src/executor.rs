//! Agent executor for running tool-calling loops
//!
//! The AgentExecutor implements the loop every crew agent runs for a task:
//! 1. Call the LLM with the conversation and the agent's tools
//! 2. Check the stop reason
//! 3. If tool use was requested, execute the tools and loop back
//! 4. If the model finished, return its final answer

use crate::usage::UsageMeter;
use crew_core::{Error, Result};
use crew_llm::{CompletionRequest, ContentBlock, LLMProvider, Message, StopReason};
use crew_tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Returned when the loop runs out of iterations
pub const MAX_ITERATIONS_NOTICE: &str = "Max iterations reached without completion";
/// Returned when the model stops on the token limit without any text
pub const TRUNCATED_NOTICE: &str = "Response truncated due to token limit";

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of LLM round trips (prevents infinite loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.7),
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: ToolRegistry,
    config: ExecutorConfig,
    usage: Arc<UsageMeter>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: ToolRegistry,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            usage: Arc::new(UsageMeter::default()),
        }
    }

    /// Create a builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Record token usage into a shared meter
    pub fn with_usage_meter(mut self, usage: Arc<UsageMeter>) -> Self {
        self.usage = usage;
        self
    }

    /// Execute the agent loop for one user message
    ///
    /// Returns the model's final answer once it stops asking for tools.
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_conversation(vec![Message::user(user_message)])
            .await
    }

    async fn run_conversation(&self, mut conversation: Vec<Message>) -> Result<String> {
        let tools = self.tool_registry.definitions();
        debug!(tool_count = tools.len(), tools = ?self.tool_registry.names(), "Available tools");

        for iteration in 1..=self.config.max_iterations {
            debug!(
                iteration,
                max_iterations = self.config.max_iterations,
                "Agent iteration started"
            );

            let mut request = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens)
                .tools(tools.clone());
            if let Some(system) = &self.config.system_prompt {
                request = request.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                request = request.temperature(temperature);
            }

            let response = self
                .provider
                .complete(request.build())
                .await
                .map_err(|e| Error::ProcessingFailed(e.to_string()))?;

            self.usage.record(response.usage);
            info!(
                model = %self.config.model,
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            // Some backends finish with tool calls but report a plain stop.
            let wants_tools = response.stop_reason == StopReason::ToolUse
                || response.message.has_tool_uses();

            if wants_tools {
                let tool_results = self.execute_tools(&response.message).await;
                conversation.push(response.message);
                if tool_results.is_empty() {
                    warn!("No tool calls despite ToolUse stop reason");
                    return Ok(conversation
                        .last()
                        .and_then(Message::text)
                        .unwrap_or_default()
                        .to_string());
                }
                conversation.extend(tool_results);
                continue;
            }

            let text = response.message.text().unwrap_or_default().to_string();
            return match response.stop_reason {
                StopReason::MaxTokens if text.is_empty() => {
                    warn!("Hit max tokens in LLM response");
                    Ok(TRUNCATED_NOTICE.to_string())
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response, returning partial answer");
                    Ok(text)
                }
                _ => {
                    debug!(iteration, response_length = text.len(), "Agent completed");
                    Ok(text)
                }
            };
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached, stopping"
        );
        Ok(MAX_ITERATIONS_NOTICE.to_string())
    }

    /// Execute tool calls from an assistant message
    ///
    /// Failures, including unknown tool names, become error results the model
    /// can react to.
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            let input_preview: String = input.to_string().chars().take(500).collect();
            info!(tool_name = %name, tool_id = %id, input_preview = %input_preview, "Executing tool");

            let Some(tool) = self.tool_registry.get(name) else {
                warn!(tool_name = %name, "Model requested an unknown tool");
                results.push(Message::tool_error(
                    id.clone(),
                    format!(
                        "Error: tool '{name}' does not exist. Available tools: {}",
                        self.tool_registry.names().join(", ")
                    ),
                ));
                continue;
            };

            let started = Instant::now();
            match tool.execute(input.clone()).await {
                Ok(result) => {
                    let result_str = render_tool_result(&result);
                    info!(
                        tool_name = %name,
                        duration_ms = elapsed_ms(started),
                        result_length = result_str.len(),
                        "Tool execution succeeded"
                    );
                    results.push(Message::tool_result(id.clone(), result_str));
                }
                Err(e) => {
                    warn!(
                        tool_name = %name,
                        duration_ms = elapsed_ms(started),
                        error = %e,
                        "Tool execution failed"
                    );
                    results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                }
            }
        }

        results
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Plain strings go back verbatim, anything else as JSON
fn render_tool_result(result: &Value) -> String {
    match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: ToolRegistry,
    config: ExecutorConfig,
    usage: Option<Arc<UsageMeter>>,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: ToolRegistry::new(),
            config: ExecutorConfig::default(),
            usage: None,
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: ToolRegistry) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Share a token usage meter
    pub fn usage_meter(mut self, usage: Arc<UsageMeter>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        let executor = AgentExecutor::new(provider, self.tool_registry, self.config);
        Ok(match self.usage {
            Some(usage) => executor.with_usage_meter(usage),
            None => executor,
        })
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
