//! Financial analysis crew
//!
//! A single-page form collects a stock ticker, starting capital, risk
//! tolerance, trading strategy and a news-impact switch. Each submission
//! builds four analyst agents and four tasks and hands them to a hierarchical
//! crew, then shows the text the crew returns.
//!
//! # Modules
//!
//! - `request`: form fields and their defaults
//! - `agents` / `tasks`: the fixed crew and its templated tasks
//! - `engine`: the [`CrewEngine`] seam and the LLM-backed implementation
//! - `render` / `routes`: the HTML page and the axum router
//! - `config` / `error`: configuration and error types

pub mod agents;
pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod request;
pub mod routes;
pub mod tasks;

pub use agents::{AgentSpec, ToolHandle, build_agents};
pub use config::{AppConfig, AppConfigBuilder};
pub use engine::{CrewEngine, CrewPlan, LlmCrewEngine, ManagerSettings, run};
pub use error::{AppError, Result};
pub use render::{PageState, render};
pub use request::{AnalysisForm, AnalysisRequest, RiskTolerance, TradingStrategy, collect_inputs};
pub use routes::{AppState, create_router};
pub use tasks::{TaskSpec, build_tasks};

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,financial_crew=debug";
