//! The four analyst agents of the crew

use serde::{Deserialize, Serialize};

/// Tool an agent carries, resolved to a concrete tool by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolHandle {
    /// Read a web page's text
    WebScrape,
    /// Search the internet
    WebSearch,
}

/// Persona and capabilities of one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub verbose: bool,
    pub allow_delegation: bool,
    pub tools: Vec<ToolHandle>,
}

impl AgentSpec {
    fn analyst(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            verbose: true,
            allow_delegation: true,
            tools: vec![ToolHandle::WebScrape, ToolHandle::WebSearch],
        }
    }
}

pub const DATA_ANALYST: &str = "Data Analyst";
pub const TRADING_STRATEGY_DEVELOPER: &str = "Trading Strategy Developer";
pub const TRADE_ADVISOR: &str = "Trade Advisor";
pub const RISK_ADVISOR: &str = "Risk Advisor";

/// The crew, in task order
pub fn build_agents() -> [AgentSpec; 4] {
    [
        AgentSpec::analyst(
            DATA_ANALYST,
            "Monitor and analyze market data in real-time to identify trends and predict market movements.",
            "Specializing in financial markets, this agent uses statistical modeling and machine \
             learning to provide crucial insights.",
        ),
        AgentSpec::analyst(
            TRADING_STRATEGY_DEVELOPER,
            "Develop and test various trading strategies based on insights from the Data Analyst Agent.",
            "Equipped with a deep understanding of financial markets and quantitative analysis, \
             this agent devises and refines trading strategies.",
        ),
        AgentSpec::analyst(
            TRADE_ADVISOR,
            "Suggest optimal trade execution strategies based on approved trading strategies.",
            "This agent specializes in analyzing the timing, price, and logistical details of \
             potential trades.",
        ),
        AgentSpec::analyst(
            RISK_ADVISOR,
            "Evaluate and provide risks associated with potential trading activities.",
            "Armed with a deep understanding of risk assessment models and market dynamics, this \
             agent scrutinizes potential risks.",
        ),
    ]
}
