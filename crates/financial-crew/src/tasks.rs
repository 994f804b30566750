//! The four analysis tasks, rendered from MiniJinja templates

use crate::agents::AgentSpec;
use crate::error::Result;
use crate::request::AnalysisRequest;
use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};

/// One task of the crew, bound to the agent that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
    pub agent: AgentSpec,
}

/// Description and expected-output templates, in agent order
///
/// Variables are the fields of [`AnalysisRequest`].
pub const TASK_TEMPLATES: [(&str, &str); 4] = [
    (
        "Continuously monitor and analyze market data for the selected stock ({{ stock_selection }}). \
         Use statistical modeling and machine learning to identify trends and predict market movements.",
        "Insights and alerts about significant market opportunities or threats for {{ stock_selection }}.",
    ),
    (
        "Develop and refine trading strategies for {{ stock_selection }} based on the insights from \
         the Data Analyst and user-defined risk tolerance ({{ risk_tolerance }}). \
         Consider trading preferences ({{ trading_strategy_preference }}).",
        "A set of potential trading strategies for {{ stock_selection }} that align with the user's \
         risk tolerance.",
    ),
    (
        "Analyze approved trading strategies to determine the best execution methods for \
         {{ stock_selection }}, considering current market conditions and optimal pricing.",
        "Detailed execution plans suggesting how and when to execute trades for {{ stock_selection }}.",
    ),
    (
        "Evaluate the risks associated with the proposed trading strategies and execution plans for \
         {{ stock_selection }}. Provide a detailed analysis of potential risks and suggest mitigation \
         strategies.",
        "A comprehensive risk analysis report detailing potential risks and mitigation \
         recommendations for {{ stock_selection }}.",
    ),
];

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

/// Render one template against the request
///
/// A variable the request does not define is an error, not an empty string.
pub fn render_template(template: &str, request: &AnalysisRequest) -> Result<String> {
    Ok(environment().render_str(template, request)?)
}

/// Build the four tasks, task `i` owned by `agents[i]`
pub fn build_tasks(agents: &[AgentSpec; 4], request: &AnalysisRequest) -> Result<Vec<TaskSpec>> {
    let env = environment();

    agents
        .iter()
        .zip(TASK_TEMPLATES)
        .map(|(agent, (description, expected_output))| -> Result<TaskSpec> {
            Ok(TaskSpec {
                description: env.render_str(description, request)?,
                expected_output: env.render_str(expected_output, request)?,
                agent: agent.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::build_agents;
    use crate::error::AppError;
    use crate::request::{RiskTolerance, TradingStrategy};

    fn swing_request() -> AnalysisRequest {
        AnalysisRequest {
            stock_selection: "AAPL".to_string(),
            risk_tolerance: RiskTolerance::Medium,
            trading_strategy_preference: TradingStrategy::SwingTrading,
            ..AnalysisRequest::default()
        }
    }

    #[test]
    fn test_every_task_mentions_the_ticker() {
        let tasks = build_tasks(&build_agents(), &swing_request()).unwrap();

        assert_eq!(tasks.len(), 4);
        for task in &tasks {
            assert!(task.description.contains("AAPL"), "{}", task.description);
            assert!(task.expected_output.contains("AAPL"));
        }
        assert!(tasks[1].description.contains("Medium"));
        assert!(tasks[1].description.contains("Swing Trading"));
    }

    #[test]
    fn test_tasks_bound_to_agents_in_order() {
        let agents = build_agents();
        let tasks = build_tasks(&agents, &swing_request()).unwrap();

        for (task, agent) in tasks.iter().zip(agents.iter()) {
            assert_eq!(&task.agent, agent);
        }
    }

    #[test]
    fn test_rendered_text() {
        let tasks = build_tasks(&build_agents(), &AnalysisRequest::default()).unwrap();
        assert_eq!(
            tasks[0].description,
            "Continuously monitor and analyze market data for the selected stock (AAPL). \
             Use statistical modeling and machine learning to identify trends and predict market movements."
        );
        assert!(!tasks[0].description.contains("{{"));
    }

    #[test]
    fn test_unknown_field_is_a_template_error() {
        let err = render_template("Analyze {{ sector }}", &AnalysisRequest::default()).unwrap_err();
        assert!(matches!(err, AppError::Template(_)));
    }

    #[test]
    fn test_user_text_is_not_evaluated() {
        let request = AnalysisRequest {
            stock_selection: "{{ risk_tolerance }}".to_string(),
            ..AnalysisRequest::default()
        };
        let rendered = render_template("Stock: {{ stock_selection }}", &request).unwrap();
        assert_eq!(rendered, "Stock: {{ risk_tolerance }}");
    }
}
