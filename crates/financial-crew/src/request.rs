//! The analysis request a user submits through the form

use crew_runtime::Inputs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticker shown on a fresh form
pub const DEFAULT_STOCK: &str = "AAPL";
/// Capital shown on a fresh form
pub const DEFAULT_CAPITAL: &str = "100000";

/// How much risk the user is willing to take
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTolerance {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    /// Options in the order the form lists them
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|risk| risk.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown risk tolerance '{s}', expected Low, Medium or High"))
    }
}

/// Preferred holding period of the strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradingStrategy {
    #[default]
    #[serde(rename = "Day Trading")]
    DayTrading,
    #[serde(rename = "Swing Trading")]
    SwingTrading,
    #[serde(rename = "Position Trading")]
    PositionTrading,
}

impl TradingStrategy {
    /// Options in the order the form lists them
    pub const ALL: [Self; 3] = [Self::DayTrading, Self::SwingTrading, Self::PositionTrading];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DayTrading => "Day Trading",
            Self::SwingTrading => "Swing Trading",
            Self::PositionTrading => "Position Trading",
        }
    }
}

impl fmt::Display for TradingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the form labels as well as `swing`, `swing-trading` and the like
impl FromStr for TradingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphabetic)
            .collect::<String>()
            .to_ascii_lowercase();

        match key.strip_suffix("trading").unwrap_or(&key) {
            "day" => Ok(Self::DayTrading),
            "swing" => Ok(Self::SwingTrading),
            "position" => Ok(Self::PositionTrading),
            _ => Err(format!(
                "unknown trading strategy '{s}', expected Day, Swing or Position Trading"
            )),
        }
    }
}

/// Everything one analysis run needs from the user
///
/// Fields are carried as entered; nothing is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub stock_selection: String,
    pub initial_capital: String,
    pub risk_tolerance: RiskTolerance,
    pub trading_strategy_preference: TradingStrategy,
    pub news_impact_consideration: bool,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            stock_selection: DEFAULT_STOCK.to_string(),
            initial_capital: DEFAULT_CAPITAL.to_string(),
            risk_tolerance: RiskTolerance::default(),
            trading_strategy_preference: TradingStrategy::default(),
            news_impact_consideration: true,
        }
    }
}

impl AnalysisRequest {
    /// Crew kickoff inputs, keyed by field name
    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("stock_selection", self.stock_selection.as_str())
            .with("initial_capital", self.initial_capital.as_str())
            .with("risk_tolerance", self.risk_tolerance.as_str())
            .with(
                "trading_strategy_preference",
                self.trading_strategy_preference.as_str(),
            )
            .with(
                "news_impact_consideration",
                self.news_impact_consideration.to_string(),
            )
    }
}

/// Raw fields of a submitted form
///
/// An unchecked checkbox is not sent at all, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisForm {
    pub stock_selection: Option<String>,
    pub initial_capital: Option<String>,
    pub risk_tolerance: Option<String>,
    pub trading_strategy_preference: Option<String>,
    pub news_impact_consideration: Option<String>,
}

/// Read the five form fields, falling back to the defaults
///
/// `None` is a form that was never submitted: every field takes its default,
/// news impact included. On a submitted form a missing checkbox means
/// unchecked. Unknown select values fall back to the first option.
pub fn collect_inputs(form: Option<&AnalysisForm>) -> AnalysisRequest {
    let Some(form) = form else {
        return AnalysisRequest::default();
    };

    AnalysisRequest {
        stock_selection: form
            .stock_selection
            .clone()
            .unwrap_or_else(|| DEFAULT_STOCK.to_string()),
        initial_capital: form
            .initial_capital
            .clone()
            .unwrap_or_else(|| DEFAULT_CAPITAL.to_string()),
        risk_tolerance: form
            .risk_tolerance
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default(),
        trading_strategy_preference: form
            .trading_strategy_preference
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default(),
        news_impact_consideration: form.news_impact_consideration.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_form_defaults() {
        let request = collect_inputs(None);
        assert_eq!(request.stock_selection, "AAPL");
        assert_eq!(request.initial_capital, "100000");
        assert_eq!(request.risk_tolerance, RiskTolerance::Low);
        assert_eq!(request.trading_strategy_preference, TradingStrategy::DayTrading);
        assert!(request.news_impact_consideration);
    }

    #[test]
    fn test_submitted_form_is_taken_as_is() {
        let form = AnalysisForm {
            stock_selection: Some("not a ticker!".to_string()),
            initial_capital: Some("-5".to_string()),
            risk_tolerance: Some("High".to_string()),
            trading_strategy_preference: Some("Position Trading".to_string()),
            news_impact_consideration: Some("on".to_string()),
        };

        let request = collect_inputs(Some(&form));
        assert_eq!(request.stock_selection, "not a ticker!");
        assert_eq!(request.initial_capital, "-5");
        assert_eq!(request.risk_tolerance, RiskTolerance::High);
        assert_eq!(request.trading_strategy_preference, TradingStrategy::PositionTrading);
        assert!(request.news_impact_consideration);
    }

    #[test]
    fn test_unchecked_checkbox_and_unknown_selects() {
        let form = AnalysisForm {
            risk_tolerance: Some("Extreme".to_string()),
            trading_strategy_preference: Some("Scalping".to_string()),
            ..AnalysisForm::default()
        };

        let request = collect_inputs(Some(&form));
        assert_eq!(request.stock_selection, "AAPL");
        assert_eq!(request.risk_tolerance, RiskTolerance::Low);
        assert_eq!(request.trading_strategy_preference, TradingStrategy::DayTrading);
        assert!(!request.news_impact_consideration);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("swing".parse::<TradingStrategy>(), Ok(TradingStrategy::SwingTrading));
        assert_eq!("Swing Trading".parse::<TradingStrategy>(), Ok(TradingStrategy::SwingTrading));
        assert_eq!("position-trading".parse::<TradingStrategy>(), Ok(TradingStrategy::PositionTrading));
        assert!("hodl".parse::<TradingStrategy>().is_err());
        assert_eq!("medium".parse::<RiskTolerance>(), Ok(RiskTolerance::Medium));
    }

    #[test]
    fn test_serialized_labels() {
        let request = AnalysisRequest {
            trading_strategy_preference: TradingStrategy::SwingTrading,
            ..AnalysisRequest::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["trading_strategy_preference"], "Swing Trading");
        assert_eq!(value["risk_tolerance"], "Low");
    }

    #[test]
    fn test_to_inputs() {
        let inputs = collect_inputs(None).to_inputs();
        assert_eq!(inputs.get("stock_selection"), Some("AAPL"));
        assert_eq!(inputs.get("trading_strategy_preference"), Some("Day Trading"));
        assert_eq!(inputs.get("news_impact_consideration"), Some("true"));
        assert_eq!(inputs.len(), 5);
    }
}
