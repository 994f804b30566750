//! `{key}` placeholder interpolation applied at crew kickoff

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern")
});

/// Named values substituted into agent and task text
///
/// Placeholders without a matching input are left untouched, so literal
/// braces in prompts survive.
///
/// # Example
///
/// ```
/// use crew_runtime::Inputs;
///
/// let inputs = Inputs::new().with("stock_selection", "AAPL");
/// assert_eq!(inputs.interpolate("Analyse {stock_selection}"), "Analyse AAPL");
/// assert_eq!(inputs.interpolate("{unknown} stays"), "{unknown} stays");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs(BTreeMap<String, String>);

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an input, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace every known `{key}` in `template`
    pub fn interpolate(&self, template: &str) -> String {
        if self.0.is_empty() {
            return template.to_string();
        }

        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match self.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_every_occurrence() {
        let inputs: Inputs = [("stock_selection", "TSLA"), ("risk_tolerance", "High")]
            .into_iter()
            .collect();

        assert_eq!(
            inputs.interpolate("{stock_selection} with {risk_tolerance} risk, again {stock_selection}"),
            "TSLA with High risk, again TSLA"
        );
    }

    #[test]
    fn test_leaves_unknown_and_non_identifier_braces() {
        let inputs = Inputs::new().with("a", "1");
        assert_eq!(inputs.interpolate("{a} {b} {not a key} {}"), "1 {b} {not a key} {}");
        assert_eq!(inputs.interpolate(r#"{"json": true}"#), r#"{"json": true}"#);
    }

    #[test]
    fn test_values_are_not_reinterpolated() {
        let inputs = Inputs::new().with("a", "{b}").with("b", "x");
        assert_eq!(inputs.interpolate("{a}"), "{b}");
    }

    #[test]
    fn test_serializes_as_map() {
        let inputs = Inputs::new().with("stock_selection", "AAPL");
        let value = serde_json::to_value(&inputs).unwrap();
        assert_eq!(value["stock_selection"], "AAPL");
        assert_eq!(inputs.len(), 1);
    }
}
