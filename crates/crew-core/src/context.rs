//! Execution context for agents
//!
//! The `Context` struct is a key-value store handed to an agent for a single
//! unit of work. The crew runtime uses it to pass task framing alongside the
//! task description.

use serde::Deserialize;
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// What the finished task should look like
    pub const EXPECTED_OUTPUT: &str = "expected_output";
    /// Outputs of earlier tasks, in order
    pub const TASK_CONTEXT: &str = "task_context";
    /// Role of the agent the task is assigned to
    pub const ASSIGNED_ROLE: &str = "assigned_role";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use crew_core::Context;
///
/// let ctx = Context::new()
///     .with_expected_output("A short report")
///     .with_task_context(vec!["Earlier finding".to_string()]);
///
/// assert_eq!(ctx.expected_output(), Some("A short report"));
/// assert_eq!(ctx.task_context().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set the expected output of the current task
    pub fn with_expected_output(mut self, expected: impl Into<String>) -> Self {
        self.insert(keys::EXPECTED_OUTPUT, serde_json::json!(expected.into()));
        self
    }

    /// Set the outputs of earlier tasks
    pub fn with_task_context(mut self, outputs: Vec<String>) -> Self {
        self.insert(keys::TASK_CONTEXT, serde_json::json!(outputs));
        self
    }

    /// Set the role the task is assigned to
    pub fn with_assigned_role(mut self, role: impl Into<String>) -> Self {
        self.insert(keys::ASSIGNED_ROLE, serde_json::json!(role.into()));
        self
    }

    // =========== Common Accessors ===========

    /// Get the expected output of the current task
    pub fn expected_output(&self) -> Option<&str> {
        self.get(keys::EXPECTED_OUTPUT).and_then(|v| v.as_str())
    }

    /// Get the outputs of earlier tasks (empty when none were recorded)
    pub fn task_context(&self) -> Vec<String> {
        self.get_typed::<Vec<String>>(keys::TASK_CONTEXT)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Get the role the task is assigned to
    pub fn assigned_role(&self) -> Option<&str> {
        self.get(keys::ASSIGNED_ROLE).and_then(|v| v.as_str())
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
