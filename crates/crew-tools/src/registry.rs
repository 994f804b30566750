//! Tool registry for managing available tools

use crate::Tool;
use crew_llm::ToolDefinition;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of the tools one agent may call during a task
///
/// Tools are kept in name order so definitions reach the model in a stable
/// order between runs.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Definitions of all registered tools, for the LLM request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl FromIterator<Arc<dyn Tool>> for ToolRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Tool>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for tool in iter {
            registry.register(tool);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        async fn execute(&self, params: Value) -> crew_core::Result<Value> {
            Ok(params)
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Named("search_the_internet")));
        registry.register(Arc::new(Named("read_website_content")));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("search_the_internet").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(
            registry.names(),
            vec!["read_website_content", "search_the_internet"]
        );
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let registry: ToolRegistry = vec![
            Arc::new(Named("dup")) as Arc<dyn Tool>,
            Arc::new(Named("dup")) as Arc<dyn Tool>,
        ]
        .into_iter()
        .collect();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_definitions() {
        let registry: ToolRegistry = std::iter::once(Arc::new(Named("x")) as Arc<dyn Tool>).collect();
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "x");
        assert_eq!(defs[0].description, "test tool");
    }
}
