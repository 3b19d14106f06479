//! Tool System
//!
//! Closed tool framework for agent capabilities. Tools expose a name, a
//! description the reasoning model uses to decide applicability, and a
//! single-string invocation. The registry dispatch is total: failures are
//! encoded as returned observation text and never propagate into the
//! reasoning loop.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Tool trait - implement to add a new capability
///
/// `name` and `description` are fixed after registration; the reasoning
/// loop only reads them for selection and calls `call`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool identifier, referenced by the model when selecting
    fn name(&self) -> &str;

    /// Shown to the LLM to decide when the tool applies
    fn description(&self) -> &str;

    /// Execute the tool on a free-text input
    async fn call(&self, input: &str) -> Result<String>;
}

/// Ordered, name-unique registry of the tools available to one session
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a new tool; a tool with the same name is replaced in place
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a boxed tool
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Invoke a tool by name, converting every failure into observation text
    ///
    /// The reasoning loop must never abort because a tool failed; an
    /// unknown name or an `Err` from the tool comes back as a diagnostic
    /// string the model can react to.
    pub async fn dispatch(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.get(name) else {
            return format!(
                "La herramienta '{}' no existe. Herramientas disponibles: {}",
                name,
                self.names().join(", ")
            );
        };

        match tool.call(input).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                format!("La herramienta '{}' falló: {}", name, e)
            }
        }
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate the system prompt section describing available tools
    pub fn prompt_section(&self) -> String {
        let mut prompt = String::from("## Herramientas disponibles\n\n");
        prompt.push_str(
            "Para usar una herramienta responde únicamente con un bloque JSON:\n\n",
        );
        prompt.push_str("```tool\n{\"tool\": \"nombre_herramienta\", \"input\": \"texto de entrada\"}\n```\n\n");
        prompt.push_str(
            "Cuando tengas la información necesaria, escribe la respuesta final sin ningún bloque de herramienta.\n\n",
        );

        for tool in &self.tools {
            prompt.push_str(&format!("### {}\n", tool.name()));
            prompt.push_str(&format!("{}\n\n", tool.description()));
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "eco"
        }

        fn description(&self) -> &str {
            "Repite la entrada."
        }

        async fn call(&self, input: &str) -> Result<String> {
            Ok(format!("eco: {input}"))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "rota"
        }

        fn description(&self) -> &str {
            "Siempre falla."
        }

        async fn call(&self, _input: &str) -> Result<String> {
            Err(AgentError::ToolExecution("sin conexión".into()))
        }
    }

    #[tokio::test]
    async fn test_registry_order_and_uniqueness() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        registry.register(BrokenTool);
        registry.register(EchoTool); // replaces, keeps position

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["eco", "rota"]);
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let out = registry.dispatch("eco", "hola").await;
        assert_eq!(out, "eco: hola");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_total() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let out = registry.dispatch("inexistente", "hola").await;
        assert!(out.contains("no existe"));
        assert!(out.contains("eco"));
    }

    #[tokio::test]
    async fn test_dispatch_converts_tool_error_to_text() {
        let mut registry = ToolRegistry::new();
        registry.register(BrokenTool);

        let out = registry.dispatch("rota", "hola").await;
        assert!(out.contains("falló"));
        assert!(out.contains("sin conexión"));
    }
}
