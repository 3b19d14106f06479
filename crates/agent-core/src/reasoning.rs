//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern: per turn the model either
//! selects exactly one tool with a derived input string or emits the final
//! answer. Intermediate steps accumulate in a per-turn scratchpad; the
//! caller-owned [`ConversationMemory`] receives exactly one exchange per
//! completed turn. The loop is bounded: when the iteration budget runs out
//! it still terminates, forcing a final answer from whatever has been
//! observed so far.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::memory::ConversationMemory;
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::ToolRegistry;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Instruction preamble, prepended to every turn
    pub system_prompt: String,

    /// Hard bound on reason/act cycles per turn
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to the system prompt
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 5,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"Eres un asistente útil.

Si necesitas una herramienta, responde con un bloque JSON en este formato exacto:
```tool
{"tool": "nombre_herramienta", "input": "texto de entrada"}
```

Tras recibir el resultado de la herramienta, intégralo en una respuesta útil.
Si puedes responder directamente sin herramientas, hazlo.
Sé conciso y preciso."#;

/// Corrective note injected when the model's decision cannot be parsed
const PARSE_RECOVERY_NOTE: &str = "Tu última respuesta no tiene un formato válido. \
Para usar una herramienta responde exactamente con:\n```tool\n{\"tool\": \"nombre\", \"input\": \"texto\"}\n```\n\
Si ya puedes responder, escribe la respuesta final sin ningún bloque de herramienta.";

/// Instruction used when the iteration budget is exhausted
const FORCE_FINAL_NOTE: &str = "No uses más herramientas. Con la información obtenida \
hasta ahora, escribe tu respuesta final.";

/// One reasoning iteration within a single turn
#[derive(Clone, Debug)]
pub struct AgentStep {
    /// Raw model output for this cycle
    pub thought: String,

    /// Tool the model selected, if any
    pub tool: Option<String>,

    /// Derived input string passed to the tool
    pub tool_input: Option<String>,

    /// What came back (tool output or corrective note)
    pub observation: Option<String>,
}

/// Tool directive as emitted by the model
#[derive(Debug, Deserialize)]
struct ToolDirective {
    tool: String,
    #[serde(default)]
    input: String,
}

/// Outcome of parsing one model response
enum Decision {
    /// No tool block: the response is the final answer
    Final(String),
    /// Invoke the named tool with the derived input
    Invoke { tool: String, input: String },
    /// Unparseable tool attempt; recover with a corrective note
    Malformed,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.prompt_section());
        }

        prompt
    }

    /// Assemble the provider message list for one reasoning step:
    /// preamble, replayed memory, current utterance, this turn's scratchpad.
    fn build_messages(
        &self,
        memory: &ConversationMemory,
        input: &str,
        scratchpad: &[AgentStep],
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2 + memory.len() * 2 + scratchpad.len() * 2);
        messages.push(Message::system(self.build_system_prompt()));
        messages.extend(memory.as_messages());
        messages.push(Message::user(input));

        for step in scratchpad {
            messages.push(Message::assistant(&step.thought));
            if let Some(observation) = &step.observation {
                messages.push(Message::tool(format!("Observación: {observation}")));
            }
        }

        messages
    }

    /// Run one turn of the agent on a user utterance
    ///
    /// Appends exactly one exchange to `memory` on completion, regardless
    /// of how many tool calls occurred in between.
    pub async fn run(&self, memory: &mut ConversationMemory, input: &str) -> Result<String> {
        let mut scratchpad: Vec<AgentStep> = Vec::new();

        for cycle in 1..=self.config.max_iterations {
            let messages = self.build_messages(memory, input, &scratchpad);
            let completion = self
                .provider
                .complete(&messages, &self.config.generation)
                .await?;
            let content = completion.content;

            match parse_decision(&content) {
                Decision::Final(answer) => {
                    memory.record(input, &answer);
                    return Ok(answer);
                }
                Decision::Invoke { tool, input: tool_input } => {
                    tracing::debug!(cycle, tool = %tool, "executing tool");
                    let observation = self.tools.dispatch(&tool, &tool_input).await;
                    scratchpad.push(AgentStep {
                        thought: content,
                        tool: Some(tool),
                        tool_input: Some(tool_input),
                        observation: Some(observation),
                    });
                }
                Decision::Malformed => {
                    tracing::debug!(cycle, "unparseable tool directive, injecting corrective note");
                    scratchpad.push(AgentStep {
                        thought: content,
                        tool: None,
                        tool_input: None,
                        observation: Some(PARSE_RECOVERY_NOTE.into()),
                    });
                }
            }
        }

        // Budget exhausted: not an error. Force a final answer from the
        // observations accumulated so far.
        let answer = self.force_final_answer(memory, input, &scratchpad).await?;
        memory.record(input, &answer);
        Ok(answer)
    }

    /// Early-stopping policy: one more generation, tools forbidden
    async fn force_final_answer(
        &self,
        memory: &ConversationMemory,
        input: &str,
        scratchpad: &[AgentStep],
    ) -> Result<String> {
        tracing::debug!(
            max_iterations = self.config.max_iterations,
            "iteration budget exhausted, generating final answer"
        );

        let mut messages = self.build_messages(memory, input, scratchpad);
        messages.push(Message::user(FORCE_FINAL_NOTE));

        let completion = self
            .provider
            .complete(&messages, &self.config.generation)
            .await?;

        // If the model still emits a tool block, keep only the prose.
        let stripped = strip_tool_block(&completion.content);
        if stripped.is_empty() {
            Ok(completion.content.trim().to_string())
        } else {
            Ok(stripped)
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Parse one model response into a decision
fn parse_decision(content: &str) -> Decision {
    // Fenced ```tool ... ``` block takes precedence
    if let Some(start) = content.find("```tool") {
        let after_marker = &content[start + "```tool".len()..];
        if let Some(end) = after_marker.find("```") {
            let json_str = after_marker[..end].trim();
            return match serde_json::from_str::<ToolDirective>(json_str) {
                Ok(directive) => Decision::Invoke {
                    tool: directive.tool,
                    input: directive.input,
                },
                Err(_) => Decision::Malformed,
            };
        }
        // Opened a tool block but never closed it
        return Decision::Malformed;
    }

    // Fallback: raw JSON object with a "tool" key somewhere in the prose
    if content.contains(r#""tool""#) {
        if let Some(directive) = parse_inline_directive(content) {
            return Decision::Invoke {
                tool: directive.tool,
                input: directive.input,
            };
        }
        return Decision::Malformed;
    }

    Decision::Final(content.trim().to_string())
}

/// Try to parse an inline JSON tool directive
fn parse_inline_directive(content: &str) -> Option<ToolDirective> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;

    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolDirective>(&content[start..=end]).ok()
}

/// Remove a fenced ```tool block, returning the surrounding prose trimmed
fn strip_tool_block(content: &str) -> String {
    let Some(start) = content.find("```tool") else {
        return content.trim().to_string();
    };

    let mut result = content[..start].to_string();
    let after_marker = &content[start + "```tool".len()..];
    if let Some(end) = after_marker.find("```") {
        result.push_str(&after_marker[end + "```".len()..]);
    }
    result.trim().to_string()
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::provider::{
        Completion, CompletionStream, FinishReason, ModelInfo, ProviderInfo, StreamChunk,
    };
    use crate::tool::Tool;

    /// Provider that replays a fixed script of completions
    struct ScriptedProvider {
        replies: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|s| (*s).to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "scripted".into(),
                version: None,
                models: Vec::new(),
                supports_streaming: false,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let content = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "Respuesta final.".into());
            Ok(Completion {
                content,
                model: options.model.clone(),
                usage: None,
                finish_reason: Some(FinishReason::Stop),
            })
        }

        async fn complete_stream(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<CompletionStream> {
            let completion = self.complete(messages, options).await?;
            let chunk = StreamChunk {
                delta: completion.content,
                done: true,
                usage: None,
            };
            Ok(Box::pin(futures::stream::iter(vec![Ok(chunk)])))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

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
            Err(AgentError::ToolExecution("timeout".into()))
        }
    }

    fn agent_with(provider: Arc<ScriptedProvider>, registry: ToolRegistry) -> Agent {
        Agent::new(provider, Arc::new(registry), AgentConfig::default())
    }

    const TOOL_BLOCK: &str = "```tool\n{\"tool\": \"eco\", \"input\": \"hola\"}\n```";

    #[tokio::test]
    async fn test_direct_final_answer() {
        let provider = Arc::new(ScriptedProvider::new(&["Madrid es la capital de España."]));
        let agent = agent_with(provider.clone(), ToolRegistry::new());
        let mut memory = ConversationMemory::new();

        let answer = agent.run(&mut memory, "¿Capital de España?").await.unwrap();

        assert_eq!(answer, "Madrid es la capital de España.");
        assert_eq!(provider.calls(), 1);
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_cycle_then_final() {
        let provider = Arc::new(ScriptedProvider::new(&[TOOL_BLOCK, "Listo: eco recibido."]));
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let agent = agent_with(provider.clone(), registry);
        let mut memory = ConversationMemory::new();

        let answer = agent.run(&mut memory, "haz eco").await.unwrap();

        assert_eq!(answer, "Listo: eco recibido.");
        assert_eq!(provider.calls(), 2);
        // one exchange for the whole turn, not one per cycle
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_directive_recovers() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "```tool\n{\"tool\": \"eco\", \"input\": sin comillas}\n```",
            "Respuesta tras corregirme.",
        ]));
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let agent = agent_with(provider.clone(), registry);
        let mut memory = ConversationMemory::new();

        let answer = agent.run(&mut memory, "haz eco").await.unwrap();

        assert_eq!(answer, "Respuesta tras corregirme.");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_recovers() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "```tool\n{\"tool\": \"telepatia\", \"input\": \"hola\"}\n```",
            "Sin telepatía, pero aquí va la respuesta.",
        ]));
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let agent = agent_with(provider.clone(), registry);
        let mut memory = ConversationMemory::new();

        let answer = agent.run(&mut memory, "lee mi mente").await.unwrap();

        assert_eq!(answer, "Sin telepatía, pero aquí va la respuesta.");
    }

    #[tokio::test]
    async fn test_iteration_budget_forces_final_answer() {
        // The model insists on the tool forever; the loop must cap at 5
        // cycles and still produce an answer via the forced generation.
        let provider = Arc::new(ScriptedProvider::new(&[
            TOOL_BLOCK, TOOL_BLOCK, TOOL_BLOCK, TOOL_BLOCK, TOOL_BLOCK,
            "Mejor respuesta disponible.",
        ]));
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let agent = agent_with(provider.clone(), registry);
        let mut memory = ConversationMemory::new();

        let answer = agent.run(&mut memory, "haz eco sin parar").await.unwrap();

        assert_eq!(answer, "Mejor respuesta disponible.");
        // 5 reason/act cycles + 1 forced final generation
        assert_eq!(provider.calls(), 6);
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_failure_does_not_abort_turn() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "```tool\n{\"tool\": \"rota\", \"input\": \"x\"}\n```",
            "La herramienta falló, pero sigo aquí.",
        ]));
        let mut registry = ToolRegistry::new();
        registry.register(BrokenTool);
        let agent = agent_with(provider.clone(), registry);
        let mut memory = ConversationMemory::new();

        let answer = agent.run(&mut memory, "usa la rota").await.unwrap();

        assert_eq!(answer, "La herramienta falló, pero sigo aquí.");
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_parse_inline_directive() {
        let content = r#"Voy a usar {"tool": "eco", "input": "hola"} ahora."#;
        match parse_decision(content) {
            Decision::Invoke { tool, input } => {
                assert_eq!(tool, "eco");
                assert_eq!(input, "hola");
            }
            _ => panic!("expected inline directive"),
        }
    }

    #[test]
    fn test_strip_tool_block() {
        let content = format!("Un momento.\n{TOOL_BLOCK}\nEso fue todo.");
        assert_eq!(strip_tool_block(&content), "Un momento.\n\nEso fue todo.");
    }
}
