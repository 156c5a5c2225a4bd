//! Objective prompt construction
//!
//! Both the proxy route and the in-process direct path build their
//! provider request here, so the instructions cannot drift apart.

use serde::Serialize;

use crate::config::CompletionConfig;

/// Fixed system instruction for objective-only output
pub const OBJECTIVE_SYSTEM_PROMPT: &str = r#"You are an AI that produces ONLY objective, non-interpretive, non-personal factual summaries.

Rules:
- No opinions
- No advice
- No reflection
- No evaluation
- No next steps
- No embellishment
- No emotional tone
- Do NOT reference the user
- Do NOT speak in first person
- Keep it concise, factual, and neutral
- Focus *strictly* on the context provided

Output must be plain text only."#;

/// Returned when the provider answers with no text
pub const EMPTY_OUTPUT_MESSAGE: &str = "No objective information could be generated.";

/// One chat message in the provider request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromptMessage {
    pub role: &'static str,
    pub content: String,
}

/// Full chat-completions payload for an objective request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ObjectiveRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// User message wrapping the raw context text
pub fn user_prompt(context: &str) -> String {
    format!(
        "Context from user:\n\n\"{}\"\n\nProduce OBJECTIVE-ONLY information derived from this context — concise, factual bullet points are preferred.",
        context
    )
}

/// Build the provider request for a context
pub fn objective_request(context: &str, config: &CompletionConfig) -> ObjectiveRequest {
    ObjectiveRequest {
        model: config.model.clone(),
        messages: vec![
            PromptMessage {
                role: "system",
                content: OBJECTIVE_SYSTEM_PROMPT.to_string(),
            },
            PromptMessage {
                role: "user",
                content: user_prompt(context),
            },
        ],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}
