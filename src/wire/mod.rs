use serde::{Deserialize, Serialize};

use crate::config::AgentRole;

/// ========================================
/// Gateway request and provider wire formats
/// ========================================

/// One stage's call, built fresh for every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub role: AgentRole,
    pub role_instruction: String,
    pub user_prompt: String,
    pub model: String,
}

// ---- OpenAI-compatible chat completions (Groq, OpenRouter) ----

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// ---- Gemini generateContent ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest<'a> {
    pub system_instruction: GeminiContent<'a>,
    pub contents: Vec<GeminiContent<'a>>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    pub parts: Vec<GeminiPartOut<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GeminiPartOut<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiPartIn>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiPartIn {
    #[serde(default)]
    pub text: String,
}

impl GeminiResponse {
    /// Full text of the first candidate, parts joined in order.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        Some(content.parts.iter().map(|p| p.text.as_str()).collect())
    }
}

impl ChatResponse {
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}
