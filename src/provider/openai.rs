use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::wire::{ChatMessage, ChatRequest, ChatResponse, GenerationRequest};

pub const TEMPERATURE: f32 = 0.5;

/// Chat completion against an OpenAI-compatible endpoint (Groq, OpenRouter).
/// The role instruction goes out as the system message.
pub async fn complete(client: &Client, base_url: &str, api_key: &str, req: &GenerationRequest) -> Result<String> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let body = ChatRequest {
        model: &req.model,
        messages: vec![
            ChatMessage { role: "system", content: &req.role_instruction },
            ChatMessage { role: "user", content: &req.user_prompt },
        ],
        temperature: TEMPERATURE,
    };

    debug!(%url, model = %req.model, "POST chat completion");

    let resp = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .context("chat completion request failed")?;

    let status = resp.status();
    let text = resp.text().await.context("chat completion read body failed")?;

    if !status.is_success() {
        return Err(anyhow!("API error ({}): {}", status, text));
    }

    let parsed: ChatResponse = serde_json::from_str(&text)
        .map_err(|e| anyhow!("failed to parse chat completion: {e}\nRaw: {text}"))?;

    parsed
        .first_content()
        .ok_or_else(|| anyhow!("chat completion had no message content"))
}
