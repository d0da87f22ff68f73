use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::wire::{GeminiContent, GeminiPartOut, GeminiRequest, GeminiResponse, GenerationConfig, GenerationRequest};

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const TEMPERATURE: f32 = 0.4;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Native Gemini `generateContent` call with the role instruction as the
/// system instruction.
pub async fn complete(client: &Client, api_base: &str, api_key: &str, req: &GenerationRequest) -> Result<String> {
    let url = format!("{}/models/{}:generateContent", api_base.trim_end_matches('/'), req.model);
    let body = GeminiRequest {
        system_instruction: GeminiContent { role: None, parts: vec![GeminiPartOut { text: &req.role_instruction }] },
        contents: vec![GeminiContent { role: Some("user"), parts: vec![GeminiPartOut { text: &req.user_prompt }] }],
        generation_config: GenerationConfig { temperature: TEMPERATURE, max_output_tokens: MAX_OUTPUT_TOKENS },
    };

    debug!(%url, "POST generateContent");

    let resp = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await
        .context("gemini request failed")?;

    let status = resp.status();
    let text = resp.text().await.context("gemini read body failed")?;

    if !status.is_success() {
        return Err(anyhow!("Gemini API error ({}): {}", status, text));
    }

    let parsed: GeminiResponse =
        serde_json::from_str(&text).map_err(|e| anyhow!("gemini response parse error: {e}\nRaw: {text}"))?;

    parsed
        .first_text()
        .ok_or_else(|| anyhow!("gemini returned no candidate text: {text}"))
}
