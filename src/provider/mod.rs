use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::{AgentRole, Config, ProviderKind};
use crate::errors::StudioError;
use crate::ux;
use crate::wire::GenerationRequest;

pub mod gemini;
pub mod openai;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Where a call goes and with which credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    OpenAiCompatible { base_url: String, api_key: String },
    Native { api_key: String },
}

impl ProviderConfig {
    /// `None` when the provider's key is empty.
    pub fn resolve(kind: ProviderKind, cfg: &Config) -> Option<Self> {
        let key = cfg.key_for(kind).trim();
        if key.is_empty() {
            return None;
        }
        let api_key = key.to_string();
        Some(match kind {
            ProviderKind::Groq => ProviderConfig::OpenAiCompatible { base_url: GROQ_BASE_URL.into(), api_key },
            ProviderKind::OpenRouter => {
                ProviderConfig::OpenAiCompatible { base_url: OPENROUTER_BASE_URL.into(), api_key }
            }
            ProviderKind::GoogleNative => ProviderConfig::Native { api_key },
        })
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, provider: &ProviderConfig, req: &GenerationRequest) -> Result<String>;
}

/// reqwest-backed transport speaking both wire formats.
pub struct HttpTransport {
    client: Client,
    gemini_base: String,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
        Ok(Self { client, gemini_base: gemini::API_BASE.into() })
    }

    pub fn with_gemini_base(mut self, base: impl Into<String>) -> Self {
        self.gemini_base = base.into();
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, provider: &ProviderConfig, req: &GenerationRequest) -> Result<String> {
        match provider {
            ProviderConfig::OpenAiCompatible { base_url, api_key } => {
                openai::complete(&self.client, base_url, api_key, req).await
            }
            ProviderConfig::Native { api_key } => gemini::complete(&self.client, &self.gemini_base, api_key, req).await,
        }
    }
}

/// Uniform completion entry point used by every pipeline stage.
pub struct Gateway<T> {
    transport: T,
    config: Config,
    progress: bool,
}

impl<T: Transport> Gateway<T> {
    pub fn new(transport: T, config: Config, progress: bool) -> Self {
        Self { transport, config, progress }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// One attempt, no retry. `agent` only labels the spinner.
    pub async fn complete(
        &self,
        role: AgentRole,
        agent: &str,
        role_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, StudioError> {
        let selection = self.config.selection(role);
        let provider = ProviderConfig::resolve(selection.provider, &self.config)
            .ok_or(StudioError::MissingCredential { role, provider: selection.provider })?;

        let req = GenerationRequest {
            role,
            role_instruction: role_instruction.to_string(),
            user_prompt: user_prompt.to_string(),
            model: selection.model,
        };

        debug!(%role, provider = %selection.provider, model = %req.model, prompt_bytes = user_prompt.len(), "calling provider");
        let spinner = ux::spinner(&format!("{agent} is working..."), self.progress);
        let started = Instant::now();
        let outcome = self.transport.send(&provider, &req).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                debug!(%role, bytes = text.len(), elapsed_ms = started.elapsed().as_millis() as u64, "provider answered");
                Ok(text)
            }
            Ok(_) => {
                warn!(%role, "provider returned an empty completion");
                Err(StudioError::ProviderCall { role, message: "empty completion".into() })
            }
            Err(e) => {
                warn!(%role, error = %e, "provider call failed");
                Err(StudioError::ProviderCall { role, message: format!("{e:#}") })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned answers and records every request it sees.
    #[derive(Default)]
    pub struct ScriptedTransport {
        answers: Mutex<VecDeque<Result<String, String>>>,
        pub seen: Mutex<Vec<(ProviderConfig, GenerationRequest)>>,
    }

    impl ScriptedTransport {
        pub fn new(answers: Vec<Result<&str, &str>>) -> Self {
            let answers = answers
                .into_iter()
                .map(|a| a.map(str::to_string).map_err(str::to_string))
                .collect();
            Self { answers: Mutex::new(answers), seen: Mutex::new(Vec::new()) }
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        pub fn prompt(&self, i: usize) -> String {
            self.seen.lock().unwrap()[i].1.user_prompt.clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, provider: &ProviderConfig, req: &GenerationRequest) -> Result<String> {
            self.seen.lock().unwrap().push((provider.clone(), req.clone()));
            match self.answers.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
                None => Err(anyhow::anyhow!("no scripted answer left")),
            }
        }
    }

    pub fn keyed_config() -> Config {
        let mut cfg = Config::default();
        cfg.groq_key = "gsk_test".into();
        cfg.google_key = "g_test".into();
        cfg.or_key = "or_test".into();
        cfg
    }
}
