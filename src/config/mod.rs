use anyhow::Context;
use clap::ValueEnum;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

pub use crate::cli::ProviderKind;
use crate::errors::StudioError;

/// Agents taking part in a run. The revisor has no settings of its own and
/// borrows the coder's provider and model.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Planner,
    Coder,
    Reviewer,
    Revisor,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentRole::Planner => "planner",
            AgentRole::Coder => "coder",
            AgentRole::Reviewer => "reviewer",
            AgentRole::Revisor => "revisor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSelection {
    pub provider: ProviderKind,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub groq_key: String,
    pub google_key: String,
    pub or_key: String,
    pub planner_prov: ProviderKind,
    pub planner_mod: String,
    pub coder_prov: ProviderKind,
    pub coder_mod: String,
    pub reviewer_prov: ProviderKind,
    pub reviewer_mod: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_key: String::new(),
            google_key: String::new(),
            or_key: String::new(),
            planner_prov: ProviderKind::Groq,
            planner_mod: "llama-3.3-70b-versatile".into(),
            coder_prov: ProviderKind::GoogleNative,
            coder_mod: "gemini-1.5-flash".into(),
            reviewer_prov: ProviderKind::Groq,
            reviewer_mod: "llama-3.3-70b-versatile".into(),
        }
    }
}

impl Config {
    /// Strict load. A missing file yields defaults; unreadable or malformed
    /// content is an error.
    pub fn try_load(path: &Path) -> Result<Self, StudioError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| StudioError::ConfigLoad(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| StudioError::ConfigLoad(e.to_string()))
    }

    /// Load that never fails: any problem falls back to defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring unusable config file");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let body = serde_json::to_string_pretty(self)?;
        let mut tmp = NamedTempFile::new_in(dir).context("creating temp config file")?;
        tmp.write_all(body.as_bytes())?;
        tmp.persist(path)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn selection(&self, role: AgentRole) -> RoleSelection {
        let (provider, model) = match role {
            AgentRole::Planner => (self.planner_prov, &self.planner_mod),
            AgentRole::Coder | AgentRole::Revisor => (self.coder_prov, &self.coder_mod),
            AgentRole::Reviewer => (self.reviewer_prov, &self.reviewer_mod),
        };
        RoleSelection { provider, model: model.clone() }
    }

    /// Setting the revisor changes the coder, since they share settings.
    pub fn set_selection(&mut self, role: AgentRole, provider: ProviderKind, model: String) {
        match role {
            AgentRole::Planner => {
                self.planner_prov = provider;
                self.planner_mod = model;
            }
            AgentRole::Coder | AgentRole::Revisor => {
                self.coder_prov = provider;
                self.coder_mod = model;
            }
            AgentRole::Reviewer => {
                self.reviewer_prov = provider;
                self.reviewer_mod = model;
            }
        }
    }

    pub fn key_for(&self, provider: ProviderKind) -> &str {
        match provider {
            ProviderKind::Groq => &self.groq_key,
            ProviderKind::GoogleNative => &self.google_key,
            ProviderKind::OpenRouter => &self.or_key,
        }
    }

    pub fn set_key(&mut self, provider: ProviderKind, key: String) {
        match provider {
            ProviderKind::Groq => self.groq_key = key,
            ProviderKind::GoogleNative => self.google_key = key,
            ProviderKind::OpenRouter => self.or_key = key,
        }
    }

    /// Fill empty keys from the environment. Keys already in the file win.
    pub fn fill_keys_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let sources: [(ProviderKind, &[&str]); 3] = [
            (ProviderKind::Groq, &["GROQ_API_KEY"]),
            (ProviderKind::GoogleNative, &["GOOGLE_API_KEY", "GEMINI_API_KEY"]),
            (ProviderKind::OpenRouter, &["OPENROUTER_API_KEY"]),
        ];
        for (kind, vars) in sources {
            if !self.key_for(kind).is_empty() {
                continue;
            }
            if let Some(v) = vars.iter().filter_map(|v| lookup(*v)).find(|v| !v.trim().is_empty()) {
                debug!(provider = %kind, "using key from environment");
                self.set_key(kind, v.trim().to_string());
            }
        }
    }

    pub fn fill_keys_from_env(&mut self) {
        self.fill_keys_from(|name| std::env::var(name).ok());
    }

    /// Copy safe to print: keys reduced to their last four characters.
    pub fn masked(&self) -> Self {
        let mut out = self.clone();
        out.groq_key = mask(&self.groq_key);
        out.google_key = mask(&self.google_key);
        out.or_key = mask(&self.or_key);
        out
    }
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{tail}")
}
