use thiserror::Error;

use crate::config::{AgentRole, ProviderKind};

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("no {provider} key configured for {role}")]
    MissingCredential { role: AgentRole, provider: ProviderKind },
    #[error("{role} call failed: {message}")]
    ProviderCall { role: AgentRole, message: String },
    #[error("config load failed: {0}")] ConfigLoad(String),
    #[error("no generated project to revise")] NoProject,
    #[error("request text is empty")] EmptyRequest,
    #[error("archive failed: {0}")] Archive(String),
}

impl StudioError {
    /// Failures that come back from a provider rather than from local checks.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, StudioError::ProviderCall { .. })
    }
}
