use serde::Serialize;
use tracing::{info, warn};

use crate::config::AgentRole;
use crate::errors::StudioError;
use crate::extract::extract;
use crate::project::ProjectBundle;
use crate::prompt;
use crate::provider::{Gateway, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Plan,
    Architecture,
    Code,
    Package,
    Revision,
}

impl Stage {
    pub const BUILD: [Stage; 4] = [Stage::Plan, Stage::Architecture, Stage::Code, Stage::Package];

    pub fn role(self) -> AgentRole {
        match self {
            Stage::Plan | Stage::Architecture => AgentRole::Planner,
            Stage::Code => AgentRole::Coder,
            Stage::Package => AgentRole::Reviewer,
            Stage::Revision => AgentRole::Revisor,
        }
    }

    pub fn agent(self) -> &'static str {
        match self {
            Stage::Plan => "PM",
            Stage::Architecture => "Architect",
            Stage::Code => "Coder",
            Stage::Package => "Packager",
            Stage::Revision => "Revisor",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Architecture => "architecture",
            Stage::Code => "code",
            Stage::Package => "package",
            Stage::Revision => "revision",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Stage::Plan => prompt::planner_instruction(),
            Stage::Architecture => prompt::architect_instruction(),
            Stage::Code => prompt::coder_instruction(),
            Stage::Package => prompt::reviewer_instruction(),
            Stage::Revision => prompt::revisor_instruction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub stage: Stage,
    pub text: String,
}

/// Authoritative text and the bundle parsed from it. Only ever replaced as a
/// whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    authoritative: Option<String>,
    bundle: Option<ProjectBundle>,
    dropped_markers: usize,
}

impl Session {
    pub fn from_authoritative(text: String) -> Self {
        let extraction = extract(&text);
        Self {
            authoritative: Some(text),
            bundle: Some(ProjectBundle::new(extraction.files)),
            dropped_markers: extraction.dropped_markers,
        }
    }

    pub fn authoritative(&self) -> Option<&str> {
        self.authoritative.as_deref()
    }

    pub fn bundle(&self) -> Option<&ProjectBundle> {
        self.bundle.as_ref()
    }

    pub fn dropped_markers(&self) -> usize {
        self.dropped_markers
    }
}

pub struct Orchestrator<T> {
    gateway: Gateway<T>,
    session: Session,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(gateway: Gateway<T>) -> Self {
        Self::with_session(gateway, Session::default())
    }

    pub fn with_session(gateway: Gateway<T>, session: Session) -> Self {
        Self { gateway, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn run_stage(
        &self,
        stage: Stage,
        prompt: &str,
        on_stage: &mut impl FnMut(&StageOutput),
    ) -> Result<String, StudioError> {
        info!(stage = stage.name(), role = %stage.role(), "stage started");
        let text = self
            .gateway
            .complete(stage.role(), stage.agent(), stage.instruction(), prompt)
            .await
            .inspect_err(|e| warn!(stage = stage.name(), error = %e, "stage failed"))?;
        let output = StageOutput { stage, text };
        on_stage(&output);
        Ok(output.text)
    }

    /// Plan, architecture, code, package. The first failure stops the run and
    /// leaves the current session as it was.
    pub async fn build(
        &mut self,
        request: &str,
        mut on_stage: impl FnMut(&StageOutput),
    ) -> Result<&Session, StudioError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(StudioError::EmptyRequest);
        }

        let plan = self.run_stage(Stage::Plan, &prompt::plan_prompt(request), &mut on_stage).await?;
        let arch = self
            .run_stage(Stage::Architecture, &prompt::architecture_prompt(&plan), &mut on_stage)
            .await?;
        let code = self.run_stage(Stage::Code, &prompt::code_prompt(&arch), &mut on_stage).await?;
        let fin = self.run_stage(Stage::Package, &prompt::package_prompt(&code), &mut on_stage).await?;

        self.session = Session::from_authoritative(fin);
        info!(files = self.session.bundle().map_or(0, |b| b.files.len()), "build finished");
        Ok(&self.session)
    }

    /// Sends the whole authoritative text plus the change request; a success
    /// replaces text and bundle outright.
    pub async fn revise(
        &mut self,
        change: &str,
        mut on_stage: impl FnMut(&StageOutput),
    ) -> Result<&Session, StudioError> {
        let change = change.trim();
        if change.is_empty() {
            return Err(StudioError::EmptyRequest);
        }
        let current = self.session.authoritative().ok_or(StudioError::NoProject)?;

        let prompt = prompt::revision_prompt(current, change);
        let updated = self.run_stage(Stage::Revision, &prompt, &mut on_stage).await?;

        self.session = Session::from_authoritative(updated);
        info!(files = self.session.bundle().map_or(0, |b| b.files.len()), "revision applied");
        Ok(&self.session)
    }
}
