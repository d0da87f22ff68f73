use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AgentRole;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "Groq")]
    #[value(alias = "Groq")]
    Groq,
    #[serde(rename = "Google (Native)")]
    #[value(name = "google", alias = "gemini", alias = "google-native")]
    GoogleNative,
    #[serde(rename = "OpenRouter")]
    #[value(name = "openrouter", alias = "open-router")]
    OpenRouter,
}

impl ProviderKind {
    /// Label used in the persisted config file.
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Groq => "Groq",
            ProviderKind::GoogleNative => "Google (Native)",
            ProviderKind::OpenRouter => "OpenRouter",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Parser, Debug)]
#[command(name = "universal-studio", version, about = "Plan, code and package a small project with a chain of LLM agents")]
pub struct Args {
    /// Path of the JSON settings file.
    #[arg(long, global = true, default_value = "config.json")]
    pub config: String,

    /// Directory receiving project.zip, preview.html and the .studio session.
    #[arg(long, global = true, default_value = ".")]
    pub workdir: String,

    #[arg(long, global = true, default_value_t = 2400)]
    pub timeout_secs: u64,

    #[arg(long, global = true, default_value_t = false)]
    pub no_progress: bool,

    #[arg(long, global = true, default_value_t = false)]
    pub save_stages: bool,

    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run plan, architecture, code and package stages for a request.
    Build(BuildArgs),
    /// Apply a change request to the last generated project.
    Revise {
        change: String,
    },
    /// Extract files from a saved model output without calling any provider.
    Extract {
        file: String,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(ClapArgs, Debug)]
pub struct BuildArgs {
    /// What to build, e.g. "a snake game in Python".
    pub request: String,

    /// Ask for change requests after the build until an empty line is entered.
    #[arg(long, default_value_t = false)]
    pub interactive: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current settings with keys masked.
    Show,
    SetKey {
        #[arg(value_enum)]
        provider: ProviderKind,
        key: String,
    },
    SetRole {
        #[arg(value_enum)]
        role: AgentRole,
        #[arg(long, value_enum)]
        provider: ProviderKind,
        #[arg(long)]
        model: String,
    },
}
