//! Role instructions and per-stage prompt templates.

/// Marker line every code-producing stage must use for each file.
pub const FILE_FORMAT: &str = "### FILE: name\n```code```";

pub fn planner_instruction() -> &'static str {
    "You are a product manager. Turn the request into a short list of concrete requirements."
}

pub fn architect_instruction() -> &'static str {
    "You are a software architect. Define the file structure and what each file is responsible for."
}

pub fn coder_instruction() -> &'static str {
    "You are a coder. Output code only."
}

pub fn reviewer_instruction() -> &'static str {
    "You are a packager. Merge and normalize the project files."
}

pub fn revisor_instruction() -> &'static str {
    "You are a revision specialist. Apply the requested change to the project."
}

pub fn plan_prompt(request: &str) -> String {
    format!("Project: {request}")
}

pub fn architecture_prompt(plan: &str) -> String {
    format!("Plan: {plan}")
}

pub fn code_prompt(architecture: &str) -> String {
    format!("Architecture: {architecture}\nTask: Write the code.\nFormat: {FILE_FORMAT}")
}

pub fn package_prompt(code: &str) -> String {
    format!("Merge the files and keep the format: {FILE_FORMAT}\n\nInput: {code}")
}

pub fn revision_prompt(authoritative: &str, change: &str) -> String {
    format!("CODE: {authoritative}\nREQUEST: {change}\nTASK: Revise it. Keep the format: ### FILE: name")
}
