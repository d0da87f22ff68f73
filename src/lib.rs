pub mod archive;
pub mod cli;
pub mod config;
pub mod errors;
pub mod extract;
pub mod log;
pub mod pipeline;
pub mod project;
pub mod prompt;
pub mod provider;
pub mod store;
pub mod ux;
pub mod wire;
