use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use fs_err as fs;
use humansize::{format_size, DECIMAL};
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;
use uuid::Uuid;

use universal_studio::cli::{Args, BuildArgs, Command, ConfigCommand};
use universal_studio::config::Config;
use universal_studio::errors::StudioError;
use universal_studio::log::{self, StageRecorder};
use universal_studio::pipeline::{Orchestrator, Session, StageOutput};
use universal_studio::provider::{Gateway, HttpTransport};
use universal_studio::store::{self, SessionRecord};
use universal_studio::ux;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    log::init_tracing(args.debug);

    match &args.command {
        Command::Build(build) => run_build(&args, build).await,
        Command::Revise { change } => run_revise(&args, change).await,
        Command::Extract { file } => run_extract(&args, file),
        Command::Config(cmd) => run_config(&args, cmd),
    }
}

fn make_gateway(args: &Args) -> Result<Gateway<HttpTransport>> {
    let mut cfg = Config::load(Path::new(&args.config));
    cfg.fill_keys_from_env();
    let transport = HttpTransport::new(args.timeout_secs)?;
    Ok(Gateway::new(transport, cfg, !args.no_progress))
}

fn report_stage(out: &StageOutput, rec: &mut StageRecorder, debug: bool) {
    ux::show_stage(out);
    match rec.save(out) {
        Ok(saved) if debug => log::print_saved_path(out, saved.as_deref()),
        Ok(_) => {}
        Err(e) => warn!(stage = out.stage.name(), error = %e, "could not save stage output"),
    }
}

/// Shows the bundle and writes the archive (plus preview page for web projects).
fn present(workdir: &Path, session: &Session) -> Result<()> {
    let Some(bundle) = session.bundle() else {
        return Ok(());
    };
    ux::show_bundle(bundle, session.dropped_markers());
    let out = store::write_outputs(workdir, bundle)?;
    println!(
        "\n{} {} ({})",
        "Archive:".bold(),
        out.archive.display(),
        format_size(out.archive_bytes, DECIMAL)
    );
    if let Some(p) = &out.preview {
        println!("{} {}", "Preview:".bold(), p.display());
    }
    Ok(())
}

/// The session is on disk before any output is written, so a failed archive
/// write still leaves something for `revise`.
fn commit(workdir: &Path, record: &SessionRecord, session: &Session) -> Result<()> {
    store::save_session(workdir, record)?;
    present(workdir, session)
}

async fn run_build(args: &Args, build: &BuildArgs) -> Result<ExitCode> {
    let workdir = Path::new(&args.workdir);
    let mut orch = Orchestrator::new(make_gateway(args)?);
    let mut rec = StageRecorder::new(workdir, Uuid::new_v4(), args.save_stages);
    let debug = args.debug;
    let mut on_stage = |out: &StageOutput| report_stage(out, &mut rec, debug);

    let mut record = match orch.build(&build.request, &mut on_stage).await {
        Ok(session) => {
            let record = SessionRecord::new(&build.request, session.authoritative().unwrap_or_default());
            commit(workdir, &record, session)?;
            record
        }
        Err(e) => {
            ux::show_error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if build.interactive {
        while let Some(change) = ux::read_line("Change request (empty line to finish):") {
            match orch.revise(&change, &mut on_stage).await {
                Ok(session) => {
                    record = record.revised(session.authoritative().unwrap_or_default());
                    commit(workdir, &record, session)?;
                }
                Err(e) => ux::show_error(&e),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_revise(args: &Args, change: &str) -> Result<ExitCode> {
    let workdir = Path::new(&args.workdir);
    let Some(record) = store::load_session(workdir)? else {
        ux::show_error(&StudioError::NoProject);
        return Ok(ExitCode::FAILURE);
    };

    let mut orch = Orchestrator::with_session(make_gateway(args)?, record.session());
    let mut rec = StageRecorder::new(workdir, record.id, args.save_stages);
    let debug = args.debug;

    match orch.revise(change, |out| report_stage(out, &mut rec, debug)).await {
        Ok(session) => {
            commit(workdir, &record.revised(session.authoritative().unwrap_or_default()), session)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            ux::show_error(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_extract(args: &Args, file: &str) -> Result<ExitCode> {
    let text = fs::read_to_string(file).with_context(|| format!("reading model output from {file}"))?;
    let session = Session::from_authoritative(text);
    present(Path::new(&args.workdir), &session)?;
    Ok(ExitCode::SUCCESS)
}

fn run_config(args: &Args, cmd: &ConfigCommand) -> Result<ExitCode> {
    let path = Path::new(&args.config);
    let mut cfg = Config::load(path);

    match cmd {
        ConfigCommand::Show => {
            println!("{} {}", "Settings:".bold(), path.display());
            println!("{}", serde_json::to_string_pretty(&cfg.masked())?);
            return Ok(ExitCode::SUCCESS);
        }
        ConfigCommand::SetKey { provider, key } => {
            if !cfg.key_for(*provider).is_empty() && !ux::confirm(&format!("Replace the stored {provider} key?")) {
                println!("Aborted by user.");
                return Ok(ExitCode::SUCCESS);
            }
            cfg.set_key(*provider, key.trim().to_string());
        }
        ConfigCommand::SetRole { role, provider, model } => {
            cfg.set_selection(*role, *provider, model.clone());
        }
    }

    cfg.save(path)?;
    println!("{} {}", "Settings saved:".green().bold(), path.display());
    Ok(ExitCode::SUCCESS)
}
