use crate::pipeline::StageOutput;
use fs_err as fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Diagnostics go to stderr; `--debug` lowers the default level to debug.
/// `RUST_LOG` overrides both.
pub fn init_tracing(debug: bool) {
    let default = if debug { "universal_studio=debug" } else { "universal_studio=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".studio").join("tx").join(tx.to_string())
}

/// Records one stage's raw output under the run's transaction directory.
/// Files are numbered in call order so a revision loop keeps its history.
pub struct StageRecorder {
    dir: PathBuf,
    seq: usize,
    enabled: bool,
}

impl StageRecorder {
    pub fn new(root: &Path, tx: Uuid, enabled: bool) -> Self {
        Self { dir: tx_dir(root, tx), seq: 0, enabled }
    }

    pub fn save(&mut self, out: &StageOutput) -> anyhow::Result<Option<PathBuf>> {
        if !self.enabled {
            return Ok(None);
        }
        fs::create_dir_all(&self.dir)?;
        self.seq += 1;
        let p = self.dir.join(format!("{:02}-{}.md", self.seq, out.stage.name()));
        fs::write(&p, &out.text)?;
        Ok(Some(p))
    }
}

pub fn print_saved_path(out: &StageOutput, saved: Option<&Path>) {
    let stage = out.stage.name();
    match saved {
        Some(p) => println!("debug[{stage}]: output saved at: {}", p.display()),
        None => println!("debug[{stage}]: output not saved (flag off)"),
    }
    std::io::stdout().flush().ok();
}
