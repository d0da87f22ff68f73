use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::errors::StudioError;
use crate::extract::ExtractedFile;
use crate::pipeline::{Stage, StageOutput};
use crate::project::{self, Classification, ProjectBundle, WebPreview};

/// Transient "in progress" indicator. Hidden when progress output is off.
pub fn spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn show_stage(out: &StageOutput) {
    let n = match out.stage {
        Stage::Plan => "1",
        Stage::Architecture => "2",
        Stage::Code => "3",
        Stage::Package => "4",
        Stage::Revision => "*",
    };
    println!("\n{} {}", format!("[{n}]").cyan().bold(), out.stage.name().to_uppercase().bold());
    println!("{}", out.text.trim());
}

pub fn show_error(err: &StudioError) {
    let label = match err {
        StudioError::MissingCredential { .. } => "missing key",
        e if e.is_provider_failure() => "provider error",
        _ => "error",
    };
    eprintln!("{} {}", format!("[{label}]").red().bold(), err);
}

/// Bundle overview: the file listing for web projects, the terminal box for
/// code projects, then every file's content.
pub fn show_bundle(bundle: &ProjectBundle, dropped_markers: usize) {
    println!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ Project ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    let kind = match bundle.classification {
        Classification::Web => "WEB".green().bold(),
        Classification::Code => "CODE".yellow().bold(),
    };
    println!("  {}: {}   {}: {}", "Type".bold(), kind, "Files".bold(), bundle.files.len());
    if dropped_markers > 0 {
        println!("  {}: {}", "Skipped markers".red().bold(), dropped_markers);
    }
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());

    if bundle.is_empty() {
        println!("(no files found in the model output)");
        return;
    }

    match bundle.classification {
        Classification::Web => {
            if let WebPreview::NoEntryPoint = project::render_web_preview(&bundle.files) {
                println!("{}", "No HTML file found; nothing to preview.".yellow());
            }
            list_files(&bundle.files);
            print_files(&bundle.files);
        }
        Classification::Code => {
            if let Some(cmd) = project::run_command(&bundle.files) {
                println!("\n{}", "┌─ Terminal ───────────────────────────────".dimmed());
                println!("{} {}", "│ $".dimmed(), cmd.green());
                println!("{}", "│ (console application; download the project to run it)".dimmed());
                println!("{}", "└──────────────────────────────────────────".dimmed());
            }
            print_files(&bundle.files);
        }
    }
}

fn print_files(files: &[ExtractedFile]) {
    print!("{}", file_sections(files));
}

fn file_sections(files: &[ExtractedFile]) -> String {
    files.iter().map(|f| format!("\n{} {}\n{}\n", "###".cyan(), f.path.bold(), f.content)).collect()
}

fn list_files(files: &[ExtractedFile]) {
    for (i, f) in files.iter().enumerate() {
        println!("{}. {}  ({} bytes)", i + 1, f.path.bold(), f.content.len());
    }
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// One trimmed line from stdin; `None` on EOF or an empty line.
pub fn read_line(prompt: &str) -> Option<String> {
    print!("{} ", prompt.bold());
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()).filter(|l| !l.is_empty()),
    }
}
