use anyhow::Context;
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::archive;
use crate::pipeline::Session;
use crate::project::{render_web_preview, Classification, ProjectBundle, WebPreview};

pub const ARCHIVE_NAME: &str = "project.zip";
pub const PREVIEW_NAME: &str = "preview.html";

/// Authoritative text kept between CLI invocations so `revise` can pick it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub updated_at: DateTime<Utc>,
    pub request: String,
    pub authoritative: String,
}

impl SessionRecord {
    pub fn new(request: &str, authoritative: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            updated_at: Utc::now(),
            request: request.to_string(),
            authoritative: authoritative.to_string(),
        }
    }

    /// Same session, newer text.
    pub fn revised(&self, authoritative: &str) -> Self {
        Self { updated_at: Utc::now(), authoritative: authoritative.to_string(), ..self.clone() }
    }

    pub fn session(&self) -> Session {
        Session::from_authoritative(self.authoritative.clone())
    }
}

pub fn session_path(workdir: &Path) -> PathBuf {
    workdir.join(".studio").join("session.json")
}

pub fn save_session(workdir: &Path, record: &SessionRecord) -> anyhow::Result<PathBuf> {
    let p = session_path(workdir);
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&p, serde_json::to_string_pretty(record)?)?;
    Ok(p)
}

pub fn load_session(workdir: &Path) -> anyhow::Result<Option<SessionRecord>> {
    let p = session_path(workdir);
    if !p.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&p)?;
    let rec = serde_json::from_str(&raw).with_context(|| format!("corrupt session file {}", p.display()))?;
    Ok(Some(rec))
}

#[derive(Debug, Clone)]
pub struct WrittenOutputs {
    pub archive: PathBuf,
    pub archive_bytes: usize,
    pub preview: Option<PathBuf>,
}

/// Writes the download archive and, for web bundles with an HTML entry point,
/// the injected preview page. A preview left by an earlier bundle is removed
/// when the new one has none.
pub fn write_outputs(workdir: &Path, bundle: &ProjectBundle) -> anyhow::Result<WrittenOutputs> {
    fs::create_dir_all(workdir)?;
    let bytes = archive::package(&bundle.files)?;
    let archive = workdir.join(ARCHIVE_NAME);
    fs::write(&archive, &bytes)?;

    let p = workdir.join(PREVIEW_NAME);
    let preview = match (bundle.classification, render_web_preview(&bundle.files)) {
        (Classification::Web, WebPreview::Page(html)) => {
            fs::write(&p, html)?;
            Some(p)
        }
        _ => {
            if p.exists() {
                fs::remove_file(&p)?;
            }
            None
        }
    };

    info!(archive = %archive.display(), bytes = bytes.len(), preview = preview.is_some(), "outputs written");
    Ok(WrittenOutputs { archive, archive_bytes: bytes.len(), preview })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedFile;
    use tempfile::tempdir;

    #[test]
    fn session_survives_a_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        assert!(load_session(dir.path()).unwrap().is_none());

        let rec = SessionRecord::new("todo app", "### FILE: a.py\nprint(1)");
        save_session(dir.path(), &rec).unwrap();
        let back = load_session(dir.path()).unwrap().unwrap();
        assert_eq!(back, rec);
        assert_eq!(back.session().bundle().unwrap().files[0].path, "a.py");

        let newer = back.revised("### FILE: b.py\nprint(2)");
        assert_eq!(newer.id, rec.id);
        assert_eq!(newer.request, "todo app");
    }

    #[test]
    fn corrupt_session_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".studio")).unwrap();
        std::fs::write(session_path(dir.path()), "nope").unwrap();
        assert!(load_session(dir.path()).is_err());
    }

    #[test]
    fn web_bundle_gets_archive_and_preview() {
        let dir = tempdir().unwrap();
        let bundle = ProjectBundle::new(vec![
            ExtractedFile::new("index.html", "<head></head><body></body>"),
            ExtractedFile::new("app.js", "go()"),
        ]);
        let out = write_outputs(dir.path(), &bundle).unwrap();
        assert!(out.archive.exists());
        assert!(out.archive_bytes > 0);
        let page = std::fs::read_to_string(out.preview.unwrap()).unwrap();
        assert_eq!(page, "<head></head><body><script>go()</script></body>");
    }

    #[test]
    fn code_bundle_has_no_preview() {
        let dir = tempdir().unwrap();
        let bundle = ProjectBundle::new(vec![ExtractedFile::new("main.py", "print(1)")]);
        let out = write_outputs(dir.path(), &bundle).unwrap();
        assert!(out.preview.is_none());
        assert!(!dir.path().join(PREVIEW_NAME).exists());
    }

    #[test]
    fn stale_preview_is_removed_when_bundle_turns_into_code() {
        let dir = tempdir().unwrap();
        let web = ProjectBundle::new(vec![ExtractedFile::new("index.html", "<body>OLD</body>")]);
        assert!(write_outputs(dir.path(), &web).unwrap().preview.is_some());

        let code = ProjectBundle::new(vec![ExtractedFile::new("main.py", "print(1)")]);
        let out = write_outputs(dir.path(), &code).unwrap();
        assert!(out.preview.is_none());
        assert!(!dir.path().join(PREVIEW_NAME).exists());
    }

    #[test]
    fn stale_preview_is_removed_when_html_document_is_empty() {
        let dir = tempdir().unwrap();
        let web = ProjectBundle::new(vec![ExtractedFile::new("index.html", "<body>OLD</body>")]);
        write_outputs(dir.path(), &web).unwrap();

        let empty = ProjectBundle::new(vec![
            ExtractedFile::new("index.html", ""),
            ExtractedFile::new("style.css", "p{}"),
        ]);
        let out = write_outputs(dir.path(), &empty).unwrap();
        assert!(out.preview.is_none());
        assert!(!dir.path().join(PREVIEW_NAME).exists());
    }
}
