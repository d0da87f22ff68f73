use std::collections::HashMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::StudioError;
use crate::extract::ExtractedFile;

/// Keyed by path: a later file replaces an earlier one with the same path,
/// keeping the earlier one's position.
pub fn dedupe_by_path(files: &[ExtractedFile]) -> Vec<&ExtractedFile> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<&ExtractedFile> = Vec::new();
    for f in files {
        match slots.get(f.path.as_str()) {
            Some(&i) => out[i] = f,
            None => {
                slots.insert(&f.path, out.len());
                out.push(f);
            }
        }
    }
    out
}

/// Deflate-compressed zip with one entry per distinct path.
pub fn package(files: &[ExtractedFile]) -> Result<Vec<u8>, StudioError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for f in dedupe_by_path(files) {
        zip.start_file(f.path.as_str(), options)
            .map_err(|e| StudioError::Archive(format!("{}: {e}", f.path)))?;
        zip.write_all(f.content.as_bytes())
            .map_err(|e| StudioError::Archive(format!("{}: {e}", f.path)))?;
    }

    let cursor = zip.finish().map_err(|e| StudioError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}
