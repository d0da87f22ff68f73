//! Pulls `(filename, content)` pairs out of free-form model output.
//!
//! A file starts at a marker line such as `### FILE: main.py` (prefixes `###`,
//! `::`, `**`; keywords `DOSYA`, `FILE`, `FILENAME`, case-insensitive) and runs
//! until the next prefix+keyword occurrence or the end of the text. Markers
//! whose filename falls outside `[a-zA-Z0-9_\-.]` are not recognised and their
//! block is lost; [`Extraction::dropped_markers`] counts them. Only whole
//! marker lines naming something path-like count, so `std::filesystem` or a
//! `**Filename conventions:**` heading still end a file but are not reported.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFile {
    pub path: String,
    pub content: String,
}

impl ExtractedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self { path: path.into(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub files: Vec<ExtractedFile>,
    /// Whole marker lines naming a path-like file that the marker pattern rejected.
    pub dropped_markers: usize,
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:###|::|\*\*)\s*(?i:DOSYA|FILE|FILENAME|Dosya)[:\s]*\**`?([a-zA-Z0-9_\-.]+)[`*]*\**\s*\n")
            .expect("marker pattern")
    })
}

/// Prefix and keyword only; this is what ends a file's content.
fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:###|::|\*\*)\s*(?i:DOSYA|FILE|FILENAME|Dosya)").expect("boundary pattern"))
}

/// A full marker line whose name contains `.`, `/` or a backslash.
fn candidate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)(?:###|::|\*\*)[ \t]*(?i:DOSYA|FILENAME|FILE)\b[: \t]*\**`?[^\s`*][^\n]*[./\\][^\n]*$")
            .expect("candidate pattern")
    })
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```\w*\n|\n```$").expect("fence pattern"))
}

pub fn extract(raw: &str) -> Extraction {
    let marker = marker_re();
    let boundary = boundary_re();

    let mut files = Vec::new();
    let mut starts = Vec::new();
    let mut pos = 0;

    while let Some(caps) = marker.captures_at(raw, pos) {
        let whole = caps.get(0).map(|m| (m.start(), m.end()));
        let name = caps.get(1).map(|m| m.as_str());
        let (Some((start, body_start)), Some(name)) = (whole, name) else { break };

        let body_end = boundary.find_at(raw, body_start).map(|m| m.start()).unwrap_or(raw.len());
        files.push(ExtractedFile::new(name.trim(), strip_fence(raw[body_start..body_end].trim())));
        starts.push(start);
        pos = body_end;
    }

    let dropped_markers = candidate_re().find_iter(raw).filter(|m| !starts.contains(&m.start())).count();
    Extraction { files, dropped_markers }
}

/// Removes an opening ```` ```lang ```` line and a closing ```` ``` ```` line.
pub fn strip_fence(content: &str) -> String {
    fence_re().replace_all(content, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn worked_example() {
        let text = "### DOSYA: main.py\n```python\nprint(\"hi\")\n```\n### DOSYA: README.md\nHello";
        let out = extract(text);
        assert_eq!(
            out.files,
            vec![ExtractedFile::new("main.py", "print(\"hi\")"), ExtractedFile::new("README.md", "Hello")]
        );
        assert_eq!(out.dropped_markers, 0);
    }

    #[test]
    fn no_markers_is_empty_not_error() {
        let out = extract("Sure! Here is a plan without any files.");
        assert!(out.files.is_empty());
        assert_eq!(out.dropped_markers, 0);
        assert!(extract("").files.is_empty());
    }

    #[test]
    fn tolerant_marker_styles_in_source_order() {
        let text = "\
Intro text that is ignored.
**FILE: `index.html`**
```html
<html></html>
```
:: filename style.css
body { margin: 0; }

### file: app.js
```
console.log(1);
```
";
        let out = extract(text);
        let names: Vec<_> = out.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(names, vec!["index.html", "style.css", "app.js"]);
        assert_eq!(out.files[0].content, "<html></html>");
        assert_eq!(out.files[1].content, "body { margin: 0; }");
        assert_eq!(out.files[2].content, "console.log(1);");
    }

    #[test]
    fn path_separator_in_name_is_dropped_and_counted() {
        let text = "### FILE: src/main.py\nprint(1)\n### FILE: ok.py\nprint(2)\n";
        let out = extract(text);
        assert_eq!(out.files, vec![ExtractedFile::new("ok.py", "print(2)")]);
        assert_eq!(out.dropped_markers, 1);
    }

    #[test]
    fn dropped_marker_still_ends_previous_file() {
        let text = "### FILE: a.txt\nalpha\n### FILE: bad name.txt\nlost\n";
        let out = extract(text);
        assert_eq!(out.files, vec![ExtractedFile::new("a.txt", "alpha")]);
        assert_eq!(out.dropped_markers, 1);
    }

    #[test]
    fn scope_operator_in_code_is_not_a_skipped_marker() {
        let text = "### FILE: main.cpp\n```cpp\n#include <filesystem>\nint main(){ std::filesystem::path p; }\n```\n";
        let out = extract(text);
        assert_eq!(out.files.len(), 1);
        assert_eq!(out.files[0].path, "main.cpp");
        assert!(out.files[0].content.ends_with("std"));
        assert_eq!(out.dropped_markers, 0);
    }

    #[test]
    fn filename_heading_in_prose_is_not_counted() {
        let text = "**Filename conventions:**\nUse snake_case.\n### FILE: a_b.py\nx\n";
        let out = extract(text);
        assert_eq!(out.files, vec![ExtractedFile::new("a_b.py", "x")]);
        assert_eq!(out.dropped_markers, 0);
    }

    #[test]
    fn nested_path_marker_is_counted_once() {
        let out = extract("### FILE: src/a.py\nprint(1)\n");
        assert!(out.files.is_empty());
        assert_eq!(out.dropped_markers, 1);
    }

    #[test]
    fn duplicate_names_are_kept() {
        let text = "### FILE: a.py\none\n### FILE: a.py\ntwo\n";
        let out = extract(text);
        assert_eq!(out.files.len(), 2);
        assert_eq!(out.files[1].content, "two");
    }

    #[test]
    fn marker_at_end_of_text_without_body() {
        let out = extract("### FILE: empty.txt\n");
        assert_eq!(out.files, vec![ExtractedFile::new("empty.txt", "")]);
    }

    #[test]
    fn fence_strip_only_touches_the_edges() {
        assert_eq!(strip_fence("```rust\nfn main() {}\n```"), "fn main() {}");
        assert_eq!(strip_fence("a\n```\nb"), "a\n```\nb");
        assert_eq!(strip_fence("plain"), "plain");
    }
}
