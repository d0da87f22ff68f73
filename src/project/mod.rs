use serde::{Deserialize, Serialize};

use crate::extract::ExtractedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Web,
    Code,
}

/// Files of the latest successful run or revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBundle {
    pub files: Vec<ExtractedFile>,
    pub classification: Classification,
}

impl ProjectBundle {
    pub fn new(files: Vec<ExtractedFile>) -> Self {
        let classification = classify(&files);
        Self { files, classification }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_html(path: &str) -> bool {
    path.ends_with(".html") || path.ends_with(".htm")
}

pub fn classify(files: &[ExtractedFile]) -> Classification {
    if files.iter().any(|f| is_html(&f.path)) {
        Classification::Web
    } else {
        Classification::Code
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebPreview {
    Page(String),
    NoEntryPoint,
}

/// Single self-contained page: the last HTML file with every stylesheet
/// inlined before `</head>` and every script before `</body>`.
pub fn render_web_preview(files: &[ExtractedFile]) -> WebPreview {
    let mut html: Option<&str> = None;
    let mut css = String::new();
    let mut js = String::new();

    for f in files {
        if is_html(&f.path) {
            html = Some(f.content.as_str());
        } else if f.path.ends_with(".css") {
            css.push_str(&f.content);
        } else if f.path.ends_with(".js") {
            js.push_str(&f.content);
        }
    }

    let Some(doc) = html.filter(|d| !d.is_empty()) else {
        return WebPreview::NoEntryPoint;
    };

    let mut page = doc.to_string();
    if !css.is_empty() {
        page = page.replace("</head>", &format!("<style>{css}</style></head>"));
    }
    if !js.is_empty() {
        page = page.replace("</body>", &format!("<script>{js}</script></body>"));
    }
    WebPreview::Page(page)
}

/// Shell line shown next to a code project. Never executed.
pub fn run_command(files: &[ExtractedFile]) -> Option<String> {
    let main = &files.first()?.path;
    let ext = main.rsplit('.').next().unwrap_or(main);
    let cmd = match ext {
        "py" => format!("python {main}"),
        "js" => format!("node {main}"),
        "java" => format!("javac {main} && java {}", main.replace(".java", "")),
        "cpp" => format!("g++ {main} -o app && ./app"),
        _ => format!("Run the file: {main}"),
    };
    Some(cmd)
}
