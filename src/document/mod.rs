use pulldown_cmark::{Event, Parser, TagEnd};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::error::{DocsError, Result};

// Only `#` to `###` open sections; deeper headings stay in the body.
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,3})\s+(.+?)(?:\s+#+)?\s*$").expect("valid regex")
});
static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\{#([A-Za-z0-9_.:-]+)\}$").expect("valid regex")
});

/// A documentation source file as read from disk
#[derive(Debug, Clone)]
pub struct Document {
    pub path: String,
    pub content: String,
}

/// A fenced code block found inside a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
    pub line: usize,
}

/// A heading and everything up to the next heading, before it is placed in the tree
#[derive(Debug, Clone)]
pub struct ParsedSection {
    pub title: String,
    pub anchor: Option<String>,
    pub level: u8,
    pub line: usize,
    pub body: String,
    pub code_blocks: Vec<CodeBlock>,
}

impl ParsedSection {
    fn new(level: u8, raw_title: &str, line: usize) -> Self {
        let (title, anchor) = split_anchor(raw_title);
        Self {
            title,
            anchor,
            level,
            line,
            body: String::new(),
            code_blocks: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str) {
        self.body.push_str(line);
        self.body.push('\n');
    }

    fn finish(mut self) -> Self {
        self.body = self.body.trim().to_string();
        self
    }
}

struct OpenFence {
    language: Option<String>,
    line: usize,
    lines: Vec<String>,
}

impl OpenFence {
    fn close(self) -> CodeBlock {
        CodeBlock {
            language: self.language,
            code: self.lines.join("\n"),
            line: self.line,
        }
    }
}

/// Splits markdown text into flat, document-ordered sections
#[derive(Debug, Default)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse markdown into sections. Text and code before the first heading are dropped.
    pub fn parse(&self, content: &str) -> Vec<ParsedSection> {
        let mut sections = Vec::new();
        let mut current: Option<ParsedSection> = None;
        let mut fence: Option<OpenFence> = None;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;

            if let Some(open) = fence.as_mut() {
                if line.trim() == "```" {
                    if let (Some(open), Some(section)) = (fence.take(), current.as_mut()) {
                        section.code_blocks.push(open.close());
                    }
                } else {
                    open.lines.push(line.to_string());
                }
                if let Some(section) = current.as_mut() {
                    section.push_line(line);
                }
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                if let Some(done) = current.take() {
                    sections.push(done.finish());
                }
                let level = caps[1].len() as u8;
                current = Some(ParsedSection::new(level, &caps[2], line_no));
                continue;
            }

            if let Some(info) = line.trim_start().strip_prefix("```") {
                let language = info.trim();
                fence = Some(OpenFence {
                    language: (!language.is_empty()).then(|| language.to_string()),
                    line: line_no,
                    lines: Vec::new(),
                });
            }

            if let Some(section) = current.as_mut() {
                section.push_line(line);
            }
        }

        // An unterminated fence runs to the end of the file
        if let (Some(open), Some(section)) = (fence, current.as_mut()) {
            section.code_blocks.push(open.close());
        }
        if let Some(done) = current {
            sections.push(done.finish());
        }

        sections
    }
}

/// Strip a trailing `{#anchor}` from a heading title.
fn split_anchor(raw: &str) -> (String, Option<String>) {
    match ANCHOR.captures(raw.trim()) {
        Some(caps) => {
            let anchor = caps[2].to_string();
            let title = caps[1].trim();
            let title = if title.is_empty() { anchor.clone() } else { title.to_string() };
            (title, Some(anchor))
        }
        None => (raw.trim().to_string(), None),
    }
}

/// Document scanner that finds and reads documentation source files
pub struct DocumentScanner {
    supported_extensions: Vec<String>,
}

impl DocumentScanner {
    /// Create a new document scanner with default supported extensions
    pub fn new() -> Self {
        Self {
            supported_extensions: vec![
                "md".to_string(),
                "mdx".to_string(),
                "markdown".to_string(),
                "txt".to_string(),
            ],
        }
    }

    /// Check if a file is a supported documentation file
    pub fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.supported_extensions.contains(&ext.to_lowercase()))
    }

    /// Load a single file, or every supported file below a directory in path order.
    pub fn load(&self, source: &Path) -> Result<Vec<Document>> {
        if source.is_file() {
            return Ok(vec![self.process_file(source, source.parent())?]);
        }
        if !source.is_dir() {
            return Err(DocsError::startup(source, "no such file or directory"));
        }

        let documents = self.scan_directory(source)?;
        if documents.is_empty() {
            return Err(DocsError::startup(source, "no documentation files found"));
        }
        Ok(documents)
    }

    /// Scan a directory for documentation files
    pub fn scan_directory(&self, dir_path: &Path) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(dir_path).sort_by_file_name() {
            let entry = entry.map_err(|e| DocsError::startup(dir_path, e))?;
            let path = entry.path();
            if path.is_file() && self.is_supported_file(path) {
                documents.push(self.process_file(path, Some(dir_path))?);
            }
        }

        Ok(documents)
    }

    /// Read a single documentation file, naming it relative to `root`
    pub fn process_file(&self, file_path: &Path, root: Option<&Path>) -> Result<Document> {
        let content = std::fs::read_to_string(file_path)
            .map_err(|e| DocsError::startup(file_path, e))?;
        let relative = root
            .and_then(|root| file_path.strip_prefix(root).ok())
            .unwrap_or(file_path);

        Ok(Document {
            path: relative.to_string_lossy().to_string(),
            content,
        })
    }
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert markdown to whitespace-collapsed plain text
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text preview of markdown, cut to `max_chars` with a trailing `...`
pub fn preview(markdown: &str, max_chars: usize) -> String {
    let text = markdown_to_text(markdown);
    if text.chars().count() <= max_chars {
        return text;
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}
