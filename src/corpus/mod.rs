use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::document::{Document, DocumentParser, DocumentScanner, ParsedSection};
use crate::error::{DocsError, Missing, Result};

mod api;
mod search;

pub use api::{ApiEntry, ApiInfo, ApiKind, ApiMethod};
pub use search::{DEFAULT_MAX_RESULTS, SearchHit};

/// Most code examples a single lookup returns
pub const MAX_CODE_EXAMPLES: usize = 10;
/// Most "did you mean" paths attached to a missing section
pub const MAX_SUGGESTIONS: usize = 5;

/// An addressable node of the documentation tree
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub path: String,
    pub title: String,
    pub level: u8,
    pub source: String,
    pub line: usize,
    pub body: String,
    #[serde(skip)]
    parent: Option<usize>,
    #[serde(skip)]
    children: Vec<usize>,
    #[serde(skip)]
    code_examples: Vec<usize>,
}

/// A fenced code block together with the section it was written in
#[derive(Debug, Clone, Serialize)]
pub struct CodeExample {
    pub language: Option<String>,
    pub code: String,
    pub section: String,
    pub source: String,
    pub line: usize,
}

impl CodeExample {
    /// Language tag, with untagged blocks reported as `plaintext`
    pub fn language_or_plain(&self) -> &str {
        self.language.as_deref().unwrap_or("plaintext")
    }
}

/// Navigation entry returned when listing sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub title: String,
    pub path: String,
    pub level: u8,
    pub children: usize,
}

/// A section with its full markdown, including every descendant
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub title: String,
    pub path: String,
    pub level: u8,
    pub source: String,
    pub line: usize,
    pub content: String,
    pub children: Vec<SectionSummary>,
    pub code_examples: usize,
}

/// Immutable documentation corpus built once at startup
#[derive(Debug, Default)]
pub struct Corpus {
    sections: Vec<Section>,
    roots: Vec<usize>,
    by_path: HashMap<String, usize>,
    examples: Vec<CodeExample>,
    api: api::ApiIndex,
}

impl Corpus {
    /// Load the corpus from a documentation file or directory
    pub fn load(source: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref();
        let documents = DocumentScanner::new().load(source)?;
        tracing::info!("Read {} documentation file(s) from {:?}", documents.len(), source);

        let corpus = Self::from_documents(&documents);
        if corpus.is_empty() {
            return Err(DocsError::startup(source, "no sections found"));
        }
        tracing::info!(
            "Corpus ready: {} sections ({} top-level), {} code examples, {} API entries",
            corpus.len(),
            corpus.roots.len(),
            corpus.examples.len(),
            corpus.api.len()
        );
        Ok(corpus)
    }

    /// Build a corpus from a single in-memory markdown source
    pub fn from_markdown(source: &str, content: &str) -> Self {
        Self::from_documents(&[Document {
            path: source.to_string(),
            content: content.to_string(),
        }])
    }

    /// Build a corpus from already-read documents, in the given order
    pub fn from_documents(documents: &[Document]) -> Self {
        let parser = DocumentParser::new();
        let mut corpus = Corpus::default();

        for document in documents {
            // Headings never nest across files
            let mut open: Vec<usize> = Vec::new();
            for parsed in parser.parse(&document.content) {
                while open
                    .last()
                    .is_some_and(|&top| corpus.sections[top].level >= parsed.level)
                {
                    open.pop();
                }
                let idx = corpus.insert(parsed, open.last().copied(), &document.path);
                open.push(idx);
            }
        }

        corpus.api = api::ApiIndex::build(&corpus);
        corpus
    }

    fn insert(&mut self, parsed: ParsedSection, parent: Option<usize>, source: &str) -> usize {
        let idx = self.sections.len();
        let segment = parsed.anchor.as_deref().unwrap_or(&parsed.title);
        let path = self.unique_path(match parent {
            Some(p) => format!("{}/{}", self.sections[p].path, segment),
            None => segment.to_string(),
        });

        let mut code_examples = Vec::with_capacity(parsed.code_blocks.len());
        for block in parsed.code_blocks {
            code_examples.push(self.examples.len());
            self.examples.push(CodeExample {
                language: block.language,
                code: block.code,
                section: path.clone(),
                source: source.to_string(),
                line: block.line,
            });
        }

        match parent {
            Some(p) => self.sections[p].children.push(idx),
            None => self.roots.push(idx),
        }
        self.by_path.insert(path.clone(), idx);
        self.sections.push(Section {
            path,
            title: parsed.title,
            level: parsed.level,
            source: source.to_string(),
            line: parsed.line,
            body: parsed.body,
            parent,
            children: Vec::new(),
            code_examples,
        });
        idx
    }

    fn unique_path(&self, path: String) -> String {
        if !self.by_path.contains_key(&path) {
            return path;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{path} ({n})");
            if !self.by_path.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All sections in document order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Top-level sections in document order
    pub fn roots(&self) -> impl Iterator<Item = &Section> {
        self.roots.iter().map(|&idx| &self.sections[idx])
    }

    pub fn section(&self, path: &str) -> Option<&Section> {
        self.by_path.get(path).map(|&idx| &self.sections[idx])
    }

    pub fn children<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a Section> {
        section.children.iter().map(|&idx| &self.sections[idx])
    }

    /// The section and all of its descendants, depth first
    pub fn descendants<'a>(&'a self, section: &'a Section) -> Vec<&'a Section> {
        let mut out = Vec::new();
        let mut stack: Vec<&Section> = vec![section];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).collect::<Vec<_>>().into_iter().rev());
        }
        out
    }

    pub fn examples(&self) -> &[CodeExample] {
        &self.examples
    }

    pub fn examples_of<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a CodeExample> {
        section.code_examples.iter().map(|&idx| &self.examples[idx])
    }

    /// Markdown for the section heading, its body and every descendant
    pub fn full_content(&self, section: &Section) -> String {
        let mut content = String::new();
        for (i, part) in self.descendants(section).into_iter().enumerate() {
            if i > 0 {
                content.push_str("\n\n");
            }
            content.push_str(&"#".repeat(part.level as usize));
            content.push(' ');
            content.push_str(&part.title);
            if !part.body.is_empty() {
                content.push_str("\n\n");
                content.push_str(&part.body);
            }
        }
        content
    }

    fn summary(&self, section: &Section) -> SectionSummary {
        SectionSummary {
            title: section.title.clone(),
            path: section.path.clone(),
            level: section.level,
            children: section.children.len(),
        }
    }

    /// Known paths containing `path`, ignoring case
    pub fn suggest_paths(&self, path: &str) -> Vec<String> {
        let needle = path.to_lowercase();
        self.sections
            .iter()
            .filter(|s| s.path.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .map(|s| s.path.clone())
            .collect()
    }

    /// Exact path lookup
    pub fn get_section(&self, path: &str) -> Result<SectionView> {
        let Some(section) = self.section(path) else {
            return Err(DocsError::NotFound {
                kind: Missing::Section,
                name: path.to_string(),
                suggestions: self.suggest_paths(path),
            });
        };

        Ok(SectionView {
            title: section.title.clone(),
            path: section.path.clone(),
            level: section.level,
            source: section.source.clone(),
            line: section.line,
            content: self.full_content(section),
            children: self.children(section).map(|c| self.summary(c)).collect(),
            code_examples: section.code_examples.len(),
        })
    }

    /// Immediate children of `parent_path`, or the top-level sections when omitted
    pub fn list_sections(&self, parent_path: Option<&str>) -> Result<Vec<SectionSummary>> {
        match parent_path {
            None => Ok(self.roots().map(|s| self.summary(s)).collect()),
            Some(path) => {
                let Some(parent) = self.section(path) else {
                    return Err(DocsError::NotFound {
                        kind: Missing::Parent,
                        name: path.to_string(),
                        suggestions: self.suggest_paths(path),
                    });
                };
                Ok(self.children(parent).map(|s| self.summary(s)).collect())
            }
        }
    }

    /// Code examples whose code or section path mentions `topic`, optionally of one language
    pub fn get_code_examples(&self, topic: &str, language: Option<&str>) -> Vec<&CodeExample> {
        let topic = topic.trim().to_lowercase();
        let language = language.map(str::trim).filter(|l| !l.is_empty());

        self.examples
            .iter()
            .filter(|ex| {
                language.is_none_or(|lang| ex.language_or_plain().eq_ignore_ascii_case(lang))
            })
            .filter(|ex| {
                ex.code.to_lowercase().contains(&topic) || ex.section.to_lowercase().contains(&topic)
            })
            .take(MAX_CODE_EXAMPLES)
            .collect()
    }
}
