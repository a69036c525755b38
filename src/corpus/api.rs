use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::{Corpus, Section};
use crate::error::{DocsError, Missing, Result};

static CLASS_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Creating an?\s+`?([A-Za-z_]\w*)|\bclass\s+`?([A-Za-z_]\w*)").expect("valid regex")
});
static METHOD_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[A-Za-z_]\w*\.)*([A-Za-z_]\w*)\s*\(").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    /// Declared by a `class Name` or `Creating a Name` heading
    Class,
    /// A section whose title merely mentions the name
    Section,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMethod {
    pub name: String,
    pub signature: String,
    pub description: String,
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiEntry {
    pub name: String,
    pub kind: ApiKind,
    pub description: String,
    pub section: String,
    pub methods: Vec<ApiMethod>,
}

/// Answer to an API lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
    pub name: String,
    pub kind: ApiKind,
    pub description: String,
    pub section: String,
    pub methods: Vec<String>,
    pub method: Option<ApiMethod>,
    /// Markdown of the method section when a method was asked for, else of the class
    pub content: String,
}

/// Class entries keyed by lowercase name, in document order
#[derive(Debug, Default)]
pub(crate) struct ApiIndex {
    entries: Vec<ApiEntry>,
    by_name: HashMap<String, usize>,
}

impl ApiIndex {
    pub(crate) fn build(corpus: &Corpus) -> Self {
        let mut index = ApiIndex::default();
        for section in corpus.sections() {
            let Some(name) = class_name(&section.title) else {
                continue;
            };
            // A later declaration of the same class replaces the earlier one
            let entry = ApiEntry::from_section(corpus, section, name, ApiKind::Class);
            match index.by_name.get(&entry.name.to_lowercase()) {
                Some(&idx) => index.entries[idx] = entry,
                None => {
                    index.by_name.insert(entry.name.to_lowercase(), index.entries.len());
                    index.entries.push(entry);
                }
            }
        }
        index
    }

    pub(crate) fn get(&self, name: &str) -> Option<&ApiEntry> {
        self.by_name.get(&name.to_lowercase()).map(|&idx| &self.entries[idx])
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn class_name(title: &str) -> Option<String> {
    let caps = CLASS_TITLE.captures(title)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string())
}

fn first_line(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("```"))
        .unwrap_or_default()
        .to_string()
}

impl ApiMethod {
    fn from_section(section: &Section, name: String) -> Self {
        Self {
            name,
            signature: section.title.clone(),
            description: first_line(&section.body),
            section: section.path.clone(),
        }
    }
}

impl ApiEntry {
    fn from_section(corpus: &Corpus, section: &Section, name: String, kind: ApiKind) -> Self {
        let methods = corpus
            .descendants(section)
            .into_iter()
            .skip(1)
            .filter_map(|child| {
                let caps = METHOD_TITLE.captures(&child.title)?;
                Some(ApiMethod::from_section(child, caps[1].to_string()))
            })
            .collect();

        Self {
            name,
            kind,
            description: first_line(&section.body),
            section: section.path.clone(),
            methods,
        }
    }
}

impl Corpus {
    pub fn api_entries(&self) -> &[ApiEntry] {
        &self.api.entries
    }

    /// Look up a class, and optionally one of its methods, ignoring case
    pub fn get_api_info(&self, class_name: &str, method_name: Option<&str>) -> Result<ApiInfo> {
        let class_name = class_name.trim();
        let entry = self.resolve_class(class_name)?;

        let method = match method_name.map(str::trim).filter(|m| !m.is_empty()) {
            None => None,
            Some(name) => Some(self.resolve_method(&entry, name)?),
        };

        let content_path = method.as_ref().map_or(&entry.section, |m| &m.section);
        let content = self
            .section(content_path)
            .map(|s| self.full_content(s))
            .unwrap_or_default();

        Ok(ApiInfo {
            name: entry.name.clone(),
            kind: entry.kind,
            description: entry.description.clone(),
            section: entry.section.clone(),
            methods: entry.methods.iter().map(|m| m.name.clone()).collect(),
            method,
            content,
        })
    }

    fn resolve_class(&self, class_name: &str) -> Result<ApiEntry> {
        if let Some(entry) = self.api.get(class_name) {
            return Ok(entry.clone());
        }

        let needle = class_name.to_lowercase();
        let fallback = (!needle.is_empty())
            .then(|| self.sections().find(|s| s.title.to_lowercase().contains(&needle)))
            .flatten();

        match fallback {
            Some(section) => Ok(ApiEntry::from_section(
                self,
                section,
                class_name.to_string(),
                ApiKind::Section,
            )),
            None => Err(DocsError::NotFound {
                kind: Missing::Class,
                name: class_name.to_string(),
                suggestions: self.api.entries.iter().map(|e| e.name.clone()).collect(),
            }),
        }
    }

    fn resolve_method(&self, entry: &ApiEntry, method_name: &str) -> Result<ApiMethod> {
        let needle = method_name.to_lowercase();
        if let Some(method) = entry.methods.iter().find(|m| m.name.to_lowercase() == needle) {
            return Ok(method.clone());
        }

        let by_title = self.section(&entry.section).and_then(|class_section| {
            self.descendants(class_section)
                .into_iter()
                .skip(1)
                .find(|s| s.title.to_lowercase().contains(&needle))
        });

        match by_title {
            Some(section) => Ok(ApiMethod::from_section(section, method_name.to_string())),
            None => Err(DocsError::NotFound {
                kind: Missing::Method,
                name: format!("{}.{}", entry.name, method_name),
                suggestions: entry.methods.iter().map(|m| m.name.clone()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "\
# Scenes

## Creating a Scene

A scene holds every node.

### `scene.add(node)`

Adds a node to the scene.

### Scene.render()

Draws one frame.

### Lifecycle

Scenes are created lazily.

## class Camera

Projects the scene.

# Lighting

Lights illuminate the scene.
";

    #[test]
    fn test_class_names_from_titles() {
        assert_eq!(class_name("Creating a Scene"), Some("Scene".to_string()));
        assert_eq!(class_name("Creating an `Emitter`"), Some("Emitter".to_string()));
        assert_eq!(class_name("The class Camera"), Some("Camera".to_string()));
        assert_eq!(class_name("Classification"), None);
    }

    #[test]
    fn test_entries_and_methods_are_extracted() {
        let corpus = Corpus::from_markdown("api.md", API);
        let names: Vec<_> = corpus.api_entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Scene", "Camera"]);

        let scene = &corpus.api_entries()[0];
        assert_eq!(scene.description, "A scene holds every node.");
        assert_eq!(scene.section, "Scenes/Creating a Scene");
        let methods: Vec<_> = scene.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["add", "render"]);
    }

    #[test]
    fn test_redeclared_class_keeps_last() {
        let corpus = Corpus::from_markdown(
            "api.md",
            "# Basics\n## class Camera\nOld camera.\n# Advanced\n## class camera\nNew camera.\n### Camera.zoom()\nZooms.\n",
        );

        assert_eq!(corpus.api_entries().len(), 1);
        let info = corpus.get_api_info("CAMERA", None).unwrap();
        assert_eq!(info.name, "camera");
        assert_eq!(info.section, "Advanced/class camera");
        assert_eq!(info.description, "New camera.");
        assert_eq!(info.methods, vec!["zoom"]);
    }

    #[test]
    fn test_class_lookup_ignores_case() {
        let corpus = Corpus::from_markdown("api.md", API);
        let info = corpus.get_api_info("scene", None).unwrap();

        assert_eq!(info.name, "Scene");
        assert_eq!(info.kind, ApiKind::Class);
        assert!(info.method.is_none());
        assert!(info.content.starts_with("## Creating a Scene"));
        assert!(info.content.contains("### Lifecycle"));
    }

    #[test]
    fn test_method_lookup() {
        let corpus = Corpus::from_markdown("api.md", API);

        let info = corpus.get_api_info("Scene", Some("RENDER")).unwrap();
        let method = info.method.unwrap();
        assert_eq!(method.name, "render");
        assert_eq!(method.description, "Draws one frame.");
        assert_eq!(info.content, "### Scene.render()\n\nDraws one frame.");

        // Falls back to any descendant title mentioning the name
        let info = corpus.get_api_info("Scene", Some("lifecycle")).unwrap();
        assert_eq!(info.method.unwrap().section, "Scenes/Creating a Scene/Lifecycle");
    }

    #[test]
    fn test_missing_method() {
        let corpus = Corpus::from_markdown("api.md", API);
        match corpus.get_api_info("Scene", Some("destroy")) {
            Err(DocsError::NotFound { kind, name, suggestions }) => {
                assert_eq!(kind, Missing::Method);
                assert_eq!(name, "Scene.destroy");
                assert_eq!(suggestions, vec!["add", "render"]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_section_title_fallback() {
        let corpus = Corpus::from_markdown("api.md", API);
        let info = corpus.get_api_info("lighting", None).unwrap();
        assert_eq!(info.kind, ApiKind::Section);
        assert_eq!(info.section, "Lighting");
        assert_eq!(info.description, "Lights illuminate the scene.");
    }

    #[test]
    fn test_missing_class() {
        let corpus = Corpus::from_markdown("api.md", API);
        let err = corpus.get_api_info("Shader", None).unwrap_err();
        assert!(err.is_not_found());
        assert!(corpus.get_api_info("  ", None).unwrap_err().is_not_found());
    }
}
