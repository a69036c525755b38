use std::fs;
use std::path::Path;

use forge_docs_rs::corpus::{Corpus, SectionSummary};
use forge_docs_rs::error::{DocsError, Missing};

const GUIDE: &str = "\
# Getting Started

Welcome to the guide.

## Quick Start {#quickstart}

Not the top-level one.

# Quick Start {#quickstart}

Render your first frame.

```python
scene.render()
```

## Lights

Add a light to the scene.

```rust
scene.add(Light::point());
```

# Reference

## Creating a Scene

Scenes hold nodes.

### Scene.render()

Draws a frame.
";

fn load_guide() -> Corpus {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("guide.md");
    fs::write(&path, GUIDE).unwrap();
    Corpus::load(&path).unwrap()
}

/// Every section reachable by walking `list_sections` from the roots
fn walk(corpus: &Corpus) -> Vec<SectionSummary> {
    let mut seen = Vec::new();
    let mut pending = corpus.list_sections(None).unwrap();
    while let Some(summary) = pending.pop() {
        pending.extend(corpus.list_sections(Some(&summary.path)).unwrap());
        seen.push(summary);
    }
    seen
}

#[test]
fn test_quickstart_scenario() {
    let corpus = load_guide();

    let view = corpus.get_section("quickstart").unwrap();
    assert_eq!(view.path, "quickstart");
    assert_eq!(view.title, "Quick Start");
    assert_eq!(view.source, "guide.md");

    match corpus.get_section("nonexistent") {
        Err(DocsError::NotFound { kind, name, .. }) => {
            assert_eq!(kind, Missing::Section);
            assert_eq!(name, "nonexistent");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_nested_anchor_is_scoped_to_parent() {
    let corpus = load_guide();
    assert!(corpus.section("Getting Started/quickstart").is_some());
    assert_eq!(corpus.section("quickstart").unwrap().level, 1);
}

#[test]
fn test_listed_paths_resolve_exactly() {
    let corpus = load_guide();
    let listed = walk(&corpus);

    assert_eq!(listed.len(), corpus.len());
    for summary in listed {
        let view = corpus.get_section(&summary.path).unwrap();
        assert_eq!(view.path, summary.path);
        assert_eq!(view.title, summary.title);
    }
}

#[test]
fn test_list_sections() {
    let corpus = load_guide();

    let roots: Vec<_> = corpus
        .list_sections(None)
        .unwrap()
        .into_iter()
        .map(|s| s.path)
        .collect();
    assert_eq!(roots, vec!["Getting Started", "quickstart", "Reference"]);

    let children = corpus.list_sections(Some("quickstart")).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].path, "quickstart/Lights");
    assert_eq!(children[0].children, 0);

    assert!(corpus.list_sections(Some("quickstart/Lights")).unwrap().is_empty());

    let err = corpus.list_sections(Some("Nowhere")).unwrap_err();
    assert!(matches!(err, DocsError::NotFound { kind: Missing::Parent, .. }));
}

#[test]
fn test_search_respects_limit_and_corpus() {
    let corpus = load_guide();

    for limit in 0..4 {
        let hits = corpus.search("scene", limit);
        assert!(hits.len() <= limit);
        for hit in &hits {
            let section = corpus.section(&hit.path).expect("hit must exist in corpus");
            assert_eq!(section.title, hit.title);
        }
    }

    let hits = corpus.search("scene", 10);
    assert!(hits.windows(2).all(|pair| pair[0].score >= pair[1].score));
    assert_eq!(hits[0].path, "Reference/Creating a Scene");
}

#[test]
fn test_code_examples_by_topic_and_language() {
    let corpus = load_guide();

    let all = corpus.get_code_examples("scene", None);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].section, "quickstart");
    assert_eq!(all[1].section, "quickstart/Lights");

    let rust = corpus.get_code_examples("scene", Some("RUST"));
    assert_eq!(rust.len(), 1);
    assert_eq!(rust[0].code, "scene.add(Light::point());");

    // Topic may match the section path instead of the code
    let lights = corpus.get_code_examples("lights", None);
    assert_eq!(lights.len(), 1);

    assert!(corpus.get_code_examples("shader", None).is_empty());
}

#[test]
fn test_api_info_is_idempotent() {
    let corpus = load_guide();

    let first = corpus.get_api_info("Scene", Some("render")).unwrap();
    let second = corpus.get_api_info("Scene", Some("render")).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.method.unwrap().description, "Draws a frame.");

    let err = corpus.get_api_info("Shader", None).unwrap_err();
    assert!(matches!(err, DocsError::NotFound { kind: Missing::Class, .. }));
}

#[test]
fn test_load_directory_in_path_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::create_dir(temp_dir.path().join("api")).unwrap();
    fs::write(temp_dir.path().join("b.md"), "# Beta\nsecond\n").unwrap();
    fs::write(temp_dir.path().join("a.md"), "# Alpha\nfirst\n## Child\n").unwrap();
    fs::write(temp_dir.path().join("api").join("camera.mdx"), "## Camera\n").unwrap();
    fs::write(temp_dir.path().join("notes.rs"), "# Ignored\n").unwrap();

    let corpus = Corpus::load(temp_dir.path()).unwrap();
    let roots: Vec<_> = corpus.roots().map(|s| s.path.as_str()).collect();
    assert_eq!(roots, vec!["Alpha", "Camera", "Beta"]);

    // A file's first heading never nests under the previous file's sections
    assert_eq!(corpus.section("Camera").unwrap().source, Path::new("api").join("camera.mdx").to_string_lossy());
}

#[test]
fn test_startup_failures() {
    let temp_dir = tempfile::tempdir().unwrap();

    let missing = Corpus::load(temp_dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(missing, DocsError::Startup { .. }));

    let empty_dir = Corpus::load(temp_dir.path()).unwrap_err();
    assert!(matches!(empty_dir, DocsError::Startup { .. }));

    let no_headings = temp_dir.path().join("plain.txt");
    fs::write(&no_headings, "just some text\n").unwrap();
    let err = Corpus::load(&no_headings).unwrap_err();
    assert!(err.to_string().contains("no sections found"));
}

#[test]
fn test_bundled_documentation_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("docs").join("forge.txt");
    let corpus = Corpus::load(path).unwrap();

    assert!(corpus.get_section("Getting Started/quickstart").is_ok());
    let camera = corpus.get_api_info("camera", Some("look_at")).unwrap();
    assert_eq!(camera.section, "Scenes/class Camera");
    assert!(!corpus.search("light", 5).is_empty());
}
