//! JSON payloads returned by the documentation tools

use serde_json::{Value, json};

use crate::corpus::{ApiInfo, CodeExample, SearchHit, SectionSummary, SectionView};
use crate::error::DocsError;

pub fn search(query: &str, hits: &[SearchHit]) -> Value {
    if hits.is_empty() {
        return json!({
            "query": query,
            "returned": 0,
            "results": [],
            "message": format!("No results found for '{query}'"),
        });
    }
    json!({
        "query": query,
        "returned": hits.len(),
        "results": hits,
    })
}

pub fn section(view: &SectionView) -> Value {
    json!({ "section": view })
}

pub fn sections(parent: Option<&str>, list: &[SectionSummary]) -> Value {
    json!({
        "parent": parent,
        "total": list.len(),
        "sections": list,
    })
}

pub fn code_examples(topic: &str, language: Option<&str>, examples: &[&CodeExample]) -> Value {
    let records: Vec<_> = examples
        .iter()
        .map(|ex| {
            json!({
                "language": ex.language_or_plain(),
                "section": ex.section,
                "source": ex.source,
                "line": ex.line,
                "code": ex.code,
            })
        })
        .collect();

    let mut response = json!({
        "topic": topic,
        "language": language,
        "returned": records.len(),
        "examples": records,
    });
    if examples.is_empty() {
        response["message"] = json!(format!("No code examples found for '{topic}'"));
    }
    response
}

pub fn api_info(info: &ApiInfo) -> Value {
    json!({ "api": info })
}

pub fn error(err: &DocsError) -> Value {
    let mut body = json!({ "message": err.to_string() });
    if let DocsError::NotFound { kind, name, suggestions } = err {
        body["error"] = json!("not_found");
        body["kind"] = json!(kind.as_str());
        body["name"] = json!(name);
        body["suggestions"] = json!(suggestions);
    }
    body
}
