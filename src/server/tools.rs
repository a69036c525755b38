use std::sync::Arc;
use rmcp::model::{AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult, PaginatedRequestParam, ProtocolVersion, RawResource, Resource, ServerCapabilities, ServerInfo};
use serde_json::{Value, json};
use serde::Deserialize;

use rmcp::{
    Error as McpError, RoleServer, ServerHandler, model::*, schemars,
    service::RequestContext, tool,
};

use crate::corpus::{Corpus, DEFAULT_MAX_RESULTS};
use crate::error::Result as DocsResult;
use super::response;

/// URI scheme under which sections are exposed as resources
pub const SECTION_URI_PREFIX: &str = "forge-docs://section/";

/// Resource URI for a section path, each path segment percent-encoded
pub fn section_uri(path: &str) -> String {
    let encoded: Vec<_> = path.split('/').map(urlencoding::encode).collect();
    format!("{SECTION_URI_PREFIX}{}", encoded.join("/"))
}

/// Full markdown of the section a resource URI points at, encoded or not
fn read_section(corpus: &Corpus, uri: &str) -> Option<String> {
    let path = urlencoding::decode(uri.strip_prefix(SECTION_URI_PREFIX)?).ok()?;
    corpus.section(&path).map(|section| corpus.full_content(section))
}

fn section_resources(corpus: &Corpus) -> Vec<Resource> {
    corpus
        .roots()
        .map(|section| RawResource::new(section_uri(&section.path), section.title.clone()).no_annotation())
        .collect()
}

fn section_resource(corpus: &Corpus, uri: String) -> Result<ReadResourceResult, McpError> {
    match read_section(corpus, &uri) {
        Some(content) => Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(content, uri)],
        }),
        None => Err(McpError::resource_not_found(
            "resource_not_found",
            Some(json!({
                "uri": uri
            })),
        )),
    }
}

/// A blank parent means the top of the tree
fn parent_filter(parent_path: Option<&str>) -> Option<&str> {
    parent_path.map(str::trim).filter(|p| !p.is_empty())
}

#[derive(Clone)]
pub struct ForgeDocs {
    pub corpus: Arc<Corpus>,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchDocsRequest {
    #[schemars(description = "free text to look for in section titles and bodies")]
    pub query: String,

    #[serde(default = "default_max_results")]
    #[schemars(description = "the maximum number of results to return (default 5)")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetSectionRequest {
    #[schemars(description = "the full section path, e.g. 'Getting Started/Quick Start'")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCodeExamplesRequest {
    #[schemars(description = "a keyword to match against example code and section paths")]
    pub topic: String,

    #[serde(default)]
    #[schemars(description = "only return examples in this language, e.g. 'python'")]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetApiInfoRequest {
    #[schemars(description = "the class to look up")]
    pub class_name: String,

    #[serde(default)]
    #[schemars(description = "a method of the class to look up (optional)")]
    pub method_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListSectionsRequest {
    #[serde(default)]
    #[schemars(description = "the section whose children to list; omit for top-level sections")]
    pub parent_path: Option<String>,
}

/// Turn a lookup outcome into a tool result. Missing things are reported, not raised.
fn respond(outcome: DocsResult<Value>) -> CallToolResult {
    match outcome {
        Ok(value) => CallToolResult::success(vec![Content::text(value.to_string())]),
        Err(err) => {
            tracing::debug!("Lookup failed: {}", err);
            CallToolResult::error(vec![Content::text(response::error(&err).to_string())])
        }
    }
}

#[tool(tool_box)]
impl ForgeDocs {

    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self {
            corpus,
        }
    }

    #[tool(description = "Search the documentation for sections matching a query, best matches first")]
    async fn search_docs(
        &self,
        #[tool(aggr)] SearchDocsRequest { query, max_results }: SearchDocsRequest,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("search_docs called with query: {:?}, max_results: {}", query, max_results);
        let hits = self.corpus.search(&query, max_results);
        Ok(respond(Ok(response::search(&query, &hits))))
    }

    #[tool(description = "Get the full content of a documentation section by its path")]
    async fn get_section(
        &self,
        #[tool(aggr)] GetSectionRequest { path }: GetSectionRequest,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("get_section called with path: {:?}", path);
        Ok(respond(self.corpus.get_section(&path).map(|view| response::section(&view))))
    }

    #[tool(description = "Get code examples related to a topic, optionally filtered by language")]
    async fn get_code_examples(
        &self,
        #[tool(aggr)] GetCodeExamplesRequest { topic, language }: GetCodeExamplesRequest,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("get_code_examples called with topic: {:?}, language: {:?}", topic, language);
        let language = language.as_deref();
        let examples = self.corpus.get_code_examples(&topic, language);
        Ok(respond(Ok(response::code_examples(&topic, language, &examples))))
    }

    #[tool(description = "Get API documentation for a class, or for one of its methods")]
    async fn get_api_info(
        &self,
        #[tool(aggr)] GetApiInfoRequest { class_name, method_name }: GetApiInfoRequest,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("get_api_info called with class_name: {:?}, method_name: {:?}", class_name, method_name);
        Ok(respond(
            self.corpus
                .get_api_info(&class_name, method_name.as_deref())
                .map(|info| response::api_info(&info)),
        ))
    }

    #[tool(description = "List the top-level sections, or the subsections under a given path")]
    async fn list_sections(
        &self,
        #[tool(aggr)] ListSectionsRequest { parent_path }: ListSectionsRequest,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("list_sections called with parent_path: {:?}", parent_path);
        let parent = parent_filter(parent_path.as_deref());
        Ok(respond(
            self.corpus
                .list_sections(parent)
                .map(|list| response::sections(parent, &list)),
        ))
    }
}


#[tool(tool_box)]
impl ServerHandler for ForgeDocs {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("This server answers questions from a fixed documentation corpus. Use 'search_docs' to find relevant sections, 'list_sections' to browse the section tree, 'get_section' to read a section by path, 'get_code_examples' to find code for a topic, or 'get_api_info' to look up a class or method.".to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: PaginatedRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: section_resources(&self.corpus),
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        tracing::info!("read_resource called with uri: {:?}", uri);
        section_resource(&self.corpus, uri)
    }
}
