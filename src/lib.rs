//! # Forge Docs MCP Server
//!
//! A Model-Context-Protocol (MCP) server that loads a static documentation corpus
//! at startup and answers lookups against it for an AI assistant.
//!
//! ## Features
//!
//! - Parse markdown documentation into a tree of addressable sections
//! - Rank sections against free-text queries
//! - Find embedded code examples by topic and language
//! - Look up classes and methods described in the documentation
//!
//! ## Modules
//!
//! - `server`: MCP server implementation and tools
//! - `corpus`: The immutable section tree and its queries
//! - `document`: Markdown parsing and source file discovery
//! - `error`: Lookup and startup errors

/// Server implementation and MCP tools
pub mod server;
/// Section tree and queries
pub mod corpus;
/// Markdown parsing and source discovery
pub mod document;
/// Error types
pub mod error;

pub use corpus::Corpus;
pub use error::{DocsError, Result};
