use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use rmcp::{ServiceExt, transport::stdio};
use forge_docs_rs::Corpus;
use forge_docs_rs::server::ForgeDocs;
use clap::Parser;

#[cfg(feature = "trace")]
use tracing_subscriber::{EnvFilter};

#[derive(Parser)]
struct Cli {
    /// Documentation file, or a directory of markdown/text files, to serve
    #[clap(long, env = "FORGE_DOCS_PATH", default_value = "docs/forge.txt")]
    docs: PathBuf,
    /// Where to write the server log (stdout carries the protocol)
    #[clap(long, env = "FORGE_DOCS_LOG", default_value = "server.log")]
    log_file: PathBuf,
}

/// You can inspect the server using the Model Context Protocol Inspector.
/// npx @modelcontextprotocol/inspector cargo run

#[tokio::main]
async fn main() -> Result<()> {
    // Get command line arguments
    let args = Cli::parse();

    // Initialize the tracing subscriber with file logging
    #[cfg(feature = "trace")]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_writer(std::fs::File::create(&args.log_file)?)
        .with_ansi(false)
        .init();

    tracing::info!("Starting MCP server");
    tracing::info!("Loading documentation from {:?}", args.docs);

    // The corpus is read once; nothing is served if it cannot be loaded
    let corpus = Corpus::load(&args.docs).inspect_err(|e| {
        tracing::error!("startup failed: {}", e);
    })?;

    let service = ForgeDocs::new(Arc::new(corpus))
        .serve(stdio()).await.inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;

    service.waiting().await?;
    Ok(())
}
