use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::path::Path;
use std::sync::Arc;
use text_editor_tools::TextEditorTools;
use text_editor_tools::server::TextEditorServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "text-editor-tools")]
#[command(about = "Hash-guarded line editing tools via CLI or MCP", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as MCP server on stdio
    Mcp {
        /// Expose only the read-side tools
        #[arg(long)]
        read_only: bool,
    },
    /// Read a line range from a file and print it as JSON
    Read {
        /// File path (absolute, or relative to the current directory)
        #[arg(long)]
        path: String,
        /// First line (1-based)
        #[arg(long, default_value_t = 1)]
        start: usize,
        /// Last line (inclusive); omit to read to end of file
        #[arg(long)]
        end: Option<usize>,
        /// Text encoding (default: utf-8)
        #[arg(long)]
        encoding: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr: in MCP mode stdout carries only JSON-RPC frames.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "text_editor_tools=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Mcp { read_only } => run_mcp_server(read_only).await,
        Commands::Read {
            path,
            start,
            end,
            encoding,
        } => run_cli_read(path, start, end, encoding).await,
    }
}

async fn run_mcp_server(read_only: bool) -> Result<()> {
    eprintln!("Starting text-editor-tools MCP server");

    let tools = Arc::new(TextEditorTools::new());
    let server = if read_only {
        TextEditorServer::read_only(tools)
    } else {
        TextEditorServer::new(tools)
    };
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    eprintln!("MCP server stopped");
    Ok(())
}

async fn run_cli_read(
    path: String,
    start: usize,
    end: Option<usize>,
    encoding: Option<String>,
) -> Result<()> {
    let tools = TextEditorTools::new();
    let abs = absolutize(&path);
    let out = tools.read_range(&abs, start, end, encoding.as_deref()).await?;

    // CLI prints JSON
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// The engine only accepts absolute paths; resolve a CLI argument against
/// the current directory first.
fn absolutize(p: &str) -> String {
    let path = Path::new(p);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    // Resolve symlinks and `.` segments when the target exists.
    std::fs::canonicalize(&joined)
        .unwrap_or(joined)
        .to_string_lossy()
        .into_owned()
}
