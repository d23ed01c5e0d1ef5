//! Toolbridge MCP server entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use toolbridge::{DocumentSource, GoogleCredentials, GoogleDocsClient, UnconfiguredSource};
use toolbridge_mcp::config::{
    load_dotenv, ServerConfig, DEFAULT_ADDR, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_ENDPOINT,
    DEFAULT_QUEUE_DEPTH,
};
use toolbridge_mcp::session::SessionTransport;
use toolbridge_mcp::tools::ToolRegistry;
use toolbridge_mcp::transport::HttpTransport;
use toolbridge_mcp::types::InitializeResult;

#[derive(Parser)]
#[command(
    name = "toolbridge-mcp",
    about = "MCP tool server over session-oriented HTTP",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ServeArgs {
    /// Listen address (host:port).
    #[arg(long, env = "TOOLBRIDGE_ADDR", default_value = DEFAULT_ADDR, global = true)]
    addr: String,

    /// Path of the MCP endpoint.
    #[arg(long, env = "TOOLBRIDGE_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Document read by read_google_doc when the call gives no docId.
    #[arg(long, env = "GOOGLE_DOC_ID", global = true)]
    doc_id: Option<String>,

    /// Upper bound on a single tool call, in seconds.
    #[arg(long, env = "TOOLBRIDGE_CALL_TIMEOUT", default_value_t = DEFAULT_CALL_TIMEOUT_SECS, global = true)]
    call_timeout: u64,

    /// Messages that may queue per session before senders wait.
    #[arg(long, env = "TOOLBRIDGE_QUEUE_DEPTH", default_value_t = DEFAULT_QUEUE_DEPTH, global = true)]
    queue_depth: usize,

    /// Bearer token required on the MCP endpoint.
    #[arg(long, env = "TOOLBRIDGE_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server over HTTP (default).
    Serve,

    /// Print server info and tool descriptors as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   toolbridge-mcp completions bash > ~/.local/share/bash-completion/completions/toolbridge-mcp
    ///   toolbridge-mcp completions zsh > ~/.zfunc/_toolbridge-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl ServeArgs {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let config = ServerConfig {
            addr: self.addr,
            endpoint: self.endpoint,
            call_timeout: Duration::from_secs(self.call_timeout),
            queue_depth: self.queue_depth,
            token: self.token,
            default_document_id: self.doc_id,
        };
        Ok(config.validated()?)
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Google Docs client when credentials are present, otherwise a source
/// whose every fetch reports the missing configuration.
fn document_source() -> Arc<dyn DocumentSource> {
    match GoogleCredentials::from_env() {
        Ok(credentials) => {
            tracing::info!("Google Docs: using {} credentials", credentials.kind());
            Arc::new(GoogleDocsClient::new(credentials))
        }
        Err(e) => {
            tracing::warn!("Google Docs disabled: {e}");
            Arc::new(UnconfiguredSource)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = load_dotenv();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_format);
    if let Some(path) = dotenv_path {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = cli.serve.into_config()?;
            let registry = ToolRegistry::with_default_tools(
                document_source(),
                config.default_document_id.clone(),
            )?;

            tracing::info!("Toolbridge MCP server v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Tools: {}", registry.len());
            if config.token.is_some() {
                tracing::info!("Auth: bearer token required");
            }

            let sessions = Arc::new(SessionTransport::new(
                Arc::new(registry),
                config.transport_config(),
            ));
            let transport = HttpTransport::new(sessions, config.token.clone());
            transport.run(&config.addr).await?;
        }

        Commands::Info => {
            let registry = ToolRegistry::with_default_tools(Arc::new(UnconfiguredSource), None)?;
            let init = InitializeResult::default_result();
            let info = serde_json::json!({
                "server": init.server_info,
                "protocol_version": init.protocol_version,
                "capabilities": init.capabilities,
                "tools": registry.list_tools(),
                "tool_count": registry.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "toolbridge-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
