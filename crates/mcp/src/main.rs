#![forbid(unsafe_code)]

mod auth;
mod entry;
mod server;
mod support;
mod tools;

use crate::auth::BearerTokenAuth;
use crate::support::runtime::{Settings, Transport};
use jg_core::ports::Authenticator;
use jg_core::usecases::UseCases;
use jg_storage::{MemoryBackend, Simulator};
use std::sync::Arc;

// Some MCP clients are strict about the server echoing a compatible protocol version.
const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "jobgate-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) struct McpServer {
    auth: Arc<dyn Authenticator>,
    usecases: UseCases,
}

fn usage() -> &'static str {
    "jg_mcp: authenticated MCP gateway for batch compute jobs\n\n\
USAGE:\n\
  jg_mcp [--auth-token TOKEN] [--transport stdio|http] [--host IP] [--port N]\n\
         [--results-base-url URL] [--simulate-ms MS]\n\
         [--log-level FILTER] [--log-format text|json]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n\
\n\
ENVIRONMENT:\n\
  Every option has a JOBGATE_* fallback, e.g. JOBGATE_AUTH_TOKEN, JOBGATE_TRANSPORT,\n\
  JOBGATE_PORT, JOBGATE_SIMULATE_MS. RUST_LOG overrides --log-level.\n\
\n\
NOTES:\n\
  - An auth token is required; tool calls carry it as `Authorization: Bearer <token>`.\n\
  - Logs go to stderr; stdout is reserved for protocol frames.\n"
}

fn version_line() -> String {
    format!("jg_mcp {SERVER_VERSION} (MCP {MCP_VERSION})")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("jg_mcp: {err}\n");
            eprint!("{}", usage());
            std::process::exit(2);
        }
    };

    support::logging::init(&settings.log_level, settings.log_format);
    tracing::info!(
        version = SERVER_VERSION,
        transport = settings.transport.as_str(),
        "starting jobgate MCP server"
    );
    tracing::debug!(?settings, "settings resolved");

    let backend = Arc::new(MemoryBackend::with_results_base_url(
        settings.results_base_url.clone(),
    ));
    let simulator = settings
        .simulate
        .map(|tick| Simulator::new(backend.clone(), tick).spawn());

    let server = Arc::new(McpServer::new(
        Arc::new(BearerTokenAuth::new(&settings.auth_token)),
        UseCases::new(backend),
    ));

    let result = match settings.transport {
        Transport::Stdio => entry::run_stdio(&server).await,
        Transport::Http => entry::run_http(server.clone(), settings.host, settings.port).await,
    };

    if let Some(handle) = simulator {
        handle.abort();
    }
    if let Err(err) = &result {
        tracing::error!(error = %err, "server stopped with an error");
    }
    result?;
    Ok(())
}
