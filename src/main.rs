use rmcp::{ServiceExt, transport::stdio};

use v0_mcp::config::Config;
use v0_mcp::server::V0Server;

/// `.env` next to the binary, then the cargo project root (target/<profile>/../..),
/// then dotenvy's usual search from the working directory. MCP clients may
/// start the server from any directory.
fn load_dotenv() {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.to_path_buf()));

    let candidates = exe_dir
        .iter()
        .flat_map(|dir| [dir.join(".env"), dir.join("../../.env")]);
    for path in candidates {
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!("ignoring unreadable {}: {e}", path.display());
            }
            return;
        }
    }
    dotenvy::dotenv().ok();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    load_dotenv();

    tracing::info!("v0-mcp starting");

    // Missing V0_API_KEY or a broken config file stops the server here, before
    // the transport is opened.
    let config = Config::load().inspect_err(|e| tracing::error!("{e}"))?;
    tracing::debug!(?config, "configuration loaded");
    let server = V0Server::new(config);

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("serving error: {e:?}"))?;

    service.waiting().await?;

    tracing::info!("v0-mcp shutting down");
    Ok(())
}
