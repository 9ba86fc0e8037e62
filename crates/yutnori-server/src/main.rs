//! The server binary: parses `--port`, installs a `tracing` subscriber
//! filtered by `RUST_LOG`, and runs the accept loop.

use clap::Parser;

/// Authoritative Yutnori multiplayer server.
#[derive(Debug, Parser)]
struct Cli {
    /// TCP port to listen on. No other configuration is exposed.
    #[arg(long, default_value_t = 42069)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), yutnori_server::ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    yutnori_server::run(cli.port).await
}
