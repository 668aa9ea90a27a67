use anyhow::Result;
use clap::Parser;
use parley_relay::server::{RelayState, router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley-relay")]
#[command(about = "Signaling relay and room registry for parley call sessions")]
struct Args {
    /// Адрес, на котором слушает реле.
    #[arg(long, default_value = "127.0.0.1:8787")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let state = RelayState::new();

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!("Relay listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;

    Ok(())
}
