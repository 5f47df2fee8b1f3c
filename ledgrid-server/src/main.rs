use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use ledgrid_server::routes::Router;
use ledgrid_server::server::serve;

/// Serve the LED grid editor page and the frame socket stub
#[derive(Parser)]
#[command(name = "ledgrid-server", version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Directory served at /
    #[arg(long, default_value = "public")]
    public: PathBuf,

    /// Directory served at /images
    #[arg(long, default_value = "images")]
    images: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.public.is_dir() {
        log::warn!("public directory {} does not exist", args.public.display());
    }

    let listener = TcpListener::bind((args.bind, args.port))
        .await
        .with_context(|| format!("binding {}:{}", args.bind, args.port))?;
    let port = listener.local_addr()?.port();
    log::info!("Server running at http://localhost:{port}");

    let router = Arc::new(Router::new(args.public, args.images));
    tokio::select! {
        result = serve(listener, router) => result.context("accepting connections")?,
        _ = tokio::signal::ctrl_c() => log::info!("shutting down"),
    }
    Ok(())
}
