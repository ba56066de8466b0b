#![allow(missing_docs)]
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

use docurift_gateway::run;

use self::config::GatewayArgs;

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let GatewayArgs {
        host,
        port,
        upstream,
        analyzer,
    } = GatewayArgs::parse().context("parsing arguments")?;
    let addr = SocketAddr::from((host, port));

    run(addr, upstream, analyzer).await?;

    info!("Bye!");
    Ok(())
}
