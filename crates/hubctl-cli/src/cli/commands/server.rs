//! Server start/stop command handlers.

use anyhow::{Context, Result};
use hubctl_core::{HubConfig, Session, server};

pub async fn start(config: &HubConfig) -> Result<()> {
    let session = Session::new(&config.token, config.verify_tls)?;
    let url = server::start_server(&session, config)
        .await
        .with_context(|| format!("start server {}", config.log_name()))?;
    println!("{url}");
    Ok(())
}

pub async fn stop(config: &HubConfig) -> Result<()> {
    let session = Session::new(&config.token, config.verify_tls)?;
    server::stop_server(&session, config)
        .await
        .with_context(|| format!("stop server {}", config.log_name()))
}
