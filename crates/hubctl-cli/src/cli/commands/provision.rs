//! Full provisioning flow: start, upload startup files, open a terminal.
//!
//! Any failure aborts the sequence; a started server is left running.

use std::path::Path;

use anyhow::{Context, Result};
use hubctl_core::workspace::{self, FileUpload};
use hubctl_core::{HubConfig, Session, server};
use tracing::info;

use super::workspace::{print_response, read_upload};

pub const DEFAULT_PROFILE: &str = "python automagic.py";
const PROFILE_NAME: &str = ".profile";
const MAGIC_NAME: &str = "automagic.py";

pub struct ProvisionOptions<'a> {
    pub config: &'a HubConfig,
    pub profile: &'a str,
    pub magic: Option<&'a Path>,
    pub stop_after: bool,
}

pub async fn run(options: ProvisionOptions<'_>) -> Result<()> {
    let ProvisionOptions {
        config,
        profile,
        magic,
        stop_after,
    } = options;

    let session = Session::new(&config.token, config.verify_tls)?;
    let server_url = server::start_server(&session, config)
        .await
        .with_context(|| format!("start server {}", config.log_name()))?;

    let status = workspace::server_status(&session, &server_url)
        .await
        .context("read server status")?;
    info!("Server status: {status}");

    let nb_session = workspace::notebook_session(&session, config)
        .await
        .context("create notebook session")?;

    let mut uploads = vec![FileUpload::text(PROFILE_NAME, profile)];
    if let Some(magic) = magic {
        uploads.push(read_upload(magic, Some(MAGIC_NAME), false)?);
    }
    for upload in &uploads {
        let response = workspace::put_file(&nb_session, config, upload)
            .await
            .with_context(|| format!("upload {}", upload.name))?;
        print_response(&response);
    }

    let response = workspace::create_terminal(&nb_session, config)
        .await
        .context("create terminal")?;
    print_response(&response);

    println!("{server_url}");

    if stop_after {
        server::stop_server(&session, config)
            .await
            .with_context(|| format!("stop server {}", config.log_name()))?;
    }
    Ok(())
}
