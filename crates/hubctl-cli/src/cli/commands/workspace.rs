//! Token, upload and terminal command handlers.

use std::path::Path;

use anyhow::{Context, Result, bail};
use hubctl_core::models::RawResponse;
use hubctl_core::workspace::{self, FileUpload};
use hubctl_core::{HubConfig, Session};

pub async fn token(config: &HubConfig) -> Result<()> {
    let session = Session::new(&config.token, config.verify_tls)?;
    let token = workspace::mint_token(&session, config)
        .await
        .context("mint token")?;
    println!("{token}");
    Ok(())
}

pub async fn upload(config: &HubConfig, local: &Path, name: Option<&str>, text: bool) -> Result<()> {
    let session = Session::new(&config.token, config.verify_tls)?;
    let nb_session = workspace::notebook_session(&session, config)
        .await
        .context("create notebook session")?;
    let upload = read_upload(local, name, text)?;
    let response = workspace::put_file(&nb_session, config, &upload)
        .await
        .with_context(|| format!("upload {}", upload.name))?;
    print_response(&response);
    Ok(())
}

pub async fn terminal(config: &HubConfig) -> Result<()> {
    let session = Session::new(&config.token, config.verify_tls)?;
    let nb_session = workspace::notebook_session(&session, config)
        .await
        .context("create notebook session")?;
    let response = workspace::create_terminal(&nb_session, config)
        .await
        .context("create terminal")?;
    print_response(&response);
    Ok(())
}

/// Reads a local file into an upload, named after the file unless `name` is
/// given.
pub fn read_upload(local: &Path, name: Option<&str>, text: bool) -> Result<FileUpload> {
    let name = match name {
        Some(name) => name.to_string(),
        None => match local.file_name() {
            Some(file_name) => file_name.to_string_lossy().to_string(),
            None => bail!("cannot derive a file name from {}", local.display()),
        },
    };
    let bytes = std::fs::read(local).with_context(|| format!("read {}", local.display()))?;
    if text {
        let content = String::from_utf8(bytes)
            .with_context(|| format!("{} is not valid UTF-8", local.display()))?;
        Ok(FileUpload::text(name, content))
    } else {
        Ok(FileUpload::binary(name, bytes))
    }
}

/// Prints a surfaced response: status line, then the body.
pub fn print_response(response: &RawResponse) {
    println!("{}", response.status);
    println!("{}", response.body);
}
