//! Calls against a running user server: scoped session, file writes,
//! terminals.
//!
//! File and terminal calls hand back the hub's response as a [`RawResponse`]
//! instead of failing on a bad status; the caller decides what counts as
//! success.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::config::HubConfig;
use crate::error::{HubError, HubResult};
use crate::models::{RawResponse, TokenResponse};
use crate::session::{Session, decode_json};

/// Mints a new token for the configured user.
///
/// # Errors
/// Returns an HTTP error for a non-2xx response and a Parse error when the
/// body carries no token.
pub async fn mint_token(session: &Session, config: &HubConfig) -> HubResult<String> {
    let response = session.send_checked(session.post(&config.tokens_url())).await?;
    let body: TokenResponse = decode_json(response).await?;
    body.token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HubError::parse("token response has no token"))
}

/// Builds a session acting with a freshly minted token for the user's server.
///
/// # Errors
/// Fails like [`mint_token`], or with a Transport error if the new session
/// cannot be built.
pub async fn notebook_session(session: &Session, config: &HubConfig) -> HubResult<Session> {
    let token = mint_token(session, config).await?;
    Session::new(&token, config.verify_tls)
}

/// Payload of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

/// A file to write into the user's home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub content: FileContent,
}

impl FileUpload {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: FileContent::Text(content.into()),
        }
    }

    pub fn binary(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: FileContent::Binary(content),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ContentsBody<'a> {
    path: String,
    name: &'a str,
    content: String,
    #[serde(rename = "type")]
    kind: &'static str,
    format: &'static str,
}

fn contents_body<'a>(home_dir: &str, upload: &'a FileUpload) -> ContentsBody<'a> {
    let (content, format) = match &upload.content {
        FileContent::Text(text) => (text.clone(), "text"),
        FileContent::Binary(bytes) => (STANDARD.encode(bytes), "base64"),
    };
    ContentsBody {
        path: format!("{home_dir}/{}", upload.name),
        name: &upload.name,
        content,
        kind: "file",
        format,
    }
}

/// Writes `upload` through the contents API.
///
/// # Errors
/// Only transport failures; any HTTP status is returned in the response.
pub async fn put_file(
    session: &Session,
    config: &HubConfig,
    upload: &FileUpload,
) -> HubResult<RawResponse> {
    let url = format!("{}/contents/{}", config.user_server_api_url(), upload.name);
    let body = contents_body(&config.home_dir, upload);
    surface(session, session.put(&url).json(&body)).await
}

/// Opens a terminal in the user's server.
///
/// # Errors
/// Only transport failures; any HTTP status is returned in the response.
pub async fn create_terminal(session: &Session, config: &HubConfig) -> HubResult<RawResponse> {
    let url = format!("{}/terminals", config.user_server_api_url());
    surface(session, session.post(&url)).await
}

/// Reads `{server_url}/api/status`.
///
/// # Errors
/// Returns an HTTP error for a non-2xx response.
pub async fn server_status(session: &Session, server_url: &str) -> HubResult<String> {
    let url = format!("{}/api/status", server_url.trim_end_matches('/'));
    let response = session.send_checked(session.get(&url)).await?;
    response.text().await.map_err(|e| HubError::transport(&e))
}

async fn surface(session: &Session, request: reqwest::RequestBuilder) -> HubResult<RawResponse> {
    let response = session.send(request).await?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(|e| HubError::transport(&e))?;
    Ok(RawResponse::from_parts(status, &text))
}
