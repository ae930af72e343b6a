use tracing::{info, warn};

use crate::config::HubConfig;
use crate::error::{HubError, HubResult};
use crate::events::open_event_stream;
use crate::models::{ProgressEvent, ServerModel, UserModel};
use crate::session::Session;

/// What the hub says about a server that should be starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchState<'a> {
    /// A transition is in flight; wait on the progress stream
    Pending(&'a str),
    /// Already up; `url` is valid
    Ready,
    /// Neither pending nor ready
    Unknown,
}

/// Classifies a descriptor. Pending wins over ready.
pub fn launch_state(server: &ServerModel) -> LaunchState<'_> {
    if let Some(verb) = server.pending() {
        LaunchState::Pending(verb)
    } else if server.ready {
        LaunchState::Ready
    } else {
        LaunchState::Unknown
    }
}

/// Ensures the configured server is launched and waits until it is ready.
///
/// Returns the full URL where the server accepts requests.
///
/// # Errors
/// - HTTP error for any non-2xx hub response (and, with
///   `strict_launch_status`, for launch statuses other than 201/202)
/// - State error if the server is neither pending nor ready, or is pending
///   without a progress url
/// - NeverReady error if the progress stream ends (or `wait_timeout`
///   elapses) without a ready event
pub async fn start_server(session: &Session, config: &HubConfig) -> HubResult<String> {
    let user_url = config.user_url();
    let log_name = config.log_name();

    let mut user: UserModel = session.get_json(&user_url).await?;

    if user.server(&config.server_name).is_none() {
        info!("Starting server {log_name}");
        let response = session
            .send_checked(session.post(&config.server_api_url()))
            .await?;
        match response.status().as_u16() {
            201 => info!("Server {log_name} is launched and ready"),
            202 => info!("Server {log_name} is launching..."),
            other if config.strict_launch_status => {
                let body = response.text().await.unwrap_or_default();
                return Err(HubError::http_status(other, &body));
            }
            other => warn!("Unexpected status: {other}"),
        }
        user = session.get_json(&user_url).await?;
    }

    let server = user.server(&config.server_name).ok_or_else(|| {
        HubError::state(format!(
            "Server {log_name} is not listed after the launch request"
        ))
    })?;

    let progress_url = match launch_state(server) {
        LaunchState::Ready => {
            info!("Server {log_name} is ready");
            return Ok(config.absolute(&server.url));
        }
        LaunchState::Pending(verb) => {
            info!("Server {log_name} is pending {verb}");
            if server.progress_url.is_empty() {
                return Err(HubError::state(format!(
                    "Server {log_name} is pending {verb} but has no progress url"
                )));
            }
            config.absolute(&server.progress_url)
        }
        LaunchState::Unknown => {
            return Err(HubError::state(format!(
                "Unexpected server state: {server:?}"
            )));
        }
    };

    let wait = wait_for_ready(session, config, &progress_url);
    match config.wait_timeout {
        Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
            HubError::never_ready(format!(
                "{log_name} not ready after {}s",
                limit.as_secs()
            ))
        })?,
        None => wait.await,
    }
}

async fn wait_for_ready(
    session: &Session,
    config: &HubConfig,
    progress_url: &str,
) -> HubResult<String> {
    let log_name = config.log_name();
    let mut events = open_event_stream::<ProgressEvent>(session, progress_url).await?;

    while let Some(event) = events.next().await {
        let event = event?;
        let progress = event.progress_label();
        let message = event.message_text();
        if event.failed {
            warn!("Progress {progress}%: {message}");
        } else {
            info!("Progress {progress}%: {message}");
        }
        if event.ready {
            events.close();
            let url = event.url.ok_or_else(|| {
                HubError::parse(format!("ready event for {log_name} has no url"))
            })?;
            return Ok(config.absolute(&url));
        }
    }

    Err(HubError::never_ready(format!("{log_name} never started!")))
}
