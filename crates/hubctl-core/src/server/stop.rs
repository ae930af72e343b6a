use std::time::Duration;

use reqwest::StatusCode;
use tracing::info;

use super::pacer::{Pacer, TokioPacer};
use crate::config::HubConfig;
use crate::error::{HubError, HubResult};
use crate::models::{ServerModel, UserModel};
use crate::session::{Session, ensure_success};

/// Delay between user-model polls while a stop is in flight.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one stop poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopStep {
    /// Server is gone from the user's mapping
    Stopped,
    /// Still transitioning; poll again after the interval
    Pending(String),
    /// Listed but no longer pending
    NotPending,
    /// The configured wait limit has elapsed
    TimedOut,
}

/// Decides what to do after a poll, given the descriptor (absent if the
/// server is no longer listed) and the time spent waiting so far.
pub fn next_stop_step(
    server: Option<&ServerModel>,
    elapsed: Duration,
    timeout: Option<Duration>,
) -> StopStep {
    let Some(server) = server else {
        return StopStep::Stopped;
    };
    let Some(verb) = server.pending() else {
        return StopStep::NotPending;
    };
    if timeout.is_some_and(|limit| elapsed >= limit) {
        return StopStep::TimedOut;
    }
    StopStep::Pending(verb.to_string())
}

/// Stops the configured server and returns once it is gone.
///
/// # Errors
/// See [`stop_server_with`].
pub async fn stop_server(session: &Session, config: &HubConfig) -> HubResult<()> {
    stop_server_with(session, config, &TokioPacer).await
}

/// [`stop_server`] with an explicit pacer.
///
/// # Errors
/// - HTTP error for a non-2xx response other than 404
/// - State error if the server stays listed without a pending transition
/// - NeverReady error if `wait_timeout` elapses first
pub async fn stop_server_with<P: Pacer>(
    session: &Session,
    config: &HubConfig,
    pacer: &P,
) -> HubResult<()> {
    let log_name = config.log_name();

    info!("Stopping server {log_name}");
    let response = session
        .send(session.delete(&config.server_api_url()))
        .await?;
    if response.status() == StatusCode::NOT_FOUND {
        info!("Server {log_name} already stopped");
        return Ok(());
    }
    let response = ensure_success(response).await?;
    if response.status() == StatusCode::NO_CONTENT {
        info!("Server {log_name} stopped");
        return Ok(());
    }

    info!("Server {log_name} stopping...");
    let user_url = config.user_url();
    let mut elapsed = Duration::ZERO;
    loop {
        let user: UserModel = session.get_json(&user_url).await?;
        match next_stop_step(user.server(&config.server_name), elapsed, config.wait_timeout) {
            StopStep::Stopped => {
                info!("Server {log_name} stopped");
                return Ok(());
            }
            StopStep::NotPending => {
                return Err(HubError::state(format!(
                    "Waiting for {log_name}, but no longer pending."
                )));
            }
            StopStep::TimedOut => {
                return Err(HubError::never_ready(format!(
                    "{log_name} still stopping after {}s",
                    elapsed.as_secs()
                )));
            }
            StopStep::Pending(verb) => {
                info!("Server {log_name} pending: {verb}");
                pacer.sleep(POLL_INTERVAL).await;
                elapsed += POLL_INTERVAL;
            }
        }
    }
}
