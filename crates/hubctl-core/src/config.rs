//! Configuration management for hubctl.
//!
//! Loads configuration from ${HUBCTL_HOME}/config.toml with sensible defaults
//! and resolves it, together with command line overrides, into a [`HubConfig`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for hubctl configuration.
    //!
    //! HUBCTL_HOME resolution order:
    //! 1. HUBCTL_HOME environment variable (if set)
    //! 2. ~/.config/hubctl (default)

    use std::path::PathBuf;

    /// Returns the hubctl home directory.
    pub fn hubctl_home() -> PathBuf {
        if let Ok(home) = std::env::var("HUBCTL_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".hubctl"),
            |h| h.join(".config").join("hubctl"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        hubctl_home().join("config.toml")
    }
}

/// Contents of config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the hub
    pub hub_url: String,

    /// Account whose server is managed
    pub user: Option<String>,

    /// Named server (empty for the default server)
    pub server_name: String,

    /// Inline API token
    pub token: Option<String>,

    /// File holding the API token
    pub token_file: Option<PathBuf>,

    /// Verify TLS certificates
    pub verify_tls: bool,

    /// Treat launch statuses other than 201/202 as errors
    pub strict_launch_status: bool,

    /// Upper bound for readiness and stop waits (unset waits forever)
    pub wait_timeout_secs: Option<u64>,

    /// Home directory inside the user server
    pub home_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hub_url: Self::DEFAULT_HUB_URL.to_string(),
            user: None,
            server_name: String::new(),
            token: None,
            token_file: None,
            verify_tls: false,
            strict_launch_status: false,
            wait_timeout_secs: None,
            home_dir: Self::DEFAULT_HOME_DIR.to_string(),
        }
    }
}

impl Config {
    const DEFAULT_HUB_URL: &str = "http://127.0.0.1:8000";
    const DEFAULT_HOME_DIR: &str = "/home/jovyan";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default config to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolves the file config plus overrides into a [`HubConfig`].
    ///
    /// Overrides win over file values. The token is taken from the literal
    /// value first, then from the token file.
    ///
    /// # Errors
    /// Returns an error for an invalid hub URL, a missing user, or when no
    /// token can be found.
    pub fn resolve(&self, overrides: &Overrides) -> Result<HubConfig> {
        let hub_url = normalize_hub_url(overrides.hub_url.as_deref().unwrap_or(&self.hub_url))?;

        let user = overrides
            .user
            .as_deref()
            .or(self.user.as_deref())
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .context("No user configured. Pass --user, set HUBCTL_USER or user in config.toml.")?;

        let server_name = overrides
            .server_name
            .clone()
            .unwrap_or_else(|| self.server_name.clone());

        let literal = overrides
            .token
            .as_deref()
            .or(self.token.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let token = match literal {
            Some(token) => token.to_string(),
            None => {
                let path = overrides
                    .token_file
                    .as_deref()
                    .or(self.token_file.as_deref())
                    .context(
                        "No API token available. Pass --token/--token-file, set HUBCTL_TOKEN \
                         or token/token_file in config.toml.",
                    )?;
                read_token_file(path)?
            }
        };

        Ok(HubConfig {
            hub_url,
            user,
            server_name,
            token,
            verify_tls: overrides.verify_tls || self.verify_tls,
            strict_launch_status: self.strict_launch_status,
            wait_timeout: self.wait_timeout_secs.map(Duration::from_secs),
            home_dir: self.home_dir.trim_end_matches('/').to_string(),
        })
    }
}

/// Command line and environment overrides applied on top of config.toml.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hub_url: Option<String>,
    pub user: Option<String>,
    pub server_name: Option<String>,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub verify_tls: bool,
}

/// Reads a token from a file: the whole content, whitespace trimmed.
///
/// # Errors
/// Returns an error if the file cannot be read or holds only whitespace.
pub fn read_token_file(path: &Path) -> Result<String> {
    tracing::info!("Loading token from {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read token from {}", path.display()))?;
    let token = contents.trim();
    if token.is_empty() {
        bail!("Token file {} is empty", path.display());
    }
    Ok(token.to_string())
}

fn normalize_hub_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    url::Url::parse(trimmed).with_context(|| format!("Invalid hub URL: {trimmed}"))?;
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Resolved settings passed into every hub operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Hub base URL without a trailing slash
    pub hub_url: String,
    pub user: String,
    /// Named server; empty for the default server
    pub server_name: String,
    pub token: String,
    pub verify_tls: bool,
    pub strict_launch_status: bool,
    pub wait_timeout: Option<Duration>,
    pub home_dir: String,
}

impl HubConfig {
    /// Minimal config for a hub, user and token, everything else defaulted.
    pub fn new(hub_url: impl Into<String>, user: impl Into<String>, token: impl Into<String>) -> Self {
        let hub_url: String = hub_url.into();
        Self {
            hub_url: hub_url.trim_end_matches('/').to_string(),
            user: user.into(),
            server_name: String::new(),
            token: token.into(),
            verify_tls: false,
            strict_launch_status: false,
            wait_timeout: None,
            home_dir: Config::DEFAULT_HOME_DIR.to_string(),
        }
    }

    #[must_use]
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// `{hub}/hub/api/users/{user}`
    pub fn user_url(&self) -> String {
        format!("{}/hub/api/users/{}", self.hub_url, self.user)
    }

    /// `{hub}/hub/api/users/{user}/servers/{name}`
    pub fn server_api_url(&self) -> String {
        format!("{}/servers/{}", self.user_url(), self.server_name)
    }

    /// `{hub}/hub/api/users/{user}/tokens`
    pub fn tokens_url(&self) -> String {
        format!("{}/tokens", self.user_url())
    }

    /// `{hub}/user/{user}/api`, the single-user server API root.
    pub fn user_server_api_url(&self) -> String {
        format!("{}/user/{}/api", self.hub_url, self.user)
    }

    /// Resolves a hub-relative path such as a progress or server URL.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.hub_url, path)
    }

    /// `user/name`, or just `user` for the default server.
    pub fn log_name(&self) -> String {
        format!("{}/{}", self.user, self.server_name)
            .trim_end_matches('/')
            .to_string()
    }
}
