//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hubctl_core::config::{self, Overrides};
use hubctl_core::{HubConfig, interrupt};

mod commands;

#[derive(Parser)]
#[command(name = "hubctl")]
#[command(version)]
#[command(about = "Start, provision and stop JupyterHub user servers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    hub: HubArgs,
}

/// Connection arguments shared by every hub command.
#[derive(clap::Args, Debug, Clone, Default)]
struct HubArgs {
    /// Hub base URL (overrides config)
    #[arg(long, env = "HUBCTL_HUB_URL", global = true)]
    hub_url: Option<String>,

    /// User whose server is managed
    #[arg(long, env = "HUBCTL_USER", global = true)]
    user: Option<String>,

    /// Named server (default: the user's default server)
    #[arg(long = "server", value_name = "NAME", global = true)]
    server_name: Option<String>,

    /// API token
    #[arg(long, env = "HUBCTL_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// File containing the API token
    #[arg(long, env = "HUBCTL_TOKEN_FILE", value_name = "PATH", global = true)]
    token_file: Option<PathBuf>,

    /// Verify TLS certificates
    #[arg(long, global = true)]
    verify_tls: bool,
}

impl From<&HubArgs> for Overrides {
    fn from(args: &HubArgs) -> Self {
        Overrides {
            hub_url: args.hub_url.clone(),
            user: args.user.clone(),
            server_name: args.server_name.clone(),
            token: args.token.clone(),
            token_file: args.token_file.clone(),
            verify_tls: args.verify_tls,
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the server (if needed) and print its URL once ready
    Start,
    /// Stop the server and wait until it is gone
    Stop,
    /// Mint a scoped token for the user and print it
    Token,
    /// Upload a local file into the user's home directory
    Upload {
        /// Local file to upload
        #[arg(value_name = "LOCAL")]
        local: PathBuf,

        /// Target file name (default: the local file name)
        #[arg(long)]
        name: Option<String>,

        /// Send as text instead of base64
        #[arg(long)]
        text: bool,
    },
    /// Open a terminal in the user's server
    Terminal,
    /// Start the server, upload the startup files and open a terminal
    Provision {
        /// Content of the uploaded .profile
        #[arg(long, default_value = commands::provision::DEFAULT_PROFILE)]
        profile: String,

        /// Local script uploaded as automagic.py
        #[arg(long, value_name = "PATH")]
        magic: Option<PathBuf>,

        /// Stop the server again when done
        #[arg(long)]
        stop_after: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(interrupt::run_interruptible(dispatch(cli)))
}

fn resolve(args: &HubArgs) -> Result<HubConfig> {
    let config = config::Config::load().context("load config")?;
    config.resolve(&args.into())
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, hub } = cli;

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Commands::Start => commands::server::start(&resolve(&hub)?).await,
        Commands::Stop => commands::server::stop(&resolve(&hub)?).await,
        Commands::Token => commands::workspace::token(&resolve(&hub)?).await,
        Commands::Upload { local, name, text } => {
            commands::workspace::upload(&resolve(&hub)?, &local, name.as_deref(), text).await
        }
        Commands::Terminal => commands::workspace::terminal(&resolve(&hub)?).await,
        Commands::Provision {
            profile,
            magic,
            stop_after,
        } => {
            commands::provision::run(commands::provision::ProvisionOptions {
                config: &resolve(&hub)?,
                profile: &profile,
                magic: magic.as_deref(),
                stop_after,
            })
            .await
        }
    }
}
