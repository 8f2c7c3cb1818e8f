use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vigil_core::Config;
use vigil_core::config::{DEFAULT_STORE_FILE, parse_utc_offset};
use vigil_core::ports::Operation;

mod commands;

#[derive(Parser)]
#[command(
    name = "vigil",
    about = "Start/stop a compute instance and keep its uptime history",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Cloud project of the instance
    #[arg(long, env = "GCE_VM_LAUNCHER_PROJECT", global = true)]
    project: Option<String>,

    /// Zone of the instance
    #[arg(long, env = "GCE_VM_LAUNCHER_ZONE", global = true)]
    zone: Option<String>,

    /// Instance name
    #[arg(long, env = "GCE_VM_LAUNCHER_INSTANCE", global = true)]
    instance: Option<String>,

    /// Status history file (JSON lines)
    #[arg(long, env = "VIGIL_STORE", default_value = DEFAULT_STORE_FILE, global = true)]
    store: PathBuf,

    /// Reference UTC offset for month boundaries (Z, +09:00, -05:00, ...)
    #[arg(long, env = "VIGIL_UTC_OFFSET", default_value = "Z", allow_hyphen_values = true, global = true)]
    utc_offset: String,
}

#[derive(Args)]
struct WaitArgs {
    /// Poll until the instance settles
    #[arg(long)]
    wait: bool,

    /// Seconds between status polls while waiting
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Maximum number of status polls while waiting
    #[arg(long, default_value_t = 60)]
    poll_attempts: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the instance
    Start(WaitArgs),
    /// Stop the instance
    Stop(WaitArgs),
    /// Show status and external IP
    Status,
    /// Append the current status to the history.
    ///
    /// Without --status the status is read from the instance.
    Record {
        /// Record this status instead of asking the instance
        #[arg(long)]
        status: Option<String>,
    },
    /// Report running minutes for a month
    Uptime {
        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl GlobalArgs {
    fn into_config(self) -> anyhow::Result<Config> {
        Ok(Config {
            project: self.project,
            zone: self.zone,
            instance: self.instance,
            store_path: self.store,
            utc_offset: parse_utc_offset(&self.utc_offset)?,
        })
    }
}

impl WaitArgs {
    fn poll_policy(&self) -> vigil_core::PollPolicy {
        vigil_core::PollPolicy::new(Duration::from_secs(self.poll_interval), self.poll_attempts)
    }
}

const DEFAULT_LOG_FILTER: &str = "vigil=info,vigil_core=info";

/// `RUST_LOG` wins as a whole; the defaults only apply when it is unset or unparsable.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();
    let config = cli.global.into_config()?;
    tracing::debug!(store = %config.store_path.display(), offset = %config.utc_offset, "configuration loaded");

    match cli.command {
        Commands::Start(wait) => {
            commands::operate(&config, Operation::Start, wait.wait, wait.poll_policy()).await
        }
        Commands::Stop(wait) => {
            commands::operate(&config, Operation::Stop, wait.wait, wait.poll_policy()).await
        }
        Commands::Status => commands::status(&config).await,
        Commands::Record { status } => commands::record(&config, status).await,
        Commands::Uptime { month, json } => commands::uptime(&config, month.as_deref(), json).await,
    }
}
