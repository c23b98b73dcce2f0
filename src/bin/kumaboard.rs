use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kumaboard::{KumaboardBackend, config_path};
use kumaboard_domain::{RenderPayload, ViewMode};

#[derive(Parser)]
#[command(
    name = "kumaboard",
    about = "Posts and maintains Uptime Kuma status summaries in Discord channels"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "KUMABOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh every registered status message on the configured interval
    Run,
    /// Post or refresh the status message in a channel
    Post {
        #[arg(long)]
        channel: String,
        #[arg(long, value_enum, default_value_t = ViewArg::Minimal)]
        view: ViewArg,
    },
    /// Fetch metrics and print the rendered summary without posting it
    Check {
        #[arg(long, value_enum, default_value_t = ViewArg::Minimal)]
        view: ViewArg,
    },
    /// List registered status messages
    List,
    /// Stop maintaining the status message in a channel
    Forget {
        #[arg(long)]
        channel: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Minimal,
    Detailed,
}

impl From<ViewArg> for ViewMode {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Minimal => ViewMode::Minimal,
            ViewArg::Detailed => ViewMode::Detailed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let path = config_path::resolve(cli.config)?;
    info!("Using config file: {}", path.display());
    let backend = KumaboardBackend::from_path(&path)?;

    match cli.command {
        Command::Run => {
            let scheduler = backend.scheduler();
            info!("Kumaboard is running. Press CTRL-C to exit.");
            scheduler
                .run_until(async {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {err}");
                    }
                })
                .await;
        }
        Command::Post { channel, view } => {
            let reconciler = backend.reconciler();
            match reconciler.handle_request(&channel, view.into()).await {
                Ok(outcome) => {
                    println!("{} (message {})", outcome.reply(), outcome.message_id());
                }
                Err(err) => {
                    error!(destination = %channel, "Status request failed: {err}");
                    anyhow::bail!("{} {err}", err.reply());
                }
            }
        }
        Command::Check { view } => {
            let payload = backend.reconciler().preview(view.into()).await?;
            print_payload(&payload);
        }
        Command::List => {
            let entries = backend.ports().registry.list_all().await?;
            if entries.is_empty() {
                println!("No status messages registered.");
            }
            for entry in entries {
                println!(
                    "channel {}  message {}  view {}",
                    entry.destination_id, entry.message_id, entry.view_mode
                );
            }
        }
        Command::Forget { channel } => {
            let registry = backend.ports().registry;
            match registry.find(&channel).await? {
                Some(entry) => {
                    registry.remove(&entry.message_id, &channel).await?;
                    println!("Forgot status message {} in channel {channel}", entry.message_id);
                }
                None => println!("No status message registered for channel {channel}"),
            }
        }
    }

    Ok(())
}

fn print_payload(payload: &RenderPayload) {
    println!("{} (#{:06x})", payload.title, payload.color.rgb());
    for field in &payload.fields {
        println!("{}", field.name);
        for line in field.body.lines() {
            println!("    {line}");
        }
    }
}
